//! List site content

use anyhow::Result;
use std::io::Write;

use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let stdout = std::io::stdout();
    write_listing(blog, content_type, &mut stdout.lock())
}

fn write_listing(blog: &Blog, content_type: &str, out: &mut impl Write) -> Result<()> {
    match content_type {
        "entry" | "entries" | "post" | "posts" => {
            let catalog = blog.catalog_builder().load_all()?;
            writeln!(out, "Entries ({}):", catalog.len())?;
            for entry in &catalog {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    entry.metadata.date, entry.metadata.title, entry.identifier
                )?;
            }
        }
        "tag" | "tags" => {
            let catalog = blog.catalog_builder().load_all()?;
            let tags = catalog.tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        "route" | "routes" => {
            let routes = blog.page_generator().enumerate_routes()?;
            writeln!(out, "Routes ({}):", routes.len())?;
            for identifier in routes.iter() {
                writeln!(
                    out,
                    "  {}",
                    crate::templates::entry_path(&blog.config.root, identifier)
                )?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: entries, tags, routes",
                content_type
            );
        }
    }

    Ok(())
}
