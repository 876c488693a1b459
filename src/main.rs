//! CLI entry point for mdx-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdx-blog")]
#[command(version)]
#[command(about = "A small static blog generator for MDX entries", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new entry
    New {
        /// Title of the new entry
        title: String,

        /// File name (without .mdx), defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Generate static files
    #[command(alias = "generate", alias = "g")]
    Build,

    /// Start a server that renders entries on request
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Remove the generated output
    Clean,

    /// List site information
    List {
        /// Type of content to list (entries, tags, routes)
        #[arg(default_value = "entries")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdx_blog=debug,info"
    } else {
        "mdx_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::New { title, slug } => {
            let blog = mdx_blog::Blog::new(&base_dir)?;
            let path = mdx_blog::commands::new::create_entry(&blog, &title, slug.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::Build => {
            let blog = mdx_blog::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate()?;
            println!("Generated successfully!");
        }

        Commands::Serve { port, ip } => {
            let blog = mdx_blog::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            mdx_blog::server::start(&blog, &ip, port).await?;
        }

        Commands::Clean => {
            let blog = mdx_blog::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = mdx_blog::Blog::new(&base_dir)?;
            mdx_blog::commands::list::run(&blog, &r#type)?;
        }

        Commands::Version => {
            println!("mdx-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
