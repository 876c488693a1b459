//! Create a new entry

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Create `<slug>.mdx` in the content directory with an explicit date
///
/// The slug defaults to the slugified title. Returns the created path.
pub fn create_entry(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() || slug.contains(['.', '/', '\\']) {
        anyhow::bail!("Invalid slug: {:?}", slug);
    }

    fs::create_dir_all(&blog.content_dir)?;

    let file_path = blog.catalog_builder().entry_path(&slug);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndate: \"{}\"\nexcerpt: \"\"\ntags: []\n---\n\n",
        serde_yaml::to_string(title)?.trim_end(),
        now.format("%Y-%m-%d")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_entry_roundtrips_through_catalog() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_entry(&blog, "Hello: World", None).unwrap();
        assert!(path.ends_with("hello-world.mdx"));

        let entry = blog.catalog_builder().load_entry("hello-world").unwrap();
        assert_eq!(entry.metadata.title, "Hello: World");
        assert_eq!(
            entry.metadata.date,
            chrono::Local::now().format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn test_create_entry_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        create_entry(&blog, "Post", Some("post")).unwrap();
        assert!(create_entry(&blog, "Post again", Some("post")).is_err());
    }

    #[test]
    fn test_create_entry_rejects_dotted_slug() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        assert!(create_entry(&blog, "Post", Some("a.b")).is_err());
    }
}
