//! Catalog builder - discovers and loads entries from the content directory

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Entry, FrontMatter, Metadata};
use crate::config::DateFallback;
use crate::error::{Error, Result};

/// Extension of content files
pub const ENTRY_EXTENSION: &str = "mdx";

/// Loads entries from a flat directory of `<identifier>.mdx` files
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    content_dir: PathBuf,
    date_fallback: DateFallback,
}

impl CatalogBuilder {
    /// Create a builder over `content_dir`
    pub fn new<P: Into<PathBuf>>(content_dir: P, date_fallback: DateFallback) -> Self {
        Self {
            content_dir: content_dir.into(),
            date_fallback,
        }
    }

    /// The directory entries are read from
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// List entry identifiers in directory order
    ///
    /// The identifier is the file name up to its first `.`.
    pub fn list_identifiers(&self) -> Result<Vec<String>> {
        if !self.content_dir.is_dir() {
            return Err(Error::NotFound {
                path: self.content_dir.clone(),
            });
        }

        let mut identifiers = Vec::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| walk_error(&self.content_dir, e))?;
            let path = entry.path();

            if !entry.file_type().is_file() || !is_entry_file(path) {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let identifier = file_name.split('.').next().unwrap_or_default();
            if identifier.is_empty() {
                tracing::debug!("Skipping {:?}: empty identifier", path);
                continue;
            }

            identifiers.push(identifier.to_string());
        }

        Ok(identifiers)
    }

    /// Path of the file backing `identifier`
    pub fn entry_path(&self, identifier: &str) -> PathBuf {
        self.content_dir
            .join(format!("{}.{}", identifier, ENTRY_EXTENSION))
    }

    /// Load a single entry
    pub fn load_entry(&self, identifier: &str) -> Result<Entry> {
        let path = self.entry_path(identifier);
        let bytes = fs::read(&path).map_err(|e| Error::from_io(&path, e))?;
        let content = String::from_utf8_lossy(&bytes);

        let parse_error = |message: String| Error::Parse {
            path: path.clone(),
            message,
        };

        let (front_matter, body) =
            FrontMatter::parse(&content).map_err(|e| parse_error(e.to_string()))?;
        let metadata = Metadata::normalize(identifier, &front_matter, &self.date_fallback)
            .map_err(|e| parse_error(e.to_string()))?;

        tracing::debug!("Loaded entry {:?} ({})", identifier, metadata.date);

        Ok(Entry {
            identifier: identifier.to_string(),
            metadata,
            body: body.to_string(),
            extra: front_matter.extra,
        })
    }

    /// Load every entry, newest first
    ///
    /// Fails on the first entry that cannot be loaded.
    pub fn load_all(&self) -> Result<Catalog> {
        let entries = self
            .list_identifiers()?
            .iter()
            .map(|identifier| self.load_entry(identifier))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Loaded {} entries from {:?}",
            entries.len(),
            self.content_dir
        );

        Ok(Catalog::from_entries(entries))
    }
}

/// All entries, sorted by date descending
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    /// Build a catalog from entries in discovery order
    ///
    /// The sort is stable: entries with equal dates keep their relative order.
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by identifier
    pub fn get(&self, identifier: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    /// Number of entries per tag, ordered by tag
    pub fn tags(&self) -> BTreeMap<&str, usize> {
        let mut tags = BTreeMap::new();
        for entry in &self.entries {
            for tag in &entry.metadata.tags {
                *tags.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        tags
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Check if a file is a content entry
fn is_entry_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == ENTRY_EXTENSION)
        .unwrap_or(false)
}

fn walk_error(content_dir: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| content_dir.to_path_buf());
    let on_content_dir = path == content_dir;
    let message = err.to_string();

    match err.into_io_error() {
        Some(source) if on_content_dir => Error::from_dir_io(path, source),
        Some(source) => Error::from_io(path, source),
        None => Error::Io {
            path,
            source: io::Error::new(io::ErrorKind::Other, message),
        },
    }
}
