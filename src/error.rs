//! Error types for the catalog, renderer and page generator

use std::io;
use std::path::PathBuf;

use crate::render::RenderError;

/// Errors raised while reading content or building pages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content directory or an entry file does not exist or cannot be read
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The front-matter block of an entry is malformed
    #[error("failed to parse front-matter in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The renderer rejected the document body
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Page template failed to render
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// Any other I/O failure while reading content
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid site configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Map an I/O error on `path`, turning `ErrorKind::NotFound` into [`Error::NotFound`]
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }

    /// Map an I/O error on a directory listing
    ///
    /// A directory that cannot be read is reported like a missing one.
    pub fn from_dir_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Error::NotFound { path: path.into() },
            _ => Error::from_io(path, source),
        }
    }

    /// Whether this error means the requested content does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = Error::from_io("blogs/x.mdx", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: blogs/x.mdx");
    }

    #[test]
    fn test_other_io_errors_are_kept() {
        let err = Error::from_io(
            "blogs",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, Error::Io { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unreadable_dir_maps_to_not_found() {
        let err = Error::from_dir_io(
            "blogs",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(err.is_not_found());

        let err = Error::from_dir_io("blogs", io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, Error::Io { .. }));
    }
}
