//! Content module - handles entry discovery, front-matter and the catalog

pub mod catalog;
mod entry;
mod frontmatter;

pub use catalog::{Catalog, CatalogBuilder};
pub use entry::{Entry, Metadata};
pub use frontmatter::{FrontMatter, FrontMatterError};
