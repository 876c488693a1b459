//! Configuration module

mod site;

pub use site::DateFallback;
pub use site::HighlightConfig;
pub use site::SiteConfig;
