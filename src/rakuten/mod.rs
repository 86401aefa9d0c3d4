//! Rakuten-specific modules for browsing, extraction, and data models.

pub mod browser;
pub mod extractor;
pub mod fetcher;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod node;
pub mod selectors;

pub use browser::{Browser, BrowserKind, BrowserSession, WebDriverBrowser};
pub use extractor::{Extraction, Extractor, MalformedItem};
pub use fetcher::Fetcher;
pub use models::Record;
pub use node::{RenderedNode, ResultNode};
pub use selectors::{SelectorConfig, SelectorSet};
