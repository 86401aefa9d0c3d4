//! rakuten-crawler - Rakuten search-results scraper
//!
//! Renders a search page in a WebDriver-controlled browser, extracts
//! product name, shop and URL per result, optionally drops results by
//! shop name, and saves the rest as a timestamped CSV file.

pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod format;
pub mod pipeline;
pub mod rakuten;

pub use config::Config;
pub use error::{FetchError, InvalidJobRow, PipelineError};
pub use filters::{Filter, ShopFilter};
pub use pipeline::{Pipeline, RunReport};
pub use rakuten::{Browser, BrowserSession, Record, RenderedNode};
