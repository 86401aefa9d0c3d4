//! Single-keyword search command.

use super::browser_from_config;
use crate::config::Config;
use crate::export::{Clock, SystemClock};
use crate::filters::ShopFilter;
use crate::format::Formatter;
use crate::pipeline::{Pipeline, RunReport};
use crate::rakuten::Browser;
use anyhow::{Context, Result};
use tracing::info;

/// Formatted records plus the run they came from.
#[derive(Debug)]
pub struct SearchOutput {
    pub report: RunReport,
    pub rendered: String,
}

/// Executes one search and saves it under the configured results directory.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search with the configured WebDriver browser.
    pub async fn execute(&self, keyword: &str, filter: &ShopFilter) -> Result<SearchOutput> {
        let browser = browser_from_config(&self.config);
        self.execute_with_browser(&browser, &SystemClock, keyword, filter).await
    }

    /// Executes the search with a provided browser and clock (for testing).
    pub async fn execute_with_browser(
        &self,
        browser: &dyn Browser,
        clock: &dyn Clock,
        keyword: &str,
        filter: &ShopFilter,
    ) -> Result<SearchOutput> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            anyhow::bail!("Keyword must not be empty");
        }

        let pipeline = Pipeline::new(browser, &self.config, clock)?;
        let report = pipeline
            .run(keyword, filter, &self.config.results_dir)
            .await
            .with_context(|| format!("Search for '{}' failed", keyword))?;

        info!("{} products saved to {}", report.records.len(), report.path.display());

        let rendered = Formatter::new(self.config.format).format_records(&report.records);
        Ok(SearchOutput { report, rendered })
    }
}
