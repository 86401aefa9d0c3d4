//! One keyword run: fetch, extract, filter, export.

use crate::config::Config;
use crate::error::PipelineError;
use crate::export::{self, path, Clock};
use crate::filters::{Filter, ShopFilter};
use crate::rakuten::{Browser, Extractor, Fetcher, Record, SelectorSet};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Records written, in page order
    pub records: Vec<Record>,
    /// File the records were written to
    pub path: PathBuf,
    /// Result nodes found on the page
    pub found: usize,
    /// Nodes dropped for missing name or shop
    pub malformed: usize,
    /// Records removed by the shop filter
    pub filtered_out: usize,
}

/// Composes fetcher, extractor, filter and exporter for single runs.
pub struct Pipeline<'a> {
    fetcher: Fetcher<'a>,
    extractor: Extractor,
    clock: &'a dyn Clock,
}

impl<'a> Pipeline<'a> {
    /// Builds a pipeline from configuration; fails on invalid selectors.
    pub fn new(browser: &'a dyn Browser, config: &Config, clock: &'a dyn Clock) -> Result<Self> {
        let fetcher = Fetcher::new(
            browser,
            &config.search_base_url,
            &config.selectors.result_item,
            config.wait_timeout(),
        );
        let extractor = Extractor::new(SelectorSet::compile(&config.selectors)?);

        Ok(Self { fetcher, extractor, clock })
    }

    /// Runs one keyword and writes the surviving records under `root`.
    ///
    /// A fetch failure aborts before anything is written.
    pub async fn run(
        &self,
        keyword: &str,
        filter: &ShopFilter,
        root: &Path,
    ) -> Result<RunReport, PipelineError> {
        info!("Starting run with keyword={} filter=[{}]", keyword, filter.description());

        let nodes = self.fetcher.fetch(keyword).await?;
        let found = nodes.len();

        let extraction = self.extractor.extract_all(&nodes);
        let extracted = extraction.records.len();

        let records = filter.apply(extraction.records);
        if !filter.is_identity() {
            info!("Filtered products: {} -> {}", extracted, records.len());
        }

        let path = path::generate(root, keyword, filter.label(), self.clock)?;
        export::save_csv(&records, &path).await?;
        debug!("Run for {} complete", keyword);

        Ok(RunReport {
            filtered_out: extracted - records.len(),
            malformed: extraction.malformed.len(),
            records,
            path,
            found,
        })
    }
}
