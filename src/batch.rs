//! Batch runs from a job table.

use crate::error::{InvalidJobRow, PipelineError};
use crate::filters::ShopFilter;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Raw job table row. Column names may be English or Japanese.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRow {
    #[serde(default, alias = "ID")]
    pub id: Option<String>,

    #[serde(default, alias = "キーワード")]
    pub keyword: Option<String>,

    #[serde(default, alias = "店舗名")]
    pub shop: Option<String>,
}

/// A validated job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub keyword: String,
    /// Shop exclusion term
    pub shop: Option<String>,
}

fn present(field: &Option<String>) -> Option<String> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

impl JobRow {
    /// Checks required fields and that the id is usable as a directory name.
    pub fn validate(&self) -> Result<Job, InvalidJobRow> {
        let id = present(&self.id).ok_or(InvalidJobRow::MissingId)?;
        let keyword = present(&self.keyword).ok_or(InvalidJobRow::MissingKeyword)?;

        if id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(InvalidJobRow::UnsafeId(id));
        }

        Ok(Job { id, keyword, shop: present(&self.shop) })
    }
}

/// One table row after loading.
#[derive(Debug, Clone)]
pub struct JobEntry {
    /// 1-based data row number
    pub row: usize,
    pub job: Result<Job, InvalidJobRow>,
}

/// Reads a job table from CSV text (UTF-8, optional BOM).
pub fn parse_jobs(content: &str) -> Result<Vec<JobEntry>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader.headers().context("Failed to read job table header")?;

    let entries = reader
        .deserialize::<JobRow>()
        .enumerate()
        .map(|(i, row)| JobEntry {
            row: i + 1,
            job: row
                .map_err(|e| InvalidJobRow::Unreadable(e.to_string()))
                .and_then(|row| row.validate()),
        })
        .collect();

    Ok(entries)
}

/// Reads a job table file.
pub fn load_jobs(path: &Path) -> Result<Vec<JobEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job table: {}", path.display()))?;

    let entries = parse_jobs(&content)?;
    info!("Loaded {} rows from {}", entries.len(), path.display());
    Ok(entries)
}

/// Result of one row.
#[derive(Debug)]
pub enum JobStatus {
    Saved { path: PathBuf, count: usize },
    Skipped(InvalidJobRow),
    Failed(PipelineError),
}

#[derive(Debug)]
pub struct JobOutcome {
    pub row: usize,
    pub id: Option<String>,
    pub status: JobStatus,
}

/// Per-row outcomes, in table order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn saved(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Saved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&JobStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Runs one pipeline per job, each into `<results_dir>/<id>/`.
pub struct BatchRunner<'a> {
    pipeline: Pipeline<'a>,
    results_dir: PathBuf,
    workers: usize,
}

impl<'a> BatchRunner<'a> {
    /// `workers` caps concurrent jobs; 1 runs rows strictly in order.
    pub fn new(pipeline: Pipeline<'a>, results_dir: impl Into<PathBuf>, workers: usize) -> Self {
        Self { pipeline, results_dir: results_dir.into(), workers: workers.max(1) }
    }

    /// Runs every entry. Row failures are reported, never propagated.
    pub async fn run(&self, entries: Vec<JobEntry>) -> BatchReport {
        let outcomes: Vec<JobOutcome> = stream::iter(entries)
            .map(|entry| self.run_entry(entry))
            .buffered(self.workers)
            .collect()
            .await;

        let report = BatchReport { outcomes };
        info!(
            "Batch finished: {} saved, {} skipped, {} failed",
            report.saved(),
            report.skipped(),
            report.failed()
        );
        report
    }

    async fn run_entry(&self, entry: JobEntry) -> JobOutcome {
        let job = match entry.job {
            Ok(job) => job,
            Err(invalid) => {
                warn!("Row {} skipped: {}", entry.row, invalid);
                return JobOutcome { row: entry.row, id: None, status: JobStatus::Skipped(invalid) };
            }
        };

        let root = self.results_dir.join(&job.id);
        let filter = ShopFilter::new(None, job.shop.as_deref());

        let status = match self.pipeline.run(&job.keyword, &filter, &root).await {
            Ok(report) => {
                info!("Saved {} products to {}", report.records.len(), report.path.display());
                JobStatus::Saved { count: report.records.len(), path: report.path }
            }
            Err(e) => {
                error!("Row {} (id {}) failed: {}", entry.row, job.id, e);
                JobStatus::Failed(e)
            }
        };

        JobOutcome { row: entry.row, id: Some(job.id), status }
    }
}
