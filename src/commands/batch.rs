//! Batch command: one search per job table row.

use super::browser_from_config;
use crate::batch::{self, BatchReport, BatchRunner, JobStatus};
use crate::config::Config;
use crate::export::{Clock, SystemClock};
use crate::pipeline::Pipeline;
use crate::rakuten::Browser;
use anyhow::Result;
use std::path::Path;

/// Runs a job table and summarises per-row outcomes.
pub struct BatchCommand {
    config: Config,
}

impl BatchCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the job table at `jobs` with the configured WebDriver browser.
    pub async fn execute(&self, jobs: &Path) -> Result<(BatchReport, String)> {
        let browser = browser_from_config(&self.config);
        self.execute_with_browser(&browser, &SystemClock, jobs).await
    }

    /// Runs the job table with a provided browser and clock (for testing).
    ///
    /// Fails only if the table cannot be read; row failures land in the report.
    pub async fn execute_with_browser(
        &self,
        browser: &dyn Browser,
        clock: &dyn Clock,
        jobs: &Path,
    ) -> Result<(BatchReport, String)> {
        let entries = batch::load_jobs(jobs)?;

        let pipeline = Pipeline::new(browser, &self.config, clock)?;
        let runner = BatchRunner::new(pipeline, &self.config.results_dir, self.config.workers);
        let report = runner.run(entries).await;

        let summary = summarize(&report);
        Ok((report, summary))
    }
}

/// One line per row, then totals.
pub fn summarize(report: &BatchReport) -> String {
    let mut lines = Vec::new();

    for outcome in &report.outcomes {
        let id = outcome.id.as_deref().unwrap_or("-");
        let line = match &outcome.status {
            JobStatus::Saved { path, count } => {
                format!("row {:>3}  {:<10}  saved {} products to {}", outcome.row, id, count, path.display())
            }
            JobStatus::Skipped(reason) => {
                format!("row {:>3}  {:<10}  skipped: {}", outcome.row, id, reason)
            }
            JobStatus::Failed(e) => format!("row {:>3}  {:<10}  failed: {}", outcome.row, id, e),
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Total: {} rows, {} saved, {} skipped, {} failed",
        report.outcomes.len(),
        report.saved(),
        report.skipped(),
        report.failed()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::FixedClock;
    use crate::rakuten::mock::{item, MockBrowser, Page};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap())
    }

    #[tokio::test]
    async fn test_batch_command_summary() {
        let dir = TempDir::new().unwrap();
        let jobs = dir.path().join("jobs.csv");
        std::fs::write(&jobs, "\u{feff}ID,キーワード,店舗名\n1,mug,\n2,,\n3,cup,X\n").unwrap();

        let browser = MockBrowser::new()
            .items("mug", vec![item("A", "S", "u")])
            .page("cup", Page::NeverRenders);
        let config = Config { results_dir: dir.path().join("results"), ..Config::default() };
        let cmd = BatchCommand::new(config);

        let (report, summary) = cmd.execute_with_browser(&browser, &clock(), &jobs).await.unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(summary.contains("saved 1 products"));
        assert!(summary.contains("skipped: missing keyword"));
        assert!(summary.contains("failed: timed out"));
        assert!(summary.contains("Total: 3 rows, 1 saved, 1 skipped, 1 failed"));
        assert!(dir.path().join("results").join("1").join("mug_none_202401020304.csv").is_file());
    }

    #[tokio::test]
    async fn test_batch_command_missing_table() {
        let dir = TempDir::new().unwrap();
        let browser = MockBrowser::new();
        let cmd = BatchCommand::new(Config::default());

        let result =
            cmd.execute_with_browser(&browser, &clock(), &dir.path().join("none.csv")).await;
        assert!(result.is_err());
        assert_eq!(browser.opened(), 0);
    }
}
