//! Error taxonomy for fetching, exporting and batch input.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain the rendered result nodes for a keyword.
///
/// Always fatal to the current pipeline run; batch mode contains it to the row.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to open browser session: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {}s waiting for `{selector}`", timeout.as_secs())]
    Timeout { selector: String, timeout: Duration },

    #[error("failed to query `{selector}`: {reason}")]
    Query { selector: String, reason: String },

    #[error("browser session closed: {0}")]
    Close(String),
}

/// Failure of a single pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// A job table row that cannot be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidJobRow {
    #[error("missing id")]
    MissingId,

    #[error("missing keyword")]
    MissingKeyword,

    #[error("id `{0}` cannot be used as a directory name")]
    UnsafeId(String),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}
