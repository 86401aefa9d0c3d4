//! Output path generation.

use crate::error::PipelineError;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Placeholder used when no shop term was given.
pub const NO_SHOP: &str = "none";

/// Output file extension.
pub const EXTENSION: &str = "csv";

/// Source of the timestamp embedded in output file names.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Makes a term safe as a file name segment.
fn sanitize(term: &str) -> String {
    term.chars().map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c }).collect()
}

/// `<keyword>_<shop or "none">_<YYYYMMDDHHmm>.csv`
pub fn file_name(keyword: &str, shop: Option<&str>, at: NaiveDateTime) -> String {
    let shop = match shop {
        Some(shop) if !shop.is_empty() => sanitize(shop),
        _ => NO_SHOP.to_string(),
    };

    format!("{}_{}_{}.{}", sanitize(keyword), shop, at.format("%Y%m%d%H%M"), EXTENSION)
}

/// Returns the output path under `root`, creating `root` first.
///
/// Minute granularity: repeated runs within the same minute share a path.
pub fn generate(
    root: &Path,
    keyword: &str,
    shop: Option<&str>,
    clock: &dyn Clock,
) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(root)
        .map_err(|source| PipelineError::OutputDir { path: root.to_path_buf(), source })?;

    Ok(root.join(file_name(keyword, shop, clock.now())))
}
