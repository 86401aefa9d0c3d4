//! CSV export of records.

pub mod path;

use crate::error::PipelineError;
use crate::rakuten::Record;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub use path::{Clock, FixedClock, SystemClock};

/// Column labels: product name, shop name, URL.
pub const HEADER: [&str; 3] = ["商品名", "店舗名", "URL"];

/// UTF-8 byte-order mark, so spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `records` to `path`, replacing any existing file.
///
/// Returns the number of data rows written; an empty slice writes the header only.
/// The file write runs on the blocking pool.
pub async fn save_csv(records: &[Record], path: &Path) -> Result<usize, PipelineError> {
    info!("Saving results to {}", path.display());

    let owned = records.to_vec();
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_csv(&owned, &target))
        .await
        .unwrap_or_else(|e| Err(std::io::Error::other(e).into()))
        .map_err(|source| PipelineError::Export { path: path.to_path_buf(), source })?;

    info!("Saved {} products to {}", records.len(), path.display());
    Ok(records.len())
}

fn write_csv(records: &[Record], path: &Path) -> Result<(), csv::Error> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([&record.name, &record.shop, &record.url])?;
    }
    writer.flush()?;

    Ok(())
}
