//! Record filtering.

pub mod shop;

use crate::rakuten::Record;

pub use shop::ShopFilter;

/// Trait for filtering records.
pub trait Filter: Send + Sync {
    /// Returns true if the record should be kept.
    fn matches(&self, record: &Record) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;

    /// Keeps the matching records, preserving their order.
    fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
