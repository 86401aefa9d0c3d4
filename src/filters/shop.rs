//! Shop-name filtering.

use super::Filter;
use crate::rakuten::Record;

/// Filters records by substring match on the shop name.
///
/// Matching is case-sensitive and locale-independent, so storefront variants
/// such as `楽天市場店` suffixes fall under a single term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopFilter {
    /// Shop term that must appear.
    only: Option<String>,
    /// Shop term that must NOT appear.
    excluded: Option<String>,
}

fn non_empty(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.is_empty()).map(String::from)
}

impl ShopFilter {
    /// Creates a new shop filter. Empty terms are ignored.
    pub fn new(only: Option<&str>, excluded: Option<&str>) -> Self {
        Self { only: non_empty(only), excluded: non_empty(excluded) }
    }

    /// Creates a filter that drops shops containing `term`.
    pub fn excluding(term: &str) -> Self {
        Self::new(None, Some(term))
    }

    /// Creates a filter that keeps only shops containing `term`.
    pub fn only(term: &str) -> Self {
        Self::new(Some(term), None)
    }

    /// Returns true if the filter keeps everything.
    pub fn is_identity(&self) -> bool {
        self.only.is_none() && self.excluded.is_none()
    }

    /// The exclusion term, if any.
    pub fn excluded(&self) -> Option<&str> {
        self.excluded.as_deref()
    }

    /// Term naming this filter in output paths: the exclusion, else the "only" term.
    pub fn label(&self) -> Option<&str> {
        self.excluded.as_deref().or(self.only.as_deref())
    }
}

impl Filter for ShopFilter {
    fn matches(&self, record: &Record) -> bool {
        if let Some(only) = &self.only {
            if !record.shop.contains(only.as_str()) {
                return false;
            }
        }

        if let Some(excluded) = &self.excluded {
            if record.shop.contains(excluded.as_str()) {
                return false;
            }
        }

        true
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();

        if let Some(only) = &self.only {
            parts.push(format!("Shop contains: {}", only));
        }

        if let Some(excluded) = &self.excluded {
            parts.push(format!("Shop excludes: {}", excluded));
        }

        if parts.is_empty() {
            "Shop: any".to_string()
        } else {
            parts.join("; ")
        }
    }
}
