//! Data model for a single search listing.

use serde::{Deserialize, Serialize};

/// One product listing from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Product name, trimmed and never empty
    pub name: String,
    /// Shop name, trimmed and never empty
    pub shop: String,
    /// Listing link; empty when the page gave none
    pub url: String,
}

impl Record {
    /// Builds a record from raw field text.
    ///
    /// Returns `None` unless both name and shop are non-empty after trimming.
    pub fn new(name: &str, shop: &str, url: Option<&str>) -> Option<Self> {
        let name = name.trim();
        let shop = shop.trim();
        if name.is_empty() || shop.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            shop: shop.to_string(),
            url: url.map(|u| u.trim().to_string()).unwrap_or_default(),
        })
    }
}
