//! CSS selectors for Rakuten search result pages.
//!
//! Listing markup differs between result types (organic vs. sponsored, old vs.
//! new layouts), so title and shop lookups carry an ordered fallback list.
//! The first selector that matches inside a result node wins.
//!
//! **Update process**: When extraction starts skipping items, capture the
//! rendered HTML, add a fallback here (or in `config.toml`), and add a fixture.

use anyhow::{anyhow, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// Result item container, also the element awaited after navigation.
pub const RESULT_ITEM: &str = "div.searchresultitem";

/// Title link, carrying both the product name and the listing URL.
pub const TITLE_LINK: &[&str] = &["h2 > a", ".title a"];

/// Shop name link.
pub const SHOP_LINK: &[&str] = &["a._ellipsis", ".merchant a"];

/// Attribute holding the listing URL on the title link.
pub const URL_ATTR: &str = "href";

/// Selector configuration as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_result_item")]
    pub result_item: String,

    #[serde(default = "default_title_link")]
    pub title_link: Vec<String>,

    #[serde(default = "default_shop_link")]
    pub shop_link: Vec<String>,
}

fn default_result_item() -> String {
    RESULT_ITEM.to_string()
}

fn default_title_link() -> Vec<String> {
    TITLE_LINK.iter().map(|s| s.to_string()).collect()
}

fn default_shop_link() -> Vec<String> {
    SHOP_LINK.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result_item: default_result_item(),
            title_link: default_title_link(),
            shop_link: default_shop_link(),
        }
    }
}

/// Compiled selectors used by the extractor.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub title_link: Vec<Selector>,
    pub shop_link: Vec<Selector>,
}

impl SelectorSet {
    /// Compiles a selector configuration, rejecting empty lists and bad CSS.
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        parse_one(&config.result_item)?;

        Ok(Self {
            title_link: parse_list("title_link", &config.title_link)?,
            shop_link: parse_list("shop_link", &config.shop_link)?,
        })
    }
}

impl Default for SelectorSet {
    fn default() -> Self {
        // The built-in lists are covered by `test_default_selectors_compile`.
        Self {
            title_link: TITLE_LINK.iter().filter_map(|s| Selector::parse(s).ok()).collect(),
            shop_link: SHOP_LINK.iter().filter_map(|s| Selector::parse(s).ok()).collect(),
        }
    }
}

fn parse_one(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector `{}`: {}", css, e))
}

fn parse_list(field: &str, list: &[String]) -> Result<Vec<Selector>> {
    if list.is_empty() {
        anyhow::bail!("Selector list `{}` must not be empty", field);
    }
    list.iter().map(|css| parse_one(css)).collect()
}
