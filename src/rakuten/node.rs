//! Rendered result nodes and the lookup surface the extractor works against.

use scraper::{ElementRef, Html, Selector};

/// Snapshot of one rendered result item, taken from the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    html: String,
}

impl RenderedNode {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Outer HTML of the node as rendered by the browser.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parses the snapshot for querying.
    pub fn parse(&self) -> Html {
        Html::parse_fragment(&self.html)
    }
}

/// Lookups needed to turn a result node into a record.
///
/// Absence is an explicit `None`, never an error.
pub trait ResultNode: Sized {
    /// Returns the first descendant matching the earliest selector that matches at all.
    fn query_first(&self, selectors: &[Selector]) -> Option<Self>;

    /// Text content with surrounding whitespace removed.
    fn inner_text(&self) -> String;

    /// Attribute value, if present.
    fn attribute(&self, name: &str) -> Option<String>;
}

impl ResultNode for ElementRef<'_> {
    fn query_first(&self, selectors: &[Selector]) -> Option<Self> {
        selectors.iter().find_map(|selector| self.select(selector).next())
    }

    fn inner_text(&self) -> String {
        self.text().collect::<String>().trim().to_string()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(String::from)
    }
}
