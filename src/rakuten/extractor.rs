//! Maps rendered result nodes to records.

use crate::rakuten::models::Record;
use crate::rakuten::node::{RenderedNode, ResultNode};
use crate::rakuten::selectors::{SelectorSet, URL_ATTR};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Required part of a listing that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPart {
    Link,
    Shop,
    Both,
}

impl std::fmt::Display for MissingPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingPart::Link => write!(f, "link"),
            MissingPart::Shop => write!(f, "shop"),
            MissingPart::Both => write!(f, "link and shop"),
        }
    }
}

/// A result node that yielded no record. Never escalated to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item {index}: missing {missing}")]
pub struct MalformedItem {
    /// 1-based position on the page
    pub index: usize,
    pub missing: MissingPart,
}

/// Records extracted from one page, with the items that were dropped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub malformed: Vec<MalformedItem>,
}

/// Turns result nodes into records using a selector set.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    selectors: SelectorSet,
}

impl Extractor {
    pub fn new(selectors: SelectorSet) -> Self {
        Self { selectors }
    }

    /// Extracts one record, or `None` when the node lacks a name or shop.
    pub fn extract<N: ResultNode>(&self, node: &N) -> Option<Record> {
        self.try_extract(node, 0).ok()
    }

    fn try_extract<N: ResultNode>(&self, node: &N, index: usize) -> Result<Record, MalformedItem> {
        let link = node.query_first(&self.selectors.title_link);
        let shop = node.query_first(&self.selectors.shop_link);

        let (link, shop) = match (link, shop) {
            (Some(link), Some(shop)) => (link, shop),
            (None, Some(_)) => return Err(MalformedItem { index, missing: MissingPart::Link }),
            (Some(_), None) => return Err(MalformedItem { index, missing: MissingPart::Shop }),
            (None, None) => return Err(MalformedItem { index, missing: MissingPart::Both }),
        };

        let name = link.inner_text();
        let shop_name = shop.inner_text();
        let url = link.attribute(URL_ATTR);

        Record::new(&name, &shop_name, url.as_deref()).ok_or_else(|| {
            let missing = match (name.is_empty(), shop_name.is_empty()) {
                (true, true) => MissingPart::Both,
                (true, false) => MissingPart::Link,
                _ => MissingPart::Shop,
            };
            MalformedItem { index, missing }
        })
    }

    /// Extracts every node in page order, skipping malformed ones with a warning.
    pub fn extract_all(&self, nodes: &[RenderedNode]) -> Extraction {
        let mut extraction = Extraction::default();
        let total = nodes.len();

        for (i, node) in nodes.iter().enumerate() {
            let index = i + 1;
            debug!("Processing item {}/{}", index, total);

            let fragment = node.parse();
            match self.try_extract(&fragment.root_element(), index) {
                Ok(record) => {
                    debug!("Collected {} from {}", record.name, record.shop);
                    extraction.records.push(record);
                }
                Err(item) => {
                    warn!("Missing {}; skipping item {}", item.missing, item.index);
                    extraction.malformed.push(item);
                }
            }
        }

        info!("Extracted {} of {} items", extraction.records.len(), total);
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn item(name: &str, href: Option<&str>, shop: &str) -> RenderedNode {
        let href = href.map(|h| format!(r#" href="{}""#, h)).unwrap_or_default();
        RenderedNode::new(format!(
            r#"<div class="searchresultitem">
                <h2><a{}>{}</a></h2>
                <a class="_ellipsis" href="https://www.rakuten.co.jp/shop/">{}</a>
            </div>"#,
            href, name, shop
        ))
    }

    #[test]
    fn test_extract_well_formed() {
        let nodes = vec![item("  Blue Mug ", Some("https://item.rakuten.co.jp/s/1/"), " S店 ")];
        let extraction = Extractor::default().extract_all(&nodes);

        assert_eq!(
            extraction.records,
            vec![Record {
                name: "Blue Mug".to_string(),
                shop: "S店".to_string(),
                url: "https://item.rakuten.co.jp/s/1/".to_string(),
            }]
        );
        assert!(extraction.malformed.is_empty());
    }

    #[test]
    fn test_missing_href_gives_empty_url() {
        let nodes = vec![item("Mug", None, "Shop")];
        let extraction = Extractor::default().extract_all(&nodes);
        assert_eq!(extraction.records[0].url, "");
    }

    #[test]
    fn test_missing_shop_is_skipped() {
        let nodes = vec![RenderedNode::new(
            r#"<div class="searchresultitem"><h2><a href="u">Mug</a></h2></div>"#,
        )];
        let extraction = Extractor::default().extract_all(&nodes);

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.malformed, vec![MalformedItem { index: 1, missing: MissingPart::Shop }]);
    }

    #[test]
    fn test_missing_link_is_skipped() {
        let nodes = vec![RenderedNode::new(
            r#"<div class="searchresultitem"><a class="_ellipsis">Shop</a></div>"#,
        )];
        let extraction = Extractor::default().extract_all(&nodes);
        assert_eq!(extraction.malformed[0].missing, MissingPart::Link);
    }

    #[test]
    fn test_empty_text_is_not_a_record() {
        let nodes = vec![item("   ", Some("u"), "Shop"), item("Mug", Some("u"), "")];
        let extraction = Extractor::default().extract_all(&nodes);

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.malformed[0], MalformedItem { index: 1, missing: MissingPart::Link });
        assert_eq!(extraction.malformed[1], MalformedItem { index: 2, missing: MissingPart::Shop });
    }

    #[test]
    fn test_garbage_markup_does_not_panic() {
        let nodes = vec![
            RenderedNode::new(""),
            RenderedNode::new("<<<div"),
            RenderedNode::new("plain text"),
        ];
        let extraction = Extractor::default().extract_all(&nodes);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.malformed.len(), 3);
        assert!(extraction.malformed.iter().all(|m| m.missing == MissingPart::Both));
    }

    #[test]
    fn test_n_minus_m_records_in_page_order() {
        let malformed = RenderedNode::new("<div class=\"searchresultitem\"><p>ad</p></div>");
        let nodes = vec![
            item("A", Some("1"), "S1"),
            malformed.clone(),
            item("B", Some("2"), "S2"),
            item("C", Some("3"), "S3"),
            malformed,
        ];
        let extraction = Extractor::default().extract_all(&nodes);

        let names: Vec<_> = extraction.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        let indices: Vec<_> = extraction.malformed.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![2, 5]);
    }

    #[test]
    fn test_fallback_layout() {
        let nodes = vec![RenderedNode::new(
            r#"<div class="searchresultitem">
                <div class="content title"><a href="https://item.rakuten.co.jp/x/">Old Layout Mug</a></div>
                <div class="content merchant _ellipsis"><a href="https://www.rakuten.co.jp/x/">X店</a></div>
            </div>"#,
        )];
        let extraction = Extractor::default().extract_all(&nodes);

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].name, "Old Layout Mug");
        assert_eq!(extraction.records[0].shop, "X店");
    }

    #[test]
    fn test_extract_single_node() {
        let node = item("Mug", Some("u"), "Shop");
        let html = node.parse();
        let record = Extractor::default().extract(&html.root_element()).unwrap();
        assert_eq!(record.name, "Mug");

        let bad = RenderedNode::new("<p>nothing</p>");
        let html = bad.parse();
        assert!(Extractor::default().extract(&html.root_element()).is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skipped_item_emits_warning() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let nodes = vec![item("Mug", Some("u"), "Shop"), RenderedNode::new("<div></div>")];
        tracing::subscriber::with_default(subscriber, || {
            Extractor::default().extract_all(&nodes);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("skipping item 2"));
        assert!(!output.contains("item 1"));
    }
}
