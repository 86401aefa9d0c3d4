//! Scripted browser for unit tests.

use crate::error::FetchError;
use crate::rakuten::browser::{Browser, BrowserSession};
use crate::rakuten::node::RenderedNode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a session does for a given keyword.
#[derive(Debug, Clone)]
pub enum Page {
    Items(Vec<String>),
    NeverRenders,
    Unreachable,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub opened: usize,
    pub closed: usize,
    pub visited: Vec<String>,
}

/// Serves scripted pages by keyword; unknown keywords render an empty page.
#[derive(Default)]
pub struct MockBrowser {
    pages: HashMap<String, Page>,
    pub calls: Arc<Mutex<Calls>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, keyword: &str, page: Page) -> Self {
        self.pages.insert(urlencoding::encode(keyword).into_owned(), page);
        self
    }

    pub fn items(self, keyword: &str, items: Vec<String>) -> Self {
        self.page(keyword, Page::Items(items))
    }

    pub fn opened(&self) -> usize {
        self.calls.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.calls.lock().unwrap().closed
    }
}

/// A well-formed result item.
pub fn item(name: &str, shop: &str, url: &str) -> String {
    format!(
        r#"<div class="searchresultitem">
            <h2><a href="{}">{}</a></h2>
            <a class="_ellipsis" href="https://www.rakuten.co.jp/shop/">{}</a>
        </div>"#,
        url, name, shop
    )
}

/// A result item without a shop link.
pub fn item_without_shop(name: &str) -> String {
    format!(r#"<div class="searchresultitem"><h2><a href="u">{}</a></h2></div>"#, name)
}

#[async_trait]
impl Browser for MockBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        self.calls.lock().unwrap().opened += 1;
        Ok(Box::new(MockSession {
            pages: self.pages.clone(),
            current: None,
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct MockSession {
    pages: HashMap<String, Page>,
    current: Option<Page>,
    calls: Arc<Mutex<Calls>>,
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.calls.lock().unwrap().visited.push(url.to_string());

        let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        let page = self.pages.get(segment).cloned().unwrap_or(Page::Items(Vec::new()));

        if let Page::Unreachable = page {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.current = Some(page);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        match &self.current {
            Some(Page::Items(_)) => Ok(()),
            _ => Err(FetchError::Timeout { selector: selector.to_string(), timeout }),
        }
    }

    async fn query_all(&mut self, _selector: &str) -> Result<Vec<RenderedNode>, FetchError> {
        match &self.current {
            Some(Page::Items(items)) => Ok(items.iter().map(RenderedNode::new).collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.calls.lock().unwrap().closed += 1;
        Ok(())
    }
}
