//! Drives a browser session to a keyword's search page and snapshots the results.

use crate::error::FetchError;
use crate::rakuten::browser::{Browser, BrowserSession};
use crate::rakuten::node::RenderedNode;
use std::time::Duration;
use tracing::{info, warn};

/// Fetches rendered result nodes, one browser session per call.
pub struct Fetcher<'a> {
    browser: &'a dyn Browser,
    base_url: String,
    result_selector: String,
    wait_timeout: Duration,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        browser: &'a dyn Browser,
        base_url: &str,
        result_selector: &str,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            browser,
            base_url: base_url.trim_end_matches('/').to_string(),
            result_selector: result_selector.to_string(),
            wait_timeout,
        }
    }

    /// Builds `<base>/<percent-encoded keyword>/`.
    pub fn search_url(&self, keyword: &str) -> String {
        format!("{}/{}/", self.base_url, urlencoding::encode(keyword))
    }

    /// Returns every result node on the first page for `keyword`.
    ///
    /// The session is closed before returning, whether or not the fetch succeeded.
    pub async fn fetch(&self, keyword: &str) -> Result<Vec<RenderedNode>, FetchError> {
        let url = self.search_url(keyword);
        let mut session = self.browser.open().await?;

        let outcome = self.collect(session.as_mut(), &url).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        outcome
    }

    async fn collect(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<Vec<RenderedNode>, FetchError> {
        info!("Opening {}", url);
        session.navigate(url).await?;
        session.wait_for_selector(&self.result_selector, self.wait_timeout).await?;

        let nodes = session.query_all(&self.result_selector).await?;
        info!("Found {} items", nodes.len());
        Ok(nodes)
    }
}
