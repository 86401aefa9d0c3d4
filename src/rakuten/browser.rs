//! Browser capability used by the fetcher, plus its WebDriver implementation.

use crate::error::FetchError;
use crate::rakuten::node::RenderedNode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tracing::{debug, info};

/// Interval between checks while waiting for a selector.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Opens browser sessions - enables mocking for tests.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a fresh session; the caller must `close` it.
    async fn open(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// One live browser session.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`.
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Waits until at least one element matches `selector`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<(), FetchError>;

    /// Snapshots every element matching `selector`, in page order.
    async fn query_all(&mut self, selector: &str) -> Result<Vec<RenderedNode>, FetchError>;

    /// Ends the session.
    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Browser driven through the WebDriver server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Firefox,
    Chrome,
}

impl std::str::FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firefox" | "gecko" => Ok(BrowserKind::Firefox),
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            _ => Err(format!("Unknown browser: {}. Use: firefox, chrome", s)),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Firefox => write!(f, "firefox"),
            BrowserKind::Chrome => write!(f, "chrome"),
        }
    }
}

/// Launches sessions against a WebDriver server (geckodriver, chromedriver, Selenium).
pub struct WebDriverBrowser {
    server_url: String,
    kind: BrowserKind,
    headless: bool,
    navigation_timeout: Duration,
}

impl WebDriverBrowser {
    pub fn new(
        server_url: impl Into<String>,
        kind: BrowserKind,
        headless: bool,
        navigation_timeout: Duration,
    ) -> Self {
        Self { server_url: server_url.into(), kind, headless, navigation_timeout }
    }

    async fn connect(&self) -> WebDriverResult<WebDriver> {
        match self.kind {
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if self.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(self.server_url.as_str(), caps).await
            }
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if self.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(self.server_url.as_str(), caps).await
            }
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        info!("Launching {} via {}", self.kind, self.server_url);

        let driver = self.connect().await.map_err(|e| FetchError::Launch(e.to_string()))?;

        Ok(Box::new(WebDriverSession {
            driver: Some(driver),
            navigation_timeout: self.navigation_timeout,
        }))
    }
}

/// Session backed by a thirtyfour `WebDriver` handle.
pub struct WebDriverSession {
    driver: Option<WebDriver>,
    navigation_timeout: Duration,
}

impl WebDriverSession {
    fn driver(&self) -> Result<&WebDriver, FetchError> {
        self.driver.as_ref().ok_or_else(|| FetchError::Close("session already ended".to_string()))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        let timeout = self.navigation_timeout;
        let driver = self.driver()?;

        match tokio::time::timeout(timeout, driver.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                Err(FetchError::Navigation { url: url.to_string(), reason: e.to_string() })
            }
            Err(_) => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: format!("no response within {}s", timeout.as_secs()),
            }),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        let driver = self.driver()?;

        let poll = async {
            loop {
                match driver.find_all(By::Css(selector)).await {
                    Ok(found) if !found.is_empty() => return,
                    Ok(_) => {}
                    Err(e) => debug!("Waiting for `{}`: {}", selector, e),
                }
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| FetchError::Timeout { selector: selector.to_string(), timeout })
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<RenderedNode>, FetchError> {
        let driver = self.driver()?;
        let query_error =
            |e: WebDriverError| FetchError::Query { selector: selector.to_string(), reason: e.to_string() };

        let elements = driver.find_all(By::Css(selector)).await.map_err(query_error)?;

        let mut nodes = Vec::with_capacity(elements.len());
        for element in elements {
            let html = element.outer_html().await.map_err(query_error)?;
            nodes.push(RenderedNode::new(html));
        }

        Ok(nodes)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        match self.driver.take() {
            Some(driver) => {
                driver.quit().await.map_err(|e| FetchError::Close(e.to_string()))?;
                info!("Browser closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
