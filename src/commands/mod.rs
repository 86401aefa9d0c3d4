//! CLI command implementations.

pub mod batch;
pub mod search;

pub use batch::BatchCommand;
pub use search::SearchCommand;

use crate::config::Config;
use crate::rakuten::WebDriverBrowser;

/// Builds the WebDriver-backed browser described by `config`.
fn browser_from_config(config: &Config) -> WebDriverBrowser {
    WebDriverBrowser::new(
        config.webdriver_url.clone(),
        config.browser,
        config.headless,
        config.navigation_timeout(),
    )
}
