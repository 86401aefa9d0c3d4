//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::rakuten::browser::BrowserKind;
use crate::rakuten::selectors::SelectorConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search endpoint; the encoded keyword is appended as a path segment
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// WebDriver server (geckodriver, chromedriver, Selenium)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Browser to request from the WebDriver server
    #[serde(default)]
    pub browser: BrowserKind,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Upper bound on page navigation, in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Upper bound on waiting for the result container, in seconds
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Root directory for CSV output
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Concurrent batch jobs (each with its own browser session)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Output format for stdout
    #[serde(default)]
    pub format: OutputFormat,

    /// Optional log file, in addition to stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

fn default_search_base_url() -> String {
    "https://search.rakuten.co.jp/search/mall".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_wait_timeout_secs() -> u64 {
    30
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_workers() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_base_url: default_search_base_url(),
            webdriver_url: default_webdriver_url(),
            browser: BrowserKind::Firefox,
            headless: default_headless(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            results_dir: default_results_dir(),
            workers: default_workers(),
            format: OutputFormat::Table,
            log_file: None,
            selectors: SelectorConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("rakuten-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("RAKUTEN_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }

        if let Ok(browser) = std::env::var("RAKUTEN_BROWSER") {
            if let Ok(b) = browser.parse() {
                self.browser = b;
            }
        }

        if let Ok(dir) = std::env::var("RAKUTEN_RESULTS_DIR") {
            self.results_dir = PathBuf::from(dir);
        }

        self
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
