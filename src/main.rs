//! rakuten-crawler - Rakuten search-results scraper CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rakuten_crawler::commands::{BatchCommand, SearchCommand};
use rakuten_crawler::config::{Config, OutputFormat};
use rakuten_crawler::rakuten::BrowserKind;
use rakuten_crawler::ShopFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "rakuten-crawler",
    version,
    about = "Rakuten search-results scraper",
    long_about = "Renders Rakuten search results in a WebDriver browser and saves product name, shop and URL as CSV."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for stdout
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// WebDriver server URL
    #[arg(long, global = true)]
    webdriver: Option<String>,

    /// Browser to drive (firefox, chrome)
    #[arg(long, global = true)]
    browser: Option<BrowserKind>,

    /// Root directory for CSV output
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Concurrent batch jobs
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one keyword and save the results
    #[command(alias = "s")]
    Search {
        /// Search keyword
        keyword: String,

        /// Drop results whose shop name contains this text
        #[arg(long, conflicts_with = "only_shop")]
        skip_shop: Option<String>,

        /// Keep only results whose shop name contains this text
        #[arg(long)]
        only_shop: Option<String>,
    },

    /// Run one search per row of a job table (id, keyword, shop)
    #[command(alias = "b")]
    Batch {
        /// Job table in CSV format
        file: PathBuf,
    },
}

fn init_logging(verbose: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };

    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let file = match log_file {
        Some(path) => {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(f)))
        }
        None => None,
    };

    tracing_subscriber::registry().with(filter).with(stderr).with(file).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(url) = cli.webdriver {
        config.webdriver_url = url;
    }
    if let Some(browser) = cli.browser {
        config.browser = browser;
    }
    if let Some(dir) = cli.results_dir {
        config.results_dir = dir;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers.max(1);
    }
    if cli.headed {
        config.headless = false;
    }

    init_logging(cli.verbose, config.log_file.as_ref())?;

    match cli.command {
        Commands::Search { keyword, skip_shop, only_shop } => {
            let filter = ShopFilter::new(only_shop.as_deref(), skip_shop.as_deref());
            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&keyword, &filter).await?;

            println!("{}", output.rendered);
            println!(
                "\nSaved {} products to {}",
                output.report.records.len(),
                output.report.path.display()
            );
        }

        Commands::Batch { file } => {
            let cmd = BatchCommand::new(config);
            let (_report, summary) = cmd.execute(&file).await?;
            println!("{}", summary);
        }
    }

    Ok(())
}
