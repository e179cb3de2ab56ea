//! pt-stats CLI
//!
//! Local entry point: runs extraction for every configured site and prints
//! the canonical records as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pt_stats::{
    error::{AppError, Result},
    extractors::ExtractorRegistry,
    models::Config,
    services::{HttpFetcher, StatsRunner},
};

/// pt-stats - PT site user-statistics extractor
#[derive(Parser, Debug)]
#[command(name = "pt-stats", version, about = "PT site user-statistics extractor")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract statistics from all configured sites
    Fetch,

    /// Classify a saved landing page and print the matched scheme
    Classify {
        /// Path to a saved landing-page HTML file
        file: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Fetch => {
            config.validate()?;
            let fetcher = Arc::new(HttpFetcher::new(&config.extraction)?);
            let runner = StatsRunner::new(&config, fetcher);
            let outcome = runner.fetch_all(&config.sites).await;

            for record in &outcome.records {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
            log::info!(
                "Extracted {}/{} sites ({} failed)",
                outcome.records.len(),
                outcome.site_total,
                outcome.failures.len()
            );
            for (site, error) in &outcome.failures {
                log::warn!("{}: {}", site, error);
            }
        }
        Command::Classify { file } => {
            let page = std::fs::read_to_string(&file)?;
            let registry = ExtractorRegistry::standard();
            match registry.classify(&page) {
                Some(extractor) => println!("{}", extractor.scheme()),
                None => return Err(AppError::UnsupportedSite),
            }
        }
        Command::Validate => {
            config.validate()?;
            log::info!(
                "Configuration OK: {} site(s), seeding page cap {}",
                config.sites.len(),
                config.extraction.seeding_page_cap
            );
        }
    }

    Ok(())
}
