//! creator-scout
//!
//! Usage:
//!     creator-scout init
//!     creator-scout cycle
//!     creator-scout run
//!     creator-scout discover --tag fitness --output creators.csv
//!     creator-scout scrape --input creators.csv --source instagram
//!     creator-scout stats

mod services;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scout_core::{AppConfig, Platform};
use scout_db::ProfileStore;
use scout_engine::{filter_by_source, load_candidates_csv, save_candidates_csv};
use scout_scheduler::CandidateSource;
use services::{load_config, Services};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "creator-scout", version, about = "Discover creators and scrape their public profiles")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "SCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Write a default config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run one discover-scrape-store cycle
    Cycle {
        /// Also write discovered candidates to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run cycles on the configured interval until Ctrl-C
    Run {
        /// Also write each cycle's discovered candidates to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Discover candidates without scraping them
    Discover {
        /// Tags to browse after the feed; defaults to the configured hashtags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// CSV file to write candidates to
        #[arg(long, default_value = "creators.csv")]
        output: PathBuf,
    },
    /// Scrape candidates listed in a CSV file and store the results
    Scrape {
        /// CSV file with `source,profile_url` columns
        #[arg(long)]
        input: PathBuf,
        /// Only scrape rows from this platform
        #[arg(long)]
        source: Option<Platform>,
        /// Skip the API and scrape pages directly
        #[arg(long)]
        no_api: bool,
    },
    /// Print store counts
    Stats,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,scout=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    info!("Starting creator-scout v{}", env!("CARGO_PKG_VERSION"));
    if let Command::Init { force } = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => AppConfig::config_path()?,
        };
        return write_default_config(&path, force);
    }
    let config = load_config(cli.config.as_deref())?;

    if cli.command == Command::Stats {
        return print_stats(&config).await;
    }

    let services = Services::start(config).await?;
    let outcome = run(&services, cli.command).await;
    services.shutdown().await;
    outcome
}

async fn run(services: &Services, command: Command) -> Result<()> {
    match command {
        Command::Cycle { export } => {
            let cycle = services.auto_cycle(export.as_deref())?;
            let report = cycle.run_cycle(1).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(error) = report.error {
                anyhow::bail!("cycle failed: {error}");
            }
        }
        Command::Run { export } => {
            let cycle = services.auto_cycle(export.as_deref())?;
            let completed = cycle.run_continuous().await;
            info!("Stopped after {} cycles", completed);
        }
        Command::Discover { tags, output } => {
            let tags = if tags.is_empty() {
                services.config.discovery.hashtags.clone()
            } else {
                tags
            };
            let report = services.discovery().gather(&tags).await;
            if let Some(error) = report.error {
                anyhow::bail!("discovery failed: {error}");
            }
            save_candidates_csv(&output, &report.candidates)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Wrote {} candidates to {}", report.candidates.len(), output.display());
        }
        Command::Scrape {
            input,
            source,
            no_api,
        } => {
            let mut candidates = load_candidates_csv(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            if let Some(source) = source {
                candidates = filter_by_source(candidates, source);
            }
            let prefer_api = services.config.scraping.use_api && !no_api;
            let result = services
                .orchestrator()?
                .run_batch(candidates, prefer_api, services.config.scraping.max_concurrency)
                .await;

            let mut stored = 0;
            for profile in result.profiles() {
                match services.db.upsert(profile).await {
                    Ok(_) => stored += 1,
                    Err(e) => tracing::warn!(handle = %profile.handle, "Failed to store profile: {}", e),
                }
            }
            info!(
                "Scraped {} profiles: {} succeeded, {} failed, {} stored",
                result.total, result.successful, result.failed, stored
            );
        }
        Command::Init { .. } | Command::Stats => {}
    }
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists, pass --force to replace it", path.display());
    }
    AppConfig::default()
        .save_to(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

async fn print_stats(config: &scout_core::AppConfig) -> Result<()> {
    let db_path = config.database_path()?;
    let db = scout_db::Database::new(&db_path).await?;
    db.run_migrations().await?;
    let stats = db.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    db.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scrape() {
        let cli = Cli::try_parse_from([
            "creator-scout",
            "scrape",
            "--input",
            "creators.csv",
            "--source",
            "linkedin",
            "--no-api",
        ])
        .expect("valid args");

        assert_eq!(
            cli.command,
            Command::Scrape {
                input: PathBuf::from("creators.csv"),
                source: Some(Platform::LinkedIn),
                no_api: true,
            }
        );
    }

    #[test]
    fn test_cli_collects_repeated_tags() {
        let cli = Cli::try_parse_from([
            "creator-scout",
            "--config",
            "scout.toml",
            "discover",
            "--tag",
            "fitness",
            "--tag",
            "food",
        ])
        .expect("valid args");

        assert_eq!(cli.config, Some(PathBuf::from("scout.toml")));
        match cli.command {
            Command::Discover { tags, output } => {
                assert_eq!(tags, vec!["fitness", "food"]);
                assert_eq!(output, PathBuf::from("creators.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_init() {
        let cli = Cli::try_parse_from(["creator-scout", "init"]).expect("valid args");
        assert_eq!(cli.command, Command::Init { force: false });

        let cli = Cli::try_parse_from(["creator-scout", "--config", "scout.toml", "init", "--force"])
            .expect("valid args");
        assert_eq!(cli.command, Command::Init { force: true });
        assert_eq!(cli.config, Some(PathBuf::from("scout.toml")));
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("config.toml");

        write_default_config(&path, false).expect("first write");
        let loaded = AppConfig::load_from(&path).expect("load written config");
        assert_eq!(loaded.scraping.max_concurrency, AppConfig::default().scraping.max_concurrency);

        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).expect("forced write");
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["creator-scout", "scrape", "--input", "x.csv", "--source", "myspace"]).is_err());
    }
}
