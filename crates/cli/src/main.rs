//! Migration Cost Estimator CLI
//!
//! Estimates the monthly cost of moving a relational database onto a
//! distributed SQL cluster, either locally or through the estimator service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{catalog, compare, estimate, history, Backend};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Migration Cost Estimator CLI
#[derive(Parser)]
#[command(name = "mce")]
#[command(author, version, about = "CLI for the Migration Cost Estimator", long_about = None)]
pub struct Cli {
    /// Estimator service URL (can also be set via MCE_API_URL env var); estimates locally when unset
    #[arg(long, env = "MCE_API_URL")]
    pub api_url: Option<String>,

    /// Pricing catalog JSON for local estimates (built-in catalog if not specified)
    #[arg(long, env = "MCE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the target cluster and its monthly cost for a scenario
    Estimate {
        /// Scenario JSON (see `mce sample`)
        #[arg(long, short)]
        scenario: PathBuf,

        /// Session state file carrying history between runs
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Compare baseline estimates for reference source configurations
    Compare,

    /// List instance and storage classes in the pricing catalog
    Catalog,

    /// Show the source instance class change history
    History {
        /// Session state file written by `mce estimate --state`
        #[arg(long)]
        state: Option<PathBuf>,

        /// Clear the history instead of showing it
        #[arg(long)]
        clear: bool,
    },

    /// Print a sample scenario to start from
    Sample,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }

    let config = config::Config::load()?;
    let format = cli.format.or(config.default_format).unwrap_or_default();

    let backend = match cli.api_url.or(config.api_url) {
        Some(url) => Backend::Remote(client::ApiClient::new(&url)?),
        None => Backend::local(cli.catalog.or(config.catalog_path).as_deref())?,
    };

    match cli.command {
        Commands::Estimate { scenario, state } => {
            estimate::run_estimate(&backend, &scenario, state.as_deref(), format).await?;
        }
        Commands::Compare => {
            compare::show_comparison(&backend, format).await?;
        }
        Commands::Catalog => {
            catalog::show_catalog(&backend, format).await?;
        }
        Commands::History { state, clear } => {
            history::show_history(&backend, state.as_deref(), clear, format).await?;
        }
        Commands::Sample => {
            estimate::print_sample()?;
        }
    }

    Ok(())
}
