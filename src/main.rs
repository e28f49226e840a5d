mod api;
mod cli;
mod config;
mod db;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "pitchboard")]
#[command(about = "A football predictions analytics dashboard backend")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Initialize the database schema
    InitDb,
    /// Populate the database with demo leagues, matches and predictions
    Seed {
        /// Wipe existing rows before seeding
        #[arg(long)]
        fresh: bool,
    },
    /// Check database connectivity
    CheckDb,
    /// Show key metrics for the filtered match set
    Metrics {
        /// Comma-separated list of leagues
        #[arg(short, long)]
        leagues: Option<String>,
        /// Comma-separated list of seasons
        #[arg(short, long)]
        seasons: Option<String>,
    },
    /// Show current-session predictions
    Predictions,
    /// Show league standings
    Standings {
        #[arg(short, long)]
        leagues: Option<String>,
        #[arg(short, long)]
        seasons: Option<String>,
    },
}

fn csv_arg(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting {} API server on port {}", settings.app.title, port);
            api::serve(port, &settings).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database().await?;
        }
        Some(Commands::Seed { fresh }) => {
            tracing::info!("Seeding demo data (fresh: {})", fresh);
            cli::seed(fresh).await?;
        }
        Some(Commands::CheckDb) => {
            cli::check_db().await?;
        }
        Some(Commands::Metrics { leagues, seasons }) => {
            cli::show_metrics(csv_arg(leagues), csv_arg(seasons)).await?;
        }
        Some(Commands::Predictions) => {
            cli::show_predictions().await?;
        }
        Some(Commands::Standings { leagues, seasons }) => {
            cli::show_standings(csv_arg(leagues), csv_arg(seasons)).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting {} API server on port 3000", settings.app.title);
            api::serve(3000, &settings).await?;
        }
    }

    Ok(())
}
