use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use windrose::commands;
use windrose::config::Config;

#[derive(Parser)]
#[command(
    name = "windrose",
    version,
    about = "Workspace trend detection over ingested content streams",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path
    #[arg(long, global = true, default_value = "data/windrose.db")]
    db: PathBuf,

    /// Optional TOML config file; environment variables apply otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load content records from a JSON file into the store
    Ingest {
        /// Workspace identifier (UUID)
        #[arg(short, long)]
        workspace: Uuid,

        /// JSON file holding an array of content records
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Detect trends for a workspace
    Detect {
        /// Workspace identifier (UUID)
        #[arg(short, long)]
        workspace: Uuid,

        /// Analysis window in days (1-365)
        #[arg(long, default_value = "7")]
        days_back: u32,

        /// Maximum trends to return
        #[arg(long, default_value = "10")]
        max_trends: usize,

        /// Minimum strength score for returned trends (0-1)
        #[arg(long, default_value = "0.0")]
        min_confidence: f64,

        /// Restrict analysis to these source tags
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,

        /// Print the full outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List active trends for a workspace
    Trends {
        /// Workspace identifier (UUID)
        #[arg(short, long)]
        workspace: Uuid,

        /// Maximum trends to list
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Deactivate trends older than a cutoff
    Sweep {
        /// Workspace identifier (UUID)
        #[arg(short, long)]
        workspace: Uuid,

        /// Deactivate trends last detected more than this many days ago
        #[arg(long, default_value = "14")]
        max_age_days: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!("windrose trend detection starting");

    match cli.command {
        Commands::Ingest { workspace, input } => {
            tracing::info!(
                workspace = %workspace,
                input = %input.display(),
                "Starting ingest command"
            );
            commands::ingest(&cli.db, workspace, &input)?;
        }

        Commands::Detect {
            workspace,
            days_back,
            max_trends,
            min_confidence,
            sources,
            json,
        } => {
            tracing::info!(
                workspace = %workspace,
                days_back = %days_back,
                max_trends = %max_trends,
                min_confidence = %min_confidence,
                sources = ?sources,
                "Starting detect command"
            );
            commands::detect(
                &config,
                &cli.db,
                workspace,
                days_back,
                max_trends,
                min_confidence,
                sources,
                json,
            )?;
        }

        Commands::Trends {
            workspace,
            limit,
            json,
        } => {
            tracing::info!(
                workspace = %workspace,
                limit = %limit,
                "Starting trends command"
            );
            commands::trends(&cli.db, workspace, limit, json)?;
        }

        Commands::Sweep {
            workspace,
            max_age_days,
        } => {
            tracing::info!(
                workspace = %workspace,
                max_age_days = %max_age_days,
                "Starting sweep command"
            );
            commands::sweep(&cli.db, workspace, max_age_days)?;
        }
    }

    tracing::info!("windrose completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("windrose=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("windrose=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
