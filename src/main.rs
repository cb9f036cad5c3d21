//! # Mentor Match CLI (`mentorctl`)
//!
//! The `mentorctl` binary starts the admin API and offers a couple of
//! offline commands for checking configuration and the recommender.
//!
//! ## Usage
//!
//! ```bash
//! mentorctl --config ./config/mentor-match.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mentorctl serve` | Start the JSON HTTP API |
//! | `mentorctl roster` | Print the seeded roster and dashboard counts |
//! | `mentorctl recommend <learner-id>` | Run one recommendation request |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info` for this crate).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mentor_match::config;
use mentor_match::recommend_cmd;
use mentor_match::server::{self, AppState};
use mentor_match::stats;

/// Mentor Match: mentorship program admin service with AI-assisted
/// mentor recommendations.
#[derive(Parser)]
#[command(
    name = "mentorctl",
    about = "Mentor Match: manage mentors and learners and request AI mentor recommendations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mentor-match.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind`. All records are held in memory and are
    /// lost when the process exits.
    Serve,

    /// Print the roster and dashboard counts.
    ///
    /// Only the demo roster exists outside a running server, so this is
    /// mostly useful with `[seed] demo = true`.
    Roster,

    /// Request mentor recommendations for one learner.
    Recommend {
        /// Learner identifier (e.g. `l1` in the demo roster).
        learner_id: String,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("mentor_match=info,mentor_match_core=info")
            }),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Roster => {
            let state = AppState::from_config(&cfg)?;
            stats::run_stats(state.store.as_ref()).await?;
        }
        Commands::Recommend { learner_id } => {
            let state = AppState::from_config(&cfg)?;
            recommend_cmd::run_recommend(
                state.store.as_ref(),
                state.recommender.as_ref(),
                &learner_id,
            )
            .await?;
        }
    }

    Ok(())
}
