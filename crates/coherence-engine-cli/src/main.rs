//! Coherence Engine CLI
//!
//! # Commands
//!
//! - `replay`: Drive the engine from a recorded JSON-lines event stream
//! - `feedback`: Print the feedback signal for one coherence value
//!
//! Logs go to stderr; stdout carries only command output.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coherence_engine_core::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Coherence Engine - harmonic coherence scoring and feedback
#[derive(Parser)]
#[command(name = "coherence-engine")]
#[command(version)]
#[command(about = "Replay harmonic event streams through the coherence engine")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to config/default.toml and environment)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay JSON-lines bridge events and print outbound events
    ///
    /// Reads one event per line from FILE (stdin when omitted). Sample
    /// timestamps drive the feedback throttle, so a recorded session replays
    /// with the same emission pattern it had live.
    Replay(commands::replay::ReplayArgs),
    /// Print the feedback signal for a coherence value
    Feedback(commands::feedback::FeedbackArgs),
}

fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location)
        .with_writer(std::io::stderr);

    if logging.format.eq_ignore_ascii_case("compact") {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("coherence-engine: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, &config.logging);

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::handle_replay(args, config).await,
        Commands::Feedback(args) => commands::feedback::handle_feedback(args),
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
