//! CLI command handlers
//!
//! # Modules
//!
//! - `replay`: Replay a recorded event stream through the engine
//! - `feedback`: One-shot feedback computation

pub mod feedback;
pub mod replay;

use std::path::Path;

use anyhow::Context;
use coherence_engine_core::Config;

/// Load configuration from `path`, or from the default layered sources.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Invalid configuration in {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}
