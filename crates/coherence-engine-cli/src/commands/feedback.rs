//! One-shot feedback computation.

use clap::Args;
use coherence_engine_core::FeedbackGenerator;

/// Arguments for the feedback command.
#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Coherence value; clamped to [0, 1]
    #[arg(allow_negative_numbers = true)]
    pub coherence: f64,
}

pub fn handle_feedback(args: FeedbackArgs) -> anyhow::Result<()> {
    println!("{}", render_feedback(args.coherence)?);
    Ok(())
}

/// Pretty JSON for the feedback signal at `coherence`.
pub fn render_feedback(coherence: f64) -> anyhow::Result<String> {
    anyhow::ensure!(coherence.is_finite(), "coherence must be finite, got {}", coherence);
    let feedback = FeedbackGenerator::new().generate(coherence);
    Ok(serde_json::to_string_pretty(&feedback)?)
}
