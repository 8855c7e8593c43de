//! Replay a recorded JSON-lines event stream through the engine.
//!
//! # Usage
//!
//! ```bash
//! coherence-engine replay fixtures/sample_session.jsonl
//! cat session.jsonl | coherence-engine replay --user-default guest -v
//! ```
//!
//! Every outbound event (bridge-ready, coherence-update, coherence-response)
//! is written to stdout as one JSON line, in publication order.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use parking_lot::Mutex;
use tracing::{info, warn};

use coherence_engine_core::{
    BridgeEvent, CoherenceEngine, Config, EventBus, EventKind, InMemoryEventBus,
    InMemoryHistoryStore, PersistenceStats, ReplayClock,
};

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines event file (stdin when omitted)
    pub file: Option<PathBuf>,

    /// User id assigned to harmonic-data events that carry none
    #[arg(long, value_name = "ID")]
    pub user_default: Option<String>,
}

/// Counters reported after a replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Non-blank input lines
    pub lines_read: usize,
    /// Lines that did not parse as an event
    pub malformed: usize,
    /// Events published to the engine
    pub events_replayed: usize,
    /// Events written to the output
    pub outbound: usize,
    pub persistence: PersistenceStats,
}

pub async fn handle_replay(args: ReplayArgs, config: Config) -> anyhow::Result<()> {
    let user_default = args.user_default.as_deref();
    let summary = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event stream {}", path.display()))?;
            run_replay(BufReader::new(file), std::io::stdout(), config, user_default).await?
        }
        None => {
            run_replay(
                BufReader::new(std::io::stdin()),
                std::io::stdout(),
                config,
                user_default,
            )
            .await?
        }
    };

    info!(
        lines_read = summary.lines_read,
        malformed = summary.malformed,
        events_replayed = summary.events_replayed,
        outbound = summary.outbound,
        persisted = summary.persistence.written,
        persist_failed = summary.persistence.failed,
        persist_dropped = summary.persistence.dropped,
        "Replay complete"
    );
    Ok(())
}

/// Replay `reader` through a fresh engine, writing outbound events to `writer`.
///
/// Harmonic-data timestamps, floored to whole milliseconds, advance a
/// [`ReplayClock`]; other events leave the clock where it is. Unparseable
/// lines are skipped with a warning.
pub async fn run_replay<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    config: Config,
    user_default: Option<&str>,
) -> anyhow::Result<ReplaySummary> {
    let bus = Arc::new(InMemoryEventBus::new());
    let clock = Arc::new(ReplayClock::new(0));
    let store = Arc::new(InMemoryHistoryStore::new());
    let engine = CoherenceEngine::with_clock(config, bus.clone(), store, clock.clone())
        .context("Failed to start coherence engine")?;

    let outbound: Arc<Mutex<Vec<BridgeEvent>>> = Arc::new(Mutex::new(Vec::new()));
    for kind in EventKind::OUTBOUND {
        let sink = Arc::clone(&outbound);
        bus.subscribe(
            kind,
            Arc::new(move |event: &BridgeEvent| sink.lock().push(event.clone())),
        );
    }
    engine.start();

    let mut summary = ReplaySummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event stream")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines_read += 1;

        let mut event: BridgeEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed event");
                summary.malformed += 1;
                continue;
            }
        };

        if let BridgeEvent::HarmonicData(data) = &mut event {
            clock.advance_to(replay_millis(data.sonic_data.timestamp));
            if data.user_id.is_none() {
                data.user_id = user_default.map(str::to_string);
            }
        }

        bus.publish(&event);
        summary.events_replayed += 1;

        let pending = std::mem::take(&mut *outbound.lock());
        for out in &pending {
            serde_json::to_writer(&mut writer, out)?;
            writeln!(writer)?;
        }
        summary.outbound += pending.len();
    }
    writer.flush()?;

    engine.shutdown().await;
    summary.persistence = engine.status().persistence;
    Ok(summary)
}

// Negative and non-finite timestamps pin the clock at zero.
fn replay_millis(timestamp: f64) -> u64 {
    if timestamp.is_finite() && timestamp > 0.0 {
        timestamp.floor() as u64
    } else {
        0
    }
}
