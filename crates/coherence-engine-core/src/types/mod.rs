//! Domain types: harmonic samples and bridge events.

mod events;
mod sample;

pub use events::{
    BridgeEvent, BridgeReadyEvent, CoherenceRequestEvent, CoherenceResponseEvent, EventKind,
    HarmonicDataEvent, HarmonicMode, HistoricalSummary, SessionEndEvent, SessionStartEvent,
    UserStateEvent,
};
pub use sample::{HarmonicSample, Waveform};
