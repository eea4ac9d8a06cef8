//! Real-time core of an electronic drum pad.
//!
//! Piezo sensor readings become discrete hit events, hit events allocate
//! playback voices, and a fixed-point mixer renders the active voices into
//! 12-bit DAC words while driving a loop sequencer that records and replays
//! hit patterns. See the [`engine`] module for the component breakdown.

pub mod engine;
pub mod messages;

pub use engine::DrumKit;
pub use messages::{ControlMessage, EngineMessage, IndicatorState};
