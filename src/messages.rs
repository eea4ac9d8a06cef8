//! Message definitions for communication between the polling loop and the audio thread.
//!
//! This module defines the enums that serve as the wire format for messages passed through the
//! ring buffers between the polling context (sensors, buttons) and the real-time audio thread.

/// Message that is emitted from the polling context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Used for testing message passing functionality.
    Ping,

    /// A sensor strike: the raw peak reading captured for one sensor.
    ///
    /// # Parameters
    /// * `sensor` - Sensor index (0 to NUM_SENSORS-1)
    /// * `reading` - Raw ADC peak value, pre-normalization
    Hit { sensor: u8, reading: u16 },

    /// The record button was pressed.
    ///
    /// Cycles the loop state: idle starts recording, recording stops and
    /// enters playback, playback clears.
    RecordButton,

    /// Clear the loop unconditionally.
    ClearLoop,

    /// Flip the overdub flag.
    ToggleOverdub,

    /// Advance to the next sound bank, wrapping.
    NextBank,
}

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMessage {
    /// Response to a Ping message.
    Pong,

    /// The loop state changed; drives the 4-way indicator LEDs.
    Indicator(IndicatorState),
}

/// The 4-way loop state shown on the indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Idle,
    Recording,
    Playing,
    Overdub,
}
