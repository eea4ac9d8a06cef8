//! Transport-specific error types.
//!
//! The real-time core itself has no error channel: out-of-range ids and
//! full pools are resolved by silent clamping and dropping. Errors only
//! exist at the transport boundary, while setting up the output stream.

use thiserror::Error;

/// Errors that can occur while creating or starting the audio stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No audio output device is available.
    #[error("no audio output device available")]
    NoOutputDevice,

    /// Failed to query the default stream configuration.
    #[error("failed to query stream config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// Failed to build the output stream.
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Failed to start the output stream.
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
