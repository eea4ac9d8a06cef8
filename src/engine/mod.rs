//! Drum pad engine.
//!
//! This module provides the real-time signal path of the drum pad and is
//! organized into sub-modules, each with a specific responsibility:
//!
//! - [`constants`]: configuration constants and limits
//! - [`errors`]: transport error types
//! - [`sample_bank`]: immutable PCM drum sounds
//! - [`voice`]: playback voice slots
//! - [`mixer`]: fixed-point mixing, voice allocation, the sample clock
//! - [`looper`]: the loop sequencer
//! - [`sensor`]: peak-detection/debounce state machines over the ADC mux
//! - [`controls`]: button edge detection
//! - [`transport`]: stream setup and the real-time callback
//!
//! The top-level [`DrumKit`] struct owns the polling side: the sensor
//! bank, the control surface and the ring endpoints into the audio thread.

pub mod constants;
pub mod controls;
pub mod errors;
pub mod looper;
pub mod mixer;
pub mod sample_bank;
pub mod sensor;
pub mod transport;
pub mod voice;

use std::sync::atomic::Ordering;

use crate::engine::controls::{ControlSurface, NUM_BUTTONS};
use crate::engine::errors::TransportError;
use crate::engine::sample_bank::SampleBank;
use crate::engine::sensor::{MuxAdc, SensorBank};
use crate::engine::transport::{StreamHandle, create_audio_stream, start_stream};
use crate::messages::{ControlMessage, EngineMessage};

/// Polling-side context for the whole drum pad.
///
/// Constructed once at startup; the polling loop calls [`poll_sensors`]
/// and [`poll_controls`] repeatedly while the audio thread renders. All
/// shared state crosses over through the SPSC rings, so nothing here
/// needs a lock.
///
/// [`poll_sensors`]: DrumKit::poll_sensors
/// [`poll_controls`]: DrumKit::poll_controls
pub struct DrumKit {
    bank: SampleBank,
    sensors: SensorBank,
    surface: ControlSurface,
    stream_handle: Option<StreamHandle>,
}

impl DrumKit {
    /// Creates a drum kit over the given sample bank. The engine is not
    /// running until [`run`](DrumKit::run) is called.
    pub fn new(bank: SampleBank) -> Self {
        Self {
            bank,
            sensors: SensorBank::new(),
            surface: ControlSurface::new(),
            stream_handle: None,
        }
    }

    /// Initialize and start the audio stream.
    pub fn run(&mut self) -> Result<(), TransportError> {
        if self.stream_handle.is_some() {
            log::warn!("engine already running");
            return Ok(());
        }

        let handle = create_audio_stream(self.bank.clone())?;
        start_stream(&handle.stream)?;
        self.stream_handle = Some(handle);
        Ok(())
    }

    /// Shut down the audio stream.
    pub fn shut_down(&mut self) {
        self.stream_handle = None;
    }

    pub fn is_running(&self) -> bool {
        self.stream_handle.is_some()
    }

    /// Polls one sensor pair through the multiplexer and forwards any
    /// completed hits to the audio thread.
    pub fn poll_sensors<A: MuxAdc>(&mut self, adc: &mut A) {
        let Some(handle) = &mut self.stream_handle else {
            return;
        };

        let now = handle.sample_clock.load(Ordering::Relaxed);
        for hit in self.sensors.poll(adc, now).into_iter().flatten() {
            let message = ControlMessage::Hit {
                sensor: hit.sensor,
                reading: hit.reading,
            };
            if handle.producer.push(message).is_err() {
                // Ring full: the hit is dropped, same policy as a full
                // voice pool.
                log::warn!("control ring full, hit dropped");
            }
        }
    }

    /// Feeds the current button levels through edge detection and
    /// forwards the resulting actions.
    pub fn poll_controls(&mut self, levels: [bool; NUM_BUTTONS]) {
        let actions = self.surface.update(levels);
        let Some(handle) = &mut self.stream_handle else {
            return;
        };
        for action in actions.into_iter().flatten() {
            if handle.producer.push(action).is_err() {
                log::warn!("control ring full, {action:?} dropped");
            }
        }
    }

    /// Send a ping message to the audio thread.
    pub fn ping(&mut self) {
        if let Some(handle) = &mut self.stream_handle {
            let _ = handle.producer.push(ControlMessage::Ping);
        }
    }

    /// Receive the next pending message from the audio thread, if any.
    /// Indicator updates drive the state LEDs.
    pub fn poll_engine_message(&mut self) -> Option<EngineMessage> {
        let handle = self.stream_handle.as_mut()?;
        handle.consumer.pop().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kit_starts_stopped() {
        let kit = DrumKit::new(SampleBank::empty());
        assert!(!kit.is_running());
    }

    #[test]
    fn test_polling_without_stream_is_a_no_op() {
        struct NullAdc;
        impl MuxAdc for NullAdc {
            fn select_channel(&mut self, _channel: u8) {}
            fn read_pair(&mut self) -> (u16, u16) {
                (0, 0)
            }
        }

        let mut kit = DrumKit::new(SampleBank::empty());
        kit.poll_sensors(&mut NullAdc);
        kit.poll_controls([true; NUM_BUTTONS]);
        assert_eq!(kit.poll_engine_message(), None);
    }
}
