//! Real-time mix engine.
//!
//! This module provides the [`RtMixer`] struct which owns the fixed voice
//! pool, the sample bank, the loop sequencer and the sample clock. It is
//! mutated exclusively from the audio callback: the polling side reaches it
//! only through control messages drained at the top of each refill (see
//! [`transport`](crate::engine::transport)).
//!
//! The per-sample hot path mixes every active voice with fixed-point
//! arithmetic, clamps to the signed 12-bit range, advances the shared
//! sample clock and drives [`LoopTrack::tick`]. A full buffer must render
//! within one buffer period; everything in here is a bounded loop over a
//! fixed-capacity array.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::constants::{
    BASE_THRESHOLD, DAC_CONTROL_BITS, HARDEST_HIT, MAX_LOOP_DURATION_SAMPLES, NUM_BANKS,
    NUM_SAMPLE_SLOTS, NUM_SENSORS, NUM_VOICES, TWELVE_BIT_MAX,
};
use crate::engine::looper::LoopTrack;
use crate::engine::sample_bank::SampleBank;
use crate::engine::voice::Voice;
use crate::messages::IndicatorState;

/// Maps a raw sensor reading onto the 12-bit velocity range.
///
/// Linear map from `[BASE_THRESHOLD, HARDEST_HIT]` to `[0, 4095]`. Readings
/// at or below the floor clamp to 0 rather than wrapping; readings above
/// the ceiling clamp to 4095.
pub fn normalize_velocity(raw: u16) -> u16 {
    if raw >= HARDEST_HIT {
        return TWELVE_BIT_MAX;
    }
    if raw <= BASE_THRESHOLD {
        return 0;
    }
    let span = (HARDEST_HIT - BASE_THRESHOLD) as u32;
    ((raw - BASE_THRESHOLD) as u32 * TWELVE_BIT_MAX as u32 / span) as u16
}

/// Converts a clamped signed 12-bit mix value to the MCP4922 wire word:
/// control bits in the top nibble, the sample offset to unsigned 12-bit
/// below.
pub fn dac_word(sample: i16) -> u16 {
    DAC_CONTROL_BITS | ((sample as i32 + 2048) as u16 & 0x0FFF)
}

/// Real-time mixer and audio-side context.
pub struct RtMixer {
    /// Immutable drum sounds, indexed by drum id.
    bank: SampleBank,

    /// Fixed voice pool; allocation and mixing scan in index order.
    voices: [Voice; NUM_VOICES],

    /// Active sound bank; maps sensor ids onto drum ids.
    active_bank: u8,

    /// The loop sequencer, ticked once per output sample.
    looper: LoopTrack,

    /// Monotonic sample counter; this path is its only writer.
    clock: u64,

    /// Mirror of `clock` readable from the polling context.
    shared_clock: Arc<AtomicU64>,
}

impl RtMixer {
    pub fn new(bank: SampleBank, shared_clock: Arc<AtomicU64>) -> Self {
        Self {
            bank,
            voices: [Voice::idle(); NUM_VOICES],
            active_bank: 0,
            looper: LoopTrack::new(),
            clock: 0,
            shared_clock,
        }
    }

    /// Triggers a drum sound from a raw sensor reading.
    ///
    /// No-op if `drum_id` is out of range.
    pub fn trigger(&mut self, drum_id: u8, raw_velocity: u16) {
        self.trigger_normalized(drum_id, normalize_velocity(raw_velocity));
    }

    /// Triggers a drum sound with an already-normalized velocity.
    ///
    /// Used when replaying loop events, which store normalized velocity,
    /// so looped hits are not scaled twice.
    pub fn trigger_normalized(&mut self, drum_id: u8, velocity: u16) {
        if drum_id as usize >= NUM_SAMPLE_SLOTS {
            return;
        }

        // First free slot, scanning in index order.
        for voice in &mut self.voices {
            if !voice.active {
                voice.start(drum_id, velocity);
                return;
            }
        }

        // Pool full: steal the voice closest to finishing (largest
        // position), ties to the lowest index.
        let mut steal = 0;
        let mut steal_pos = 0;
        for (i, voice) in self.voices.iter().enumerate() {
            if voice.position > steal_pos {
                steal_pos = voice.position;
                steal = i;
            }
        }
        log::debug!("voice {steal} stolen for drum {drum_id}");
        self.voices[steal].start(drum_id, velocity);
    }

    /// Handles one sensor hit from the polling context.
    ///
    /// The active bank maps the sensor onto a drum id; the hit is offered
    /// to the sequencer (which accepts it while recording or overdubbing)
    /// and then triggers a voice.
    pub fn hit(&mut self, sensor: u8, reading: u16) {
        if sensor as usize >= NUM_SENSORS {
            return;
        }
        let drum_id = self.active_bank * NUM_SENSORS as u8 + sensor;
        let velocity = normalize_velocity(reading);
        self.looper.record(drum_id, velocity, self.clock);
        self.trigger_normalized(drum_id, velocity);
    }

    /// Record-button press: idle starts recording, recording stops into
    /// playback, playback clears.
    pub fn record_button(&mut self) {
        if !self.looper.is_recording() && !self.looper.is_playing() {
            self.looper.start_recording();
        } else if self.looper.is_recording() {
            self.looper.stop_recording(self.clock);
        } else {
            self.looper.clear();
        }
    }

    pub fn clear_loop(&mut self) {
        self.looper.clear();
    }

    pub fn toggle_overdub(&mut self) {
        self.looper.toggle_overdub();
    }

    /// Selects the next sound bank, wrapping.
    pub fn next_bank(&mut self) {
        self.active_bank = (self.active_bank + 1) % NUM_BANKS as u8;
        log::info!("sound bank {}", self.active_bank);
    }

    /// The 4-way loop state for the indicator LEDs.
    pub fn indicator(&self) -> IndicatorState {
        if self.looper.is_recording() {
            IndicatorState::Recording
        } else if self.looper.is_playing() && self.looper.overdub_enabled() {
            IndicatorState::Overdub
        } else if self.looper.is_playing() {
            IndicatorState::Playing
        } else {
            IndicatorState::Idle
        }
    }

    /// Renders one output sample: the clamped signed 12-bit mix of all
    /// active voices.
    ///
    /// Advances every contributing voice by one sample (retiring voices
    /// that consumed their last sample), enforces the recording auto-stop,
    /// ticks the sequencer at the current clock position, then advances
    /// the sample clock.
    pub fn mix_sample(&mut self) -> i16 {
        let mut mix_sum: i32 = 0;

        for voice in &mut self.voices {
            if !voice.active {
                continue;
            }
            let sample = self.bank.sample(voice.drum_id);
            if voice.position >= sample.len() {
                voice.stop();
                continue;
            }

            let scaled = (sample.at(voice.position) as i32 * voice.velocity as i32) >> 12;
            mix_sum += scaled;

            voice.position += 1;
            if voice.position >= sample.len() {
                voice.stop();
            }
        }

        // Recording auto-stop: 4 seconds after the first recorded hit.
        if self.looper.is_recording()
            && let Some(start) = self.looper.record_start()
            && self.clock.saturating_sub(start) >= MAX_LOOP_DURATION_SAMPLES
        {
            log::info!("loop: recording auto-stopped");
            self.looper.stop_recording(self.clock);
        }

        let due = self.looper.tick(self.clock);
        for event in due.iter() {
            self.trigger_normalized(event.drum_id, event.velocity);
        }

        self.clock += 1;
        self.shared_clock.store(self.clock, Ordering::Relaxed);

        mix_sum.clamp(-2048, 2047) as i16
    }

    /// Fills one output buffer with DAC wire words.
    ///
    /// This is the firmware refill entry point: it must complete within
    /// one buffer period.
    pub fn refill(&mut self, buffer: &mut [u16]) {
        for slot in buffer.iter_mut() {
            *slot = dac_word(self.mix_sample());
        }
    }

    /// Current sample-clock value.
    pub fn clock(&self) -> u64 {
        self.clock
    }
}
