//! Loop sequencer: records timestamped hit events and replays them against
//! the sample clock.
//!
//! The sequencer is driven once per output sample by the mixer. It moves
//! between three states: idle, recording, and playing, with overdub as an
//! orthogonal flag that only matters while playing. Event storage is a
//! fixed-capacity array with index-based reuse; nothing here allocates.

use crate::engine::constants::MAX_LOOP_EVENTS;

/// One recorded hit, timestamped relative to the loop start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopEvent {
    /// Sample offset from the start of the loop.
    pub timestamp: u64,

    /// Which sound to play.
    pub drum_id: u8,

    /// Normalized velocity. Stored post-normalization so replay skips the
    /// velocity map and looped hits keep their recorded loudness.
    pub velocity: u16,
}

/// Events due for replay on one tick, collected so the caller can feed them
/// back into the mixer without the sequencer holding a callback.
#[derive(Debug, Default)]
pub struct DueEvents {
    events: [Option<LoopEvent>; MAX_LOOP_EVENTS],
    len: usize,
}

impl DueEvents {
    fn push(&mut self, event: LoopEvent) {
        if self.len < MAX_LOOP_EVENTS {
            self.events[self.len] = Some(event);
            self.len += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = LoopEvent> + '_ {
        self.events[..self.len].iter().flatten().copied()
    }
}

/// Records and replays a loop of drum events.
#[derive(Debug)]
pub struct LoopTrack {
    events: [LoopEvent; MAX_LOOP_EVENTS],
    count: usize,
    recording: bool,
    playing: bool,
    overdub: bool,

    /// Sample-clock value of the first recorded hit. Silence before the
    /// first hit is not part of the loop.
    record_start: Option<u64>,

    /// Loop length in samples; 0 means undefined.
    loop_length: u64,

    /// Loop position the previous tick ended on.
    last_tick_pos: u64,
}

impl LoopTrack {
    pub fn new() -> Self {
        Self {
            events: [LoopEvent {
                timestamp: 0,
                drum_id: 0,
                velocity: 0,
            }; MAX_LOOP_EVENTS],
            count: 0,
            recording: false,
            playing: false,
            overdub: false,
            record_start: None,
            loop_length: 0,
            last_tick_pos: 0,
        }
    }

    /// Starts recording a new loop, discarding any previous one.
    pub fn start_recording(&mut self) {
        self.count = 0;
        self.recording = true;
        self.playing = false;
        self.record_start = None;
        self.loop_length = 0;
        self.last_tick_pos = 0;
        log::info!("loop: recording started");
    }

    /// Stops recording and enters playback.
    ///
    /// The loop length is the elapsed sample time from the first recorded
    /// hit to `stop_time`. With no events (or zero length) the track falls
    /// back to idle.
    pub fn stop_recording(&mut self, stop_time: u64) {
        self.recording = false;

        match self.record_start {
            Some(start) if self.count > 0 => {
                self.loop_length = stop_time.saturating_sub(start);
                if self.loop_length == 0 {
                    self.reset_timing();
                    log::info!("loop: zero-length recording discarded");
                    return;
                }
                // Uphold 0 <= timestamp < loop_length for a hit that lands
                // exactly at the end.
                for event in &mut self.events[..self.count] {
                    event.timestamp %= self.loop_length;
                }
                self.playing = true;
                self.last_tick_pos = 0;
                log::info!(
                    "loop: playing {} events over {} samples",
                    self.count,
                    self.loop_length
                );
            }
            _ => {
                self.reset_timing();
                log::info!("loop: recording stopped with no events");
            }
        }
    }

    /// Adds a hit to the loop.
    ///
    /// Accepted while recording, or while playing with overdub enabled;
    /// ignored otherwise. The first hit of a recording latches the loop
    /// start time. A full event buffer force-stops an initial recording
    /// and silently drops overdubbed hits.
    pub fn record(&mut self, drum_id: u8, velocity: u16, now: u64) {
        if self.recording {
            if self.count == MAX_LOOP_EVENTS {
                log::warn!("loop: event buffer full, stopping recording");
                self.stop_recording(now);
                return;
            }
            let start = *self.record_start.get_or_insert(now);
            self.events[self.count] = LoopEvent {
                timestamp: now - start,
                drum_id,
                velocity,
            };
            self.count += 1;
        } else if self.playing && self.overdub && self.loop_length > 0 {
            if self.count == MAX_LOOP_EVENTS {
                log::warn!("loop: event buffer full, overdub hit dropped");
                return;
            }
            let Some(start) = self.record_start else {
                return;
            };
            self.events[self.count] = LoopEvent {
                timestamp: (now - start) % self.loop_length,
                drum_id,
                velocity,
            };
            self.count += 1;
        }
    }

    /// Advances the loop to `now` and collects the events that became due.
    ///
    /// An event fires when its timestamp lies in the open-closed interval
    /// `(last_tick_pos, pos]` walking forward, treating the interval as
    /// wrapping when `pos` has wrapped past the loop end. The range test
    /// means each event fires exactly once per cycle even when ticks are
    /// coarser than one sample.
    pub fn tick(&mut self, now: u64) -> DueEvents {
        let mut due = DueEvents::default();
        if !self.playing || self.loop_length == 0 {
            return due;
        }
        let Some(start) = self.record_start else {
            return due;
        };

        let pos = (now - start) % self.loop_length;
        let last = self.last_tick_pos;

        for event in &self.events[..self.count] {
            let fires = if pos == last {
                event.timestamp == pos
            } else if last < pos {
                event.timestamp > last && event.timestamp <= pos
            } else {
                event.timestamp > last || event.timestamp <= pos
            };
            if fires {
                due.push(*event);
            }
        }

        self.last_tick_pos = pos;
        due
    }

    /// Resets the track to idle and empties the event buffer.
    pub fn clear(&mut self) {
        self.count = 0;
        self.recording = false;
        self.reset_timing();
    }

    /// Flips the overdub flag; recording/playing state is untouched.
    pub fn toggle_overdub(&mut self) {
        self.overdub = !self.overdub;
    }

    fn reset_timing(&mut self) {
        self.playing = false;
        self.record_start = None;
        self.loop_length = 0;
        self.last_tick_pos = 0;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn overdub_enabled(&self) -> bool {
        self.overdub
    }

    /// Loop length in samples; 0 while undefined.
    pub fn length(&self) -> u64 {
        self.loop_length
    }

    /// Sample-clock value of the first recorded hit, if latched.
    pub fn record_start(&self) -> Option<u64> {
        self.record_start
    }
}

impl Default for LoopTrack {
    fn default() -> Self {
        Self::new()
    }
}
