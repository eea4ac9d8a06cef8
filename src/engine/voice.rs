//! Playback voices.
//!
//! A voice is one in-progress playback of a drum sample. Voices live in a
//! fixed pool owned by the mixer; allocation scans the pool in index order
//! and the pool is the only mutator.

/// A single voice slot in the mixer.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub active: bool,

    /// Which drum sound is playing.
    pub drum_id: u8,

    /// Playback position within the sample, in samples.
    pub position: u32,

    /// Normalized playback velocity (0 to 4095).
    pub velocity: u16,
}

impl Voice {
    pub fn idle() -> Self {
        Self {
            active: false,
            drum_id: 0,
            position: 0,
            velocity: 0,
        }
    }

    /// Claims this slot for a new hit, resetting playback to the start.
    pub fn start(&mut self, drum_id: u8, velocity: u16) {
        self.active = true;
        self.drum_id = drum_id;
        self.position = 0;
        self.velocity = velocity;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.position = 0;
    }
}
