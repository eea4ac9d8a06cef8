//! Immutable drum sample storage.
//!
//! Each drum sound is a read-only buffer of signed 16-bit PCM, fixed for
//! the program lifetime. Voices borrow samples by id through the bank and
//! never copy them.

use std::sync::Arc;

use crate::engine::constants::NUM_SAMPLE_SLOTS;

/// One read-only drum sound.
#[derive(Debug, Clone)]
pub struct DrumSample {
    data: Arc<[i16]>,
}

impl DrumSample {
    pub fn new(pcm: impl Into<Arc<[i16]>>) -> Self {
        Self { data: pcm.into() }
    }

    /// An empty sample, for unpopulated slots. Triggering it retires the
    /// voice on the next mix step.
    pub fn silent() -> Self {
        Self {
            data: Vec::new().into(),
        }
    }

    /// Length in samples.
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// PCM value at `position`. Callers keep `position < len()`.
    pub fn at(&self, position: u32) -> i16 {
        self.data[position as usize]
    }
}

/// The fixed set of drum sounds, indexed by drum id.
#[derive(Debug, Clone)]
pub struct SampleBank {
    samples: [DrumSample; NUM_SAMPLE_SLOTS],
}

impl SampleBank {
    pub fn new(samples: [DrumSample; NUM_SAMPLE_SLOTS]) -> Self {
        Self { samples }
    }

    /// A bank of empty samples.
    pub fn empty() -> Self {
        Self {
            samples: std::array::from_fn(|_| DrumSample::silent()),
        }
    }

    /// Sample for `drum_id`. Callers keep `drum_id < NUM_SAMPLE_SLOTS`.
    pub fn sample(&self, drum_id: u8) -> &DrumSample {
        &self.samples[drum_id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_length_and_access() {
        let sample = DrumSample::new(vec![10i16, -20, 30]);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.at(0), 10);
        assert_eq!(sample.at(2), 30);
    }

    #[test]
    fn test_silent_sample() {
        let sample = DrumSample::silent();
        assert_eq!(sample.len(), 0);
        assert!(sample.is_empty());
    }

    #[test]
    fn test_bank_indexing() {
        let mut samples: [DrumSample; NUM_SAMPLE_SLOTS] =
            std::array::from_fn(|_| DrumSample::silent());
        samples[3] = DrumSample::new(vec![7i16]);

        let bank = SampleBank::new(samples);
        assert_eq!(bank.sample(3).at(0), 7);
        assert!(bank.sample(0).is_empty());
    }
}
