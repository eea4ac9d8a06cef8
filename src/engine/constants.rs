//! Engine configuration constants and limits.

/// Output sample rate in Hz.
pub const SAMPLE_RATE_HZ: u32 = 44_100;

/// Number of samples in one output buffer (one refill deadline).
pub const AUDIO_BUFFER_SIZE: usize = 256;

/// Maximum number of voices that can be active simultaneously.
pub const NUM_VOICES: usize = 8;

/// Number of physical pad sensors.
pub const NUM_SENSORS: usize = 6;

/// Number of selectable sound banks.
pub const NUM_BANKS: usize = 2;

/// Total number of drum sample slots (sensors x banks).
pub const NUM_SAMPLE_SLOTS: usize = NUM_SENSORS * NUM_BANKS;

/// Number of multiplexer channels; each channel selects one sensor pair.
pub const MUX_CHANNELS: usize = NUM_SENSORS.div_ceil(2);

/// Raw reading at which a strike starts registering (velocity floor).
pub const BASE_THRESHOLD: u16 = 100;

/// Per-sensor trigger thresholds.
///
/// Kept as an array in case some sensors are more sensitive than others
/// due to component variation.
pub const SENSOR_THRESHOLD: [u16; NUM_SENSORS] = [BASE_THRESHOLD; NUM_SENSORS];

/// Raw reading mapped to full velocity; anything above clamps.
pub const HARDEST_HIT: u16 = 1200;

/// Maximum normalized velocity (12-bit).
pub const TWELVE_BIT_MAX: u16 = 4095;

/// Time after the first threshold crossing during which the true strike
/// peak is collected, in microseconds.
pub const CAPTURE_WINDOW_US: u32 = 1_000;

/// Time after a hit event during which a sensor ignores readings, in
/// microseconds. Suppresses mechanical and electrical ringdown.
pub const RECOVERY_WINDOW_US: u32 = 50 * 1_000;

const fn us_to_samples(us: u32) -> u64 {
    us as u64 * SAMPLE_RATE_HZ as u64 / 1_000_000
}

/// Capture window converted to the sample-clock time base.
pub const CAPTURE_WINDOW_SAMPLES: u64 = us_to_samples(CAPTURE_WINDOW_US);

/// Recovery window converted to the sample-clock time base.
pub const RECOVERY_WINDOW_SAMPLES: u64 = us_to_samples(RECOVERY_WINDOW_US);

/// Maximum number of events a loop can hold.
pub const MAX_LOOP_EVENTS: usize = 12;

/// Recording auto-stops once this many samples have elapsed since the
/// loop's first recorded hit (4 seconds).
pub const MAX_LOOP_DURATION_SAMPLES: u64 = SAMPLE_RATE_HZ as u64 * 4;

/// Control bits for the MCP4922 DAC word: channel A, buffered, 1x gain,
/// active mode.
pub const DAC_CONTROL_BITS: u16 = 0x3000;

/// Capacity of each SPSC ring buffer between the polling loop and the
/// audio thread.
pub const RING_CAPACITY: usize = 1024;
