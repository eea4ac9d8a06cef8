//! Piezo sensor input: peak detection and debounce.
//!
//! Each sensor runs a three-phase state machine. A reading over the
//! threshold opens a capture window that collects the true peak of the
//! mechanical strike (which rings for about a millisecond) instead of
//! firing on the first sample over threshold. Emitting the peak opens a
//! recovery window during which the sensor ignores everything, so the
//! ringdown cannot re-trigger.
//!
//! Sensors share an ADC pair through an analog multiplexer: one poll
//! selects a mux channel, reads the two sensors wired to it and advances
//! the channel index, so the whole bank is scanned every `MUX_CHANNELS`
//! polls. All timing is in the sample-clock time base.

use crate::engine::constants::{
    CAPTURE_WINDOW_SAMPLES, MUX_CHANNELS, NUM_SENSORS, RECOVERY_WINDOW_SAMPLES, SENSOR_THRESHOLD,
};

/// Boundary to the multiplexed ADC pair.
///
/// Implementations select the multiplexer channel on the hardware (or
/// fake) side and sample both ADC lines.
pub trait MuxAdc {
    /// Routes the given multiplexer channel to the ADC pair.
    fn select_channel(&mut self, channel: u8);

    /// Samples both ADC lines for the selected channel. The first value
    /// belongs to sensor `channel`, the second to `channel + MUX_CHANNELS`.
    fn read_pair(&mut self) -> (u16, u16);
}

/// A discrete hit produced by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitEvent {
    pub sensor: u8,

    /// The raw peak reading collected over the capture window.
    pub reading: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SensorPhase {
    Ready,
    Capturing,
    Recovering,
}

/// Per-sensor debounce state. Transitions are driven only by elapsed time
/// and incoming readings.
#[derive(Debug, Clone, Copy)]
struct SensorState {
    phase: SensorPhase,
    max_reading: u16,
    peak_deadline: u64,
    recovery_deadline: u64,
}

impl SensorState {
    fn new() -> Self {
        Self {
            phase: SensorPhase::Ready,
            max_reading: 0,
            peak_deadline: 0,
            recovery_deadline: 0,
        }
    }

    /// Feeds one reading at time `now`; returns the captured peak when a
    /// capture window closes.
    fn feed(&mut self, reading: u16, threshold: u16, now: u64) -> Option<u16> {
        // Leaving recovery is purely time-based; the reading that arrives
        // on the crossing poll is then judged under Ready rules.
        if self.phase == SensorPhase::Recovering {
            if now < self.recovery_deadline {
                return None;
            }
            self.phase = SensorPhase::Ready;
        }

        match self.phase {
            SensorPhase::Ready => {
                if reading > threshold {
                    self.phase = SensorPhase::Capturing;
                    self.max_reading = reading;
                    self.peak_deadline = now + CAPTURE_WINDOW_SAMPLES;
                }
                None
            }
            SensorPhase::Capturing => {
                if reading > self.max_reading {
                    self.max_reading = reading;
                }
                if now >= self.peak_deadline {
                    self.phase = SensorPhase::Recovering;
                    self.recovery_deadline = now + RECOVERY_WINDOW_SAMPLES;
                    return Some(self.max_reading);
                }
                None
            }
            SensorPhase::Recovering => None,
        }
    }
}

/// The full set of sensors plus the multiplexer scan position.
#[derive(Debug)]
pub struct SensorBank {
    sensors: [SensorState; NUM_SENSORS],
    mux_index: u8,
}

impl SensorBank {
    pub fn new() -> Self {
        Self {
            sensors: [SensorState::new(); NUM_SENSORS],
            mux_index: 0,
        }
    }

    /// Polls the sensor pair on the current multiplexer channel.
    ///
    /// Processes exactly two readings, advances the channel index by one
    /// (wrapping) and returns up to one hit per polled sensor.
    pub fn poll<A: MuxAdc>(&mut self, adc: &mut A, now: u64) -> [Option<HitEvent>; 2] {
        let channel = self.mux_index;
        adc.select_channel(channel);
        let (low, high) = adc.read_pair();

        let first = self.feed_sensor(channel, low, now);
        let second = self.feed_sensor(channel + MUX_CHANNELS as u8, high, now);

        self.mux_index = (self.mux_index + 1) % MUX_CHANNELS as u8;
        [first, second]
    }

    fn feed_sensor(&mut self, sensor: u8, reading: u16, now: u64) -> Option<HitEvent> {
        let idx = sensor as usize;
        if idx >= NUM_SENSORS {
            return None;
        }
        self.sensors[idx]
            .feed(reading, SENSOR_THRESHOLD[idx], now)
            .map(|reading| {
                log::debug!("sensor {sensor} hit, peak {reading}");
                HitEvent { sensor, reading }
            })
    }
}

impl Default for SensorBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted ADC: a fixed reading per sensor, settable between polls.
    struct FakeAdc {
        readings: [u16; NUM_SENSORS],
        selected: u8,
        selections: Vec<u8>,
    }

    impl FakeAdc {
        fn new() -> Self {
            Self {
                readings: [0; NUM_SENSORS],
                selected: 0,
                selections: Vec::new(),
            }
        }
    }

    impl MuxAdc for FakeAdc {
        fn select_channel(&mut self, channel: u8) {
            self.selected = channel;
            self.selections.push(channel);
        }

        fn read_pair(&mut self) -> (u16, u16) {
            let low = self.readings[self.selected as usize];
            let high = self.readings[self.selected as usize + MUX_CHANNELS];
            (low, high)
        }
    }

    #[test]
    fn test_mux_round_robins_channels() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        for _ in 0..2 * MUX_CHANNELS {
            bank.poll(&mut adc, 0);
        }

        let expected: Vec<u8> = (0..MUX_CHANNELS as u8).chain(0..MUX_CHANNELS as u8).collect();
        assert_eq!(adc.selections, expected);
    }

    #[test]
    fn test_quiet_sensors_emit_nothing() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        for now in 0..1000 {
            assert_eq!(bank.poll(&mut adc, now), [None, None]);
        }
    }

    #[test]
    fn test_strike_emits_peak_once() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        // Sensor 0 crosses threshold, rings up to a peak, then decays.
        adc.readings[0] = 300;
        assert_eq!(bank.poll(&mut adc, 0), [None, None]); // capture opens

        adc.readings[0] = 900;
        bank.mux_index = 0;
        assert_eq!(bank.poll(&mut adc, 10), [None, None]);

        adc.readings[0] = 700;
        bank.mux_index = 0;
        assert_eq!(bank.poll(&mut adc, 20), [None, None]);

        // Past the capture deadline: the window closes with the max seen.
        bank.mux_index = 0;
        let hits = bank.poll(&mut adc, CAPTURE_WINDOW_SAMPLES + 5);
        assert_eq!(
            hits[0],
            Some(HitEvent {
                sensor: 0,
                reading: 900
            })
        );
    }

    #[test]
    fn test_recovery_window_suppresses_retrigger() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        adc.readings[0] = 800;
        bank.poll(&mut adc, 0);
        bank.mux_index = 0;
        let hits = bank.poll(&mut adc, CAPTURE_WINDOW_SAMPLES);
        assert!(hits[0].is_some());
        let fired_at = CAPTURE_WINDOW_SAMPLES;

        // Ringdown stays over threshold through the recovery window:
        // nothing may fire.
        let mut now = fired_at + 1;
        while now < fired_at + RECOVERY_WINDOW_SAMPLES {
            bank.mux_index = 0;
            assert_eq!(bank.poll(&mut adc, now)[0], None);
            now += 100;
        }

        // After recovery the same level starts a fresh capture.
        bank.mux_index = 0;
        assert_eq!(bank.poll(&mut adc, fired_at + RECOVERY_WINDOW_SAMPLES), [None, None]);
        bank.mux_index = 0;
        let hits = bank.poll(
            &mut adc,
            fired_at + RECOVERY_WINDOW_SAMPLES + CAPTURE_WINDOW_SAMPLES,
        );
        assert!(hits[0].is_some());
    }

    #[test]
    fn test_reading_at_threshold_does_not_trigger() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        adc.readings[0] = SENSOR_THRESHOLD[0];
        for now in 0..100 {
            bank.mux_index = 0;
            assert_eq!(bank.poll(&mut adc, now), [None, None]);
        }
    }

    #[test]
    fn test_both_sensors_of_a_pair_are_polled() {
        let mut bank = SensorBank::new();
        let mut adc = FakeAdc::new();

        // Sensor 0 and its pair partner both strike.
        adc.readings[0] = 500;
        adc.readings[MUX_CHANNELS] = 600;
        bank.poll(&mut adc, 0);

        bank.mux_index = 0;
        let hits = bank.poll(&mut adc, CAPTURE_WINDOW_SAMPLES);
        assert_eq!(
            hits,
            [
                Some(HitEvent {
                    sensor: 0,
                    reading: 500
                }),
                Some(HitEvent {
                    sensor: MUX_CHANNELS as u8,
                    reading: 600
                }),
            ]
        );
    }
}
