//! Audio transport: stream setup and the real-time callback.
//!
//! On the device this is a double-buffered DMA/SPI pipeline clocked at the
//! sample rate; on the host it is a cpal output stream. Either way the
//! contract is the same: once per buffer period the callback drains the
//! control ring, then asks the mixer for one sample per output slot. The
//! callback context is the only one that touches the mixer, the sequencer
//! and the sample clock.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::engine::constants::{AUDIO_BUFFER_SIZE, RING_CAPACITY, SAMPLE_RATE_HZ};
use crate::engine::errors::TransportError;
use crate::engine::mixer::RtMixer;
use crate::engine::sample_bank::SampleBank;
use crate::messages::{ControlMessage, EngineMessage};

/// Handle to the running stream with the polling-side ring endpoints.
pub struct StreamHandle {
    pub stream: Stream,
    pub producer: Producer<ControlMessage>,
    pub consumer: Consumer<EngineMessage>,

    /// Read-only mirror of the sample clock for sensor window timing.
    pub sample_clock: Arc<AtomicU64>,
}

/// Setup and configure the logger.
pub fn setup_logger() {
    // Default to `info`; override via `RUST_LOG`, e.g. `RUST_LOG=debug`.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Create and configure the audio stream.
///
/// Builds both SPSC rings, moves the mixer into the stream callback and
/// returns the polling-side endpoints. The stream is created but not yet
/// started.
pub fn create_audio_stream(bank: SampleBank) -> Result<StreamHandle, TransportError> {
    setup_logger();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(TransportError::NoOutputDevice)?;

    let channels = device.default_output_config()?.channels();

    log::info!(
        "starting drum pad engine ({} ch @ {} Hz, {}-sample buffers)",
        channels,
        SAMPLE_RATE_HZ,
        AUDIO_BUFFER_SIZE
    );

    // Control ring (polling loop -> audio thread).
    let (producer_in, mut consumer_in) = RingBuffer::new(RING_CAPACITY);

    // Indicator ring (audio thread -> polling loop).
    let (mut producer_out, consumer_out) = RingBuffer::new(RING_CAPACITY);

    let sample_clock = Arc::new(AtomicU64::new(0));
    let mut mixer = RtMixer::new(bank, sample_clock.clone());
    let mut last_indicator = mixer.indicator();

    let stream_config = StreamConfig {
        channels,
        sample_rate: SAMPLE_RATE_HZ,
        buffer_size: BufferSize::Fixed(AUDIO_BUFFER_SIZE as u32),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Apply pending control messages before rendering.
            while let Ok(message) = consumer_in.pop() {
                match message {
                    ControlMessage::Ping => {
                        let _ = producer_out.push(EngineMessage::Pong);
                    }
                    ControlMessage::Hit { sensor, reading } => {
                        mixer.hit(sensor, reading);
                    }
                    ControlMessage::RecordButton => {
                        mixer.record_button();
                    }
                    ControlMessage::ClearLoop => {
                        mixer.clear_loop();
                    }
                    ControlMessage::ToggleOverdub => {
                        mixer.toggle_overdub();
                    }
                    ControlMessage::NextBank => {
                        mixer.next_bank();
                    }
                }
            }

            // One engine sample per output frame, fanned out to every
            // channel. The 12-bit mix scales to [-1.0, 1.0).
            for frame in data.chunks_mut(channels as usize) {
                let value = mixer.mix_sample() as f32 / 2048.0;
                for slot in frame.iter_mut() {
                    *slot = value;
                }
            }

            // State can also change from the audio side (auto-stop, loop
            // events), so the indicator is published after rendering.
            let indicator = mixer.indicator();
            if indicator != last_indicator {
                last_indicator = indicator;
                let _ = producer_out.push(EngineMessage::Indicator(indicator));
            }
        },
        |err| {
            log::error!("audio stream error: {}", err);
        },
        None,
    )?;

    Ok(StreamHandle {
        stream,
        producer: producer_in,
        consumer: consumer_out,
        sample_clock,
    })
}

/// Start playing the audio stream.
pub fn start_stream(stream: &Stream) -> Result<(), TransportError> {
    stream.play()?;
    Ok(())
}
