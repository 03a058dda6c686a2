/*!
    Audio playback through a device.
*/

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use media_native::{Frame, audio_frame_format};
use media_types::{AudioClock, CancelToken, Error, Result};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};
use tracing::{debug, info};

use crate::device::device_error;
use crate::shared::{DEFAULT_BUFFER_SECONDS, Shared, fill_silence, whole_frames};
use crate::{AudioSpec, Device, Direction, negotiate};

const WAIT: Duration = Duration::from_millis(1);

/**
    A playing output stream.

    Interleaved samples in the negotiated format are queued with
    [`AudioOutput::push`] or [`AudioOutput::write`], and consumed by the
    device callback. The [`AudioClock`] counts the samples the device has
    consumed.

    The stream stops when the output is dropped. On some platforms the
    underlying stream is bound to the thread that opened it, so the
    output is not `Send`.
*/
pub struct AudioOutput {
    stream: cpal::Stream,
    producer: HeapProd<u8>,
    spec: AudioSpec,
    clock: Arc<AudioClock>,
    shared: Arc<Shared>,
}

impl AudioOutput {
    /**
        Open `device` for playback at exactly `spec`, with about one second
        of buffering.

        # Errors

        - Configuration error if the device is not an output or does not
          support `spec` exactly
        - Device error if the platform fails to build or start the stream
    */
    pub fn open(device: &Device, spec: AudioSpec) -> Result<Self> {
        Self::open_with_buffer(device, spec, DEFAULT_BUFFER_SECONDS)
    }

    /**
        Open `device` for playback, buffering up to `seconds` of audio.
    */
    pub fn open_with_buffer(device: &Device, spec: AudioSpec, seconds: f64) -> Result<Self> {
        if device.direction() != Direction::Output {
            return Err(Error::config(format!("{} is not an output device", device.name())));
        }
        let config = negotiate(&spec, &device.supported_configs()?)?;
        let sample_format = spec.cpal_format()?;
        let bytes_per_sample = spec.format.bytes_per_sample();

        let (producer, mut consumer) = HeapRb::<u8>::new(spec.bytes_for(seconds)).split();
        let clock = Arc::new(AudioClock::new(spec.sample_rate, spec.channels));
        let shared = Arc::new(Shared::default());

        let data_callback = {
            let clock = Arc::clone(&clock);
            let shared = Arc::clone(&shared);
            let format = spec.format;
            move |data: &mut cpal::Data, _: &cpal::OutputCallbackInfo| {
                let out = data.bytes_mut();
                let read = consumer.pop_slice(out);
                fill_silence(&mut out[read..], format);
                clock.add_samples((read / bytes_per_sample) as u64);

                let drained = read < out.len() && consumer.is_empty();
                if drained && shared.is_closed() {
                    clock.mark_finished();
                }
            }
        };
        let error_callback = {
            let shared = Arc::clone(&shared);
            move |error: cpal::StreamError| shared.set_error(error)
        };

        let stream = device
            .inner()
            .build_output_stream_raw(&config, sample_format, data_callback, error_callback, None)
            .map_err(device_error)?;
        stream.play().map_err(device_error)?;

        info!(device = device.name(), %spec, "opened audio output");
        Ok(Self {
            stream,
            producer,
            spec,
            clock,
            shared,
        })
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    /**
        Clock of the samples played so far.
    */
    pub fn clock(&self) -> Arc<AudioClock> {
        Arc::clone(&self.clock)
    }

    /**
        Bytes that can be queued without waiting.
    */
    pub fn vacant(&self) -> usize {
        self.producer.vacant_len()
    }

    /**
        Bytes queued but not played yet.
    */
    pub fn queued(&self) -> usize {
        self.producer.occupied_len()
    }

    /**
        Last error the platform reported for this stream.
    */
    pub fn error(&self) -> Option<String> {
        self.shared.error()
    }

    /**
        Queue as many whole sample frames of `bytes` as fit, without
        waiting. Returns the number of bytes queued.
    */
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let len = whole_frames(bytes.len().min(self.producer.vacant_len()), self.spec.frame_bytes());
        self.producer.push_slice(&bytes[..len])
    }

    /**
        Queue all of `bytes`, waiting for the device to make room.

        # Errors

        - Configuration error if `bytes` does not hold whole sample frames,
          or the output is closed
        - [`Error::Cancelled`] once `cancel` is set
    */
    pub fn write(&mut self, bytes: &[u8], cancel: &CancelToken) -> Result<()> {
        if self.shared.is_closed() {
            return Err(Error::config("audio output is closed"));
        }
        if bytes.len() % self.spec.frame_bytes() != 0 {
            return Err(Error::config(format!(
                "{} bytes is not a whole number of {} byte sample frames",
                bytes.len(),
                self.spec.frame_bytes()
            )));
        }

        let mut written = 0;
        while written < bytes.len() {
            cancel.check()?;
            written += self.push(&bytes[written..]);
            if written < bytes.len() {
                thread::sleep(WAIT);
            }
        }
        Ok(())
    }

    /**
        Queue the samples of an audio frame, waiting for room.

        # Errors

        Configuration error if the frame is not audio in the device format.
    */
    pub fn write_frame(&mut self, frame: &Frame, cancel: &CancelToken) -> Result<()> {
        let audio = frame
            .as_audio()
            .ok_or_else(|| Error::config("audio output cannot play video frames"))?;
        let format = audio_frame_format(audio)?;
        let expected = AudioSpec {
            buffer_frames: None,
            ..self.spec
        };
        if AudioSpec::from_format(&format)? != expected {
            return Err(Error::config(format!(
                "frame format {format} does not match device format {}",
                self.spec
            )));
        }

        let len = audio.samples() * self.spec.frame_bytes();
        let data = audio.data(0);
        let bytes = data
            .get(..len)
            .ok_or_else(|| Error::config("audio frame holds fewer bytes than samples"))?;
        self.write(bytes, cancel)
    }

    /**
        Signal that no more samples follow. Once the device has played the
        queued samples the clock switches to wall time.
    */
    pub fn close(&self) {
        self.shared.close();
        debug!(queued = self.queued(), "closed audio output");
    }

    /**
        Wait until the device has played every queued sample.
    */
    pub fn drain(&self, cancel: &CancelToken) -> Result<()> {
        while !self.producer.is_empty() {
            cancel.check()?;
            if let Some(error) = self.shared.error() {
                return Err(Error::device(error));
            }
            thread::sleep(WAIT);
        }
        Ok(())
    }

    /**
        Pause playback. Queued samples stay queued.
    */
    pub fn pause(&self) -> Result<()> {
        self.stream.pause().map_err(device_error)
    }

    pub fn resume(&self) -> Result<()> {
        self.stream.play().map_err(device_error)
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("spec", &self.spec)
            .field("queued", &self.queued())
            .field("closed", &self.shared.is_closed())
            .finish_non_exhaustive()
    }
}
