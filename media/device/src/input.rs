/*!
    Audio capture from a device.
*/

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use ffmpeg_next::frame;
use media_native::{Frame, alloc_audio};
use media_types::{AudioFormat, CancelToken, Error, Pts, Rational, Result};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use tracing::{info, warn};

use crate::device::device_error;
use crate::shared::{DEFAULT_BUFFER_SECONDS, Shared, whole_frames};
use crate::{AudioSpec, Device, Direction, negotiate};

const WAIT: Duration = Duration::from_millis(1);

/**
    A capturing input stream.

    The device callback queues interleaved samples in the negotiated
    format; the pipeline reads them as bytes or as audio frames. When the
    pipeline falls behind and the queue is full, the callback drops the
    newest samples and counts them, see [`AudioInput::dropped`].
*/
pub struct AudioInput {
    stream: cpal::Stream,
    consumer: HeapCons<u8>,
    spec: AudioSpec,
    format: AudioFormat,
    shared: Arc<Shared>,
    // samples per channel handed out as frames so far
    position: u64,
}

impl AudioInput {
    /**
        Open `device` for capture at exactly `spec`, with about one second
        of buffering.

        # Errors

        - Configuration error if the device is not an input or does not
          support `spec` exactly
        - Device error if the platform fails to build or start the stream
    */
    pub fn open(device: &Device, spec: AudioSpec) -> Result<Self> {
        Self::open_with_buffer(device, spec, DEFAULT_BUFFER_SECONDS)
    }

    /**
        Open `device` for capture, buffering up to `seconds` of audio.
    */
    pub fn open_with_buffer(device: &Device, spec: AudioSpec, seconds: f64) -> Result<Self> {
        if device.direction() != Direction::Input {
            return Err(Error::config(format!("{} is not an input device", device.name())));
        }
        let config = negotiate(&spec, &device.supported_configs()?)?;
        let format = spec.audio_format()?;
        let sample_format = spec.cpal_format()?;

        let (mut producer, consumer) = HeapRb::<u8>::new(spec.bytes_for(seconds)).split();
        let shared = Arc::new(Shared::default());

        let data_callback = {
            let shared = Arc::clone(&shared);
            move |data: &cpal::Data, _: &cpal::InputCallbackInfo| {
                let bytes = data.bytes();
                let pushed = producer.push_slice(bytes);
                if pushed < bytes.len() {
                    shared.add_dropped(bytes.len() - pushed);
                }
            }
        };
        let error_callback = {
            let shared = Arc::clone(&shared);
            move |error: cpal::StreamError| shared.set_error(error)
        };

        let stream = device
            .inner()
            .build_input_stream_raw(&config, sample_format, data_callback, error_callback, None)
            .map_err(device_error)?;
        stream.play().map_err(device_error)?;

        info!(device = device.name(), %spec, "opened audio input");
        Ok(Self {
            stream,
            consumer,
            spec,
            format,
            shared,
            position: 0,
        })
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    /**
        Time base of the timestamps of frames from [`AudioInput::read_frame`].
    */
    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.spec.sample_rate as i32)
    }

    /**
        Bytes captured and not read yet.
    */
    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }

    /**
        Bytes dropped because the queue was full.
    */
    pub fn dropped(&self) -> u64 {
        self.shared.dropped()
    }

    pub fn error(&self) -> Option<String> {
        self.shared.error()
    }

    /**
        Read as many whole sample frames as are available and fit in
        `out`, without waiting. Returns the number of bytes read.
    */
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let len = whole_frames(out.len().min(self.consumer.occupied_len()), self.spec.frame_bytes());
        self.consumer.pop_slice(&mut out[..len])
    }

    /**
        Wait for `samples` samples per channel and return them as one
        audio frame, stamped with its position in the capture.

        # Errors

        - Configuration error if `samples` is zero
        - [`Error::Cancelled`] once `cancel` is set
        - Device error if the platform reported a stream error
    */
    pub fn read_frame(&mut self, samples: usize, cancel: &CancelToken) -> Result<Frame> {
        if samples == 0 {
            return Err(Error::config("cannot read an empty frame"));
        }
        let len = samples * self.spec.frame_bytes();
        while self.consumer.occupied_len() < len {
            cancel.check()?;
            if let Some(error) = self.shared.error() {
                return Err(Error::device(error));
            }
            thread::sleep(WAIT);
        }

        let mut audio = frame::Audio::empty();
        alloc_audio(&mut audio, &self.format, samples)?;
        let read = self.consumer.pop_slice(&mut audio.data_mut(0)[..len]);
        if read < len {
            warn!(read, wanted = len, "short read from capture queue");
        }

        let mut frame = Frame::Audio(audio);
        frame.set_pts(Some(Pts(self.position as i64)));
        self.position += samples as u64;
        Ok(frame)
    }

    pub fn pause(&self) -> Result<()> {
        self.stream.pause().map_err(device_error)
    }

    pub fn resume(&self) -> Result<()> {
        self.stream.play().map_err(device_error)
    }
}

impl std::fmt::Debug for AudioInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioInput")
            .field("spec", &self.spec)
            .field("available", &self.available())
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}
