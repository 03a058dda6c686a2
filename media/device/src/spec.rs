/*!
    Requested device formats and their negotiation.
*/

use std::fmt;

use cpal::{BufferSize, SampleRate, StreamConfig, SupportedBufferSize, SupportedStreamConfigRange};
use media_types::{AudioFormat, ChannelLayout, Error, Result, SampleFormat};

/**
    The exact format a device stream must run at.

    Device samples are always interleaved, so the sample format must be
    a packed one.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub format: SampleFormat,
    pub channels: u16,
    /// Frames per device callback, or the platform default.
    pub buffer_frames: Option<u32>,
}

impl AudioSpec {
    pub const fn new(sample_rate: u32, format: SampleFormat, channels: u16) -> Self {
        Self {
            sample_rate,
            format,
            channels,
            buffer_frames: None,
        }
    }

    /**
        Request a fixed number of frames per device callback.
    */
    pub const fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_frames = Some(frames);
        self
    }

    /**
        The spec matching frames of `format`.

        # Errors

        Configuration error if the format is planar.
    */
    pub fn from_format(format: &AudioFormat) -> Result<Self> {
        let spec = Self::new(format.sample_rate, format.format, format.channels());
        spec.validate()?;
        Ok(spec)
    }

    /**
        The frame format a device stream with this spec exchanges.
    */
    pub fn audio_format(&self) -> Result<AudioFormat> {
        let layout = ChannelLayout::from_channels(self.channels).ok_or_else(|| {
            Error::config(format!("no channel layout has {} channels", self.channels))
        })?;
        Ok(AudioFormat::new(self.format, layout, self.sample_rate))
    }

    /**
        Bytes of one sample of every channel.
    */
    pub fn frame_bytes(&self) -> usize {
        self.format.bytes_per_sample() * usize::from(self.channels)
    }

    /**
        Bytes needed to hold `seconds` of audio.
    */
    pub(crate) fn bytes_for(&self, seconds: f64) -> usize {
        let frames = (f64::from(self.sample_rate) * seconds).ceil() as usize;
        frames.max(1) * self.frame_bytes()
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::config("device sample rate is zero"));
        }
        if self.channels == 0 {
            return Err(Error::config("device channel count is zero"));
        }
        if self.format.is_planar() {
            return Err(Error::config(format!(
                "devices exchange interleaved samples, not {}",
                self.format
            )));
        }
        if self.buffer_frames == Some(0) {
            return Err(Error::config("device buffer size is zero"));
        }
        Ok(())
    }

    pub(crate) fn cpal_format(&self) -> Result<cpal::SampleFormat> {
        to_cpal(self.format)
            .ok_or_else(|| Error::config(format!("no device sample format for {}", self.format)))
    }
}

impl fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz {} {} channel(s)",
            self.sample_rate, self.format, self.channels
        )?;
        if let Some(frames) = self.buffer_frames {
            write!(f, " in {frames} frame buffers")?;
        }
        Ok(())
    }
}

pub(crate) fn to_cpal(format: SampleFormat) -> Option<cpal::SampleFormat> {
    Some(match format {
        SampleFormat::U8 => cpal::SampleFormat::U8,
        SampleFormat::S16 => cpal::SampleFormat::I16,
        SampleFormat::S32 => cpal::SampleFormat::I32,
        SampleFormat::S64 => cpal::SampleFormat::I64,
        SampleFormat::F32 => cpal::SampleFormat::F32,
        SampleFormat::F64 => cpal::SampleFormat::F64,
        _ => return None,
    })
}

pub(crate) fn from_cpal(format: cpal::SampleFormat) -> Option<SampleFormat> {
    Some(match format {
        cpal::SampleFormat::U8 => SampleFormat::U8,
        cpal::SampleFormat::I16 => SampleFormat::S16,
        cpal::SampleFormat::I32 => SampleFormat::S32,
        cpal::SampleFormat::I64 => SampleFormat::S64,
        cpal::SampleFormat::F32 => SampleFormat::F32,
        cpal::SampleFormat::F64 => SampleFormat::F64,
        _ => return None,
    })
}

/**
    Find the stream configuration that runs exactly at `spec` among the
    ranges a device supports.

    # Errors

    Configuration error if the spec is invalid, or no range supports its
    sample rate, format and channel count, or its buffer size.
*/
pub fn negotiate(spec: &AudioSpec, supported: &[SupportedStreamConfigRange]) -> Result<StreamConfig> {
    spec.validate()?;
    let format = spec.cpal_format()?;
    let rate = SampleRate(spec.sample_rate);

    let mut candidates = supported
        .iter()
        .filter(|r| {
            r.channels() == spec.channels
                && r.sample_format() == format
                && r.min_sample_rate() <= rate
                && rate <= r.max_sample_rate()
        })
        .peekable();
    if candidates.peek().is_none() {
        return Err(Error::config(format!("device does not support {spec}")));
    }

    let buffer_size = match spec.buffer_frames {
        None => BufferSize::Default,
        Some(frames) => {
            let fits = candidates.any(|r| match r.buffer_size() {
                SupportedBufferSize::Range { min, max } => (*min..=*max).contains(&frames),
                SupportedBufferSize::Unknown => true,
            });
            if !fits {
                return Err(Error::config(format!(
                    "device does not support {spec}: buffer size out of range"
                )));
            }
            BufferSize::Fixed(frames)
        }
    };

    Ok(StreamConfig {
        channels: spec.channels,
        sample_rate: rate,
        buffer_size,
    })
}
