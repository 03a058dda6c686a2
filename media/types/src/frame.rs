/*!
    Frame format descriptors.
*/

use std::fmt;

use serde::Serialize;

use crate::{ChannelLayout, MediaType, PixelFormat, SampleFormat};

/**
    Format of a decoded video frame.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VideoFormat {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

impl VideoFormat {
    pub const fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    /**
        Size in bytes of a tightly packed frame in this format.
    */
    pub const fn frame_size(self) -> usize {
        (self.width as usize * self.height as usize * self.format.bits_per_pixel() as usize)
            .div_ceil(8)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.format, self.width, self.height)
    }
}

/**
    Format of a decoded audio frame.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AudioFormat {
    pub format: SampleFormat,
    pub layout: ChannelLayout,
    pub sample_rate: u32,
}

impl AudioFormat {
    pub const fn new(format: SampleFormat, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            format,
            layout,
            sample_rate,
        }
    }

    pub const fn channels(self) -> u16 {
        self.layout.channels()
    }

    /**
        Number of bytes needed to hold `samples` samples of every channel.
    */
    pub const fn buffer_size(self, samples: usize) -> usize {
        samples * self.channels() as usize * self.format.bytes_per_sample()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}Hz", self.format, self.layout, self.sample_rate)
    }
}

/**
    Format of a decoded frame of either kind.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FrameFormat {
    Video(VideoFormat),
    Audio(AudioFormat),
}

impl FrameFormat {
    pub const fn media_type(self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
        }
    }

    pub const fn as_video(self) -> Option<VideoFormat> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }

    pub const fn as_audio(self) -> Option<AudioFormat> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }
}

impl From<VideoFormat> for FrameFormat {
    fn from(format: VideoFormat) -> Self {
        Self::Video(format)
    }
}

impl From<AudioFormat> for FrameFormat {
    fn from(format: AudioFormat) -> Self {
        Self::Audio(format)
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video(v) => fmt::Display::fmt(v, f),
            Self::Audio(a) => fmt::Display::fmt(a, f),
        }
    }
}
