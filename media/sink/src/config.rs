/*!
    Writer configuration types.
*/

use media_native::Options;
use media_types::{
    AudioFormat, CodecId, Error, FrameFormat, Metadata, Rational, Result, VideoFormat,
};

/**
    Container format for output.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContainerFormat {
    /// MP4 container (most compatible).
    Mp4,
    /// Matroska container (most flexible).
    Mkv,
    /// MPEG transport stream.
    MpegTs,
    /// RIFF WAVE, for uncompressed audio.
    Wav,
    /// Any other muxer, by FFmpeg short name.
    Named(String),
}

impl ContainerFormat {
    /**
        Get the FFmpeg muxer name for this container.
    */
    pub fn ffmpeg_format_name(&self) -> &str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "matroska",
            Self::MpegTs => "mpegts",
            Self::Wav => "wav",
            Self::Named(name) => name,
        }
    }

    /**
        Get the typical file extension for this container, if it has one.
    */
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Mp4 => Some("mp4"),
            Self::Mkv => Some("mkv"),
            Self::MpegTs => Some("ts"),
            Self::Wav => Some("wav"),
            Self::Named(_) => None,
        }
    }
}

/**
    Encoder settings for one output stream.
*/
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub codec: CodecId,
    /// Format of the frames handed to the encoder.
    pub format: FrameFormat,
    /// Frame rate of a video stream. The encoder time base is its inverse.
    pub frame_rate: Option<Rational>,
    /// Target bit rate in bits per second, or the encoder default.
    pub bit_rate: Option<usize>,
    /// Private encoder options, e.g. `preset` for x264.
    pub options: Options,
    pub metadata: Vec<Metadata>,
}

impl StreamConfig {
    /**
        A video stream encoding frames of `format` at `frame_rate`.
    */
    pub fn video(codec: CodecId, format: VideoFormat, frame_rate: Rational) -> Self {
        Self {
            frame_rate: Some(frame_rate),
            ..Self::new(codec, FrameFormat::Video(format))
        }
    }

    /**
        An audio stream encoding frames of `format`. The encoder time base
        is one sample.
    */
    pub fn audio(codec: CodecId, format: AudioFormat) -> Self {
        Self::new(codec, FrameFormat::Audio(format))
    }

    fn new(codec: CodecId, format: FrameFormat) -> Self {
        Self {
            codec,
            format,
            frame_rate: None,
            bit_rate: None,
            options: Options::new(),
            metadata: Vec::new(),
        }
    }

    pub fn with_bit_rate(mut self, bit_rate: usize) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata::new(key, value));
        self
    }

    /**
        Time base of the frames handed to the encoder.
    */
    pub fn time_base(&self) -> Result<Rational> {
        match self.format {
            FrameFormat::Video(_) => match self.frame_rate {
                Some(rate) if rate.num > 0 && rate.den > 0 => Ok(Rational::new(rate.den, rate.num)),
                Some(rate) => Err(Error::config(format!("invalid frame rate {rate}"))),
                None => Err(Error::config("video stream has no frame rate")),
            },
            FrameFormat::Audio(a) => match i32::try_from(a.sample_rate) {
                Ok(rate) if rate > 0 => Ok(Rational::new(1, rate)),
                _ => Err(Error::config(format!("invalid sample rate {}", a.sample_rate))),
            },
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.codec.media_type() != self.format.media_type() {
            return Err(Error::config(format!(
                "codec {} cannot encode {} frames",
                self.codec,
                self.format.media_type()
            )));
        }
        if let FrameFormat::Video(v) = self.format {
            if v.width == 0 || v.height == 0 {
                return Err(Error::config(format!(
                    "invalid video size {}x{}",
                    v.width, v.height
                )));
            }
        }
        self.time_base().map(|_| ())
    }
}

/**
    Configuration for a [`Writer`](crate::Writer).
*/
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Container format, or `None` to guess it from the file name.
    pub format: Option<ContainerFormat>,
    /// Output streams, in stream index order.
    pub streams: Vec<StreamConfig>,
    /// Container metadata.
    pub metadata: Vec<Metadata>,
    /// Muxer options.
    pub options: Options,
    /// Enable "fast start" for MP4 (moves moov atom to beginning).
    pub fast_start: bool,
}

impl WriterConfig {
    /**
        Create a new writer configuration.
    */
    pub fn new(format: ContainerFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::guess()
        }
    }

    /**
        Create a configuration that picks the container from the file name.
    */
    pub fn guess() -> Self {
        Self {
            format: None,
            streams: Vec::new(),
            metadata: Vec::new(),
            options: Options::new(),
            fast_start: false,
        }
    }

    /**
        Add an output stream. Streams are numbered in the order they are added.
    */
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata::new(key, value));
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }

    /**
        Set fast start for MP4.
    */
    pub fn with_fast_start(mut self, enabled: bool) -> Self {
        self.fast_start = enabled;
        self
    }

    pub(crate) fn muxer_options(&self) -> Options {
        let mut options = self.options.clone();
        if self.fast_start && options.get("movflags").is_none() {
            options.insert("movflags", "+faststart");
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{ChannelLayout, PixelFormat, SampleFormat};

    fn audio() -> AudioFormat {
        AudioFormat::new(SampleFormat::F32p, ChannelLayout::Mono, 22050)
    }

    #[test]
    fn container_names() {
        assert_eq!(ContainerFormat::Mkv.ffmpeg_format_name(), "matroska");
        assert_eq!(ContainerFormat::Mp4.extension(), Some("mp4"));
        let named = ContainerFormat::Named("adts".into());
        assert_eq!(named.ffmpeg_format_name(), "adts");
        assert_eq!(named.extension(), None);
    }

    #[test]
    fn stream_time_bases() {
        let a = StreamConfig::audio(CodecId::Aac, audio());
        assert_eq!(a.time_base().unwrap(), Rational::new(1, 22050));

        let v = StreamConfig::video(
            CodecId::Mpeg4,
            VideoFormat::new(PixelFormat::Yuv420p, 320, 240),
            Rational::new(30000, 1001),
        );
        assert_eq!(v.time_base().unwrap(), Rational::new(1001, 30000));
    }

    #[test]
    fn invalid_streams_are_config_errors() {
        let wrong_kind = StreamConfig::audio(CodecId::H264, audio());
        assert!(matches!(wrong_kind.validate(), Err(Error::Config { .. })));

        let no_rate = StreamConfig {
            frame_rate: None,
            ..StreamConfig::video(
                CodecId::Mpeg4,
                VideoFormat::new(PixelFormat::Yuv420p, 320, 240),
                Rational::new(25, 1),
            )
        };
        assert!(matches!(no_rate.validate(), Err(Error::Config { .. })));

        let empty = StreamConfig::video(
            CodecId::Mpeg4,
            VideoFormat::new(PixelFormat::Yuv420p, 0, 240),
            Rational::new(25, 1),
        );
        assert!(matches!(empty.validate(), Err(Error::Config { .. })));

        let silent = StreamConfig::audio(
            CodecId::Aac,
            AudioFormat::new(SampleFormat::F32p, ChannelLayout::Mono, 0),
        );
        assert!(matches!(silent.validate(), Err(Error::Config { .. })));
        assert!(StreamConfig::audio(CodecId::Aac, audio()).validate().is_ok());
    }

    #[test]
    fn fast_start_sets_movflags() {
        let config = WriterConfig::new(ContainerFormat::Mp4).with_fast_start(true);
        assert_eq!(config.muxer_options().get("movflags"), Some("+faststart"));

        let explicit = WriterConfig::new(ContainerFormat::Mp4)
            .with_fast_start(true)
            .with_option("movflags", "+frag_keyframe");
        assert_eq!(explicit.muxer_options().get("movflags"), Some("+frag_keyframe"));
        assert!(WriterConfig::guess().muxer_options().is_empty());
    }
}
