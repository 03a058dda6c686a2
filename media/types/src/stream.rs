/*!
    Stream and container information.
*/

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::{
    AudioFormat, ChannelLayout, CodecId, Disposition, Error, FrameFormat, MediaDuration,
    MediaType, Metadata, PixelFormat, Pts, Rational, Result, SampleFormat, VideoFormat,
};

/**
    Codec parameters of a stream, or of an encoding target.

    Values the container leaves unset are `None` (or zero for counts), so
    validation happens when a concrete format is requested through
    [`Parameters::video_format`] or [`Parameters::audio_format`].
*/
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Parameters {
    pub media_type: MediaType,
    /// Codec, if it is one of the known identifiers.
    pub codec: Option<CodecId>,
    /// Native codec name, always set when the codec is known to FFmpeg.
    pub codec_name: String,
    pub pixel_format: Option<PixelFormat>,
    pub width: u32,
    pub height: u32,
    pub sample_format: Option<SampleFormat>,
    pub channel_layout: Option<ChannelLayout>,
    pub channels: u16,
    pub sample_rate: u32,
    /// Bits per second, zero if unknown.
    pub bit_rate: i64,
    pub frame_rate: Option<Rational>,
}

impl Parameters {
    /**
        Parameters describing video frames of the given format.
    */
    pub fn video(format: VideoFormat) -> Self {
        Self {
            media_type: MediaType::Video,
            pixel_format: Some(format.format),
            width: format.width,
            height: format.height,
            ..Self::default()
        }
    }

    /**
        Parameters describing audio frames of the given format.
    */
    pub fn audio(format: AudioFormat) -> Self {
        Self {
            media_type: MediaType::Audio,
            sample_format: Some(format.format),
            channel_layout: Some(format.layout),
            channels: format.channels(),
            sample_rate: format.sample_rate,
            ..Self::default()
        }
    }

    /**
        Returns the video frame format these parameters describe.

        # Errors

        Returns a configuration error if the kind is not video, the pixel
        format is unspecified or a dimension is zero.
    */
    pub fn video_format(&self) -> Result<VideoFormat> {
        if self.media_type != MediaType::Video {
            return Err(Error::config(format!(
                "expected video parameters, got {}",
                self.media_type
            )));
        }
        let format = self
            .pixel_format
            .ok_or_else(|| Error::config("pixel format is unspecified"))?;
        if self.width == 0 || self.height == 0 {
            return Err(Error::config(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        Ok(VideoFormat::new(format, self.width, self.height))
    }

    /**
        Returns the audio frame format these parameters describe.

        A missing channel layout is derived from the channel count.

        # Errors

        Returns a configuration error if the kind is not audio, the sample
        format is unspecified, the channel layout cannot be determined or
        the sample rate is zero.
    */
    pub fn audio_format(&self) -> Result<AudioFormat> {
        if self.media_type != MediaType::Audio {
            return Err(Error::config(format!(
                "expected audio parameters, got {}",
                self.media_type
            )));
        }
        let format = self
            .sample_format
            .ok_or_else(|| Error::config("sample format is unspecified"))?;
        let layout = self
            .channel_layout
            .or_else(|| ChannelLayout::from_channels(self.channels))
            .ok_or_else(|| {
                Error::config(format!("no channel layout for {} channels", self.channels))
            })?;
        if self.channels != 0 && self.channels != layout.channels() {
            return Err(Error::config(format!(
                "channel layout {layout} does not have {} channels",
                self.channels
            )));
        }
        if self.sample_rate == 0 {
            return Err(Error::config("sample rate is unspecified"));
        }
        Ok(AudioFormat::new(format, layout, self.sample_rate))
    }

    /**
        Returns the frame format for audio or video parameters.
    */
    pub fn frame_format(&self) -> Result<FrameFormat> {
        match self.media_type {
            MediaType::Video => self.video_format().map(FrameFormat::Video),
            MediaType::Audio => self.audio_format().map(FrameFormat::Audio),
            other => Err(Error::config(format!(
                "{other} streams have no frame format"
            ))),
        }
    }
}

impl From<FrameFormat> for Parameters {
    fn from(format: FrameFormat) -> Self {
        match format {
            FrameFormat::Video(v) => Self::video(v),
            FrameFormat::Audio(a) => Self::audio(a),
        }
    }
}

/**
    Information about one stream of an open container.
*/
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreamInfo {
    pub index: usize,
    pub time_base: Rational,
    pub parameters: Parameters,
    pub start_time: Option<Pts>,
    pub duration: Option<MediaDuration>,
    /// Number of frames, if the container records it.
    pub frames: Option<u64>,
    pub disposition: Disposition,
    pub metadata: Vec<Metadata>,
}

impl StreamInfo {
    pub fn media_type(&self) -> MediaType {
        self.parameters.media_type
    }

    /**
        Duration of the stream as wall time, if known.
    */
    pub fn duration_time(&self) -> Option<Duration> {
        self.duration.map(|d| d.to_duration(self.time_base))
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        find_metadata(&self.metadata, key)
    }
}

/**
    Information about an open container.
*/
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaInfo {
    pub url: String,
    /// Short demuxer name, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub format_name: String,
    pub format_long_name: String,
    #[serde(serialize_with = "seconds")]
    pub duration: Option<Duration>,
    pub bit_rate: i64,
    pub metadata: Vec<Metadata>,
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    /**
        Streams of the given kind, in container order.
    */
    pub fn streams_of(&self, kind: MediaType) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(move |s| s.media_type() == kind)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        find_metadata(&self.metadata, key)
    }
}

fn find_metadata<'a>(metadata: &'a [Metadata], key: &str) -> Option<&'a str> {
    metadata
        .iter()
        .find(|m| m.key.eq_ignore_ascii_case(key))
        .map(|m| m.value.as_str())
}

fn seconds<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_params() -> Parameters {
        Parameters {
            media_type: MediaType::Audio,
            codec: Some(CodecId::Aac),
            codec_name: "aac".into(),
            sample_format: Some(SampleFormat::F32p),
            channels: 1,
            sample_rate: 22050,
            ..Parameters::default()
        }
    }

    #[test]
    fn video_parameters_round_trip_format() {
        let format = VideoFormat::new(PixelFormat::Yuv420p, 640, 480);
        let params = Parameters::video(format);
        assert_eq!(params.video_format().unwrap(), format);
        assert_eq!(params.frame_format().unwrap(), FrameFormat::Video(format));
    }

    #[test]
    fn audio_layout_derived_from_channels() {
        let format = audio_params().audio_format().unwrap();
        assert_eq!(format.layout, ChannelLayout::Mono);
        assert_eq!(format.sample_rate, 22050);
    }

    #[test]
    fn wrong_kind_is_config_error() {
        let err = audio_params().video_format().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        let subtitle = Parameters {
            media_type: MediaType::Subtitle,
            ..Parameters::default()
        };
        assert!(matches!(subtitle.frame_format(), Err(Error::Config { .. })));
    }

    #[test]
    fn unspecified_formats_are_config_errors() {
        let mut video = Parameters::video(VideoFormat::new(PixelFormat::Rgb24, 2, 2));
        video.pixel_format = None;
        assert!(matches!(video.video_format(), Err(Error::Config { .. })));

        let mut audio = audio_params();
        audio.sample_format = None;
        assert!(matches!(audio.audio_format(), Err(Error::Config { .. })));

        let mut audio = audio_params();
        audio.sample_rate = 0;
        assert!(audio.audio_format().is_err());

        let mut audio = audio_params();
        audio.channels = 0;
        assert!(audio.audio_format().is_err());
    }

    #[test]
    fn mismatched_layout_is_config_error() {
        let mut audio = audio_params();
        audio.channel_layout = Some(ChannelLayout::Stereo);
        assert!(matches!(audio.audio_format(), Err(Error::Config { .. })));
    }

    #[test]
    fn media_info_serializes_duration_as_seconds() {
        let info = MediaInfo {
            url: "a.m4a".into(),
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".into(),
            format_long_name: "QuickTime / MOV".into(),
            duration: Some(Duration::from_millis(1500)),
            bit_rate: 0,
            metadata: vec![Metadata::new("encoder", "Lavf")],
            streams: vec![StreamInfo {
                index: 0,
                time_base: Rational::new(1, 22050),
                parameters: audio_params(),
                start_time: Some(Pts(0)),
                duration: Some(MediaDuration(33075)),
                frames: None,
                disposition: Disposition::DEFAULT,
                metadata: Vec::new(),
            }],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["duration"], 1.5);
        assert_eq!(json["streams"][0]["parameters"]["sample_format"], "fltp");
        assert_eq!(json["streams"][0]["disposition"][0], "default");
        assert_eq!(info.metadata_value("ENCODER"), Some("Lavf"));
        assert_eq!(info.streams_of(MediaType::Audio).count(), 1);
        assert_eq!(
            info.streams[0].duration_time(),
            Some(Duration::from_millis(1500))
        );
    }
}
