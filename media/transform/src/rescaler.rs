/*!
    Conversion of decoded frames into a fixed target format.
*/

use ffmpeg_next::{format, frame, software::scaling};
use media_native::{
    Frame, NativeLayout, NativeResultExt, Resampler, alloc_audio, audio_frame_format, convert,
    copy_frame_props,
};
use media_types::{AudioFormat, Error, FrameFormat, Parameters, Result, VideoFormat};
use tracing::{debug, trace};

use crate::config::RescalerConfig;

// initial destination capacity in samples per channel
const AUDIO_CAPACITY: usize = 1024;

enum Context {
    Video {
        ctx: scaling::Context,
        source: (format::Pixel, u32, u32),
    },
    Audio(Resampler),
}

/**
    Frame rescaler with a target format fixed at construction.

    Owns one native conversion context and one destination frame. The
    context is built on the first frame and rebuilt whenever the source
    format differs from the last one observed. The destination frame is
    allocated at construction and reused for every conversion, so a
    returned frame is only valid until the next call.
*/
pub struct Rescaler {
    target: FrameFormat,
    config: RescalerConfig,
    target_pixel: Option<format::Pixel>,
    dest: Frame,
    capacity: usize,
    context: Option<Context>,
    builds: u64,
}

impl Rescaler {
    /**
        Create a rescaler targeting the frame format described by `params`.

        With `force` set, frames already in the target format are still
        converted into the destination frame.

        # Errors

        Returns a configuration error if the parameters are neither audio
        nor video, the format is unspecified, or the audio channel layout
        fails FFmpeg's validity check.
    */
    pub fn new(params: &Parameters, force: bool) -> Result<Self> {
        let config = RescalerConfig {
            force,
            ..RescalerConfig::default()
        };
        Self::with_config(params, config)
    }

    /**
        Create a rescaler with an explicit configuration.
    */
    pub fn with_config(params: &Parameters, config: RescalerConfig) -> Result<Self> {
        match params.frame_format()? {
            FrameFormat::Video(v) => Self::new_video(v, config),
            FrameFormat::Audio(a) => Self::new_audio(a, config),
        }
    }

    /**
        Create a video rescaler with the default configuration.
    */
    pub fn video(format: VideoFormat) -> Result<Self> {
        Self::with_config(&Parameters::video(format), RescalerConfig::default())
    }

    /**
        Create an audio rescaler with the default configuration.
    */
    pub fn audio(format: AudioFormat) -> Result<Self> {
        Self::with_config(&Parameters::audio(format), RescalerConfig::default())
    }

    fn new_video(target: VideoFormat, config: RescalerConfig) -> Result<Self> {
        let pixel = convert::pixel_to_native(target.format)?;
        let dest = frame::Video::new(pixel, target.width, target.height);
        debug!(to = %target, "created video rescaler");
        Ok(Self {
            target: FrameFormat::Video(target),
            config,
            target_pixel: Some(pixel),
            dest: Frame::Video(dest),
            capacity: 0,
            context: None,
            builds: 0,
        })
    }

    fn new_audio(target: AudioFormat, config: RescalerConfig) -> Result<Self> {
        let layout = NativeLayout::from_layout(target.layout)?;
        if !layout.is_valid() {
            return Err(Error::config(format!(
                "channel layout {} is not valid",
                target.layout
            )));
        }
        let mut dest = frame::Audio::empty();
        alloc_audio(&mut dest, &target, AUDIO_CAPACITY)?;
        debug!(to = %target, "created audio rescaler");
        Ok(Self {
            target: FrameFormat::Audio(target),
            config,
            target_pixel: None,
            dest: Frame::Audio(dest),
            capacity: AUDIO_CAPACITY,
            context: None,
            builds: 0,
        })
    }

    pub fn target(&self) -> FrameFormat {
        self.target
    }

    pub fn config(&self) -> RescalerConfig {
        self.config
    }

    /**
        Number of times the native context has been (re)built.
    */
    pub fn context_builds(&self) -> u64 {
        self.builds
    }

    /**
        Convert a frame into the target format.

        Returns `None` for a `None` source, since there is nothing to flush.
        A source already in the target format is returned as-is unless the
        rescaler is forced. Otherwise the result is the destination frame,
        carrying the source frame's timestamps and properties.

        # Errors

        - Configuration error if the source kind differs from the target's
        - Native error if the conversion context cannot be built or fails
    */
    pub fn rescale<'a>(&'a mut self, source: Option<&'a Frame>) -> Result<Option<&'a Frame>> {
        let Some(source) = source else {
            return Ok(None);
        };

        match (source, self.target) {
            (Frame::Video(v), FrameFormat::Video(target)) => {
                if !self.config.force && self.matches_video(v, target) {
                    return Ok(Some(source));
                }
                self.scale(v, target)?;
            }
            (Frame::Audio(a), FrameFormat::Audio(target)) => {
                if !self.config.force && audio_frame_format(a).is_ok_and(|f| f == target) {
                    return Ok(Some(source));
                }
                self.resample(a, target)?;
            }
            _ => {
                return Err(Error::config(format!(
                    "cannot rescale a {} frame to {}",
                    source.media_type(),
                    self.target
                )));
            }
        }

        copy_frame_props(&mut self.dest, source)?;
        Ok(Some(&self.dest))
    }

    fn matches_video(&self, frame: &frame::Video, target: VideoFormat) -> bool {
        Some(frame.format()) == self.target_pixel
            && frame.width() == target.width
            && frame.height() == target.height
    }

    fn scale(&mut self, source: &frame::Video, target: VideoFormat) -> Result<()> {
        let key = (source.format(), source.width(), source.height());
        let stale = match &self.context {
            Some(Context::Video { source: built, .. }) => *built != key,
            _ => true,
        };

        if stale {
            let pixel = self
                .target_pixel
                .ok_or_else(|| Error::config("video rescaler has no target pixel format"))?;
            let ctx = scaling::Context::get(
                key.0,
                key.1,
                key.2,
                pixel,
                target.width,
                target.height,
                self.config.algorithm.flags(),
            )
            .native()?;
            self.context = Some(Context::Video { ctx, source: key });
            self.builds += 1;
            debug!(
                source = convert::pixel_name(key.0),
                width = key.1,
                height = key.2,
                to = %target,
                builds = self.builds,
                "built scaling context"
            );
        }

        if let (Some(Context::Video { ctx, .. }), Some(dest)) =
            (self.context.as_mut(), self.dest.as_video_mut())
        {
            ctx.run(source, dest).native()?;
        }
        Ok(())
    }

    fn resample(&mut self, source: &frame::Audio, target: AudioFormat) -> Result<()> {
        let stale = match &self.context {
            Some(Context::Audio(resampler)) => !resampler.accepts(source),
            _ => true,
        };

        if stale {
            let resampler = Resampler::new(source, &target)?;
            self.context = Some(Context::Audio(resampler));
            self.builds += 1;
            debug!(
                source_rate = source.rate(),
                source_samples = source.samples(),
                to = %target,
                builds = self.builds,
                "built resampling context"
            );
        }

        if let (Some(Context::Audio(resampler)), Some(dest)) =
            (self.context.as_mut(), self.dest.as_audio_mut())
        {
            let needed = resampler.output_samples(source.samples());
            if needed > self.capacity {
                alloc_audio(dest, &target, needed)?;
                trace!(from = self.capacity, to = needed, "grew resampling buffer");
                self.capacity = needed;
            }
            resampler.convert(source, dest, self.capacity)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Rescaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rescaler")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("builds", &self.builds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_next::format::Pixel;
    use media_types::{ChannelLayout, MediaType, PixelFormat, Pts, SampleFormat};

    fn vga() -> VideoFormat {
        VideoFormat::new(PixelFormat::Yuv420p, 640, 480)
    }

    fn audio_frame(format: AudioFormat, samples: usize) -> Frame {
        let mut frame = frame::Audio::empty();
        alloc_audio(&mut frame, &format, samples).unwrap();
        Frame::Audio(frame)
    }

    #[test]
    fn scales_to_target_and_reuses_context() {
        let mut rescaler = Rescaler::video(vga()).unwrap();
        assert_eq!(rescaler.context_builds(), 0);

        let mut source = Frame::from(frame::Video::new(Pixel::RGB24, 1280, 720));
        source.set_pts(Some(Pts(42)));

        for _ in 0..3 {
            let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
            assert_eq!(out.format().unwrap(), FrameFormat::Video(vga()));
            assert_eq!(out.pts(), Some(Pts(42)));
        }
        assert_eq!(rescaler.context_builds(), 1);
    }

    #[test]
    fn source_change_rebuilds_context() {
        let mut rescaler = Rescaler::video(vga()).unwrap();
        let hd = Frame::from(frame::Video::new(Pixel::RGB24, 1280, 720));
        let small = Frame::from(frame::Video::new(Pixel::RGB24, 320, 240));

        rescaler.rescale(Some(&hd)).unwrap();
        rescaler.rescale(Some(&small)).unwrap();
        rescaler.rescale(Some(&small)).unwrap();
        assert_eq!(rescaler.context_builds(), 2);
    }

    #[test]
    fn matching_source_is_returned_as_is() {
        let mut rescaler = Rescaler::video(vga()).unwrap();
        let source = Frame::from(frame::Video::new(Pixel::YUV420P, 640, 480));
        let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
        assert!(std::ptr::eq(out, &source));
        assert_eq!(rescaler.context_builds(), 0);
    }

    #[test]
    fn forced_rescaler_always_converts() {
        let config = RescalerConfig::new().forced();
        let mut rescaler = Rescaler::with_config(&Parameters::video(vga()), config).unwrap();
        let source = Frame::from(frame::Video::new(Pixel::YUV420P, 640, 480));
        let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
        assert!(!std::ptr::eq(out, &source));
        assert_eq!(out.format().unwrap(), FrameFormat::Video(vga()));
        assert_eq!(rescaler.context_builds(), 1);
    }

    #[test]
    fn no_source_is_no_result() {
        let mut rescaler = Rescaler::video(vga()).unwrap();
        assert!(rescaler.rescale(None).unwrap().is_none());
        assert_eq!(rescaler.context_builds(), 0);
    }

    #[test]
    fn kind_mismatch_is_config_error() {
        let mut rescaler = Rescaler::video(vga()).unwrap();
        let source = audio_frame(
            AudioFormat::new(SampleFormat::S16, ChannelLayout::Mono, 8000),
            64,
        );
        assert!(matches!(
            rescaler.rescale(Some(&source)),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn construction_validates_parameters() {
        let unknown = Parameters::default();
        assert!(matches!(
            Rescaler::new(&unknown, false),
            Err(Error::Config { .. })
        ));

        let mut no_pixel = Parameters::video(vga());
        no_pixel.pixel_format = None;
        assert!(matches!(
            Rescaler::new(&no_pixel, false),
            Err(Error::Config { .. })
        ));

        let mut no_format = Parameters::audio(AudioFormat::new(
            SampleFormat::F32p,
            ChannelLayout::Mono,
            22050,
        ));
        no_format.sample_format = None;
        assert!(matches!(
            Rescaler::new(&no_format, false),
            Err(Error::Config { .. })
        ));

        let mut subtitle = Parameters::default();
        subtitle.media_type = MediaType::Subtitle;
        assert!(Rescaler::new(&subtitle, false).is_err());
    }

    #[test]
    fn resamples_to_target() {
        let target = AudioFormat::new(SampleFormat::F32p, ChannelLayout::Mono, 22050);
        let mut rescaler = Rescaler::audio(target).unwrap();
        let mut source = audio_frame(
            AudioFormat::new(SampleFormat::S16, ChannelLayout::Stereo, 48000),
            960,
        );
        source.set_pts(Some(Pts(960)));

        let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
        assert_eq!(out.format().unwrap(), FrameFormat::Audio(target));
        assert_eq!(out.pts(), Some(Pts(960)));
        assert!(out.samples() <= 960);

        rescaler.rescale(Some(&source)).unwrap();
        assert_eq!(rescaler.context_builds(), 1);
    }

    #[test]
    fn large_audio_frames_grow_the_destination() {
        let target = AudioFormat::new(SampleFormat::F32p, ChannelLayout::Mono, 22050);
        let mut rescaler = Rescaler::audio(target).unwrap();
        let source = audio_frame(
            AudioFormat::new(SampleFormat::F32, ChannelLayout::Mono, 48000),
            8192,
        );
        let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
        assert!(out.samples() > AUDIO_CAPACITY);
        assert_eq!(rescaler.context_builds(), 1);
    }

    #[test]
    fn matching_audio_is_returned_as_is() {
        let target = AudioFormat::new(SampleFormat::S16, ChannelLayout::Stereo, 44100);
        let mut rescaler = Rescaler::audio(target).unwrap();
        let source = audio_frame(target, 512);
        let out = rescaler.rescale(Some(&source)).unwrap().unwrap();
        assert!(std::ptr::eq(out, &source));
        assert_eq!(rescaler.context_builds(), 0);
    }
}
