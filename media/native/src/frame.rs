/*!
    Native decoded frames.
*/

use ffmpeg_next::frame;
use media_types::{FrameFormat, MediaType, Pts, Result};

use crate::params::{audio_frame_format, video_frame_format};

/**
    A decoded frame of either kind.

    Frames stay in native memory; the pipeline hands them between decoder,
    rescaler and encoder without copying.
*/
pub enum Frame {
    Video(frame::Video),
    Audio(frame::Audio),
}

impl Frame {
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
        }
    }

    /**
        Format descriptor of this frame.

        # Errors

        Returns a configuration error if the native format has no
        `media-types` counterpart.
    */
    pub fn format(&self) -> Result<FrameFormat> {
        match self {
            Self::Video(v) => video_frame_format(v).map(FrameFormat::Video),
            Self::Audio(a) => audio_frame_format(a).map(FrameFormat::Audio),
        }
    }

    pub fn pts(&self) -> Option<Pts> {
        let pts = match self {
            Self::Video(v) => v.pts(),
            Self::Audio(a) => a.pts(),
        };
        pts.map(Pts)
    }

    pub fn set_pts(&mut self, pts: Option<Pts>) {
        let pts = pts.map(|p| p.0);
        match self {
            Self::Video(v) => v.set_pts(pts),
            Self::Audio(a) => a.set_pts(pts),
        }
    }

    /**
        Number of samples per channel, zero for video frames.
    */
    pub fn samples(&self) -> usize {
        match self {
            Self::Video(_) => 0,
            Self::Audio(a) => a.samples(),
        }
    }

    pub fn as_video(&self) -> Option<&frame::Video> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }

    pub fn as_audio(&self) -> Option<&frame::Audio> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }

    pub fn as_video_mut(&mut self) -> Option<&mut frame::Video> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }

    pub fn as_audio_mut(&mut self) -> Option<&mut frame::Audio> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }
}

impl From<frame::Video> for Frame {
    fn from(frame: frame::Video) -> Self {
        Self::Video(frame)
    }
}

impl From<frame::Audio> for Frame {
    fn from(frame: frame::Audio) -> Self {
        Self::Audio(frame)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("media_type", &self.media_type())
            .field("format", &self.format().ok())
            .field("pts", &self.pts())
            .finish()
    }
}

static_assertions::assert_impl_all!(Frame: Send);
