/*!
    Rescaler configuration types.
*/

use ffmpeg_next::software::scaling;

/**
    Scaling algorithm used for video conversion.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalingAlgorithm {
    /// Nearest neighbor, fastest
    #[default]
    Point,
    FastBilinear,
    Bilinear,
    Bicubic,
    Area,
    /// Slowest, best for downscaling
    Lanczos,
}

impl ScalingAlgorithm {
    pub(crate) fn flags(self) -> scaling::Flags {
        match self {
            Self::Point => scaling::Flags::POINT,
            Self::FastBilinear => scaling::Flags::FAST_BILINEAR,
            Self::Bilinear => scaling::Flags::BILINEAR,
            Self::Bicubic => scaling::Flags::BICUBIC,
            Self::Area => scaling::Flags::AREA,
            Self::Lanczos => scaling::Flags::LANCZOS,
        }
    }
}

/**
    Configuration for a [`crate::Rescaler`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RescalerConfig {
    /// Convert even when the source already matches the target.
    pub force: bool,
    /// Algorithm for video scaling; ignored for audio.
    pub algorithm: ScalingAlgorithm,
}

impl RescalerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

static_assertions::assert_impl_all!(RescalerConfig: Send, Sync, Copy);
