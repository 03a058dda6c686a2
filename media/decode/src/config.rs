/*!
    Decoder configuration types.
*/

use media_native::Options;
use media_transform::ScalingAlgorithm;

/**
    Configuration for stream decoders.
*/
#[derive(Clone, Debug, Default)]
pub struct DecoderConfig {
    /// Number of decoding threads, zero lets FFmpeg decide.
    pub threads: usize,
    /// Options passed to the codec when it is opened.
    pub options: Options,
    /// Scaling algorithm for streams decoded to a different video format.
    pub scaling: ScalingAlgorithm,
}

impl DecoderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn with_scaling(mut self, scaling: ScalingAlgorithm) -> Self {
        self.scaling = scaling;
        self
    }
}

static_assertions::assert_impl_all!(DecoderConfig: Send, Sync);
