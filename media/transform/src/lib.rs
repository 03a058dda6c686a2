/*!
    Frame transformation for the media crate ecosystem.

    This crate converts decoded frames into a fixed target format:
    - **Video**: scaling and pixel format conversion through swscale
    - **Audio**: resampling, channel layout and sample format conversion
      through swresample

    Decoders output frames in whatever format the codec specifies; a
    [`Rescaler`] turns them into the format a consumer asked for.

    # Example

    ```ignore
    use media_transform::Rescaler;
    use media_types::{PixelFormat, VideoFormat};

    let mut rescaler = Rescaler::video(VideoFormat::new(PixelFormat::Yuv420p, 640, 480))?;
    for frame in decoded_frames {
        if let Some(scaled) = rescaler.rescale(Some(&frame))? {
            // scaled is 640x480 yuv420p
        }
    }
    ```

    # Lazy Initialization

    The native context is built on first use, since the source format is
    only known once a frame arrives. If the source format changes
    mid-stream, the context is rebuilt. Frames already in the target
    format are returned as-is unless the rescaler is forced.

    # Test Signals

    [`SineGenerator`] produces a continuous tone in any audio format,
    useful for feeding encoders without a source file.
*/

pub use media_native::Frame;
pub use media_types::{AudioFormat, Error, FrameFormat, Result, VideoFormat};

mod config;
mod generator;
mod rescaler;

pub use config::{RescalerConfig, ScalingAlgorithm};
pub use generator::SineGenerator;
pub use rescaler::Rescaler;
