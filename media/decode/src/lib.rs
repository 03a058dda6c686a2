/*!
    Media decoding for the media crate ecosystem.

    This crate turns packets from an [`Input`] into decoded frames.

    - [`VideoDecoder`] and [`AudioDecoder`] decode the packets of a single
      stream, one send/receive round per packet
    - [`Decoder`] picks the right one for a stream
    - [`MediaDecoder`] runs a whole input: a selector chooses which streams
      to decode and in what format, and the decoded (and optionally
      rescaled) frames are handed to a callback

    # Example

    ```ignore
    use media_decode::{MediaDecoder, Target};
    use media_types::{CancelToken, Flow, FrameFormat, MediaType, PixelFormat, VideoFormat};

    let mut input = media_source::open("video.mp4", None, &Default::default())?;
    let rgb = FrameFormat::Video(VideoFormat::new(PixelFormat::Rgb24, 320, 240));
    let mut decoder = MediaDecoder::new(&input, |stream| {
        (stream.media_type() == MediaType::Video).then_some(Target::Format(rgb))
    })?;

    decoder.decode(&mut input, &CancelToken::new(), |stream, frame| {
        match frame {
            Some(frame) => { /* 320x240 rgb24 */ }
            None => { /* stream flushed */ }
        }
        Ok(Flow::Continue)
    })?;
    ```
*/

pub use media_native::{Frame, Packet};
pub use media_source::{DemuxEvent, Input};
pub use media_types::{Error, Result};

mod audio;
mod config;
mod decoder;
mod pipeline;
mod video;

pub use audio::AudioDecoder;
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use pipeline::{MediaDecoder, Target};
pub use video::VideoDecoder;
