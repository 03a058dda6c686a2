/*!
    Encoding and muxing for the media crate ecosystem.

    This crate handles the output side of the media pipeline. It encodes
    frames, or takes already encoded packets, and writes them into
    container formats such as MP4, Matroska or WAV files.

    # Encoding

    ```ignore
    use media_native::Runtime;
    use media_sink::{ContainerFormat, StreamConfig, Writer, WriterConfig};
    use media_types::{CancelToken, CodecId};

    let _runtime = Runtime::start()?;
    let config = WriterConfig::new(ContainerFormat::Mp4)
        .with_stream(StreamConfig::audio(CodecId::Aac, format));
    let mut writer = Writer::create("tone.m4a", config)?;

    writer.encode(&CancelToken::new(), |_stream| {
        if generator.position() >= length {
            return Ok(None);
        }
        generator.next_frame().map(Some)
    })?;

    let summary = writer.finish()?;
    ```

    Producers are pulled in timestamp order across streams, so the output
    is interleaved without buffering whole streams. Audio encoders with a
    fixed frame size, see [`Writer::frame_size`], must be fed frames of
    exactly that many samples, except for the last one.

    # Remuxing

    [`remux`] copies selected streams of an open input into a new
    container without decoding them.

    # Finalization

    Always call [`Writer::finish`] to write the container trailer. Without
    it the duration may be unknown to players, seeking may not work, and
    some players will not open the file at all.
*/

pub use media_native::{Frame, Options, Packet};
pub use media_types::{CodecId, Error, Metadata, Result};

mod config;
mod remux;
mod writer;

pub use config::{ContainerFormat, StreamConfig, WriterConfig};
pub use remux::remux;
pub use writer::{StreamSummary, Writer, WriterState, WriterSummary};
