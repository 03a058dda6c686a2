/*!
    Per-stream decoder selection and codec opening.
*/

use ffmpeg_next::{codec, threading};
use media_native::{Frame, NativeResultExt, Packet, native_error};
use media_source::Input;
use media_types::{Error, MediaType, Rational, Result};
use tracing::debug;

use crate::{AudioDecoder, DecoderConfig, VideoDecoder};

/**
    Open a decoder for the native parameters of a stream.
*/
pub(crate) fn open_codec(
    parameters: codec::Parameters,
    config: &DecoderConfig,
) -> Result<codec::decoder::Opened> {
    let mut ctx = codec::context::Context::from_parameters(parameters).native()?;
    if config.threads > 0 {
        ctx.set_threading(threading::Config::count(config.threads));
    }

    let id = ctx.id();
    let codec = ffmpeg_next::decoder::find(id)
        .ok_or_else(|| native_error(ffmpeg_next::Error::DecoderNotFound))?;
    debug!(codec = codec.name(), threads = config.threads, "opening decoder");

    ctx.decoder()
        .open_as_with(codec, config.options.to_dictionary())
        .native()
}

/**
    Native parameters of a stream of an open input.
*/
pub(crate) fn stream_parameters(input: &Input, index: usize) -> Result<codec::Parameters> {
    input
        .as_native()
        .stream(index)
        .map(|s| s.parameters())
        .ok_or_else(|| Error::config(format!("stream {index} does not exist")))
}

/**
    Decoder for one stream of either kind.
*/
#[derive(Debug)]
#[non_exhaustive]
pub enum Decoder {
    Video(VideoDecoder),
    Audio(AudioDecoder),
}

impl Decoder {
    /**
        Open a decoder for stream `index` of `input`.

        # Errors

        Returns a configuration error if the stream does not exist or is
        neither audio nor video, and a native error if no decoder is
        available for its codec.
    */
    pub fn open(input: &Input, index: usize, config: &DecoderConfig) -> Result<Self> {
        let stream = input
            .stream(index)
            .ok_or_else(|| Error::config(format!("stream {index} does not exist")))?;
        match stream.media_type() {
            MediaType::Video => VideoDecoder::open(input, index, config).map(Self::Video),
            MediaType::Audio => AudioDecoder::open(input, index, config).map(Self::Audio),
            other => Err(Error::config(format!(
                "stream {index} is {other} and cannot be decoded"
            ))),
        }
    }

    pub fn stream(&self) -> usize {
        match self {
            Self::Video(d) => d.stream(),
            Self::Audio(d) => d.stream(),
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
        }
    }

    pub fn time_base(&self) -> Rational {
        match self {
            Self::Video(d) => d.time_base(),
            Self::Audio(d) => d.time_base(),
        }
    }

    /**
        Decode a packet, returning the frames it completed.
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<Frame>> {
        match self {
            Self::Video(d) => Ok(d.decode(packet)?.into_iter().map(Frame::Video).collect()),
            Self::Audio(d) => Ok(d.decode(packet)?.into_iter().map(Frame::Audio).collect()),
        }
    }

    /**
        Drain the frames still buffered in the decoder at end of stream.
    */
    pub fn flush(&mut self) -> Result<Vec<Frame>> {
        match self {
            Self::Video(d) => Ok(d.flush()?.into_iter().map(Frame::Video).collect()),
            Self::Audio(d) => Ok(d.flush()?.into_iter().map(Frame::Audio).collect()),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Video(d) => d.reset(),
            Self::Audio(d) => d.reset(),
        }
    }
}
