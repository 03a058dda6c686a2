/*!
    Video decoder implementation.
*/

use ffmpeg_next::{codec::decoder, frame};
use media_native::{Packet, native_error};
use media_source::Input;
use media_types::{Error, Rational, Result};
use tracing::{debug, warn};

use crate::DecoderConfig;
use crate::decoder::{open_codec, stream_parameters};

/**
    Video decoder.

    Decodes the packets of one video stream into native frames. Frame
    timestamps are in the stream's time base.
*/
pub struct VideoDecoder {
    decoder: decoder::Video,
    stream: usize,
    time_base: Rational,
}

impl VideoDecoder {
    /**
        Open a decoder for video stream `index` of `input`.
    */
    pub fn open(input: &Input, index: usize, config: &DecoderConfig) -> Result<Self> {
        let info = input
            .stream(index)
            .ok_or_else(|| Error::config(format!("stream {index} does not exist")))?;
        let decoder = open_codec(stream_parameters(input, index)?, config)?
            .video()
            .map_err(native_error)?;
        debug!(
            stream = index,
            width = decoder.width(),
            height = decoder.height(),
            "opened video decoder"
        );
        Ok(Self {
            decoder,
            stream: index,
            time_base: info.time_base,
        })
    }

    pub fn stream(&self) -> usize {
        self.stream
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /**
        Decode a packet, returning decoded frames.

        May return zero, one, or multiple frames depending on codec.
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<frame::Video>> {
        self.decoder
            .send_packet(packet.as_native())
            .map_err(native_error)?;
        self.receive_frames()
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this at end of stream to retrieve any buffered frames.
    */
    pub fn flush(&mut self) -> Result<Vec<frame::Video>> {
        self.decoder.send_eof().map_err(native_error)?;
        let frames = self.receive_frames()?;
        debug!(stream = self.stream, frames = frames.len(), "flushed video decoder");
        Ok(frames)
    }

    /**
        Reset the decoder after a seek.

        Clears internal buffers.
    */
    pub fn reset(&mut self) {
        self.decoder.flush();
    }

    fn receive_frames(&mut self) -> Result<Vec<frame::Video>> {
        let mut frames = Vec::new();
        loop {
            let mut decoded = frame::Video::empty();
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => {
                    if decoded.width() == 0 || decoded.height() == 0 {
                        warn!(stream = self.stream, "dropping empty video frame");
                        continue;
                    }
                    let pts = decoded.timestamp();
                    decoded.set_pts(pts);
                    frames.push(decoded);
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::ffi::EAGAIN => {
                    break;
                }
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(native_error(e)),
            }
        }
        Ok(frames)
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("stream", &self.stream)
            .field("time_base", &self.time_base)
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .finish_non_exhaustive()
    }
}
