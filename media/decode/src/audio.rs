/*!
    Audio decoder implementation.
*/

use ffmpeg_next::{codec::decoder, frame};
use media_native::{Packet, frame_channels, native_error};
use media_source::Input;
use media_types::{Error, Rational, Result};
use tracing::{debug, warn};

use crate::DecoderConfig;
use crate::decoder::{open_codec, stream_parameters};

/**
    Audio decoder.

    Decodes audio packets into frames.
*/
pub struct AudioDecoder {
    decoder: decoder::Audio,
    stream: usize,
    time_base: Rational,
}

impl AudioDecoder {
    /**
        Open a decoder for audio stream `index` of `input`.
    */
    pub fn open(input: &Input, index: usize, config: &DecoderConfig) -> Result<Self> {
        let info = input
            .stream(index)
            .ok_or_else(|| Error::config(format!("stream {index} does not exist")))?;
        let decoder = open_codec(stream_parameters(input, index)?, config)?
            .audio()
            .map_err(native_error)?;
        debug!(stream = index, rate = decoder.rate(), "opened audio decoder");
        Ok(Self {
            decoder,
            stream: index,
            time_base: info.time_base,
        })
    }

    pub fn stream(&self) -> usize {
        self.stream
    }

    /**
        Get the time base for this decoder.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Get the sample rate of the decoded audio.
    */
    pub fn sample_rate(&self) -> u32 {
        self.decoder.rate()
    }

    /**
        Decode a packet, returning decoded frames.

        May return zero, one, or multiple frames depending on codec.
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<frame::Audio>> {
        self.decoder
            .send_packet(packet.as_native())
            .map_err(native_error)?;
        self.receive_frames()
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this at end of stream to retrieve any buffered frames.
    */
    pub fn flush(&mut self) -> Result<Vec<frame::Audio>> {
        self.decoder.send_eof().map_err(native_error)?;
        let frames = self.receive_frames()?;
        debug!(stream = self.stream, frames = frames.len(), "flushed audio decoder");
        Ok(frames)
    }

    /**
        Reset the decoder after a seek.

        Clears internal buffers. Call this after seeking.
    */
    pub fn reset(&mut self) {
        self.decoder.flush();
    }

    fn receive_frames(&mut self) -> Result<Vec<frame::Audio>> {
        let mut frames = Vec::new();
        loop {
            let mut decoded = frame::Audio::empty();
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => {
                    if decoded.samples() == 0 || frame_channels(&decoded) == 0 {
                        warn!(stream = self.stream, "dropping empty audio frame");
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

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("stream", &self.stream)
            .field("time_base", &self.time_base)
            .field("sample_rate", &self.decoder.rate())
            .finish_non_exhaustive()
    }
}
