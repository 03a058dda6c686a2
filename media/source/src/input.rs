/*!
    Opening inputs and reading their stream information.
*/

use std::time::Duration;

use ffmpeg_next::{ffi, format};
use media_native::{Options, Packet, convert, ensure_started, native_error, open_input, parameters};
use media_types::{
    Disposition, Error, MediaDuration, MediaInfo, MediaType, Metadata, Pts, Result, StreamInfo,
};
use tracing::{debug, info};

/**
    An open container.

    Owns the native demuxer context. Stream information is read once when
    the input is opened and stays valid for the lifetime of the input.
*/
pub struct Input {
    ctx: format::context::Input,
    url: String,
    streams: Vec<StreamInfo>,
}

/**
    Open a file, URL or device and probe its streams.

    `format` forces a demuxer by name (e.g. `"wav"`, or a device such as
    `"alsa"`) instead of probing. `options` are passed to the demuxer;
    options it does not recognize are logged and ignored.

    # Errors

    - Configuration error if the runtime is not started, the url is empty
      or the forced format is unknown
    - Native error if the container cannot be opened or probed
*/
pub fn open(url: &str, format: Option<&str>, options: &Options) -> Result<Input> {
    ensure_started()?;
    if url.is_empty() {
        return Err(Error::config("input url is empty"));
    }
    let ctx = open_input(url, format, options)?;

    let streams = ctx.streams().map(|s| stream_info(&s)).collect::<Vec<_>>();
    info!(
        url,
        format = ctx.format().name(),
        streams = streams.len(),
        "opened input"
    );
    for s in &streams {
        debug!(
            index = s.index,
            kind = %s.media_type(),
            codec = %s.parameters.codec_name,
            time_base = %s.time_base,
            "input stream"
        );
    }

    Ok(Input {
        ctx,
        url: url.to_string(),
        streams,
    })
}

fn stream_info(stream: &format::stream::Stream<'_>) -> StreamInfo {
    let mut params = parameters(&stream.parameters());
    let frame_rate = convert::rational_from_native(stream.avg_frame_rate());
    if params.media_type == MediaType::Video && frame_rate.is_valid() {
        params.frame_rate = Some(frame_rate);
    }

    let start_time = stream.start_time();
    let duration = stream.duration();
    let frames = stream.frames();

    StreamInfo {
        index: stream.index(),
        time_base: convert::rational_from_native(stream.time_base()),
        parameters: params,
        start_time: (start_time != ffi::AV_NOPTS_VALUE).then_some(Pts(start_time)),
        duration: (duration != ffi::AV_NOPTS_VALUE && duration > 0)
            .then_some(MediaDuration(duration)),
        frames: (frames > 0).then_some(frames as u64),
        disposition: Disposition::from_bits_retain(stream.disposition().bits() as u32),
        metadata: stream
            .metadata()
            .iter()
            .map(|(k, v)| Metadata::new(k, v))
            .collect(),
    }
}

impl Input {
    pub fn url(&self) -> &str {
        &self.url
    }

    /**
        Short name of the demuxer, e.g. `wav` or `mov,mp4,m4a,3gp,3g2,mj2`.
    */
    pub fn format_name(&self) -> &str {
        self.ctx.format().name()
    }

    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    pub fn stream(&self, index: usize) -> Option<&StreamInfo> {
        self.streams.get(index)
    }

    /**
        Index of the stream FFmpeg considers the best of the given kind.
    */
    pub fn best_stream(&self, kind: MediaType) -> Option<usize> {
        self.ctx
            .streams()
            .best(convert::media_type_to_native(kind))
            .map(|s| s.index())
    }

    /**
        Container duration, if known.
    */
    pub fn duration(&self) -> Option<Duration> {
        let duration = self.ctx.duration();
        (duration != ffi::AV_NOPTS_VALUE && duration > 0)
            .then(|| Duration::from_micros(duration as u64))
    }

    /**
        Information about the container and all of its streams.
    */
    pub fn info(&self) -> MediaInfo {
        let format = self.ctx.format();
        MediaInfo {
            url: self.url.clone(),
            format_name: format.name().to_string(),
            format_long_name: format.description().to_string(),
            duration: self.duration(),
            bit_rate: self.ctx.bit_rate(),
            metadata: self
                .ctx
                .metadata()
                .iter()
                .map(|(k, v)| Metadata::new(k, v))
                .collect(),
            streams: self.streams.clone(),
        }
    }

    /**
        Read the next packet in container order.

        Returns `Ok(None)` at end of stream.
    */
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut packet = ffmpeg_next::Packet::empty();
        match packet.read(&mut self.ctx) {
            Ok(()) => {
                let (time_base, kind) = self
                    .streams
                    .get(packet.stream())
                    .map(|s| (s.time_base, s.media_type()))
                    .ok_or_else(|| {
                        Error::config(format!(
                            "packet for unknown stream {}",
                            packet.stream()
                        ))
                    })?;
                Ok(Some(Packet::new(packet, time_base, kind)))
            }
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(e) => Err(native_error(e)),
        }
    }

    pub fn as_native(&self) -> &format::context::Input {
        &self.ctx
    }

    pub fn as_native_mut(&mut self) -> &mut format::context::Input {
        &mut self.ctx
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("url", &self.url)
            .field("format", &self.format_name())
            .field("streams", &self.streams.len())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Input: Send);
