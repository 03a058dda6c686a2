/*!
    Output container writer.
*/

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use ffmpeg_next::{Dictionary, codec, encoder, ffi, format};
use media_native::registry::{self, FormatFilter};
use media_native::{
    Frame, NativeResultExt, Options, Packet, clear_codec_tag, convert, ensure_started,
    native_error, set_codec_layout,
};
use media_source::Input;
use media_types::{
    CancelToken, Error, FrameFormat, MediaType, Metadata, Pts, Rational, Result, Termination,
};
use tracing::{debug, info, warn};

use crate::{ContainerFormat, StreamConfig, WriterConfig};

/**
    Where a [`Writer`] is in its lifecycle.

    The header is written when the writer is created, so a writer is
    never observed before it.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WriterState {
    /// The header is written and packets are accepted.
    Writing,
    /// The trailer is written, nothing more can be written.
    Finished,
}

enum Encoder {
    Video(codec::encoder::video::Encoder),
    Audio(codec::encoder::audio::Encoder),
}

impl Encoder {
    fn base(&mut self) -> &mut codec::encoder::Encoder {
        match self {
            Self::Video(e) => e,
            Self::Audio(e) => e,
        }
    }
}

struct EncoderState {
    encoder: Encoder,
    format: FrameFormat,
    time_base: Rational,
    next_pts: i64,
    finished: bool,
}

struct OutputStream {
    media_type: MediaType,
    // muxer time base, final once the header is written
    time_base: Rational,
    encoder: Option<EncoderState>,
    packets: u64,
    bytes: u64,
}

/**
    Per-stream totals of a finished writer.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSummary {
    pub index: usize,
    pub media_type: MediaType,
    pub time_base: Rational,
    pub packets: u64,
    pub bytes: u64,
}

/**
    What a [`Writer`] wrote.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterSummary {
    pub path: PathBuf,
    pub format_name: String,
    pub streams: Vec<StreamSummary>,
}

impl WriterSummary {
    pub fn packets(&self) -> u64 {
        self.streams.iter().map(|s| s.packets).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.streams.iter().map(|s| s.bytes).sum()
    }
}

/**
    Writes packets into an output container.

    The container header is written by [`Writer::create`], and the trailer
    by [`Writer::finish`]. Anything written after the trailer is rejected
    with a configuration error.

    Every packet is rescaled from its own time base to the time base the
    muxer chose for its stream before it is written, and its byte position
    is reset.
*/
pub struct Writer {
    output: format::context::Output,
    path: PathBuf,
    streams: Vec<OutputStream>,
    state: WriterState,
}

impl Writer {
    /**
        Create an output file with one encoder per configured stream, and
        write its header.

        # Errors

        - Configuration error if the runtime is not started, there are no
          streams, a stream is invalid or the container format is unknown
        - Native error if the file cannot be created, an encoder cannot be
          found or opened, or the muxer rejects the header
    */
    pub fn create(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref();
        if config.streams.is_empty() {
            return Err(Error::config("writer has no streams"));
        }
        for stream in &config.streams {
            stream.validate()?;
        }
        ensure_started()?;

        let mut output = allocate(path, config.format.as_ref())?;
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let mut streams = Vec::with_capacity(config.streams.len());
        for stream in &config.streams {
            streams.push(add_encoded_stream(&mut output, stream, global_header)?);
        }

        Self::start(
            output,
            path,
            streams,
            &config.metadata,
            &config.muxer_options(),
        )
    }

    /**
        Create an output file whose streams copy the parameters of
        `streams` of `input`, for writing packets without re-encoding.
    */
    pub(crate) fn copy(
        path: &Path,
        format: Option<&ContainerFormat>,
        input: &Input,
        streams: &[usize],
    ) -> Result<Self> {
        ensure_started()?;
        let mut output = allocate(path, format)?;

        let mut out = Vec::with_capacity(streams.len());
        for &index in streams {
            let info = input
                .stream(index)
                .ok_or_else(|| Error::config(format!("input has no stream {index}")))?;
            let source = input
                .as_native()
                .stream(index)
                .ok_or_else(|| Error::config(format!("input has no stream {index}")))?;

            let mut stream = output
                .add_stream(encoder::find(codec::Id::None))
                .native()?;
            stream.set_parameters(source.parameters());
            clear_codec_tag(&mut stream);
            stream.set_time_base(convert::rational_to_native(info.time_base));
            if !info.metadata.is_empty() {
                stream.set_metadata(metadata_dictionary(&info.metadata));
            }

            out.push(OutputStream {
                media_type: info.media_type(),
                time_base: info.time_base,
                encoder: None,
                packets: 0,
                bytes: 0,
            });
        }

        Self::start(output, path, out, &input.info().metadata, &Options::new())
    }

    fn start(
        mut output: format::context::Output,
        path: &Path,
        mut streams: Vec<OutputStream>,
        metadata: &[Metadata],
        options: &Options,
    ) -> Result<Self> {
        if !metadata.is_empty() {
            output.set_metadata(metadata_dictionary(metadata));
        }

        let unused = output.write_header_with(options.to_dictionary()).native()?;
        for (key, _) in unused.iter() {
            warn!(path = %path.display(), option = key, "muxer ignored option");
        }

        for (index, stream) in streams.iter_mut().enumerate() {
            if let Some(native) = output.stream(index) {
                stream.time_base = convert::rational_from_native(native.time_base());
            }
            debug!(
                index,
                kind = %stream.media_type,
                time_base = %stream.time_base,
                encoded = stream.encoder.is_some(),
                "output stream"
            );
        }

        info!(
            path = %path.display(),
            format = output.format().name(),
            streams = streams.len(),
            "wrote header"
        );

        Ok(Self {
            output,
            path: path.to_path_buf(),
            streams,
            state: WriterState::Writing,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /**
        Time base the muxer uses for a stream.
    */
    pub fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.streams.get(index).map(|s| s.time_base)
    }

    /**
        Time base frames of an encoded stream are expected in.
    */
    pub fn encoder_time_base(&self, index: usize) -> Option<Rational> {
        self.streams
            .get(index)?
            .encoder
            .as_ref()
            .map(|e| e.time_base)
    }

    /**
        Number of samples per channel the audio encoder of a stream
        requires in every frame but the last, or `None` if it accepts any.
    */
    pub fn frame_size(&self, index: usize) -> Option<usize> {
        match &self.streams.get(index)?.encoder.as_ref()?.encoder {
            Encoder::Audio(e) => Some(e.frame_size() as usize).filter(|&n| n > 0),
            Encoder::Video(_) => None,
        }
    }

    /**
        Number of packets written so far, over all streams.
    */
    pub fn packets_written(&self) -> u64 {
        self.streams.iter().map(|s| s.packets).sum()
    }

    /**
        Encode frames pulled from `produce` until every encoded stream
        has ended.

        `produce` is called with the index of the stream whose next frame
        has the lowest timestamp, and returns that frame, or `None` once
        the stream has ended, which flushes its encoder. Frames without a
        timestamp are stamped to follow the previous frame of their stream.

        Frames must be in the stream's configured format, with timestamps
        in its [encoder time base](Self::encoder_time_base).

        # Errors

        - [`Error::Cancelled`] once `cancel` is set
        - Configuration error if a frame has the wrong format, or the
          trailer is already written
        - Any error returned by `produce`, the encoders or the muxer
    */
    pub fn encode<F>(&mut self, cancel: &CancelToken, mut produce: F) -> Result<Termination>
    where
        F: FnMut(usize) -> Result<Option<Frame>>,
    {
        self.ensure_writing()?;
        while let Some(index) = self.next_stream() {
            cancel.check()?;
            match produce(index)? {
                Some(frame) => self.send_frame(index, frame)?,
                None => self.flush_stream(index)?,
            }
        }
        Ok(Termination::EndOfStream)
    }

    /**
        Write an already encoded packet to the output stream its stream
        index names.

        # Errors

        - Configuration error if the stream does not exist or the trailer
          is already written
        - [`Error::InvalidTimeBase`] if either time base is zero
        - Native error if the muxer rejects the packet
    */
    pub fn write(&mut self, packet: Packet) -> Result<()> {
        self.ensure_writing()?;
        self.write_packet(packet)
    }

    /**
        Flush encoders that have not ended yet and write the trailer.

        # Errors

        Configuration error if the trailer is already written, or any
        error from flushing the encoders or writing the trailer.
    */
    pub fn finish(&mut self) -> Result<WriterSummary> {
        self.ensure_writing()?;
        for index in 0..self.streams.len() {
            let open = self.streams[index]
                .encoder
                .as_ref()
                .is_some_and(|e| !e.finished);
            if open {
                self.flush_stream(index)?;
            }
        }

        self.output.write_trailer().native()?;
        self.state = WriterState::Finished;

        let summary = self.summary();
        info!(
            path = %self.path.display(),
            packets = summary.packets(),
            bytes = summary.bytes(),
            "wrote trailer"
        );
        Ok(summary)
    }

    /**
        What has been written so far.
    */
    pub fn summary(&self) -> WriterSummary {
        WriterSummary {
            path: self.path.clone(),
            format_name: self.output.format().name().to_string(),
            streams: self
                .streams
                .iter()
                .enumerate()
                .map(|(index, s)| StreamSummary {
                    index,
                    media_type: s.media_type,
                    time_base: s.time_base,
                    packets: s.packets,
                    bytes: s.bytes,
                })
                .collect(),
        }
    }

    fn ensure_writing(&self) -> Result<()> {
        match self.state {
            WriterState::Writing => Ok(()),
            WriterState::Finished => Err(Error::config(format!(
                "trailer of {} is already written",
                self.path.display()
            ))),
        }
    }

    // the open encoder whose next frame starts earliest, first stream on ties
    fn next_stream(&self) -> Option<usize> {
        self.streams
            .iter()
            .enumerate()
            .filter_map(|(index, s)| {
                s.encoder
                    .as_ref()
                    .filter(|e| !e.finished)
                    .map(|e| (index, e))
            })
            .min_by(|(_, a), (_, b)| {
                compare_time(a.next_pts, a.time_base, b.next_pts, b.time_base)
            })
            .map(|(index, _)| index)
    }

    fn send_frame(&mut self, index: usize, mut frame: Frame) -> Result<()> {
        let state = self.encoder_mut(index)?;

        let format = frame.format()?;
        if format != state.format {
            return Err(Error::config(format!(
                "stream {index} encodes {} frames, got {format}",
                state.format
            )));
        }

        let pts = match frame.pts() {
            Some(pts) => pts.0,
            None => {
                frame.set_pts(Some(Pts(state.next_pts)));
                state.next_pts
            }
        };
        state.next_pts = pts
            + match &frame {
                Frame::Audio(a) => a.samples() as i64,
                _ => 1,
            };

        let sent = match (&mut state.encoder, &frame) {
            (Encoder::Video(e), Frame::Video(v)) => e.send_frame(v),
            (Encoder::Audio(e), Frame::Audio(a)) => e.send_frame(a),
            _ => {
                return Err(Error::config(format!(
                    "stream {index} cannot encode {} frames",
                    frame.media_type()
                )));
            }
        };
        sent.native()?;
        self.drain(index)
    }

    fn flush_stream(&mut self, index: usize) -> Result<()> {
        let state = self.encoder_mut(index)?;
        state.finished = true;
        state.encoder.base().send_eof().native()?;
        self.drain(index)?;
        debug!(
            index,
            packets = self.streams[index].packets,
            "flushed encoder"
        );
        Ok(())
    }

    fn drain(&mut self, index: usize) -> Result<()> {
        let state = self.encoder_mut(index)?;
        let media_type = state.format.media_type();
        let time_base = state.time_base;

        let mut packets = Vec::new();
        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match state.encoder.base().receive_packet(&mut packet) {
                Ok(()) => packets.push(Packet::new(packet, time_base, media_type)),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => break,
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(native_error(e)),
            }
        }

        for mut packet in packets {
            packet.set_stream(index);
            self.write_packet(packet)?;
        }
        Ok(())
    }

    fn write_packet(&mut self, mut packet: Packet) -> Result<()> {
        let index = packet.stream();
        let stream = self
            .streams
            .get_mut(index)
            .ok_or_else(|| Error::config(format!("output has no stream {index}")))?;

        packet.rescale_to(stream.time_base)?;
        let size = packet.size() as u64;
        packet
            .into_native()
            .write_interleaved(&mut self.output)
            .native()?;

        stream.packets += 1;
        stream.bytes += size;
        Ok(())
    }

    fn encoder_mut(&mut self, index: usize) -> Result<&mut EncoderState> {
        self.streams
            .get_mut(index)
            .and_then(|s| s.encoder.as_mut())
            .ok_or_else(|| Error::config(format!("output stream {index} has no encoder")))
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.state == WriterState::Writing {
            warn!(
                path = %self.path.display(),
                packets = self.packets_written(),
                "writer dropped before its trailer was written"
            );
        }
    }
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("streams", &self.streams.len())
            .field("packets", &self.packets_written())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(WriterSummary: Send, Sync);

fn allocate(path: &Path, format: Option<&ContainerFormat>) -> Result<format::context::Output> {
    match format {
        Some(container) => {
            let name = container.ffmpeg_format_name();
            if registry::output_formats(&FormatFilter::new().name(name)).is_empty() {
                return Err(Error::config(format!("unknown output format {name:?}")));
            }
            format::output_as(path, name).native()
        }
        None => format::output(path).native(),
    }
}

fn add_encoded_stream(
    output: &mut format::context::Output,
    config: &StreamConfig,
    global_header: bool,
) -> Result<OutputStream> {
    let id = convert::codec_to_native(config.codec)?;
    let codec = encoder::find(id).ok_or_else(|| native_error(ffmpeg_next::Error::EncoderNotFound))?;
    let time_base = config.time_base()?;
    let context = codec::context::Context::new_with_codec(codec);

    let (encoder, parameters) = match config.format {
        FrameFormat::Video(v) => {
            let mut video = context.encoder().video().native()?;
            video.set_width(v.width);
            video.set_height(v.height);
            video.set_format(convert::pixel_to_native(v.format)?);
            video.set_time_base(convert::rational_to_native(time_base));
            video.set_frame_rate(config.frame_rate.map(convert::rational_to_native));
            if let Some(bit_rate) = config.bit_rate {
                video.set_bit_rate(bit_rate);
            }
            if global_header {
                video.set_flags(codec::Flags::GLOBAL_HEADER);
            }
            let opened = video
                .open_as_with(codec, config.options.to_dictionary())
                .native()?;
            let parameters = codec::Parameters::from(&opened);
            (Encoder::Video(opened), parameters)
        }
        FrameFormat::Audio(a) => {
            let mut audio = context.encoder().audio().native()?;
            audio.set_rate(a.sample_rate as i32);
            audio.set_format(convert::sample_to_native(a.format)?);
            set_codec_layout(&mut audio, a.layout)?;
            audio.set_time_base(convert::rational_to_native(time_base));
            if let Some(bit_rate) = config.bit_rate {
                audio.set_bit_rate(bit_rate);
            }
            if global_header {
                audio.set_flags(codec::Flags::GLOBAL_HEADER);
            }
            let opened = audio
                .open_as_with(codec, config.options.to_dictionary())
                .native()?;
            let parameters = codec::Parameters::from(&opened);
            (Encoder::Audio(opened), parameters)
        }
    };

    let mut stream = output.add_stream(codec).native()?;
    stream.set_time_base(convert::rational_to_native(time_base));
    stream.set_parameters(parameters);
    if !config.metadata.is_empty() {
        stream.set_metadata(metadata_dictionary(&config.metadata));
    }
    debug!(
        index = stream.index(),
        codec = %config.codec,
        format = %config.format,
        "opened encoder"
    );

    Ok(OutputStream {
        media_type: config.format.media_type(),
        time_base,
        encoder: Some(EncoderState {
            encoder,
            format: config.format,
            time_base,
            next_pts: 0,
            finished: false,
        }),
        packets: 0,
        bytes: 0,
    })
}

fn metadata_dictionary(metadata: &[Metadata]) -> Dictionary<'static> {
    let mut dictionary = Dictionary::new();
    for entry in metadata {
        dictionary.set(&entry.key, &entry.value);
    }
    dictionary
}

fn compare_time(a: i64, a_base: Rational, b: i64, b_base: Rational) -> Ordering {
    let lhs = i128::from(a) * i128::from(a_base.num) * i128::from(b_base.den);
    let rhs = i128::from(b) * i128::from(b_base.num) * i128::from(a_base.den);
    lhs.cmp(&rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_time_across_time_bases() {
        let audio = Rational::new(1, 22050);
        let video = Rational::new(1, 25);
        assert_eq!(compare_time(0, audio, 0, video), Ordering::Equal);
        assert_eq!(compare_time(882, audio, 1, video), Ordering::Equal);
        assert_eq!(compare_time(1024, audio, 1, video), Ordering::Greater);
        assert_eq!(compare_time(512, audio, 1, video), Ordering::Less);
    }

    #[test]
    fn summary_totals() {
        let summary = WriterSummary {
            path: PathBuf::from("out.mkv"),
            format_name: "matroska".into(),
            streams: vec![
                StreamSummary {
                    index: 0,
                    media_type: MediaType::Video,
                    time_base: Rational::new(1, 1000),
                    packets: 10,
                    bytes: 1000,
                },
                StreamSummary {
                    index: 1,
                    media_type: MediaType::Audio,
                    time_base: Rational::new(1, 1000),
                    packets: 5,
                    bytes: 50,
                },
            ],
        };
        assert_eq!(summary.packets(), 15);
        assert_eq!(summary.bytes(), 1050);
    }
}
