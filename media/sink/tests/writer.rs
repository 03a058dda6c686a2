use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame;
use media_native::{Frame, Packet, Runtime};
use media_sink::{ContainerFormat, StreamConfig, Writer, WriterConfig, WriterState, remux};
use media_source::{DemuxEvent, Options, open};
use media_transform::SineGenerator;
use media_types::{
    AudioFormat, CancelToken, ChannelLayout, CodecId, Error, Flow, MediaType, PixelFormat,
    Rational, SampleFormat, Termination, VideoFormat,
};

const LENGTH: Duration = Duration::from_secs(2);
const FPS: i32 = 25;

fn runtime() {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::start().unwrap());
}

fn tone_format() -> AudioFormat {
    AudioFormat::new(SampleFormat::F32p, ChannelLayout::Mono, 22050)
}

fn video_format() -> VideoFormat {
    VideoFormat::new(PixelFormat::Yuv420p, 320, 240)
}

fn gray_frame() -> Frame {
    let mut video = frame::Video::new(Pixel::YUV420P, 320, 240);
    for plane in 0..3 {
        video.data_mut(plane).fill(128);
    }
    Frame::Video(video)
}

fn packet_counts(path: &Path) -> (Vec<usize>, Vec<usize>) {
    let mut input = open(path.to_str().unwrap(), None, &Options::new()).unwrap();
    let mut counts = vec![0; input.streams().len()];
    let mut flushed = Vec::new();
    let termination = input
        .demux(&CancelToken::new(), |event| {
            match event {
                DemuxEvent::Packet(packet) => counts[packet.stream()] += 1,
                DemuxEvent::Flush(index) => flushed.push(index),
                DemuxEvent::ReadError(e) => return Err(e),
            }
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(termination, Termination::EndOfStream);
    (counts, flushed)
}

/// Two seconds of gray 25 fps video and a 440 Hz tone in Matroska.
fn write_two_streams(path: &Path) -> media_sink::WriterSummary {
    let config = WriterConfig::new(ContainerFormat::Mkv)
        .with_metadata("title", "two streams")
        .with_stream(StreamConfig::video(
            CodecId::Mpeg4,
            video_format(),
            Rational::new(FPS, 1),
        ))
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    let mut writer = Writer::create(path, config).unwrap();
    let frame_size = writer.frame_size(1).unwrap();
    let mut generator = SineGenerator::new(440.0, -5.0, tone_format(), frame_size).unwrap();

    let mut video_frames = 0;
    let mut last = Duration::ZERO;
    let termination = writer
        .encode(&CancelToken::new(), |stream| {
            let at = match stream {
                0 => Duration::from_secs_f64(f64::from(video_frames) / f64::from(FPS)),
                _ => generator.position(),
            };
            assert!(at + Duration::from_millis(1) >= last, "stream {stream} at {at:?}");
            last = at;

            if at >= LENGTH {
                return Ok(None);
            }
            match stream {
                0 => {
                    video_frames += 1;
                    Ok(Some(gray_frame()))
                }
                _ => generator.next_frame().map(Some),
            }
        })
        .unwrap();
    assert_eq!(termination, Termination::EndOfStream);
    assert_eq!(video_frames, 50);

    let summary = writer.finish().unwrap();
    assert_eq!(writer.state(), WriterState::Finished);
    summary
}

#[test]
fn two_streams_demux_with_per_stream_counts() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.mkv");
    let summary = write_two_streams(&path);

    assert_eq!(summary.streams.len(), 2);
    assert_eq!(summary.streams[0].media_type, MediaType::Video);
    assert_eq!(summary.streams[0].packets, 50);
    assert!(summary.streams[1].packets > 0);

    let (counts, flushed) = packet_counts(&path);
    assert_eq!(counts[0] as u64, summary.streams[0].packets);
    assert_eq!(counts[1] as u64, summary.streams[1].packets);
    assert_eq!(flushed.len(), 2);

    let input = open(path.to_str().unwrap(), None, &Options::new()).unwrap();
    assert_eq!(input.format_name(), "matroska,webm");
    assert_eq!(input.streams()[0].parameters.codec, Some(CodecId::Mpeg4));
    assert_eq!(input.streams()[1].parameters.codec, Some(CodecId::Aac));
    assert_eq!(input.info().metadata_value("title"), Some("two streams"));
}

#[test]
fn aac_tone_has_requested_format_and_length() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.m4a");

    let config = WriterConfig::new(ContainerFormat::Mp4)
        .with_fast_start(true)
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()).with_bit_rate(64_000));
    let mut writer = Writer::create(&path, config).unwrap();
    assert_eq!(writer.state(), WriterState::Writing);
    assert_eq!(writer.encoder_time_base(0), Some(Rational::new(1, 22050)));
    let frame_size = writer.frame_size(0).unwrap();
    assert_eq!(frame_size, 1024);

    let mut generator = SineGenerator::new(440.0, -5.0, tone_format(), frame_size).unwrap();
    writer
        .encode(&CancelToken::new(), |_| {
            if generator.position() >= LENGTH {
                return Ok(None);
            }
            generator.next_frame().map(Some)
        })
        .unwrap();
    let summary = writer.finish().unwrap();
    assert!(summary.bytes() > 0);

    let input = open(path.to_str().unwrap(), None, &Options::new()).unwrap();
    assert_eq!(input.streams().len(), 1);
    let params = &input.streams()[0].parameters;
    assert_eq!(params.codec, Some(CodecId::Aac));
    assert_eq!(params.sample_rate, 22050);
    assert_eq!(params.channels, 1);

    let duration = input.duration().unwrap().as_secs_f64();
    assert!((duration - 2.0).abs() < 0.2, "duration {duration}");
}

#[test]
fn nothing_is_written_after_the_trailer() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.mkv");
    let config = WriterConfig::new(ContainerFormat::Mkv)
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    let mut writer = Writer::create(&path, config).unwrap();

    // producers that end immediately still get their encoders flushed
    writer.encode(&CancelToken::new(), |_| Ok(None)).unwrap();
    writer.finish().unwrap();

    assert!(matches!(writer.finish(), Err(Error::Config { .. })));
    let packet = Packet::empty(Rational::new(1, 22050), MediaType::Audio);
    assert!(matches!(writer.write(packet), Err(Error::Config { .. })));
    assert!(matches!(
        writer.encode(&CancelToken::new(), |_| Ok(None)),
        Err(Error::Config { .. })
    ));
}

#[test]
fn zero_time_base_is_rejected() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(ContainerFormat::Mkv)
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    let mut writer = Writer::create(dir.path().join("zero.mkv"), config).unwrap();

    let mut inner = ffmpeg_next::Packet::copy(&[0u8; 8]);
    inner.set_pts(Some(0));
    let packet = Packet::new(inner, Rational { num: 0, den: 1 }, MediaType::Audio);
    assert!(matches!(
        writer.write(packet),
        Err(Error::InvalidTimeBase { .. })
    ));
    assert_eq!(writer.packets_written(), 0);
    writer.finish().unwrap();
}

#[test]
fn frame_of_wrong_format_is_config_error() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(ContainerFormat::Mkv)
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    let mut writer = Writer::create(dir.path().join("wrong.mkv"), config).unwrap();

    let stereo = AudioFormat::new(SampleFormat::F32p, ChannelLayout::Stereo, 22050);
    let mut generator = SineGenerator::new(440.0, -5.0, stereo, 1024).unwrap();
    let result = writer.encode(&CancelToken::new(), |_| generator.next_frame().map(Some));
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn encode_stops_when_cancelled() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(ContainerFormat::Mkv)
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    let mut writer = Writer::create(dir.path().join("cancel.mkv"), config).unwrap();

    let cancel = CancelToken::new();
    let mut generator = SineGenerator::new(440.0, -5.0, tone_format(), 1024).unwrap();
    let mut produced = 0;
    let result = writer.encode(&cancel, |_| {
        produced += 1;
        if produced == 3 {
            cancel.cancel();
        }
        generator.next_frame().map(Some)
    });
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(produced, 3);
    writer.finish().unwrap();
}

#[test]
fn invalid_configuration_is_rejected() {
    runtime();
    let dir = tempfile::tempdir().unwrap();

    let empty = Writer::create(dir.path().join("empty.mkv"), WriterConfig::new(ContainerFormat::Mkv));
    assert!(matches!(empty, Err(Error::Config { .. })));

    let unknown = WriterConfig::new(ContainerFormat::Named("no-such-muxer".into()))
        .with_stream(StreamConfig::audio(CodecId::Aac, tone_format()));
    assert!(matches!(
        Writer::create(dir.path().join("unknown.bin"), unknown),
        Err(Error::Config { .. })
    ));

    let mismatched = WriterConfig::new(ContainerFormat::Mkv)
        .with_stream(StreamConfig::audio(CodecId::Mpeg4, tone_format()));
    assert!(matches!(
        Writer::create(dir.path().join("mismatched.mkv"), mismatched),
        Err(Error::Config { .. })
    ));
}

#[test]
fn remux_copies_selected_streams() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mkv");
    let written = write_two_streams(&source);

    let mut input = open(source.to_str().unwrap(), None, &Options::new()).unwrap();
    let target = dir.path().join("audio.mkv");
    let summary = remux(
        &mut input,
        &target,
        Some(&ContainerFormat::Mkv),
        &[1],
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(summary.streams.len(), 1);
    assert_eq!(summary.streams[0].media_type, MediaType::Audio);
    assert_eq!(summary.streams[0].packets, written.streams[1].packets);

    let (counts, _) = packet_counts(&target);
    assert_eq!(counts, vec![written.streams[1].packets as usize]);
}

#[test]
fn remux_rejects_bad_selection() {
    runtime();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mkv");
    write_two_streams(&source);

    let mut input = open(source.to_str().unwrap(), None, &Options::new()).unwrap();
    let cancel = CancelToken::new();
    let twice = remux(&mut input, dir.path().join("a.mkv"), None, &[1, 1], &cancel);
    assert!(matches!(twice, Err(Error::Config { .. })));
    let missing = remux(&mut input, dir.path().join("b.mkv"), None, &[7], &cancel);
    assert!(matches!(missing, Err(Error::Config { .. })));
}
