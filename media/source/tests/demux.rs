use std::io::Write;
use std::sync::OnceLock;

use media_native::Runtime;
use media_source::{DemuxEvent, Options, open};
use media_types::{
    CancelToken, ChannelLayout, CodecId, Error, Flow, MediaType, Rational, SampleFormat,
    Termination,
};

const RATE: u32 = 8000;
const SAMPLES: usize = 8000;

fn runtime() {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::start().unwrap());
}

/// One second of 16-bit mono PCM in a WAV container.
fn wav_file() -> tempfile::NamedTempFile {
    let data_len = (SAMPLES * 2) as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&RATE.to_le_bytes());
    bytes.extend_from_slice(&(RATE * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..SAMPLES {
        let sample = ((i as f32 * 0.05).sin() * 8000.0) as i16;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

fn path(file: &tempfile::NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn open_reads_stream_information() {
    runtime();
    let file = wav_file();
    let input = open(path(&file), None, &Options::new()).unwrap();

    assert_eq!(input.format_name(), "wav");
    assert_eq!(input.streams().len(), 1);
    let stream = input.stream(0).unwrap();
    assert_eq!(stream.media_type(), MediaType::Audio);
    assert_eq!(stream.parameters.codec, Some(CodecId::PcmS16Le));
    assert_eq!(stream.parameters.sample_rate, RATE);
    assert_eq!(stream.parameters.channels, 1);
    assert_eq!(stream.parameters.channel_layout, Some(ChannelLayout::Mono));
    assert_eq!(stream.parameters.sample_format, Some(SampleFormat::S16));
    assert_eq!(stream.time_base, Rational::new(1, RATE as i32));
    assert_eq!(input.best_stream(MediaType::Audio), Some(0));
    assert_eq!(input.best_stream(MediaType::Video), None);

    let info = input.info();
    assert_eq!(info.streams.len(), 1);
    let duration = info.duration.unwrap();
    assert!((duration.as_secs_f64() - 1.0).abs() < 0.01);
}

#[test]
fn demux_delivers_every_packet_then_flushes() {
    runtime();
    let file = wav_file();
    let mut input = open(path(&file), None, &Options::new()).unwrap();

    let mut bytes = 0;
    let mut packets = 0;
    let mut flushed = Vec::new();
    let termination = input
        .demux(&CancelToken::new(), |event| {
            match event {
                DemuxEvent::Packet(packet) => {
                    assert!(flushed.is_empty(), "packet after flush");
                    assert_eq!(packet.stream(), 0);
                    assert_eq!(packet.media_type(), MediaType::Audio);
                    packets += 1;
                    bytes += packet.size();
                }
                DemuxEvent::Flush(index) => flushed.push(index),
                DemuxEvent::ReadError(e) => return Err(e),
            }
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(termination, Termination::EndOfStream);
    assert!(packets > 0);
    assert_eq!(bytes, SAMPLES * 2);
    assert_eq!(flushed, vec![0]);
}

#[test]
fn handler_stop_halts_without_error() {
    runtime();
    let file = wav_file();
    let mut input = open(path(&file), None, &Options::new()).unwrap();

    let mut seen = 0;
    let termination = input
        .demux(&CancelToken::new(), |event| {
            if let DemuxEvent::Packet(_) = event {
                seen += 1;
                return Ok(Flow::Stop);
            }
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(termination, Termination::Stopped);
    assert_eq!(seen, 1);
}

#[test]
fn cancellation_is_the_termination_reason() {
    runtime();
    let file = wav_file();
    let mut input = open(path(&file), None, &Options::new()).unwrap();

    let cancel = CancelToken::new();
    let mut seen = 0;
    let result = input.demux(&cancel, |event| {
        if let DemuxEvent::Packet(_) = event {
            seen += 1;
            cancel.cancel();
        }
        Ok(Flow::Continue)
    });

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(seen, 1, "no reads after cancellation");
}

#[test]
fn handler_error_is_returned() {
    runtime();
    let file = wav_file();
    let mut input = open(path(&file), None, &Options::new()).unwrap();

    let result = input.demux(&CancelToken::new(), |_| Err(Error::config("rejected")));
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn read_packet_reaches_end_of_stream() {
    runtime();
    let file = wav_file();
    let mut input = open(path(&file), None, &Options::new()).unwrap();

    let mut total = 0;
    while let Some(packet) = input.read_packet().unwrap() {
        total += packet.size();
    }
    assert_eq!(total, SAMPLES * 2);
    assert!(input.read_packet().unwrap().is_none());
}

#[test]
fn forced_format_is_used() {
    runtime();
    let file = wav_file();
    let input = open(path(&file), Some("wav"), &Options::new()).unwrap();
    assert_eq!(input.format_name(), "wav");
}

#[test]
fn unknown_forced_format_is_config_error() {
    runtime();
    let file = wav_file();
    let err = open(path(&file), Some("no-such-demuxer"), &Options::new()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn missing_file_is_native_error() {
    runtime();
    let err = open("/nonexistent/input.wav", None, &Options::new()).unwrap_err();
    assert!(matches!(err, Error::Native { .. }));
}

#[test]
fn malformed_container_is_fatal() {
    runtime();
    let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    file.write_all(b"RIFF\x10\x00\x00\x00WAVEjunkjunkjunk").unwrap();
    file.flush().unwrap();
    assert!(open(path(&file), Some("wav"), &Options::new()).is_err());
}

#[test]
fn empty_url_is_config_error() {
    runtime();
    assert!(matches!(
        open("", None, &Options::new()),
        Err(Error::Config { .. })
    ));
}
