use std::io::Write;
use std::sync::OnceLock;

use media_decode::{AudioDecoder, Decoder, DecoderConfig, MediaDecoder, Target};
use media_native::{Options, Runtime};
use media_source::{DemuxEvent, Input, open};
use media_types::{
    AudioFormat, CancelToken, ChannelLayout, Error, Flow, FrameFormat, PixelFormat, SampleFormat,
    Termination, VideoFormat,
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
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
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

fn open_wav(file: &tempfile::NamedTempFile) -> Input {
    open(file.path().to_str().unwrap(), None, &Options::new()).unwrap()
}

#[test]
fn native_decode_delivers_all_samples_then_flush() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let mut decoder = MediaDecoder::new(&input, |_| Some(Target::Native)).unwrap();
    assert_eq!(decoder.selected().collect::<Vec<_>>(), vec![0]);
    assert_eq!(decoder.target(0), Some(Target::Native));

    let mut samples = 0;
    let mut flushes = 0;
    let termination = decoder
        .decode(&mut input, &CancelToken::new(), |stream, frame| {
            assert_eq!(stream, 0);
            match frame {
                Some(frame) => {
                    assert_eq!(flushes, 0, "frame after flush");
                    assert_eq!(
                        frame.format().unwrap(),
                        FrameFormat::Audio(AudioFormat::new(
                            SampleFormat::S16,
                            ChannelLayout::Mono,
                            RATE
                        ))
                    );
                    samples += frame.samples();
                }
                None => flushes += 1,
            }
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(termination, Termination::EndOfStream);
    assert_eq!(samples, SAMPLES);
    assert_eq!(flushes, 1);
}

#[test]
fn target_format_frames_are_rescaled() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let target = AudioFormat::new(SampleFormat::F32p, ChannelLayout::Stereo, 22050);
    let mut decoder =
        MediaDecoder::new(&input, |_| Some(Target::Format(FrameFormat::Audio(target)))).unwrap();

    let mut frames = 0;
    decoder
        .decode(&mut input, &CancelToken::new(), |_, frame| {
            if let Some(frame) = frame {
                assert_eq!(frame.format().unwrap(), FrameFormat::Audio(target));
                frames += 1;
            }
            Ok(Flow::Continue)
        })
        .unwrap();
    assert!(frames > 0);
}

#[test]
fn unselected_streams_are_skipped() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let mut decoder = MediaDecoder::new(&input, |_| None).unwrap();
    assert_eq!(decoder.selected().count(), 0);
    assert!(decoder.stream(0).is_none());

    let termination = decoder
        .decode(&mut input, &CancelToken::new(), |_, _| {
            panic!("no stream was selected")
        })
        .unwrap();
    assert_eq!(termination, Termination::EndOfStream);
}

#[test]
fn demux_forwards_selected_streams_only() {
    runtime();
    let file = wav_file();

    let mut input = open_wav(&file);
    let none = MediaDecoder::new(&input, |_| None).unwrap();
    let mut events = 0;
    none.demux(&mut input, &CancelToken::new(), |_| {
        events += 1;
        Ok(Flow::Continue)
    })
    .unwrap();
    assert_eq!(events, 0);

    let mut input = open_wav(&file);
    let all = MediaDecoder::new(&input, |_| Some(Target::Native)).unwrap();
    let mut bytes = 0;
    let mut flushed = false;
    all.demux(&mut input, &CancelToken::new(), |event| {
        match event {
            DemuxEvent::Packet(packet) => bytes += packet.size(),
            DemuxEvent::Flush(_) => flushed = true,
            DemuxEvent::ReadError(e) => return Err(e),
        }
        Ok(Flow::Continue)
    })
    .unwrap();
    assert_eq!(bytes, SAMPLES * 2);
    assert!(flushed);
}

#[test]
fn handler_stop_ends_decoding() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let mut decoder = MediaDecoder::new(&input, |_| Some(Target::Native)).unwrap();

    let mut frames = 0;
    let termination = decoder
        .decode(&mut input, &CancelToken::new(), |_, _| {
            frames += 1;
            Ok(Flow::Stop)
        })
        .unwrap();
    assert_eq!(termination, Termination::Stopped);
    assert_eq!(frames, 1);
}

#[test]
fn cancelled_decode_reports_cancellation() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let mut decoder = MediaDecoder::new(&input, |_| Some(Target::Native)).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = decoder.decode(&mut input, &cancel, |_, _| Ok(Flow::Continue));
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn target_of_wrong_kind_is_config_error() {
    runtime();
    let file = wav_file();
    let input = open_wav(&file);
    let video = FrameFormat::Video(VideoFormat::new(PixelFormat::Rgb24, 64, 64));
    let result = MediaDecoder::new(&input, |_| Some(Target::Format(video)));
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn missing_stream_is_config_error() {
    runtime();
    let file = wav_file();
    let input = open_wav(&file);
    assert!(matches!(
        Decoder::open(&input, 5, &DecoderConfig::new()),
        Err(Error::Config { .. })
    ));
}

#[test]
fn stream_decoder_round() {
    runtime();
    let file = wav_file();
    let mut input = open_wav(&file);
    let config = DecoderConfig::new().with_threads(1);
    let mut decoder = AudioDecoder::open(&input, 0, &config).unwrap();
    assert_eq!(decoder.sample_rate(), RATE);
    assert_eq!(decoder.stream(), 0);

    let mut samples = 0;
    while let Some(packet) = input.read_packet().unwrap() {
        samples += decoder.decode(&packet).unwrap().iter().map(|f| f.samples()).sum::<usize>();
    }
    samples += decoder.flush().unwrap().iter().map(|f| f.samples()).sum::<usize>();
    assert_eq!(samples, SAMPLES);
}
