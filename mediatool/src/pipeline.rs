/*!
    Commands that run a whole pipeline over a file.
*/

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use image::RgbImage;
use media_decode::{MediaDecoder, Target};
use media_native::Options;
use media_sink::{ContainerFormat, StreamConfig, Writer, WriterConfig, remux as copy_streams};
use media_source::DemuxEvent;
use media_transform::SineGenerator;
use media_types::{
    AudioFormat, CancelToken, ChannelLayout, CodecId, Flow, FrameFormat, MediaType, PixelFormat,
    SampleFormat, VideoFormat,
};
use tracing::{debug, info, warn};

use crate::ToneArgs;

// used when the encoder accepts frames of any size
const DEFAULT_FRAME_SIZE: usize = 1024;

const RETRY_DELAY: Duration = Duration::from_millis(10);

pub fn demux(url: &str, format: Option<&str>, cancel: &CancelToken) -> anyhow::Result<()> {
    let mut input = media_source::open(url, format, &Options::new())
        .with_context(|| format!("failed to open {url}"))?;

    let mut counts = vec![(0u64, 0u64); input.streams().len()];
    let termination = input.demux(cancel, |event| match event {
        DemuxEvent::Packet(packet) => {
            if let Some((packets, bytes)) = counts.get_mut(packet.stream()) {
                *packets += 1;
                *bytes += packet.size() as u64;
            }
            Ok(Flow::Continue)
        }
        DemuxEvent::Flush(index) => {
            debug!(stream = index, "stream ended");
            Ok(Flow::Continue)
        }
        DemuxEvent::ReadError(e) if e.is_again() => {
            // live sources report this while waiting for data
            thread::sleep(RETRY_DELAY);
            Ok(Flow::Continue)
        }
        DemuxEvent::ReadError(e) => Err(e),
    })?;

    for (stream, (packets, bytes)) in input.streams().iter().zip(&counts) {
        println!(
            "#{} {}: {packets} packets, {bytes} bytes",
            stream.index,
            stream.media_type()
        );
    }
    println!("{termination:?}");
    Ok(())
}

pub fn remux(
    url: &str,
    output: &Path,
    format: Option<String>,
    streams: &[usize],
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    let mut input = media_source::open(url, None, &Options::new())
        .with_context(|| format!("failed to open {url}"))?;
    let format = format.map(ContainerFormat::Named);

    let summary = copy_streams(&mut input, output, format.as_ref(), streams, cancel)
        .with_context(|| format!("failed to remux {url} into {}", output.display()))?;
    println!(
        "{}: {} ({} packets, {} bytes)",
        summary.path.display(),
        summary.format_name,
        summary.packets(),
        summary.bytes()
    );
    Ok(())
}

/**
    Options of the frame extraction command.
*/
#[derive(Debug)]
pub struct FrameOptions {
    pub output_dir: PathBuf,
    pub stream: Option<usize>,
    pub every: usize,
    pub max: Option<usize>,
    pub size: Option<(u32, u32)>,
}

pub fn extract_frames(
    url: &str,
    options: &FrameOptions,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    if options.every == 0 {
        bail!("--every must be at least 1");
    }
    let mut input = media_source::open(url, None, &Options::new())
        .with_context(|| format!("failed to open {url}"))?;

    let index = match options.stream {
        Some(index) => index,
        None => input
            .best_stream(MediaType::Video)
            .with_context(|| format!("{url} has no video stream"))?,
    };
    let stream = input
        .stream(index)
        .with_context(|| format!("{url} has no stream {index}"))?;
    let source = stream.parameters.video_format()?;
    let (width, height) = options.size.unwrap_or((source.width, source.height));
    let target = FrameFormat::Video(VideoFormat::new(PixelFormat::Rgb24, width, height));

    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("failed to create {}", options.output_dir.display()))?;

    let mut decoder =
        MediaDecoder::new(&input, |s| (s.index == index).then_some(Target::Format(target)))?;

    let mut decoded = 0usize;
    let mut saved = 0usize;
    let mut failure = None;
    let termination = decoder.decode(&mut input, cancel, |_, frame| {
        let Some(frame) = frame else {
            return Ok(Flow::Continue);
        };
        decoded += 1;
        if (decoded - 1) % options.every != 0 {
            return Ok(Flow::Continue);
        }
        let Some(video) = frame.as_video() else {
            return Ok(Flow::Continue);
        };

        let path = options.output_dir.join(format!("frame-{saved:05}.png"));
        let saved_ok = rgb_image(video.width(), video.height(), video.stride(0), video.data(0))
            .context("decoded frame is smaller than its size")
            .and_then(|image| {
                image
                    .save(&path)
                    .with_context(|| format!("failed to save {}", path.display()))
            });
        if let Err(e) = saved_ok {
            failure = Some(e);
            return Ok(Flow::Stop);
        }
        debug!(path = %path.display(), pts = ?frame.pts(), "saved frame");

        saved += 1;
        if options.max.is_some_and(|max| saved >= max) {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    })?;
    if let Some(e) = failure {
        return Err(e);
    }

    info!(decoded, saved, ?termination, "extracted frames");
    println!("saved {saved} of {decoded} frames to {}", options.output_dir.display());
    Ok(())
}

/**
    Copy rows of packed RGB24 pixels into an image, skipping the padding
    at the end of each row.
*/
fn rgb_image(width: u32, height: u32, stride: usize, data: &[u8]) -> Option<RgbImage> {
    let row = width as usize * 3;
    if height > 0 && stride < row {
        return None;
    }
    let mut pixels = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        pixels.extend_from_slice(data.get(start..start + row)?);
    }
    RgbImage::from_raw(width, height, pixels)
}

#[allow(clippy::too_many_arguments)]
pub fn tone(
    output: &Path,
    tone: &ToneArgs,
    codec: CodecId,
    sample_format: SampleFormat,
    rate: u32,
    channels: u16,
    format: Option<String>,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    if !(tone.duration > 0.0) {
        bail!("duration must be positive");
    }
    let layout = ChannelLayout::from_channels(channels)
        .with_context(|| format!("no channel layout has {channels} channels"))?;
    let audio = AudioFormat::new(sample_format, layout, rate);

    let config = match format {
        Some(name) => WriterConfig::new(ContainerFormat::Named(name)),
        None => WriterConfig::guess(),
    }
    .with_fast_start(true)
    .with_metadata("title", format!("{} Hz tone", tone.frequency))
    .with_stream(StreamConfig::audio(codec, audio));
    let mut writer = Writer::create(output, config)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let frame_size = writer.frame_size(0).unwrap_or(DEFAULT_FRAME_SIZE);
    let mut generator = SineGenerator::new(tone.frequency, tone.gain, audio, frame_size)?;
    let total = (tone.duration * f64::from(rate)).round() as u64;
    let mut produced = 0u64;

    writer.encode(cancel, |_| {
        if produced >= total {
            return Ok(None);
        }
        produced += frame_size as u64;
        generator.next_frame().map(Some)
    })?;
    let summary = writer.finish()?;

    if produced > total {
        warn!(
            extra = produced - total,
            "tone rounded up to a whole number of frames"
        );
    }
    println!(
        "{}: {} ({} packets, {} bytes)",
        summary.path.display(),
        summary.format_name,
        summary.packets(),
        summary.bytes()
    );
    Ok(())
}
