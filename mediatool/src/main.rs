use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use media_native::Runtime;
use media_types::{CancelToken, CodecId, MediaType, SampleFormat};
use tokio::signal;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod devices;
mod pipeline;
mod probe;
mod registry;

#[derive(Parser, Debug)]
#[command(name = "mediatool")]
#[command(about = "Inspect, demux, remux and encode media files with FFmpeg")]
struct Args {
    /// More logging, repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the versions of the linked FFmpeg libraries
    Version,

    /// List container formats
    Formats {
        /// Only formats that can be written
        #[arg(long, conflicts_with = "demuxers")]
        muxers: bool,
        /// Only formats that can be read
        #[arg(long)]
        demuxers: bool,
        /// Only formats with this name
        #[arg(long)]
        name: Option<String>,
        /// Only formats using this file extension
        #[arg(long)]
        extension: Option<String>,
    },

    /// List codec implementations
    Codecs {
        /// Only codecs of this media type
        #[arg(long)]
        kind: Option<MediaType>,
        /// Only encoders
        #[arg(long, conflicts_with = "decoders")]
        encoders: bool,
        /// Only decoders
        #[arg(long)]
        decoders: bool,
    },

    /// List pixel formats
    PixelFormats,

    /// List sample formats
    SampleFormats,

    /// List standard channel layouts
    ChannelLayouts,

    /// Print container and stream information
    Probe {
        input: String,
        /// Force the input format
        #[arg(short, long)]
        format: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Read every packet and count them per stream
    Demux {
        input: String,
        /// Force the input format
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Copy streams into another container without re-encoding
    Remux {
        input: String,
        output: PathBuf,
        /// Output format, guessed from the file name by default
        #[arg(short, long)]
        format: Option<String>,
        /// Input stream to copy, repeat for more (all by default)
        #[arg(short, long = "stream")]
        streams: Vec<usize>,
    },

    /// Decode a video stream and save frames as PNG images
    ExtractFrames {
        input: String,
        /// Directory for the images
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Video stream to decode, the best one by default
        #[arg(long)]
        stream: Option<usize>,
        /// Save every nth frame
        #[arg(long, default_value_t = 1)]
        every: usize,
        /// Stop after this many images
        #[arg(long)]
        max: Option<usize>,
        /// Scale images to this width
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Scale images to this height
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },

    /// Encode a sine tone into a file
    Tone {
        output: PathBuf,
        #[command(flatten)]
        tone: ToneArgs,
        /// Audio codec
        #[arg(long, default_value = "aac")]
        codec: CodecId,
        /// Sample format handed to the encoder
        #[arg(long, default_value = "fltp")]
        sample_format: SampleFormat,
        /// Sample rate in Hz
        #[arg(long, default_value_t = 22050)]
        rate: u32,
        /// Number of channels
        #[arg(long, default_value_t = 1)]
        channels: u16,
        /// Output format, guessed from the file name by default
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List audio devices
    Devices,

    /// Play a sine tone on an output device
    PlayTone {
        #[command(flatten)]
        tone: ToneArgs,
        /// Output device, the default one if omitted
        #[arg(long)]
        device: Option<String>,
        /// Sample rate in Hz, the device default if omitted
        #[arg(long)]
        rate: Option<u32>,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct ToneArgs {
    /// Tone frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    frequency: f64,
    /// Gain in dB relative to full scale
    #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
    gain: f64,
    /// Length in seconds
    #[arg(long, default_value_t = 2.0)]
    duration: f64,
}

fn level(args: &Args) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = level(&args);
    init_logging(level);

    let _runtime = Runtime::start().context("failed to initialize FFmpeg")?;
    media_native::set_log_level(level);

    let cancel = CancelToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if signal::ctrl_c().await.is_ok() {
                info!("interrupted, stopping");
                cancel.cancel();
            }
        }
    });

    let command = args.command;
    tokio::task::spawn_blocking(move || run(command, &cancel))
        .await
        .context("command panicked")?
}

fn run(command: Command, cancel: &CancelToken) -> anyhow::Result<()> {
    match command {
        Command::Version => registry::version(),
        Command::Formats {
            muxers,
            demuxers,
            name,
            extension,
        } => registry::formats(muxers, demuxers, name, extension),
        Command::Codecs {
            kind,
            encoders,
            decoders,
        } => registry::codecs(kind, encoders, decoders),
        Command::PixelFormats => registry::pixel_formats(),
        Command::SampleFormats => registry::sample_formats(),
        Command::ChannelLayouts => registry::channel_layouts(),
        Command::Probe {
            input,
            format,
            json,
        } => probe::probe(&input, format.as_deref(), json),
        Command::Demux { input, format } => pipeline::demux(&input, format.as_deref(), cancel),
        Command::Remux {
            input,
            output,
            format,
            streams,
        } => pipeline::remux(&input, &output, format, &streams, cancel),
        Command::ExtractFrames {
            input,
            output_dir,
            stream,
            every,
            max,
            width,
            height,
        } => pipeline::extract_frames(
            &input,
            &pipeline::FrameOptions {
                output_dir,
                stream,
                every,
                max,
                size: width.zip(height),
            },
            cancel,
        ),
        Command::Tone {
            output,
            tone,
            codec,
            sample_format,
            rate,
            channels,
            format,
        } => pipeline::tone(
            &output,
            &tone,
            codec,
            sample_format,
            rate,
            channels,
            format,
            cancel,
        ),
        Command::Devices => devices::list(),
        Command::PlayTone { tone, device, rate } => {
            devices::play_tone(&tone, device.as_deref(), rate, cancel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        let args = Args::try_parse_from(["mediatool", "version"]).unwrap();
        assert_eq!(level(&args), LevelFilter::WARN);
        let args = Args::try_parse_from(["mediatool", "-vv", "version"]).unwrap();
        assert_eq!(level(&args), LevelFilter::DEBUG);
        let args = Args::try_parse_from(["mediatool", "version", "--quiet"]).unwrap();
        assert_eq!(level(&args), LevelFilter::ERROR);
    }

    #[test]
    fn tone_arguments_parse() {
        let args = Args::try_parse_from([
            "mediatool",
            "tone",
            "out.m4a",
            "--gain",
            "-12",
            "--codec",
            "mp2",
            "--sample-format",
            "s16",
        ])
        .unwrap();
        let Command::Tone {
            tone,
            codec,
            sample_format,
            rate,
            ..
        } = args.command
        else {
            panic!("expected tone command");
        };
        assert_eq!(tone.gain, -12.0);
        assert_eq!(tone.frequency, 440.0);
        assert_eq!(codec, CodecId::Mp2);
        assert_eq!(sample_format, SampleFormat::S16);
        assert_eq!(rate, 22050);
    }

    #[test]
    fn remux_collects_streams() {
        let args =
            Args::try_parse_from(["mediatool", "remux", "in.mp4", "out.mkv", "-s", "0", "-s", "2"])
                .unwrap();
        let Command::Remux { streams, .. } = args.command else {
            panic!("expected remux command");
        };
        assert_eq!(streams, vec![0, 2]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(Args::try_parse_from(["mediatool", "codecs", "--kind", "smell"]).is_err());
        assert!(Args::try_parse_from(["mediatool", "extract-frames", "a.mp4", "--width", "10"]).is_err());
    }
}
