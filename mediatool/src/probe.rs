/*!
    Container and stream summaries.
*/

use anyhow::Context;
use media_native::Options;
use media_types::{MediaInfo, MediaType, StreamInfo};

pub fn probe(url: &str, format: Option<&str>, json: bool) -> anyhow::Result<()> {
    let input = media_source::open(url, format, &Options::new())
        .with_context(|| format!("failed to open {url}"))?;
    let info = input.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", describe(&info));
    }
    Ok(())
}

fn describe(info: &MediaInfo) -> String {
    let mut out = format!("{}: {} ({})\n", info.url, info.format_name, info.format_long_name);
    if let Some(duration) = info.duration {
        out.push_str(&format!("  duration: {:.3}s\n", duration.as_secs_f64()));
    }
    if info.bit_rate > 0 {
        out.push_str(&format!("  bit rate: {} kb/s\n", info.bit_rate / 1000));
    }
    for entry in &info.metadata {
        out.push_str(&format!("  {}: {}\n", entry.key, entry.value));
    }
    for stream in &info.streams {
        out.push_str(&format!("  {}\n", describe_stream(stream)));
    }
    out
}

fn describe_stream(stream: &StreamInfo) -> String {
    let params = &stream.parameters;
    let codec = if params.codec_name.is_empty() {
        "unknown"
    } else {
        params.codec_name.as_str()
    };
    let mut line = format!("#{} {}: {codec}", stream.index, params.media_type);

    match params.media_type {
        MediaType::Video => {
            if let Some(format) = params.pixel_format {
                line.push_str(&format!(", {format}"));
            }
            line.push_str(&format!(", {}x{}", params.width, params.height));
            if let Some(rate) = params.frame_rate {
                line.push_str(&format!(", {:.3} fps", rate.to_f64()));
            }
        }
        MediaType::Audio => {
            line.push_str(&format!(", {} Hz", params.sample_rate));
            match params.channel_layout {
                Some(layout) => line.push_str(&format!(", {layout}")),
                None => line.push_str(&format!(", {} channels", params.channels)),
            }
            if let Some(format) = params.sample_format {
                line.push_str(&format!(", {format}"));
            }
        }
        _ => {}
    }
    if params.bit_rate > 0 {
        line.push_str(&format!(", {} kb/s", params.bit_rate / 1000));
    }
    line.push_str(&format!(" [tb {}]", stream.time_base));
    if !stream.disposition.is_empty() {
        line.push_str(&format!(" ({})", stream.disposition));
    }
    if let Some(language) = stream.metadata_value("language") {
        line.push_str(&format!(" {language}"));
    }
    line
}
