/*!
    Listings of what the linked FFmpeg supports.
*/

use media_native::registry::{self, CodecFilter, FormatFilter, FormatInfo};
use media_types::MediaType;

pub fn version() -> anyhow::Result<()> {
    let versions = registry::versions();
    println!("ffmpeg {}", versions.ffmpeg);
    for library in versions.libraries {
        println!("  {library}");
    }
    Ok(())
}

pub fn formats(
    muxers: bool,
    demuxers: bool,
    name: Option<String>,
    extension: Option<String>,
) -> anyhow::Result<()> {
    let mut filter = FormatFilter::new();
    if let Some(name) = name {
        filter = filter.name(name);
    }
    if let Some(extension) = extension {
        filter = filter.extension(extension);
    }

    let mut formats = Vec::new();
    if !muxers {
        formats.extend(registry::input_formats(&filter));
    }
    if !demuxers {
        formats.extend(registry::output_formats(&filter));
    }
    formats.sort_by(|a, b| a.name.cmp(&b.name));

    for format in &formats {
        println!("{}", format_line(format));
    }
    Ok(())
}

fn format_line(format: &FormatInfo) -> String {
    let direction = match format.direction {
        registry::Direction::Input => 'D',
        registry::Direction::Output => 'E',
    };
    let device = if format.device { 'd' } else { ' ' };
    format!(
        "{direction}{device} {:<24} {}",
        format.name, format.long_name
    )
}

pub fn codecs(kind: Option<MediaType>, encoders: bool, decoders: bool) -> anyhow::Result<()> {
    let both = !encoders && !decoders;
    let filter = CodecFilter {
        media_type: kind,
        encoders: encoders || both,
        decoders: decoders || both,
    };

    let mut codecs = registry::codecs(&filter);
    codecs.sort_by(|a, b| a.name.cmp(&b.name));
    for codec in codecs {
        println!(
            "{}{} {:<10} {:<20} {:<16} {}",
            if codec.decoder { 'D' } else { '.' },
            if codec.encoder { 'E' } else { '.' },
            codec.media_type,
            codec.name,
            codec.codec_name,
            codec.long_name
        );
    }
    Ok(())
}

pub fn pixel_formats() -> anyhow::Result<()> {
    for format in registry::pixel_formats() {
        let mut flags = String::new();
        flags.push(if format.known.is_some() { 'K' } else { '.' });
        flags.push(if format.planar { 'P' } else { '.' });
        flags.push(if format.rgb { 'R' } else { '.' });
        flags.push(if format.alpha { 'A' } else { '.' });
        flags.push(if format.hardware { 'H' } else { '.' });
        println!(
            "{flags} {:<20} {} components, {} bits",
            format.name, format.components, format.bits_per_pixel
        );
    }
    Ok(())
}

pub fn sample_formats() -> anyhow::Result<()> {
    for info in registry::sample_formats() {
        println!(
            "{:<6} {} bytes{}",
            info.format,
            info.bytes_per_sample,
            if info.planar { ", planar" } else { "" }
        );
    }
    Ok(())
}

pub fn channel_layouts() -> anyhow::Result<()> {
    for layout in registry::channel_layouts() {
        let marker = if layout.known.is_some() { '*' } else { ' ' };
        println!("{marker} {:<24} {} channels", layout.name, layout.channels);
    }
    Ok(())
}
