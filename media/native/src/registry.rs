/*!
    Formats, codecs and library versions known to the linked FFmpeg.
*/

use std::collections::HashSet;
use std::ffi::{c_char, c_uint, c_void};
use std::ptr;

use ffmpeg_next::{codec, ffi, media};
use media_types::{ChannelLayout, CodecId, MediaType, PixelFormat, SampleFormat};

use crate::convert::{
    codec_from_native, media_type_from_native, sample_to_native, static_str,
};
use crate::layout::describe;

/**
    Direction of a container format.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Demuxer or input device
    Input,
    /// Muxer or output device
    Output,
}

/**
    A demuxer, muxer or device.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    /// Comma-separated short names, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub name: String,
    pub long_name: String,
    pub extensions: Vec<String>,
    pub mime_types: Vec<String>,
    pub direction: Direction,
    /// Capture or playback device rather than a file format.
    pub device: bool,
    /// Default codecs of a muxer.
    pub default_video_codec: Option<String>,
    pub default_audio_codec: Option<String>,
    pub default_subtitle_codec: Option<String>,
}

impl FormatInfo {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name.split(',').map(str::trim).filter(|n| !n.is_empty())
    }
}

/**
    Filter applied when listing formats.

    All set criteria must match. Name, extension and mime type are
    compared case-insensitively against each entry of the format's lists.
*/
#[derive(Clone, Debug)]
pub struct FormatFilter {
    pub name: Option<String>,
    pub extension: Option<String>,
    pub mime_type: Option<String>,
    pub files: bool,
    pub devices: bool,
}

impl Default for FormatFilter {
    fn default() -> Self {
        Self {
            name: None,
            extension: None,
            mime_type: None,
            files: true,
            devices: true,
        }
    }
}

impl FormatFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into().trim_start_matches('.').to_string());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn files_only(mut self) -> Self {
        self.files = true;
        self.devices = false;
        self
    }

    pub fn devices_only(mut self) -> Self {
        self.files = false;
        self.devices = true;
        self
    }

    pub fn matches(&self, format: &FormatInfo) -> bool {
        let kind_ok = if format.device { self.devices } else { self.files };
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|n| format.names().any(|f| f.eq_ignore_ascii_case(n)));
        let ext_ok = self
            .extension
            .as_deref()
            .is_none_or(|e| format.extensions.iter().any(|f| f.eq_ignore_ascii_case(e)));
        let mime_ok = self
            .mime_type
            .as_deref()
            .is_none_or(|m| format.mime_types.iter().any(|f| f.eq_ignore_ascii_case(m)));
        kind_ok && name_ok && ext_ok && mime_ok
    }
}

fn split_list(ptr: *const c_char) -> Vec<String> {
    unsafe { static_str(ptr) }
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn owned(ptr: *const c_char) -> String {
    unsafe { static_str(ptr) }.unwrap_or_default().to_owned()
}

fn codec_name(id: ffi::AVCodecID) -> Option<String> {
    let id = codec::Id::from(id);
    (id != codec::Id::None).then(|| id.name().to_owned())
}

fn input_devices() -> HashSet<usize> {
    let mut set = HashSet::new();
    unsafe {
        let mut dev: *const ffi::AVInputFormat = ptr::null();
        loop {
            dev = ffi::av_input_audio_device_next(dev as _) as *const _;
            if dev.is_null() {
                break;
            }
            set.insert(dev as usize);
        }
        let mut dev: *const ffi::AVInputFormat = ptr::null();
        loop {
            dev = ffi::av_input_video_device_next(dev as _) as *const _;
            if dev.is_null() {
                break;
            }
            set.insert(dev as usize);
        }
    }
    set
}

fn output_devices() -> HashSet<usize> {
    let mut set = HashSet::new();
    unsafe {
        let mut dev: *const ffi::AVOutputFormat = ptr::null();
        loop {
            dev = ffi::av_output_audio_device_next(dev as _) as *const _;
            if dev.is_null() {
                break;
            }
            set.insert(dev as usize);
        }
        let mut dev: *const ffi::AVOutputFormat = ptr::null();
        loop {
            dev = ffi::av_output_video_device_next(dev as _) as *const _;
            if dev.is_null() {
                break;
            }
            set.insert(dev as usize);
        }
    }
    set
}

/**
    List demuxers and input devices matching the filter.
*/
pub fn input_formats(filter: &FormatFilter) -> Vec<FormatInfo> {
    let devices = input_devices();
    let mut out = Vec::new();
    let mut opaque: *mut c_void = ptr::null_mut();
    loop {
        let fmt = unsafe { ffi::av_demuxer_iterate(&mut opaque) };
        if fmt.is_null() {
            break;
        }
        let info = unsafe {
            FormatInfo {
                name: owned((*fmt).name),
                long_name: owned((*fmt).long_name),
                extensions: split_list((*fmt).extensions),
                mime_types: split_list((*fmt).mime_type),
                direction: Direction::Input,
                device: devices.contains(&(fmt as usize)),
                default_video_codec: None,
                default_audio_codec: None,
                default_subtitle_codec: None,
            }
        };
        if filter.matches(&info) {
            out.push(info);
        }
    }
    out
}

/**
    List muxers and output devices matching the filter.
*/
pub fn output_formats(filter: &FormatFilter) -> Vec<FormatInfo> {
    let devices = output_devices();
    let mut out = Vec::new();
    let mut opaque: *mut c_void = ptr::null_mut();
    loop {
        let fmt = unsafe { ffi::av_muxer_iterate(&mut opaque) };
        if fmt.is_null() {
            break;
        }
        let info = unsafe {
            FormatInfo {
                name: owned((*fmt).name),
                long_name: owned((*fmt).long_name),
                extensions: split_list((*fmt).extensions),
                mime_types: split_list((*fmt).mime_type),
                direction: Direction::Output,
                device: devices.contains(&(fmt as usize)),
                default_video_codec: codec_name((*fmt).video_codec),
                default_audio_codec: codec_name((*fmt).audio_codec),
                default_subtitle_codec: codec_name((*fmt).subtitle_codec),
            }
        };
        if filter.matches(&info) {
            out.push(info);
        }
    }
    out
}

/**
    A codec implementation.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecInfo {
    /// Implementation name, e.g. `libopus` or `aac`.
    pub name: String,
    pub long_name: String,
    /// Name of the codec this implements, e.g. `opus`.
    pub codec_name: String,
    pub id: Option<CodecId>,
    pub media_type: MediaType,
    pub encoder: bool,
    pub decoder: bool,
}

/**
    Filter applied when listing codecs.
*/
#[derive(Clone, Debug, Default)]
pub struct CodecFilter {
    pub media_type: Option<MediaType>,
    pub encoders: bool,
    pub decoders: bool,
}

impl CodecFilter {
    /**
        Both encoders and decoders of any kind.
    */
    pub fn all() -> Self {
        Self {
            media_type: None,
            encoders: true,
            decoders: true,
        }
    }

    pub fn of_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn matches(&self, codec: &CodecInfo) -> bool {
        let role_ok = (self.encoders && codec.encoder) || (self.decoders && codec.decoder);
        role_ok && self.media_type.is_none_or(|t| t == codec.media_type)
    }
}

/**
    List codec implementations matching the filter.
*/
pub fn codecs(filter: &CodecFilter) -> Vec<CodecInfo> {
    let mut out = Vec::new();
    let mut opaque: *mut c_void = ptr::null_mut();
    loop {
        let codec = unsafe { ffi::av_codec_iterate(&mut opaque) };
        if codec.is_null() {
            break;
        }
        let info = unsafe {
            let id = codec::Id::from((*codec).id);
            CodecInfo {
                name: owned((*codec).name),
                long_name: owned((*codec).long_name),
                codec_name: id.name().to_owned(),
                id: codec_from_native(id),
                media_type: media_type_from_native(media::Type::from((*codec).type_)),
                encoder: ffi::av_codec_is_encoder(codec) != 0,
                decoder: ffi::av_codec_is_decoder(codec) != 0,
            }
        };
        if filter.matches(&info) {
            out.push(info);
        }
    }
    out
}

/**
    A native pixel format.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelFormatInfo {
    pub name: String,
    pub components: u8,
    pub bits_per_pixel: u32,
    pub planar: bool,
    pub rgb: bool,
    pub alpha: bool,
    pub hardware: bool,
    /// The `media-types` counterpart, if there is one.
    pub known: Option<PixelFormat>,
}

/**
    List every pixel format known to FFmpeg.
*/
pub fn pixel_formats() -> Vec<PixelFormatInfo> {
    let mut out = Vec::new();
    let mut desc: *const ffi::AVPixFmtDescriptor = ptr::null();
    loop {
        desc = unsafe { ffi::av_pix_fmt_desc_next(desc) };
        if desc.is_null() {
            break;
        }
        let info = unsafe {
            let flags = (*desc).flags as u64;
            let name = owned((*desc).name);
            PixelFormatInfo {
                known: name.parse().ok(),
                name,
                components: (*desc).nb_components,
                bits_per_pixel: ffi::av_get_bits_per_pixel(desc).max(0) as u32,
                planar: flags & ffi::AV_PIX_FMT_FLAG_PLANAR as u64 != 0,
                rgb: flags & ffi::AV_PIX_FMT_FLAG_RGB as u64 != 0,
                alpha: flags & ffi::AV_PIX_FMT_FLAG_ALPHA as u64 != 0,
                hardware: flags & ffi::AV_PIX_FMT_FLAG_HWACCEL as u64 != 0,
            }
        };
        out.push(info);
    }
    out
}

/**
    A sample format as FFmpeg describes it.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleFormatInfo {
    pub format: SampleFormat,
    pub bytes_per_sample: usize,
    pub planar: bool,
}

/**
    List the sample formats of `media-types` as the linked FFmpeg reports
    them.
*/
pub fn sample_formats() -> Vec<SampleFormatInfo> {
    SampleFormat::ALL
        .iter()
        .filter_map(|&format| {
            let native = sample_to_native(format).ok()?;
            Some(SampleFormatInfo {
                format,
                bytes_per_sample: native.bytes(),
                planar: native.is_planar(),
            })
        })
        .collect()
}

/**
    A standard channel layout.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelLayoutInfo {
    pub name: String,
    pub channels: u16,
    pub known: Option<ChannelLayout>,
}

/**
    List FFmpeg's standard channel layouts.
*/
pub fn channel_layouts() -> Vec<ChannelLayoutInfo> {
    let mut out = Vec::new();
    let mut opaque: *mut c_void = ptr::null_mut();
    loop {
        let layout = unsafe { ffi::av_channel_layout_standard(&mut opaque) };
        if layout.is_null() {
            break;
        }
        let Some(name) = (unsafe { describe(layout) }) else {
            continue;
        };
        out.push(ChannelLayoutInfo {
            known: name.parse().ok(),
            channels: unsafe { (*layout).nb_channels.max(0) as u16 },
            name,
        });
    }
    out
}

/**
    Version of one native library.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibraryVersion {
    pub name: &'static str,
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl LibraryVersion {
    fn new(name: &'static str, version: c_uint) -> Self {
        Self {
            name,
            major: version >> 16,
            minor: (version >> 8) & 0xff,
            micro: version & 0xff,
        }
    }
}

impl std::fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.{}.{}", self.name, self.major, self.minor, self.micro)
    }
}

/**
    Versions of the linked native libraries.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versions {
    /// FFmpeg release, e.g. `7.1` or a git describe string.
    pub ffmpeg: String,
    pub libraries: Vec<LibraryVersion>,
}

pub fn versions() -> Versions {
    unsafe {
        Versions {
            ffmpeg: owned(ffi::av_version_info()),
            libraries: vec![
                LibraryVersion::new("libavutil", ffi::avutil_version()),
                LibraryVersion::new("libavcodec", ffi::avcodec_version()),
                LibraryVersion::new("libavformat", ffi::avformat_version()),
                LibraryVersion::new("libavdevice", ffi::avdevice_version()),
                LibraryVersion::new("libswscale", ffi::swscale_version()),
                LibraryVersion::new("libswresample", ffi::swresample_version()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mp4_demuxer_by_extension() {
        let formats = input_formats(&FormatFilter::new().extension(".mp4"));
        assert!(formats.iter().any(|f| f.names().any(|n| n == "mp4")));
        assert!(formats.iter().all(|f| f.direction == Direction::Input));
    }

    #[test]
    fn finds_muxer_by_name_with_default_codecs() {
        let formats = output_formats(&FormatFilter::new().name("adts"));
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].default_audio_codec.as_deref(), Some("aac"));
        assert!(!formats[0].device);
    }

    #[test]
    fn filter_rejects_unknown_names() {
        assert!(input_formats(&FormatFilter::new().name("no-such-format")).is_empty());
    }

    #[test]
    fn filter_matches_by_kind() {
        let file = FormatInfo {
            name: "wav".into(),
            long_name: "WAV / WAVE".into(),
            extensions: vec!["wav".into()],
            mime_types: vec![],
            direction: Direction::Input,
            device: false,
            default_video_codec: None,
            default_audio_codec: None,
            default_subtitle_codec: None,
        };
        assert!(FormatFilter::new().matches(&file));
        assert!(FormatFilter::new().files_only().matches(&file));
        assert!(!FormatFilter::new().devices_only().matches(&file));
        assert!(FormatFilter::new().extension("WAV").matches(&file));
        assert!(!FormatFilter::new().mime_type("audio/x-wav").matches(&file));
    }

    #[test]
    fn lists_aac_encoder() {
        let encoders = codecs(&CodecFilter {
            encoders: true,
            ..CodecFilter::default()
        });
        assert!(
            encoders
                .iter()
                .any(|c| c.id == Some(CodecId::Aac) && c.encoder)
        );
        assert!(encoders.iter().all(|c| c.encoder));
    }

    #[test]
    fn codec_filter_by_type() {
        let audio = codecs(&CodecFilter::all().of_type(MediaType::Audio));
        assert!(!audio.is_empty());
        assert!(audio.iter().all(|c| c.media_type == MediaType::Audio));
    }

    #[test]
    fn pixel_formats_include_known_formats() {
        let formats = pixel_formats();
        let yuv = formats.iter().find(|f| f.name == "yuv420p").unwrap();
        assert_eq!(yuv.known, Some(PixelFormat::Yuv420p));
        assert_eq!(yuv.bits_per_pixel, 12);
        assert!(yuv.planar);
        let rgba = formats.iter().find(|f| f.name == "rgba").unwrap();
        assert!(rgba.rgb && rgba.alpha && !rgba.planar);
        for &known in PixelFormat::ALL {
            let native = formats.iter().find(|f| f.known == Some(known)).unwrap();
            assert_eq!(native.bits_per_pixel, known.bits_per_pixel(), "{known}");
        }
    }

    #[test]
    fn sample_formats_agree_with_native() {
        let formats = sample_formats();
        assert_eq!(formats.len(), SampleFormat::ALL.len());
        for info in formats {
            assert_eq!(info.bytes_per_sample, info.format.bytes_per_sample());
            assert_eq!(info.planar, info.format.is_planar());
        }
    }

    #[test]
    fn standard_layouts_include_named_layouts() {
        let layouts = channel_layouts();
        for &known in ChannelLayout::ALL {
            let info = layouts.iter().find(|l| l.known == Some(known)).unwrap();
            assert_eq!(info.channels, known.channels());
        }
    }

    #[test]
    fn versions_are_reported() {
        let versions = versions();
        assert!(!versions.ffmpeg.is_empty());
        let avcodec = versions
            .libraries
            .iter()
            .find(|l| l.name == "libavcodec")
            .unwrap();
        assert!(avcodec.major >= 59);
        assert!(avcodec.to_string().starts_with("libavcodec "));
    }
}
