/*!
    Conversions between `media-types` enumerations and native values.

    Values cross the boundary by name, through FFmpeg's own name tables,
    so a name in `media-types` is the single definition of each mapping.
    Native values without a counterpart convert to `None`.
*/

use std::ffi::{CStr, CString, c_char, c_int};

use ffmpeg_next::{codec, ffi, format, media};
use media_types::{CodecId, Error, MediaType, PixelFormat, Rational, Result, SampleFormat};

fn c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| Error::config(format!("invalid name {name:?}")))
}

/**
    Read a static C string returned by FFmpeg.

    # Safety

    `ptr` must be null or point to a NUL-terminated string that lives for
    the rest of the process.
*/
pub(crate) unsafe fn static_str(ptr: *const c_char) -> Option<&'static str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

pub fn pixel_to_native(format: PixelFormat) -> Result<format::Pixel> {
    let name = c_name(format.name())?;
    let raw = unsafe { ffi::av_get_pix_fmt(name.as_ptr()) };
    if raw == ffi::AVPixelFormat::AV_PIX_FMT_NONE {
        return Err(Error::config(format!(
            "pixel format {format} is not supported by the linked FFmpeg"
        )));
    }
    Ok(format::Pixel::from(raw))
}

pub fn pixel_from_native(pixel: format::Pixel) -> Option<PixelFormat> {
    let raw: ffi::AVPixelFormat = pixel.into();
    unsafe { static_str(ffi::av_get_pix_fmt_name(raw)) }?.parse().ok()
}

/**
    Interpret a raw `AVPixelFormat` value stored in an `int` field.
*/
pub fn pixel_from_raw(value: c_int) -> Option<format::Pixel> {
    if value < 0 || value >= ffi::AVPixelFormat::AV_PIX_FMT_NB as c_int {
        return None;
    }
    // in range of the generated enum
    let raw = unsafe { std::mem::transmute::<c_int, ffi::AVPixelFormat>(value) };
    Some(format::Pixel::from(raw))
}

/**
    Name FFmpeg uses for a native pixel format, including formats without
    a `media-types` counterpart.
*/
pub fn pixel_name(pixel: format::Pixel) -> &'static str {
    let raw: ffi::AVPixelFormat = pixel.into();
    unsafe { static_str(ffi::av_get_pix_fmt_name(raw)) }.unwrap_or("none")
}

pub fn sample_to_native(format: SampleFormat) -> Result<format::Sample> {
    let name = c_name(format.name())?;
    let raw = unsafe { ffi::av_get_sample_fmt(name.as_ptr()) };
    if raw == ffi::AVSampleFormat::AV_SAMPLE_FMT_NONE {
        return Err(Error::config(format!(
            "sample format {format} is not supported by the linked FFmpeg"
        )));
    }
    Ok(format::Sample::from(raw))
}

pub fn sample_from_native(sample: format::Sample) -> Option<SampleFormat> {
    sample_name(sample).parse().ok()
}

/**
    Interpret a raw `AVSampleFormat` value stored in an `int` field.
*/
pub fn sample_from_raw(value: c_int) -> Option<format::Sample> {
    if value < 0 || value >= ffi::AVSampleFormat::AV_SAMPLE_FMT_NB as c_int {
        return None;
    }
    let raw = unsafe { std::mem::transmute::<c_int, ffi::AVSampleFormat>(value) };
    Some(format::Sample::from(raw))
}

pub fn sample_name(sample: format::Sample) -> &'static str {
    let raw: ffi::AVSampleFormat = sample.into();
    unsafe { static_str(ffi::av_get_sample_fmt_name(raw)) }.unwrap_or("none")
}

pub fn codec_to_native(codec: CodecId) -> Result<codec::Id> {
    let name = c_name(codec.name())?;
    let descriptor = unsafe { ffi::avcodec_descriptor_get_by_name(name.as_ptr()) };
    if descriptor.is_null() {
        return Err(Error::config(format!(
            "codec {codec} is not known to the linked FFmpeg"
        )));
    }
    Ok(codec::Id::from(unsafe { (*descriptor).id }))
}

pub fn codec_from_native(id: codec::Id) -> Option<CodecId> {
    if id == codec::Id::None {
        return None;
    }
    id.name().parse().ok()
}

pub fn media_type_to_native(kind: MediaType) -> media::Type {
    match kind {
        MediaType::Video => media::Type::Video,
        MediaType::Audio => media::Type::Audio,
        MediaType::Data => media::Type::Data,
        MediaType::Subtitle => media::Type::Subtitle,
        MediaType::Attachment => media::Type::Attachment,
        _ => media::Type::Unknown,
    }
}

pub fn media_type_from_native(kind: media::Type) -> MediaType {
    match kind {
        media::Type::Video => MediaType::Video,
        media::Type::Audio => MediaType::Audio,
        media::Type::Data => MediaType::Data,
        media::Type::Subtitle => MediaType::Subtitle,
        media::Type::Attachment => MediaType::Attachment,
        media::Type::Unknown => MediaType::Unknown,
    }
}

/**
    Native rationals may be zero when unset, so this never panics.
*/
pub fn rational_from_native(r: ffmpeg_next::Rational) -> Rational {
    Rational {
        num: r.numerator(),
        den: r.denominator(),
    }
}

pub fn rational_to_native(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}
