/*!
    Pixel formats, sample formats and channel layouts.
*/

/**
    Video pixel formats.

    This is a subset of formats commonly encountered in media pipelines.
    Not all FFmpeg pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Packed YUV 4:2:2, Y0 Cb Y1 Cr
    Yuyv422,
    /// Packed YUV 4:2:2, Cb Y0 Cr Y1
    Uyvy422,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:1:0, 9bpp
    Yuv410p,
    /// Planar YUV 4:1:1, 12bpp
    Yuv411p,
    /// Planar YUV 4:2:0, full range (JPEG)
    Yuvj420p,
    /// Planar YUV 4:2:2, full range (JPEG)
    Yuvj422p,
    /// Planar YUV 4:4:4, full range (JPEG)
    Yuvj444p,
    /// Grayscale, 8bpp
    Gray8,
    /// Grayscale, 16bpp little-endian
    Gray16le,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Semi-planar YUV 4:2:0 with swapped chroma
    Nv21,
    /// Packed ARGB, 32bpp
    Argb,
    /// Packed RGBA, 32bpp (common for display)
    Rgba,
    /// Packed ABGR, 32bpp
    Abgr,
    /// Packed BGRA, 32bpp (common for display on macOS/Windows)
    Bgra,
    /// Planar YUV 4:2:0, 10-bit (HDR content)
    Yuv420p10le,
    /// Planar YUV 4:2:2, 10-bit
    Yuv422p10le,
    /// Planar YUV 4:4:4, 10-bit
    Yuv444p10le,
    /// Semi-planar YUV 4:2:0, 10-bit (hardware decoder output)
    P010le,
}

name_table!(PixelFormat, "pixel format", {
    Yuv420p => "yuv420p",
    Yuyv422 => "yuyv422",
    Uyvy422 => "uyvy422",
    Rgb24 => "rgb24",
    Bgr24 => "bgr24",
    Yuv422p => "yuv422p",
    Yuv444p => "yuv444p",
    Yuv410p => "yuv410p",
    Yuv411p => "yuv411p",
    Yuvj420p => "yuvj420p",
    Yuvj422p => "yuvj422p",
    Yuvj444p => "yuvj444p",
    Gray8 => "gray",
    Gray16le => "gray16le",
    Nv12 => "nv12",
    Nv21 => "nv21",
    Argb => "argb",
    Rgba => "rgba",
    Abgr => "abgr",
    Bgra => "bgra",
    Yuv420p10le => "yuv420p10le",
    Yuv422p10le => "yuv422p10le",
    Yuv444p10le => "yuv444p10le",
    P010le => "p010le",
});

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv410p => 9,
            Self::Yuv420p | Self::Yuvj420p | Self::Yuv411p | Self::Nv12 | Self::Nv21 => 12,
            Self::Yuv420p10le | Self::P010le => 15,
            Self::Yuv422p
            | Self::Yuvj422p
            | Self::Yuyv422
            | Self::Uyvy422
            | Self::Gray16le => 16,
            Self::Yuv422p10le => 20,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p | Self::Yuvj444p => 24,
            Self::Yuv444p10le => 30,
            Self::Argb | Self::Rgba | Self::Abgr | Self::Bgra => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p
            | Self::Yuv422p
            | Self::Yuv444p
            | Self::Yuv410p
            | Self::Yuv411p
            | Self::Yuvj420p
            | Self::Yuvj422p
            | Self::Yuvj444p
            | Self::Yuv420p10le
            | Self::Yuv422p10le
            | Self::Yuv444p10le => true,
            Self::Nv12 | Self::Nv21 | Self::P010le => true, // semi-planar counts as planar
            Self::Yuyv422
            | Self::Uyvy422
            | Self::Rgb24
            | Self::Bgr24
            | Self::Gray8
            | Self::Gray16le
            | Self::Argb
            | Self::Rgba
            | Self::Abgr
            | Self::Bgra => false,
        }
    }

    /**
        Returns true if this is an RGB family format.
    */
    pub const fn is_rgb(self) -> bool {
        matches!(
            self,
            Self::Rgb24 | Self::Bgr24 | Self::Argb | Self::Rgba | Self::Abgr | Self::Bgra
        )
    }
}

/**
    Audio sample formats.

    Packed formats interleave channels in one buffer; planar formats keep
    one buffer per channel.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Signed 64-bit integer
    S64,
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    U8p,
    S16p,
    S32p,
    S64p,
    F32p,
    F64p,
}

name_table!(SampleFormat, "sample format", {
    U8 => "u8",
    S16 => "s16",
    S32 => "s32",
    S64 => "s64",
    F32 => "flt",
    F64 => "dbl",
    U8p => "u8p",
    S16p => "s16p",
    S32p => "s32p",
    S64p => "s64p",
    F32p => "fltp",
    F64p => "dblp",
});

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::U8p => 1,
            Self::S16 | Self::S16p => 2,
            Self::S32 | Self::S32p | Self::F32 | Self::F32p => 4,
            Self::S64 | Self::S64p | Self::F64 | Self::F64p => 8,
        }
    }

    /**
        Returns true if this is a floating-point format.
    */
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64 | Self::F32p | Self::F64p)
    }

    /**
        Returns true if each channel is stored in its own plane.
    */
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Self::U8p | Self::S16p | Self::S32p | Self::S64p | Self::F32p | Self::F64p
        )
    }

    /**
        Returns the interleaved variant of this format.
    */
    pub const fn packed(self) -> Self {
        match self {
            Self::U8 | Self::U8p => Self::U8,
            Self::S16 | Self::S16p => Self::S16,
            Self::S32 | Self::S32p => Self::S32,
            Self::S64 | Self::S64p => Self::S64,
            Self::F32 | Self::F32p => Self::F32,
            Self::F64 | Self::F64p => Self::F64,
        }
    }

    /**
        Returns the planar variant of this format.
    */
    pub const fn planar(self) -> Self {
        match self {
            Self::U8 | Self::U8p => Self::U8p,
            Self::S16 | Self::S16p => Self::S16p,
            Self::S32 | Self::S32p => Self::S32p,
            Self::S64 | Self::S64p => Self::S64p,
            Self::F32 | Self::F32p => Self::F32p,
            Self::F64 | Self::F64p => Self::F64p,
        }
    }
}

/**
    Audio channel layout.

    Names follow FFmpeg's standard layout table, so a layout can be handed
    to the native library by name.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Left and right channels
    Stereo,
    /// Stereo plus low frequency
    TwoPointOne,
    /// Left, right and center
    Surround,
    /// Left, right, center and back center
    FourPointZero,
    /// Front and back pairs
    Quad,
    /// 5.0 with back surrounds
    FivePointZero,
    /// 5.0 with side surrounds
    FivePointZeroSide,
    /// 5.1 with back surrounds
    FivePointOne,
    /// 5.1 with side surrounds
    FivePointOneSide,
    SixPointOne,
    SevenPointOne,
}

name_table!(ChannelLayout, "channel layout", {
    Mono => "mono",
    Stereo => "stereo",
    TwoPointOne => "2.1",
    Surround => "3.0",
    FourPointZero => "4.0",
    Quad => "quad",
    FivePointZero => "5.0",
    FivePointZeroSide => "5.0(side)",
    FivePointOne => "5.1",
    FivePointOneSide => "5.1(side)",
    SixPointOne => "6.1",
    SevenPointOne => "7.1",
});

impl ChannelLayout {
    /**
        Returns the number of channels.
    */
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::TwoPointOne | Self::Surround => 3,
            Self::FourPointZero | Self::Quad => 4,
            Self::FivePointZero | Self::FivePointZeroSide => 5,
            Self::FivePointOne | Self::FivePointOneSide => 6,
            Self::SixPointOne => 7,
            Self::SevenPointOne => 8,
        }
    }

    /**
        Returns the default layout for a channel count, matching the
        layout FFmpeg picks for the same count.
    */
    pub fn from_channels(channels: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.channels() == channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::assert_table_round_trips;

    #[test]
    fn pixel_format_bits_per_pixel() {
        assert_eq!(PixelFormat::Yuv420p.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Bgra.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Rgb24.bits_per_pixel(), 24);
        assert_eq!(PixelFormat::Gray8.bits_per_pixel(), 8);
    }

    #[test]
    fn pixel_format_is_planar() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Bgra.is_planar());
        assert!(!PixelFormat::Rgb24.is_planar());
        assert!(!PixelFormat::Yuyv422.is_planar());
    }

    #[test]
    fn pixel_format_names() {
        assert_table_round_trips(PixelFormat::ALL);
        assert_eq!(PixelFormat::Yuv420p.name(), "yuv420p");
        assert_eq!(PixelFormat::Gray8.to_string(), "gray");
        assert_eq!("rgb24".parse::<PixelFormat>().unwrap(), PixelFormat::Rgb24);
        let err = "rgb23".parse::<PixelFormat>().unwrap_err();
        assert_eq!(err.to_string(), "unknown pixel format name \"rgb23\"");
    }

    #[test]
    fn sample_format_bytes_per_sample() {
        assert_eq!(SampleFormat::U8.bytes_per_sample(), 1);
        assert_eq!(SampleFormat::S16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::F64p.bytes_per_sample(), 8);
    }

    #[test]
    fn sample_format_planarity() {
        for format in SampleFormat::ALL {
            assert!(format.planar().is_planar());
            assert!(!format.packed().is_planar());
            assert_eq!(format.packed().planar(), format.planar());
            assert_eq!(format.is_float(), format.packed().is_float());
        }
        assert_eq!(SampleFormat::F32.planar(), SampleFormat::F32p);
        assert_eq!(SampleFormat::S16p.packed(), SampleFormat::S16);
    }

    #[test]
    fn sample_format_names() {
        assert_table_round_trips(SampleFormat::ALL);
        assert_eq!(SampleFormat::F32p.name(), "fltp");
        assert_eq!("dbl".parse::<SampleFormat>().unwrap(), SampleFormat::F64);
        assert!("float".parse::<SampleFormat>().is_err());
    }

    #[test]
    fn channel_layout_names() {
        assert_table_round_trips(ChannelLayout::ALL);
        assert_eq!(ChannelLayout::FivePointOne.name(), "5.1");
        assert_eq!("mono".parse::<ChannelLayout>().unwrap(), ChannelLayout::Mono);
    }

    #[test]
    fn channel_layout_defaults() {
        assert_eq!(ChannelLayout::from_channels(1), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_channels(2), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_channels(3), Some(ChannelLayout::TwoPointOne));
        assert_eq!(ChannelLayout::from_channels(6), Some(ChannelLayout::FivePointOne));
        assert_eq!(ChannelLayout::from_channels(8), Some(ChannelLayout::SevenPointOne));
        assert_eq!(ChannelLayout::from_channels(0), None);
        assert_eq!(ChannelLayout::from_channels(24), None);
        for layout in ChannelLayout::ALL {
            let default = ChannelLayout::from_channels(layout.channels()).unwrap();
            assert_eq!(default.channels(), layout.channels());
        }
    }

    #[test]
    fn serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&SampleFormat::F32p).unwrap(),
            "\"fltp\""
        );
        assert_eq!(
            serde_json::to_string(&ChannelLayout::FivePointOneSide).unwrap(),
            "\"5.1(side)\""
        );
    }
}
