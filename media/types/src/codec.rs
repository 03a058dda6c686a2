/*!
    Codec identification.
*/

use crate::MediaType;

/**
    Codec identifiers.

    This is a subset of codecs commonly used in media pipelines.
    Not all FFmpeg codecs are represented; names match FFmpeg's codec
    descriptor names.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video codecs
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
    /// AV1
    Av1,
    /// MPEG-4 Part 2
    Mpeg4,
    /// MPEG-2 Video
    Mpeg2Video,
    /// MPEG-1 Video
    Mpeg1Video,
    /// Motion JPEG
    Mjpeg,
    Png,
    Gif,
    /// Uncompressed video
    RawVideo,
    Theora,
    /// Apple ProRes
    ProRes,
    /// Avid DNxHD
    Dnxhd,
    /// FFmpeg lossless video
    Ffv1,

    // Audio codecs
    /// AAC (Advanced Audio Coding)
    Aac,
    /// Opus
    Opus,
    /// MP3 (MPEG Audio Layer 3)
    Mp3,
    /// MP2 (MPEG Audio Layer 2)
    Mp2,
    /// Vorbis
    Vorbis,
    /// FLAC (Free Lossless Audio Codec)
    Flac,
    /// Apple Lossless
    Alac,
    /// AC-3 (Dolby Digital)
    Ac3,
    /// E-AC-3 (Dolby Digital Plus)
    Eac3,
    /// PCM unsigned 8-bit
    PcmU8,
    /// PCM signed 16-bit little-endian
    PcmS16Le,
    /// PCM signed 16-bit big-endian
    PcmS16Be,
    /// PCM signed 24-bit little-endian
    PcmS24Le,
    /// PCM signed 32-bit little-endian
    PcmS32Le,
    /// PCM 32-bit float little-endian
    PcmF32Le,
    /// PCM 64-bit float little-endian
    PcmF64Le,
    /// G.711 A-law
    PcmAlaw,
    /// G.711 mu-law
    PcmMulaw,

    // Subtitle codecs
    /// SubRip (.srt)
    SubRip,
    /// Advanced SubStation Alpha
    Ass,
    /// MP4 timed text
    MovText,
    WebVtt,
    DvdSubtitle,
    DvbSubtitle,
    /// Blu-ray presentation graphics
    HdmvPgs,
}

name_table!(CodecId, "codec", {
    H264 => "h264",
    H265 => "hevc",
    Vp8 => "vp8",
    Vp9 => "vp9",
    Av1 => "av1",
    Mpeg4 => "mpeg4",
    Mpeg2Video => "mpeg2video",
    Mpeg1Video => "mpeg1video",
    Mjpeg => "mjpeg",
    Png => "png",
    Gif => "gif",
    RawVideo => "rawvideo",
    Theora => "theora",
    ProRes => "prores",
    Dnxhd => "dnxhd",
    Ffv1 => "ffv1",
    Aac => "aac",
    Opus => "opus",
    Mp3 => "mp3",
    Mp2 => "mp2",
    Vorbis => "vorbis",
    Flac => "flac",
    Alac => "alac",
    Ac3 => "ac3",
    Eac3 => "eac3",
    PcmU8 => "pcm_u8",
    PcmS16Le => "pcm_s16le",
    PcmS16Be => "pcm_s16be",
    PcmS24Le => "pcm_s24le",
    PcmS32Le => "pcm_s32le",
    PcmF32Le => "pcm_f32le",
    PcmF64Le => "pcm_f64le",
    PcmAlaw => "pcm_alaw",
    PcmMulaw => "pcm_mulaw",
    SubRip => "subrip",
    Ass => "ass",
    MovText => "mov_text",
    WebVtt => "webvtt",
    DvdSubtitle => "dvd_subtitle",
    DvbSubtitle => "dvb_subtitle",
    HdmvPgs => "hdmv_pgs_subtitle",
});

impl CodecId {
    /**
        Returns the kind of media this codec carries.
    */
    pub const fn media_type(self) -> MediaType {
        match self {
            Self::H264
            | Self::H265
            | Self::Vp8
            | Self::Vp9
            | Self::Av1
            | Self::Mpeg4
            | Self::Mpeg2Video
            | Self::Mpeg1Video
            | Self::Mjpeg
            | Self::Png
            | Self::Gif
            | Self::RawVideo
            | Self::Theora
            | Self::ProRes
            | Self::Dnxhd
            | Self::Ffv1 => MediaType::Video,
            Self::Aac
            | Self::Opus
            | Self::Mp3
            | Self::Mp2
            | Self::Vorbis
            | Self::Flac
            | Self::Alac
            | Self::Ac3
            | Self::Eac3
            | Self::PcmU8
            | Self::PcmS16Le
            | Self::PcmS16Be
            | Self::PcmS24Le
            | Self::PcmS32Le
            | Self::PcmF32Le
            | Self::PcmF64Le
            | Self::PcmAlaw
            | Self::PcmMulaw => MediaType::Audio,
            Self::SubRip
            | Self::Ass
            | Self::MovText
            | Self::WebVtt
            | Self::DvdSubtitle
            | Self::DvbSubtitle
            | Self::HdmvPgs => MediaType::Subtitle,
        }
    }

    /**
        Returns true if this is a video codec.
    */
    pub const fn is_video(self) -> bool {
        matches!(self.media_type(), MediaType::Video)
    }

    /**
        Returns true if this is an audio codec.
    */
    pub const fn is_audio(self) -> bool {
        matches!(self.media_type(), MediaType::Audio)
    }

    /**
        Returns true if this is a lossless codec.
    */
    pub const fn is_lossless(self) -> bool {
        matches!(
            self,
            Self::Flac
                | Self::Alac
                | Self::Ffv1
                | Self::Png
                | Self::RawVideo
                | Self::PcmU8
                | Self::PcmS16Le
                | Self::PcmS16Be
                | Self::PcmS24Le
                | Self::PcmS32Le
                | Self::PcmF32Le
                | Self::PcmF64Le
        )
    }
}
