/*!
    Error types for the media crate ecosystem.
*/

use std::fmt;

use crate::Rational;

/**
    Error type for the media crate ecosystem.

    Errors fall into three groups:

    - Configuration errors, raised before any native call is made
    - Native errors, carrying the numeric code returned by FFmpeg
    - Resource errors, when a native allocation fails
    - Device errors, reported by the platform audio layer

    Reaching the end of a stream is not an error, pipelines report it
    through [`crate::Termination`] instead.
*/
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid configuration, detected before calling into FFmpeg
    #[error("configuration error: {message}")]
    Config { message: String },
    /// Error code returned by FFmpeg
    #[error("{message} ({kind}, code {code})")]
    Native {
        code: i32,
        kind: ErrorKind,
        message: String,
    },
    /// A native allocation failed
    #[error("failed to allocate {what}")]
    Alloc { what: &'static str },
    /// A time base with a zero component was used for rescaling
    #[error("invalid time base for rescaling: {from} -> {to}")]
    InvalidTimeBase { from: Rational, to: Rational },
    /// The operation was cancelled through a [`crate::CancelToken`]
    #[error("operation cancelled")]
    Cancelled,
    /// The platform audio layer failed
    #[error("audio device error: {message}")]
    Device { message: String },
}

impl Error {
    /**
        Create a configuration error with the given message.
    */
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /**
        Create a native error from an FFmpeg return code and its description.
    */
    pub fn native(code: i32, message: impl Into<String>) -> Self {
        Self::Native {
            code,
            kind: ErrorKind::from_code(code),
            message: message.into(),
        }
    }

    /**
        Create an allocation error for the named native object.
    */
    pub fn alloc(what: &'static str) -> Self {
        Self::Alloc { what }
    }

    /**
        Create an audio device error.
    */
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /**
        Returns the category of this error, if it came from FFmpeg.
    */
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Native { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /**
        Returns true if FFmpeg reported end of stream.
    */
    pub fn is_eof(&self) -> bool {
        self.kind() == Some(ErrorKind::EndOfStream)
    }

    /**
        Returns true if FFmpeg asked to try again later.
    */
    pub fn is_again(&self) -> bool {
        self.kind() == Some(ErrorKind::Again)
    }
}

/**
    Result type alias for the media crate ecosystem.
*/
pub type Result<T> = std::result::Result<T, Error>;

/**
    Stable category of an FFmpeg error code.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    EndOfStream,
    Again,
    ResourceExhausted,
    InvalidData,
    InvalidArgument,
    NotFound,
    PermissionDenied,
    Io,
    DecoderNotFound,
    EncoderNotFound,
    DemuxerNotFound,
    MuxerNotFound,
    StreamNotFound,
    ProtocolNotFound,
    FilterNotFound,
    OptionNotFound,
    PatchWelcome,
    Bug,
    Exit,
    Other,
}

// FFERRTAG: negated little-endian four character code
const fn tag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    -((a as i32) | ((b as i32) << 8) | ((c as i32) << 16) | ((d as i32) << 24))
}

const AVERROR_EOF: i32 = tag(b'E', b'O', b'F', b' ');
const AVERROR_INVALIDDATA: i32 = tag(b'I', b'N', b'D', b'A');
const AVERROR_DECODER_NOT_FOUND: i32 = tag(0xF8, b'D', b'E', b'C');
const AVERROR_ENCODER_NOT_FOUND: i32 = tag(0xF8, b'E', b'N', b'C');
const AVERROR_DEMUXER_NOT_FOUND: i32 = tag(0xF8, b'D', b'E', b'M');
const AVERROR_MUXER_NOT_FOUND: i32 = tag(0xF8, b'M', b'U', b'X');
const AVERROR_STREAM_NOT_FOUND: i32 = tag(0xF8, b'S', b'T', b'R');
const AVERROR_PROTOCOL_NOT_FOUND: i32 = tag(0xF8, b'P', b'R', b'O');
const AVERROR_FILTER_NOT_FOUND: i32 = tag(0xF8, b'F', b'I', b'L');
const AVERROR_OPTION_NOT_FOUND: i32 = tag(0xF8, b'O', b'P', b'T');
const AVERROR_BSF_NOT_FOUND: i32 = tag(0xF8, b'B', b'S', b'F');
const AVERROR_PATCHWELCOME: i32 = tag(b'P', b'A', b'W', b'E');
const AVERROR_BUG: i32 = tag(b'B', b'U', b'G', b'!');
const AVERROR_BUG2: i32 = tag(b'B', b'U', b'G', b' ');
const AVERROR_EXIT: i32 = tag(b'E', b'X', b'I', b'T');

const EPERM: i32 = 1;
const ENOENT: i32 = 2;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EACCES: i32 = 13;
const EINVAL: i32 = 22;
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
const EAGAIN: i32 = 35;
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
const EAGAIN: i32 = 11;

impl ErrorKind {
    /**
        Map a negative FFmpeg return code to its category.

        Codes FFmpeg derives from `errno` are matched against their negated
        POSIX values, the rest against FFmpeg's own tags.
    */
    pub const fn from_code(code: i32) -> Self {
        match code {
            AVERROR_EOF => Self::EndOfStream,
            AVERROR_INVALIDDATA => Self::InvalidData,
            AVERROR_DECODER_NOT_FOUND => Self::DecoderNotFound,
            AVERROR_ENCODER_NOT_FOUND => Self::EncoderNotFound,
            AVERROR_DEMUXER_NOT_FOUND => Self::DemuxerNotFound,
            AVERROR_MUXER_NOT_FOUND => Self::MuxerNotFound,
            AVERROR_STREAM_NOT_FOUND => Self::StreamNotFound,
            AVERROR_PROTOCOL_NOT_FOUND => Self::ProtocolNotFound,
            AVERROR_FILTER_NOT_FOUND | AVERROR_BSF_NOT_FOUND => Self::FilterNotFound,
            AVERROR_OPTION_NOT_FOUND => Self::OptionNotFound,
            AVERROR_PATCHWELCOME => Self::PatchWelcome,
            AVERROR_BUG | AVERROR_BUG2 => Self::Bug,
            AVERROR_EXIT => Self::Exit,
            c if c == -EAGAIN => Self::Again,
            c if c == -ENOMEM => Self::ResourceExhausted,
            c if c == -EINVAL => Self::InvalidArgument,
            c if c == -ENOENT => Self::NotFound,
            c if c == -EPERM || c == -EACCES => Self::PermissionDenied,
            c if c == -EIO => Self::Io,
            _ => Self::Other,
        }
    }

    /**
        Stable lowercase name of this category.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::EndOfStream => "end-of-stream",
            Self::Again => "again",
            Self::ResourceExhausted => "resource-exhausted",
            Self::InvalidData => "invalid-data",
            Self::InvalidArgument => "invalid-argument",
            Self::NotFound => "not-found",
            Self::PermissionDenied => "permission-denied",
            Self::Io => "io",
            Self::DecoderNotFound => "decoder-not-found",
            Self::EncoderNotFound => "encoder-not-found",
            Self::DemuxerNotFound => "demuxer-not-found",
            Self::MuxerNotFound => "muxer-not-found",
            Self::StreamNotFound => "stream-not-found",
            Self::ProtocolNotFound => "protocol-not-found",
            Self::FilterNotFound => "filter-not-found",
            Self::OptionNotFound => "option-not-found",
            Self::PatchWelcome => "not-implemented",
            Self::Bug => "internal-bug",
            Self::Exit => "exit",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::config("stream 3 does not exist");
        assert_eq!(format!("{e}"), "configuration error: stream 3 does not exist");

        let e = Error::native(AVERROR_EOF, "End of file");
        assert_eq!(format!("{e}"), "End of file (end-of-stream, code -541478725)");

        let e = Error::alloc("frame");
        assert_eq!(format!("{e}"), "failed to allocate frame");

        let e = Error::InvalidTimeBase {
            from: Rational { num: 0, den: 0 },
            to: Rational::new(1, 1000),
        };
        assert_eq!(format!("{e}"), "invalid time base for rescaling: 0/0 -> 1/1000");

        assert_eq!(format!("{}", Error::Cancelled), "operation cancelled");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(format!("{e}").contains("file not found"));
    }

    #[test]
    fn error_is_eof() {
        assert!(Error::native(AVERROR_EOF, "eof").is_eof());
        assert!(!Error::config("test").is_eof());
        assert!(!Error::Cancelled.is_eof());
    }

    #[test]
    fn error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let e = Error::Io(io_err);
        assert!(StdError::source(&e).is_some());
        assert!(StdError::source(&Error::Cancelled).is_none());
    }

    #[test]
    fn tags_match_ffmpeg_values() {
        assert_eq!(AVERROR_EOF, -0x2046_4F45);
        assert_eq!(AVERROR_EOF, -541478725);
        assert_eq!(AVERROR_INVALIDDATA, -1094995529);
        assert_eq!(AVERROR_DECODER_NOT_FOUND, -1128613112);
        assert_eq!(AVERROR_EXIT, -1414092869);
    }

    #[test]
    fn kinds_from_codes() {
        assert_eq!(ErrorKind::from_code(AVERROR_EOF), ErrorKind::EndOfStream);
        assert_eq!(ErrorKind::from_code(-EAGAIN), ErrorKind::Again);
        assert_eq!(ErrorKind::from_code(-ENOMEM), ErrorKind::ResourceExhausted);
        assert_eq!(ErrorKind::from_code(AVERROR_INVALIDDATA), ErrorKind::InvalidData);
        assert_eq!(ErrorKind::from_code(-EINVAL), ErrorKind::InvalidArgument);
        assert_eq!(ErrorKind::from_code(-ENOENT), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_code(-EACCES), ErrorKind::PermissionDenied);
        assert_eq!(
            ErrorKind::from_code(AVERROR_ENCODER_NOT_FOUND),
            ErrorKind::EncoderNotFound
        );
        assert_eq!(ErrorKind::from_code(AVERROR_BUG), ErrorKind::Bug);
        assert_eq!(ErrorKind::from_code(-123456), ErrorKind::Other);
    }

    #[test]
    fn native_error_keeps_code() {
        let e = Error::native(-EAGAIN, "Resource temporarily unavailable");
        assert!(e.is_again());
        assert!(matches!(e, Error::Native { code, .. } if code == -EAGAIN));
    }
}
