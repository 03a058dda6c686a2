/*!
    Shared types for the media crate ecosystem.

    This crate defines the types that cross crate boundaries. It has no dependency on FFmpeg, making it lightweight and enabling
    consumers to depend on it without pulling in FFmpeg bindings.

    # Core Types

    - [`Rational`] and [`rescale`] - Time bases and exact timestamp rescaling
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`PacketTiming`] - Packet timestamps that move between containers

    # Enumerations

    Every enumeration has a stable name table shared with FFmpeg, exposed through
    `name()`, `Display` and `FromStr`:

    - [`MediaType`] - Stream kinds
    - [`PixelFormat`], [`SampleFormat`], [`ChannelLayout`] - Frame formats
    - [`CodecId`] - Codec identifiers
    - [`Disposition`] - Stream disposition flags
    - [`MetadataKey`] - Well-known metadata keys

    # Stream Information

    - [`Parameters`] - Codec parameters of a stream or an encoding target
    - [`StreamInfo`] and [`MediaInfo`] - Stream and container metadata
    - [`VideoFormat`], [`AudioFormat`], [`FrameFormat`] - Frame format descriptors

    # Pipeline Control

    - [`Flow`] - Handler decision to continue or stop
    - [`Termination`] - Why a pipeline finished without error
    - [`CancelToken`] - Cooperative cancellation

    # Clock

    - [`AudioClock`] - Position derived from samples consumed by a device

    # Error Handling

    - [`Error`], [`ErrorKind`] and [`Result`]
*/

#[macro_use]
mod names;

mod clock;
mod codec;
mod disposition;
mod error;
mod format;
mod frame;
mod media_type;
mod metadata;
mod packet;
mod rational;
mod signal;
mod stream;
mod timestamp;

pub use clock::{AudioClock, Clock};
pub use codec::CodecId;
pub use disposition::Disposition;
pub use error::{Error, ErrorKind, Result};
pub use format::{ChannelLayout, PixelFormat, SampleFormat};
pub use frame::{AudioFormat, FrameFormat, VideoFormat};
pub use media_type::MediaType;
pub use metadata::{Metadata, MetadataKey};
pub use packet::PacketTiming;
pub use rational::{Rational, rescale};
pub use signal::{CancelToken, Flow, Termination};
pub use stream::{MediaInfo, Parameters, StreamInfo};
pub use timestamp::{MediaDuration, Pts};

/**
    Error returned when parsing a name that is not in an enumeration's table.
*/
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} name {name:?}")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub name: String,
}

impl ParseNameError {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}
