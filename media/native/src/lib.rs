/*!
    FFmpeg boundary for the media crate ecosystem.

    Every interpretation of native memory in the ecosystem happens in this
    crate. The other crates talk to FFmpeg through `ffmpeg-next` handles and
    the narrow accessors exported here, and exchange data in the FFmpeg-free
    types of `media-types`.

    # Lifecycle

    FFmpeg's global state is initialized explicitly with [`Runtime::start`],
    once per process. Opening inputs and creating outputs requires a running
    runtime; see [`ensure_started`].

    # Contents

    - [`Runtime`] - Library and network initialization
    - [`NativeResultExt`] and [`check`] - Native error mapping
    - [`convert`] - Enum conversions through FFmpeg's name tables
    - [`NativeLayout`] - Owned native channel layout
    - [`Packet`] and [`Frame`] - Native packets and frames with their context
    - [`Resampler`] and [`alloc_audio`] - Audio conversion contexts and buffers
    - [`registry`] - Formats, codecs and library versions
    - [`Options`] - Key/value options passed to demuxers, muxers and codecs
    - [`open_input`] - Demuxer contexts
*/

pub use ffmpeg_next;

pub mod convert;
pub mod registry;

mod error;
mod frame;
mod layout;
mod open;
mod options;
mod packet;
mod params;
mod resample;
mod runtime;

pub use error::{NativeResultExt, check, native_error};
pub use frame::Frame;
pub use layout::NativeLayout;
pub use open::open_input;
pub use options::Options;
pub use packet::Packet;
pub use params::{
    audio_frame_format, clear_codec_tag, frame_channels, parameters, set_codec_layout,
    video_frame_format,
};
pub use resample::{Resampler, alloc_audio, copy_frame_props, set_audio_samples};
pub use runtime::{Runtime, ensure_started, set_log_level};
