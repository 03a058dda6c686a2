/*!
    Narrow accessors over native codec parameters and frames.
*/

use ffmpeg_next::{codec, format, frame, media};
use media_types::{AudioFormat, ChannelLayout, Error, Parameters, Result, VideoFormat};

use crate::convert::{
    codec_from_native, media_type_from_native, pixel_from_native, pixel_from_raw,
    sample_from_native, sample_from_raw,
};
use crate::NativeLayout;
use crate::layout::layout_of;

/**
    Read the codec parameters of a stream.

    Unset or unknown native values are reported as `None` or zero.
*/
pub fn parameters(native: &codec::Parameters) -> Parameters {
    let id = native.id();
    let medium = native.medium();

    let mut out = Parameters {
        media_type: media_type_from_native(medium),
        codec: codec_from_native(id),
        codec_name: if id == codec::Id::None {
            String::new()
        } else {
            id.name().to_string()
        },
        ..Parameters::default()
    };

    unsafe {
        let ptr = native.as_ptr();
        out.bit_rate = (*ptr).bit_rate;
        match medium {
            media::Type::Video => {
                out.width = (*ptr).width.max(0) as u32;
                out.height = (*ptr).height.max(0) as u32;
                out.pixel_format = pixel_from_raw((*ptr).format).and_then(pixel_from_native);
            }
            media::Type::Audio => {
                out.sample_format = sample_from_raw((*ptr).format).and_then(sample_from_native);
                out.channels = (*ptr).ch_layout.nb_channels.max(0) as u16;
                out.channel_layout = layout_of(&(*ptr).ch_layout);
                out.sample_rate = (*ptr).sample_rate.max(0) as u32;
            }
            _ => {}
        }
    }

    out
}

/**
    Format of a native video frame.

    # Errors

    Returns a configuration error if the pixel format has no `media-types`
    counterpart.
*/
pub fn video_frame_format(frame: &frame::Video) -> Result<VideoFormat> {
    let format = pixel_from_native(frame.format()).ok_or_else(|| {
        Error::config(format!(
            "unsupported pixel format {}",
            crate::convert::pixel_name(frame.format())
        ))
    })?;
    Ok(VideoFormat::new(format, frame.width(), frame.height()))
}

/**
    Format of a native audio frame.

    # Errors

    Returns a configuration error if the sample format or channel layout
    has no `media-types` counterpart.
*/
pub fn audio_frame_format(frame: &frame::Audio) -> Result<AudioFormat> {
    let format = sample_from_native(frame.format()).ok_or_else(|| {
        Error::config(format!(
            "unsupported sample format {}",
            crate::convert::sample_name(frame.format())
        ))
    })?;
    let layout = unsafe { layout_of(&(*frame.as_ptr()).ch_layout) }
        .or_else(|| media_types::ChannelLayout::from_channels(frame_channels(frame)))
        .ok_or_else(|| {
            Error::config(format!(
                "unsupported channel layout with {} channels",
                frame_channels(frame)
            ))
        })?;
    Ok(AudioFormat::new(format, layout, frame.rate()))
}

/**
    Number of channels of a native audio frame.
*/
pub fn frame_channels(frame: &frame::Audio) -> u16 {
    unsafe { (*frame.as_ptr()).ch_layout.nb_channels.max(0) as u16 }
}

/**
    Set the channel layout of a codec context being configured, typically
    an audio encoder before it is opened.
*/
pub fn set_codec_layout(ctx: &mut codec::Context, layout: ChannelLayout) -> Result<()> {
    let native = NativeLayout::from_layout(layout)?;
    unsafe { native.copy_to(&mut (*ctx.as_mut_ptr()).ch_layout) }
}

/**
    Clear the codec tag of an output stream whose parameters were copied
    from another container, letting the muxer pick its own tag.
*/
pub fn clear_codec_tag(stream: &mut format::stream::StreamMut<'_>) {
    unsafe {
        let params = (*stream.as_mut_ptr()).codecpar;
        if !params.is_null() {
            (*params).codec_tag = 0;
        }
    }
}
