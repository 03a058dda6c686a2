/*!
    Audio resampling contexts and native audio frame buffers.
*/

use std::ffi::c_int;
use std::ptr;

use ffmpeg_next::{ffi, frame};
use media_types::{AudioFormat, Error, Result};

use crate::convert::sample_to_native;
use crate::{NativeLayout, check};

/**
    An owned `SwrContext` converting from one observed source format to a
    fixed destination format.
*/
pub struct Resampler {
    ctx: *mut ffi::SwrContext,
    source_format: c_int,
    source_rate: c_int,
    source_layout: NativeLayout,
}

impl Resampler {
    /**
        Build a context converting frames shaped like `source` into `target`.

        # Errors

        Returns a native error if FFmpeg rejects the conversion, or a
        configuration error if the target cannot be expressed natively.
    */
    pub fn new(source: &frame::Audio, target: &AudioFormat) -> Result<Self> {
        let out_layout = NativeLayout::from_layout(target.layout)?;
        let out_format: ffi::AVSampleFormat = sample_to_native(target.format)?.into();

        let (source_format, source_rate, source_layout) = unsafe {
            let src = source.as_ptr();
            (
                (*src).format,
                (*src).sample_rate,
                NativeLayout::copy_from(&(*src).ch_layout)?,
            )
        };
        if !source_layout.is_valid() {
            return Err(Error::config("source audio frame has no valid channel layout"));
        }
        let in_format = crate::convert::sample_from_raw(source_format)
            .ok_or_else(|| Error::config("source audio frame has no sample format"))?;
        let in_format: ffi::AVSampleFormat = in_format.into();

        let mut ctx = ptr::null_mut();
        unsafe {
            check(ffi::swr_alloc_set_opts2(
                &mut ctx,
                out_layout.as_ptr(),
                out_format,
                target.sample_rate as c_int,
                source_layout.as_ptr(),
                in_format,
                source_rate,
                0,
                ptr::null_mut(),
            ))?;
            if ctx.is_null() {
                return Err(Error::alloc("resampling context"));
            }
            if let Err(e) = check(ffi::swr_init(ctx)) {
                ffi::swr_free(&mut ctx);
                return Err(e);
            }
        }

        Ok(Self {
            ctx,
            source_format,
            source_rate,
            source_layout,
        })
    }

    /**
        Returns true if `frame` has the source format this context was built for.
    */
    pub fn accepts(&self, frame: &frame::Audio) -> bool {
        unsafe {
            let src = frame.as_ptr();
            (*src).format == self.source_format
                && (*src).sample_rate == self.source_rate
                && self.source_layout.same_as(&(*src).ch_layout)
        }
    }

    /**
        Upper bound of output samples for `input` more input samples.
    */
    pub fn output_samples(&self, input: usize) -> usize {
        let n = unsafe { ffi::swr_get_out_samples(self.ctx, input as c_int) };
        n.max(0) as usize
    }

    /**
        Convert `src` into `dst`, an audio frame allocated with
        [`alloc_audio`] for `capacity` samples per channel. On return `dst`
        holds the converted samples only.
    */
    pub fn convert(
        &mut self,
        src: &frame::Audio,
        dst: &mut frame::Audio,
        capacity: usize,
    ) -> Result<()> {
        unsafe {
            (*dst.as_mut_ptr()).nb_samples = capacity as c_int;
            check(ffi::swr_convert_frame(self.ctx, dst.as_mut_ptr(), src.as_ptr()))?;
        }
        Ok(())
    }
}

impl Drop for Resampler {
    fn drop(&mut self) {
        unsafe { ffi::swr_free(&mut self.ctx) };
    }
}

impl std::fmt::Debug for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("source_rate", &self.source_rate)
            .field("source_layout", &self.source_layout)
            .finish_non_exhaustive()
    }
}

// the context is only touched through &mut self
unsafe impl Send for Resampler {}

/**
    Allocate sample buffers of `format` for `capacity` samples per channel,
    replacing any buffers `frame` held before.

    # Errors

    Configuration error if the format cannot be expressed natively, native
    error if allocation fails.
*/
pub fn alloc_audio(frame: &mut frame::Audio, format: &AudioFormat, capacity: usize) -> Result<()> {
    let layout = NativeLayout::from_layout(format.layout)?;
    let sample: ffi::AVSampleFormat = sample_to_native(format.format)?.into();
    unsafe {
        let ptr = frame.as_mut_ptr();
        ffi::av_frame_unref(ptr);
        (*ptr).format = sample as c_int;
        (*ptr).sample_rate = format.sample_rate as c_int;
        (*ptr).nb_samples = capacity.max(1) as c_int;
        layout.copy_to(&mut (*ptr).ch_layout)?;
        check(ffi::av_frame_get_buffer(ptr, 0))?;
    }
    Ok(())
}

/**
    Set the number of valid samples of an allocated audio frame.

    `samples` must not exceed the capacity the frame was allocated with.
*/
pub fn set_audio_samples(frame: &mut frame::Audio, samples: usize) {
    unsafe { (*frame.as_mut_ptr()).nb_samples = samples as c_int };
}

/**
    Copy timestamps and other properties of `src` onto `dst`, leaving the
    format and data of `dst` untouched.
*/
pub fn copy_frame_props(dst: &mut crate::Frame, src: &crate::Frame) -> Result<()> {
    let src = match src {
        crate::Frame::Video(v) => unsafe { v.as_ptr() },
        crate::Frame::Audio(a) => unsafe { a.as_ptr() },
    };
    let dst = match dst {
        crate::Frame::Video(v) => unsafe { v.as_mut_ptr() },
        crate::Frame::Audio(a) => unsafe { a.as_mut_ptr() },
    };
    check(unsafe { ffi::av_frame_copy_props(dst, src) })?;
    Ok(())
}
