/*!
    Owned native channel layouts.
*/

use std::ffi::{CStr, CString, c_char, c_int};

use ffmpeg_next::ffi;
use media_types::{ChannelLayout, Error, Result};

use crate::check;

/**
    An owned `AVChannelLayout`, released with `av_channel_layout_uninit`.
*/
pub struct NativeLayout {
    inner: ffi::AVChannelLayout,
}

impl NativeLayout {
    fn unspecified() -> Self {
        // all-zero is AV_CHANNEL_ORDER_UNSPEC with no channels
        Self {
            inner: unsafe { std::mem::zeroed() },
        }
    }

    /**
        Build the native layout for a named layout.
    */
    pub fn from_layout(layout: ChannelLayout) -> Result<Self> {
        let name = CString::new(layout.name())
            .map_err(|_| Error::config(format!("invalid layout name {layout}")))?;
        let mut out = Self::unspecified();
        check(unsafe { ffi::av_channel_layout_from_string(&mut out.inner, name.as_ptr()) })
            .map_err(|_| Error::config(format!("channel layout {layout} is unknown to FFmpeg")))?;
        Ok(out)
    }

    /**
        FFmpeg's default layout for a channel count.
    */
    pub fn default_for(channels: u16) -> Self {
        let mut out = Self::unspecified();
        unsafe { ffi::av_channel_layout_default(&mut out.inner, channels as c_int) };
        out
    }

    /**
        Copy a layout owned by another native structure.

        # Safety

        `src` must point to an initialized `AVChannelLayout`.
    */
    pub unsafe fn copy_from(src: *const ffi::AVChannelLayout) -> Result<Self> {
        let mut out = Self::unspecified();
        check(unsafe { ffi::av_channel_layout_copy(&mut out.inner, src) })?;
        Ok(out)
    }

    /**
        Returns true if FFmpeg considers this layout valid.
    */
    pub fn is_valid(&self) -> bool {
        unsafe { ffi::av_channel_layout_check(&self.inner) == 1 }
    }

    pub fn channels(&self) -> u16 {
        self.inner.nb_channels.max(0) as u16
    }

    /**
        FFmpeg's description of this layout, e.g. `stereo` or `5.1(side)`.
    */
    pub fn describe(&self) -> Option<String> {
        unsafe { describe(&self.inner) }
    }

    /**
        The matching named layout, if this is one of the known ones.
    */
    pub fn layout(&self) -> Option<ChannelLayout> {
        self.describe()?.parse().ok()
    }

    pub fn as_ptr(&self) -> *const ffi::AVChannelLayout {
        &self.inner
    }

    /**
        Copy this layout into a native structure.

        # Safety

        `dst` must point to an `AVChannelLayout` that is either zeroed or
        initialized; its previous contents are released.
    */
    pub unsafe fn copy_to(&self, dst: *mut ffi::AVChannelLayout) -> Result<()> {
        check(unsafe { ffi::av_channel_layout_copy(dst, &self.inner) })?;
        Ok(())
    }

    /**
        Returns true if both describe the same channels in the same order.
    */
    pub fn same_as(&self, other: *const ffi::AVChannelLayout) -> bool {
        unsafe { ffi::av_channel_layout_compare(&self.inner, other) == 0 }
    }
}

impl Drop for NativeLayout {
    fn drop(&mut self) {
        unsafe { ffi::av_channel_layout_uninit(&mut self.inner) };
    }
}

impl std::fmt::Debug for NativeLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLayout")
            .field("channels", &self.channels())
            .field("description", &self.describe())
            .finish()
    }
}

// the layout owns its channel map, if any
unsafe impl Send for NativeLayout {}

/**
    Describe a native layout.

    # Safety

    `layout` must point to an initialized `AVChannelLayout`.
*/
pub(crate) unsafe fn describe(layout: *const ffi::AVChannelLayout) -> Option<String> {
    let mut buf = [0 as c_char; 128];
    let ret = unsafe { ffi::av_channel_layout_describe(layout, buf.as_mut_ptr(), buf.len() as _) };
    if ret < 0 {
        return None;
    }
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_str()
        .ok()
        .map(str::to_owned)
}

/**
    The named layout of a native layout, if it is one of the known ones.

    # Safety

    `layout` must point to an initialized `AVChannelLayout`.
*/
pub(crate) unsafe fn layout_of(layout: *const ffi::AVChannelLayout) -> Option<ChannelLayout> {
    unsafe { describe(layout) }?.parse().ok()
}
