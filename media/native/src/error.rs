/*!
    Mapping of native error codes.
*/

use std::ffi::c_int;

use media_types::{Error, Result};

/**
    Convert an `ffmpeg-next` error into a native [`Error`], keeping the
    numeric code and FFmpeg's description.
*/
pub fn native_error(err: ffmpeg_next::Error) -> Error {
    let code: c_int = err.into();
    Error::native(code, err.to_string())
}

/**
    Check the return code of a raw FFmpeg call.

    Non-negative codes are passed through, negative ones become a native
    [`Error`].
*/
pub fn check(code: c_int) -> Result<c_int> {
    if code < 0 {
        Err(native_error(ffmpeg_next::Error::from(code)))
    } else {
        Ok(code)
    }
}

/**
    Extension trait mapping `ffmpeg-next` results into the ecosystem's
    [`Result`].
*/
pub trait NativeResultExt<T> {
    fn native(self) -> Result<T>;
}

impl<T> NativeResultExt<T> for std::result::Result<T, ffmpeg_next::Error> {
    fn native(self) -> Result<T> {
        self.map_err(native_error)
    }
}
