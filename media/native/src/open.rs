/*!
    Demuxer context creation.
*/

use std::ffi::CString;
use std::ptr;

use ffmpeg_next::{Dictionary, ffi, format};
use media_types::{Error, Result};
use tracing::warn;

use crate::{Options, check, native_error};

/**
    Open `url` with an optional forced demuxer and probe its streams.

    Options the demuxer does not consume are logged and dropped.

    # Errors

    - Configuration error if `url` or `format` contain NUL bytes, or the
      forced format is unknown
    - Native error if opening or probing fails
*/
pub fn open_input(url: &str, format: Option<&str>, options: &Options) -> Result<format::context::Input> {
    let url_c = CString::new(url).map_err(|_| Error::config("input url contains NUL"))?;

    let input_format = match format {
        Some(name) => {
            let name_c = CString::new(name)
                .map_err(|_| Error::config("input format name contains NUL"))?;
            let found = unsafe { ffi::av_find_input_format(name_c.as_ptr()) };
            if found.is_null() {
                return Err(Error::config(format!("unknown input format {name:?}")));
            }
            found
        }
        None => ptr::null(),
    };

    unsafe {
        let mut ps = ptr::null_mut();
        let mut opts = options.to_dictionary().disown();
        let ret = ffi::avformat_open_input(&mut ps, url_c.as_ptr(), input_format as _, &mut opts);
        let unused = Dictionary::own(opts);
        for (key, _) in unused.iter() {
            warn!(url, option = key, "demuxer ignored option");
        }
        check(ret)?;

        let ret = ffi::avformat_find_stream_info(ps, ptr::null_mut());
        if ret < 0 {
            ffi::avformat_close_input(&mut ps);
            return Err(native_error(ffmpeg_next::Error::from(ret)));
        }
        Ok(format::context::Input::wrap(ps))
    }
}
