/*!
    Process lifecycle of the native libraries.
*/

use std::sync::atomic::{AtomicU8, Ordering};

use ffmpeg_next::{ffi, log};
use media_types::{Error, Result};
use tracing::level_filters::LevelFilter;

use crate::NativeResultExt;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(IDLE);

/**
    Handle on the initialized native libraries.

    Created once per process with [`Runtime::start`], which initializes
    FFmpeg and its network layer. Dropping the handle shuts the network
    layer down; the runtime cannot be started again afterwards.

    Keep the handle alive for as long as inputs or outputs are in use,
    typically for the whole of `main`.
*/
#[derive(Debug)]
pub struct Runtime {
    _private: (),
}

impl Runtime {
    /**
        Initialize FFmpeg and its network layer.

        # Errors

        Returns a configuration error if a runtime was already started in
        this process, or a native error if FFmpeg fails to initialize.
    */
    pub fn start() -> Result<Self> {
        if STATE
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::config(
                "native runtime can only be started once per process",
            ));
        }

        if let Err(e) = ffmpeg_next::init().native() {
            STATE.store(IDLE, Ordering::SeqCst);
            return Err(e);
        }
        unsafe {
            ffi::avformat_network_init();
        }

        tracing::debug!(
            version = %crate::registry::versions().ffmpeg,
            "native runtime started"
        );
        Ok(Self { _private: () })
    }

    pub fn is_running() -> bool {
        STATE.load(Ordering::SeqCst) == RUNNING
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if STATE
            .compare_exchange(RUNNING, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            unsafe {
                ffi::avformat_network_deinit();
            }
            tracing::debug!("native runtime stopped");
        }
    }
}

/**
    Returns a configuration error unless a [`Runtime`] is running.
*/
pub fn ensure_started() -> Result<()> {
    match STATE.load(Ordering::SeqCst) {
        RUNNING => Ok(()),
        STOPPED => Err(Error::config("native runtime was already stopped")),
        _ => Err(Error::config(
            "native runtime not started, call Runtime::start first",
        )),
    }
}

/**
    Set FFmpeg's own log level to follow a tracing verbosity.
*/
pub fn set_log_level(filter: LevelFilter) {
    let level = if filter == LevelFilter::OFF {
        log::Level::Quiet
    } else if filter == LevelFilter::ERROR {
        log::Level::Error
    } else if filter == LevelFilter::WARN {
        log::Level::Warning
    } else if filter == LevelFilter::INFO {
        log::Level::Info
    } else if filter == LevelFilter::DEBUG {
        log::Level::Verbose
    } else {
        log::Level::Debug
    };
    log::set_level(level);
}

static_assertions::assert_impl_all!(Runtime: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    // The runtime is process-global, so the whole lifecycle is one test.
    #[test]
    fn lifecycle() {
        assert!(ensure_started().is_err());

        let runtime = Runtime::start().unwrap();
        assert!(Runtime::is_running());
        ensure_started().unwrap();

        let err = Runtime::start().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        drop(runtime);
        assert!(!Runtime::is_running());
        assert!(matches!(ensure_started(), Err(Error::Config { .. })));
        assert!(Runtime::start().is_err());
    }

    #[test]
    fn log_level_follows_verbosity() {
        set_log_level(LevelFilter::OFF);
        assert_eq!(unsafe { ffi::av_log_get_level() }, ffi::AV_LOG_QUIET);
        set_log_level(LevelFilter::WARN);
        assert_eq!(unsafe { ffi::av_log_get_level() }, ffi::AV_LOG_WARNING);
    }
}
