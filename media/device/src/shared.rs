/*!
    State shared between a device handle and its callback.
*/

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use media_types::SampleFormat;
use parking_lot::Mutex;
use tracing::warn;

/// Default ring buffer length, in seconds of audio.
pub(crate) const DEFAULT_BUFFER_SECONDS: f64 = 1.0;

/**
    Flags and counters written by the device callback and read by the
    pipeline side. The data callback only touches atomics; the error slot
    is written from the error callback.
*/
#[derive(Debug, Default)]
pub(crate) struct Shared {
    closed: AtomicBool,
    /// Bytes the callback could not move through the ring buffer.
    dropped: AtomicU64,
    /// Last error reported by the platform layer, set off the audio path.
    error: Mutex<Option<String>>,
}

impl Shared {
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn add_dropped(&self, bytes: usize) {
        self.dropped.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn set_error(&self, error: impl std::fmt::Display) {
        let message = error.to_string();
        warn!(error = %message, "audio stream error");
        *self.error.lock() = Some(message);
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }
}

/**
    Fill `bytes` with the silence value of an interleaved sample format.
*/
pub(crate) fn fill_silence(bytes: &mut [u8], format: SampleFormat) {
    // unsigned samples are centered on 0x80, the rest on zero
    let value = if format == SampleFormat::U8 { 0x80 } else { 0 };
    bytes.fill(value);
}

/**
    Largest length not above `len` that holds whole sample frames.
*/
pub(crate) fn whole_frames(len: usize, frame_bytes: usize) -> usize {
    if frame_bytes == 0 {
        return 0;
    }
    len - len % frame_bytes
}

static_assertions::assert_impl_all!(Shared: Send, Sync);
