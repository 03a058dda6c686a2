/*!
    Playback position of device streams.
*/

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const RUNNING: u8 = 0;
const FINISHING: u8 = 1;
const FINISHED: u8 = 2;

/**
    A source of the current playback position.
*/
pub trait Clock: Send + Sync {
    fn position(&self) -> Duration;

    /// Jump to `position`, e.g. after the pipeline seeks.
    fn reset_to(&self, position: Duration);
}

/**
    Position of an audio stream, counted in samples the device consumed.

    The device callback reports consumed samples with
    [`AudioClock::add_samples`]. Once the stream has played out and is
    marked finished, the position keeps advancing with wall time from
    where the samples ended.

    Every method is lock-free, so the clock can be driven from a realtime
    audio callback.
*/
#[derive(Debug)]
pub struct AudioClock {
    sample_rate: u32,
    channels: u16,
    origin: Instant,
    // interleaved samples, all channels counted
    consumed: AtomicU64,
    state: AtomicU8,
    // valid once state is FINISHED
    end_samples: AtomicU64,
    end_nanos: AtomicU64,
}

impl AudioClock {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            origin: Instant::now(),
            consumed: AtomicU64::new(0),
            state: AtomicU8::new(RUNNING),
            end_samples: AtomicU64::new(0),
            end_nanos: AtomicU64::new(0),
        }
    }

    /**
        Count `count` interleaved samples as played. Ignored once the
        clock is finished.
    */
    pub fn add_samples(&self, count: u64) {
        if self.state.load(Ordering::Acquire) == RUNNING {
            self.consumed.fetch_add(count, Ordering::Relaxed);
        }
    }

    /**
        Freeze the sample count and continue on wall time. Only the first
        call has an effect.
    */
    pub fn mark_finished(&self) {
        if self
            .state
            .compare_exchange(RUNNING, FINISHING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let elapsed = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.end_samples
            .store(self.consumed.load(Ordering::Relaxed), Ordering::Relaxed);
        self.end_nanos.store(elapsed, Ordering::Relaxed);
        self.state.store(FINISHED, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    pub fn samples_consumed(&self) -> u64 {
        self.consumed.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    fn to_duration(&self, samples: u64) -> Duration {
        let per_second = u128::from(self.sample_rate) * u128::from(self.channels);
        if per_second == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(samples) * 1_000_000_000 / per_second;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn to_samples(&self, position: Duration) -> u64 {
        let frames = position.as_nanos() * u128::from(self.sample_rate) / 1_000_000_000;
        u64::try_from(frames * u128::from(self.channels)).unwrap_or(u64::MAX)
    }
}

impl Clock for AudioClock {
    fn position(&self) -> Duration {
        if self.state.load(Ordering::Acquire) == FINISHED {
            let samples = self.end_samples.load(Ordering::Relaxed);
            let ended_at = Duration::from_nanos(self.end_nanos.load(Ordering::Relaxed));
            let since_end = self.origin.elapsed().saturating_sub(ended_at);
            return self.to_duration(samples) + since_end;
        }
        self.to_duration(self.consumed.load(Ordering::Relaxed))
    }

    fn reset_to(&self, position: Duration) {
        self.consumed
            .store(self.to_samples(position), Ordering::Relaxed);
        self.state.store(RUNNING, Ordering::Release);
    }
}

static_assertions::assert_impl_all!(AudioClock: Send, Sync, Clock);
