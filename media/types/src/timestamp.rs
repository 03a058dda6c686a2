/*!
    Timestamps and durations counted in time base ticks.
*/

use std::time::Duration;

use serde::Serialize;

use crate::{Rational, Result, rescale};

const NANOSECONDS: Rational = Rational {
    num: 1,
    den: 1_000_000_000,
};

/**
    A presentation or decoding timestamp, in ticks of its stream's time base.

    The value alone has no unit; every conversion takes the time base.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pts(pub i64);

/**
    A length of time, in ticks of a time base.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MediaDuration(pub i64);

macro_rules! ticks {
    ($ty:ident) => {
        impl $ty {
            /**
                Wall time of this value in `time_base`, rounded to the
                nearest nanosecond. Negative values and unset time bases
                give zero.
            */
            pub fn to_duration(self, time_base: Rational) -> Duration {
                ticks_to_duration(self.0, time_base)
            }

            /**
                The value closest to `duration` in `time_base`, or zero
                for an unset time base.
            */
            pub fn from_duration(duration: Duration, time_base: Rational) -> Self {
                Self(duration_to_ticks(duration, time_base))
            }

            /**
                Move this value from one time base to another, see
                [`rescale`].
            */
            #[inline]
            pub fn rescale(self, from: Rational, to: Rational) -> Result<Self> {
                rescale(self.0, from, to).map(Self)
            }
        }

        impl From<i64> for $ty {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$ty> for i64 {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

ticks!(Pts);
ticks!(MediaDuration);

fn ticks_to_duration(ticks: i64, time_base: Rational) -> Duration {
    if ticks <= 0 {
        return Duration::ZERO;
    }
    match rescale(ticks, time_base, NANOSECONDS) {
        Ok(nanos) if nanos > 0 => Duration::from_nanos(nanos as u64),
        _ => Duration::ZERO,
    }
}

fn duration_to_ticks(duration: Duration, time_base: Rational) -> i64 {
    let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
    rescale(nanos, NANOSECONDS, time_base).unwrap_or(0)
}
