/*!
    Packet timing and its transfer between containers.
*/

use crate::{MediaDuration, Pts, Rational, Result};

/**
    Timing fields of a compressed packet.

    All timestamps are expressed in `time_base`. A packet read from one
    container must have its timing rescaled to the destination stream's
    time base before it is written to another container.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketTiming {
    /// Presentation timestamp, if known.
    pub pts: Option<Pts>,
    /// Decode timestamp, if known.
    pub dts: Option<Pts>,
    /// Duration, zero if unknown.
    pub duration: MediaDuration,
    /// Time base of the above values.
    pub time_base: Rational,
    /// Byte position in the source container, if known.
    pub position: Option<i64>,
}

impl PacketTiming {
    /**
        Rescale this timing to the given time base.

        PTS, DTS and duration are all rescaled, and the byte position is
        reset to unknown since it refers to the source container.

        # Errors

        Returns [`crate::Error::InvalidTimeBase`] if either time base has a
        zero component. This is never treated as a pass-through.
    */
    pub fn rescale(&self, to: Rational) -> Result<Self> {
        let from = self.time_base;
        Ok(Self {
            pts: self.pts.map(|p| p.rescale(from, to)).transpose()?,
            dts: self.dts.map(|d| d.rescale(from, to)).transpose()?,
            duration: self.duration.rescale(from, to)?,
            time_base: to,
            position: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn timing() -> PacketTiming {
        PacketTiming {
            pts: Some(Pts(3003)),
            dts: Some(Pts(0)),
            duration: MediaDuration(1001),
            time_base: Rational::new(1, 30000),
            position: Some(4096),
        }
    }

    #[test]
    fn rescale_all_fields_and_invalidate_position() {
        let out = timing().rescale(Rational::new(1, 90000)).unwrap();
        assert_eq!(out.pts, Some(Pts(9009)));
        assert_eq!(out.dts, Some(Pts(0)));
        assert_eq!(out.duration, MediaDuration(3003));
        assert_eq!(out.time_base, Rational::new(1, 90000));
        assert_eq!(out.position, None);
    }

    #[test]
    fn rescale_keeps_missing_timestamps_missing() {
        let mut t = timing();
        t.pts = None;
        t.dts = None;
        let out = t.rescale(Rational::new(1, 1000)).unwrap();
        assert_eq!(out.pts, None);
        assert_eq!(out.dts, None);
        assert_eq!(out.duration, MediaDuration(33));
    }

    #[test]
    fn rescale_to_same_time_base_only_drops_position() {
        let t = timing();
        let out = t.rescale(t.time_base).unwrap();
        assert_eq!(out.pts, t.pts);
        assert_eq!(out.dts, t.dts);
        assert_eq!(out.duration, t.duration);
        assert_eq!(out.position, None);
    }

    #[test]
    fn rescale_rejects_zero_time_base() {
        let mut t = timing();
        t.time_base = Rational { num: 0, den: 1 };
        assert!(matches!(
            t.rescale(Rational::new(1, 1000)),
            Err(Error::InvalidTimeBase { .. })
        ));
        assert!(timing().rescale(Rational { num: 1, den: 0 }).is_err());
    }
}
