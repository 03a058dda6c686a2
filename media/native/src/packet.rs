/*!
    Native packets with their stream context.
*/

use media_types::{MediaDuration, MediaType, PacketTiming, Pts, Rational, Result};

/**
    A compressed packet read from, or destined for, a container.

    Wraps the native packet together with the time base its timestamps
    are expressed in and the kind of stream it belongs to. The packet owns
    its data; writing it to an output consumes it.
*/
pub struct Packet {
    inner: ffmpeg_next::Packet,
    time_base: Rational,
    media_type: MediaType,
}

impl Packet {
    pub fn new(inner: ffmpeg_next::Packet, time_base: Rational, media_type: MediaType) -> Self {
        Self {
            inner,
            time_base,
            media_type,
        }
    }

    /**
        An empty packet, used as a flush signal for decoders.
    */
    pub fn empty(time_base: Rational, media_type: MediaType) -> Self {
        Self::new(ffmpeg_next::Packet::empty(), time_base, media_type)
    }

    pub fn stream(&self) -> usize {
        self.inner.stream()
    }

    pub fn set_stream(&mut self, index: usize) {
        self.inner.set_stream(index);
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.inner.data()
    }

    pub fn is_key(&self) -> bool {
        self.inner.is_key()
    }

    /**
        Timing of this packet in its time base.
    */
    pub fn timing(&self) -> PacketTiming {
        let position = self.inner.position();
        PacketTiming {
            pts: self.inner.pts().map(Pts),
            dts: self.inner.dts().map(Pts),
            duration: MediaDuration(self.inner.duration()),
            time_base: self.time_base,
            position: (position >= 0).then_some(position as i64),
        }
    }

    /**
        Replace the timing of this packet, including its time base.
    */
    pub fn set_timing(&mut self, timing: &PacketTiming) {
        self.inner.set_pts(timing.pts.map(|p| p.0));
        self.inner.set_dts(timing.dts.map(|d| d.0));
        self.inner.set_duration(timing.duration.0);
        self.inner
            .set_position(timing.position.map_or(-1, |p| p as isize));
        self.time_base = timing.time_base;
    }

    /**
        Rescale the timestamps of this packet to another time base.

        The byte position is reset, since it refers to the source container.
    */
    pub fn rescale_to(&mut self, time_base: Rational) -> Result<()> {
        let timing = self.timing().rescale(time_base)?;
        self.set_timing(&timing);
        Ok(())
    }

    pub fn as_native(&self) -> &ffmpeg_next::Packet {
        &self.inner
    }

    pub fn as_native_mut(&mut self) -> &mut ffmpeg_next::Packet {
        &mut self.inner
    }

    pub fn into_native(self) -> ffmpeg_next::Packet {
        self.inner
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("stream", &self.stream())
            .field("media_type", &self.media_type)
            .field("size", &self.size())
            .field("timing", &self.timing())
            .finish()
    }
}

static_assertions::assert_impl_all!(Packet: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::Error;

    fn packet() -> Packet {
        let mut inner = ffmpeg_next::Packet::copy(&[0u8; 16]);
        inner.set_pts(Some(3003));
        inner.set_dts(Some(0));
        inner.set_duration(1001);
        inner.set_position(4096);
        inner.set_stream(1);
        Packet::new(inner, Rational::new(1, 30000), MediaType::Video)
    }

    #[test]
    fn timing_reads_native_fields() {
        let t = packet().timing();
        assert_eq!(t.pts, Some(Pts(3003)));
        assert_eq!(t.dts, Some(Pts(0)));
        assert_eq!(t.duration, MediaDuration(1001));
        assert_eq!(t.position, Some(4096));
        assert_eq!(t.time_base, Rational::new(1, 30000));
    }

    #[test]
    fn rescale_updates_native_packet() {
        let mut p = packet();
        p.rescale_to(Rational::new(1, 90000)).unwrap();
        assert_eq!(p.as_native().pts(), Some(9009));
        assert_eq!(p.as_native().dts(), Some(0));
        assert_eq!(p.as_native().duration(), 3003);
        assert_eq!(p.as_native().position(), -1);
        assert_eq!(p.time_base(), Rational::new(1, 90000));
        assert_eq!(p.size(), 16);
    }

    #[test]
    fn rescale_with_zero_time_base_leaves_packet_untouched() {
        let mut p = packet();
        let err = p.rescale_to(Rational { num: 0, den: 1 }).unwrap_err();
        assert!(matches!(err, Error::InvalidTimeBase { .. }));
        assert_eq!(p.as_native().pts(), Some(3003));
        assert_eq!(p.as_native().position(), 4096);
    }

    #[test]
    fn set_stream() {
        let mut p = packet();
        assert_eq!(p.stream(), 1);
        p.set_stream(0);
        assert_eq!(p.stream(), 0);
    }

    #[test]
    fn empty_packet_has_no_data() {
        let p = Packet::empty(Rational::new(1, 1000), MediaType::Audio);
        assert!(p.data().is_none());
        assert_eq!(p.timing().pts, None);
    }
}
