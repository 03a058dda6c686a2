/*!
    Stream media kinds.
*/

/**
    Kind of media carried by a stream.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MediaType {
    #[default]
    Unknown,
    /// Video stream
    Video,
    /// Audio stream
    Audio,
    /// Opaque data stream (timecodes, telemetry)
    Data,
    /// Subtitle stream
    Subtitle,
    /// Attached file (fonts, cover art)
    Attachment,
}

name_table!(MediaType, "media type", {
    Unknown => "unknown",
    Video => "video",
    Audio => "audio",
    Data => "data",
    Subtitle => "subtitle",
    Attachment => "attachment",
});

impl MediaType {
    /**
        Returns true for the kinds that decode into frames.
    */
    pub const fn is_decodable(self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::assert_table_round_trips;

    #[test]
    fn names() {
        assert_table_round_trips(MediaType::ALL);
        assert_eq!(MediaType::Subtitle.to_string(), "subtitle");
        assert_eq!("audio".parse::<MediaType>().unwrap(), MediaType::Audio);
        assert!("Audio".parse::<MediaType>().is_err());
    }

    #[test]
    fn decodable() {
        assert!(MediaType::Video.is_decodable());
        assert!(MediaType::Audio.is_decodable());
        assert!(!MediaType::Subtitle.is_decodable());
        assert!(!MediaType::default().is_decodable());
    }
}
