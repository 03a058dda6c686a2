/*!
    Stream disposition flags.
*/

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Serialize;

use crate::ParseNameError;

bitflags! {
    /**
        Disposition of a stream within its container.

        Bit values match FFmpeg's `AV_DISPOSITION_*` constants, so the raw
        bits can be exchanged with the native library directly.
    */
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Disposition: u32 {
        const DEFAULT = 0x0001;
        const DUB = 0x0002;
        const ORIGINAL = 0x0004;
        const COMMENT = 0x0008;
        const LYRICS = 0x0010;
        const KARAOKE = 0x0020;
        const FORCED = 0x0040;
        const HEARING_IMPAIRED = 0x0080;
        const VISUAL_IMPAIRED = 0x0100;
        const CLEAN_EFFECTS = 0x0200;
        const ATTACHED_PIC = 0x0400;
        const TIMED_THUMBNAILS = 0x0800;
        const NON_DIEGETIC = 0x1000;
        const CAPTIONS = 0x10000;
        const DESCRIPTIONS = 0x20000;
        const METADATA = 0x40000;
        const DEPENDENT = 0x80000;
        const STILL_IMAGE = 0x100000;
    }
}

const NAMES: &[(Disposition, &str)] = &[
    (Disposition::DEFAULT, "default"),
    (Disposition::DUB, "dub"),
    (Disposition::ORIGINAL, "original"),
    (Disposition::COMMENT, "comment"),
    (Disposition::LYRICS, "lyrics"),
    (Disposition::KARAOKE, "karaoke"),
    (Disposition::FORCED, "forced"),
    (Disposition::HEARING_IMPAIRED, "hearing_impaired"),
    (Disposition::VISUAL_IMPAIRED, "visual_impaired"),
    (Disposition::CLEAN_EFFECTS, "clean_effects"),
    (Disposition::ATTACHED_PIC, "attached_pic"),
    (Disposition::TIMED_THUMBNAILS, "timed_thumbnails"),
    (Disposition::NON_DIEGETIC, "non_diegetic"),
    (Disposition::CAPTIONS, "captions"),
    (Disposition::DESCRIPTIONS, "descriptions"),
    (Disposition::METADATA, "metadata"),
    (Disposition::DEPENDENT, "dependent"),
    (Disposition::STILL_IMAGE, "still_image"),
];

impl Disposition {
    /**
        Names of the set flags, in bit order.
    */
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

/**
    Flags are joined with `|`, the empty set formats as an empty string.
*/
impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromStr for Disposition {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::empty();
        for part in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let (flag, _) = NAMES
                .iter()
                .find(|(_, name)| *name == part)
                .ok_or_else(|| ParseNameError::new("disposition", part))?;
            flags |= *flag;
        }
        Ok(flags)
    }
}

impl Serialize for Disposition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_native_values() {
        assert_eq!(Disposition::DEFAULT.bits(), 1);
        assert_eq!(Disposition::ATTACHED_PIC.bits(), 1 << 10);
        assert_eq!(Disposition::CAPTIONS.bits(), 1 << 16);
        assert_eq!(Disposition::STILL_IMAGE.bits(), 1 << 20);
    }

    #[test]
    fn every_flag_has_a_name() {
        assert_eq!(NAMES.len(), Disposition::all().iter().count());
        for (flag, name) in NAMES {
            assert_eq!(flag.to_string(), *name);
            assert_eq!(name.parse::<Disposition>().unwrap(), *flag);
        }
    }

    #[test]
    fn display_joins_flags() {
        let d = Disposition::DEFAULT | Disposition::FORCED;
        assert_eq!(d.to_string(), "default|forced");
        assert_eq!(Disposition::empty().to_string(), "");
    }

    #[test]
    fn parse_joined_flags() {
        let d: Disposition = "forced|default".parse().unwrap();
        assert_eq!(d, Disposition::DEFAULT | Disposition::FORCED);
        assert_eq!("".parse::<Disposition>().unwrap(), Disposition::empty());
        assert!("default|loud".parse::<Disposition>().is_err());
    }

    #[test]
    fn unknown_bits_are_kept_but_not_named() {
        let d = Disposition::from_bits_retain(0x1 | 0x8000);
        assert_eq!(d.to_string(), "default");
        assert_eq!(d.bits(), 0x8001);
    }
}
