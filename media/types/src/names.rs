/*!
    Name tables shared with FFmpeg.
*/

/**
    Implements `ALL`, `name()`, `Display`, `FromStr` and `Serialize` for an
    enumeration from a single table of `Variant => "name"` entries, so the
    two directions can never disagree.
*/
macro_rules! name_table {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /** Every value, in table order. */
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /** The name FFmpeg uses for this value. */
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::ParseNameError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err($crate::ParseNameError::new($kind, s)),
                }
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }
    };
}

#[cfg(test)]
pub(crate) fn assert_table_round_trips<T>(all: &[T])
where
    T: Copy + PartialEq + std::fmt::Debug + std::fmt::Display + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    let mut seen = std::collections::HashSet::new();
    for value in all {
        let name = value.to_string();
        assert!(seen.insert(name.clone()), "duplicate name {name:?}");
        assert_eq!(name.parse::<T>().unwrap(), *value);
    }
}
