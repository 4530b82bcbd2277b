//! Platform identifiers and platform sets.
//!
//! A platform id is a `<arch>-<os>` string such as `x86_64-linux` or
//! `aarch64-darwin`. Package metadata restricts where a package may be built
//! with a [`PlatformSet`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::util::InternedString;

/// The set of platforms a package supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlatformSet {
    /// No restriction.
    #[default]
    All,
    /// Excluded everywhere.
    None,
    /// Only the listed platforms.
    Specific(BTreeSet<InternedString>),
}

impl PlatformSet {
    /// Build a set from platform ids. An empty list is normalized to `None`.
    pub fn specific<I, S>(platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<InternedString>,
    {
        let set: BTreeSet<InternedString> = platforms.into_iter().map(Into::into).collect();
        if set.is_empty() {
            PlatformSet::None
        } else {
            PlatformSet::Specific(set)
        }
    }

    /// Whether `platform` is a member of this set.
    pub fn contains(&self, platform: InternedString) -> bool {
        match self {
            PlatformSet::All => true,
            PlatformSet::None => false,
            PlatformSet::Specific(set) => set.contains(&platform),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PlatformSet::None)
    }
}

impl fmt::Display for PlatformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformSet::All => write!(f, "all"),
            PlatformSet::None => write!(f, "none"),
            PlatformSet::Specific(set) => {
                let names: Vec<&str> = set.iter().map(|p| p.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PlatformSetRepr {
    Keyword(String),
    List(Vec<InternedString>),
}

impl Serialize for PlatformSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            PlatformSet::All => PlatformSetRepr::Keyword("all".to_string()),
            PlatformSet::None => PlatformSetRepr::Keyword("none".to_string()),
            PlatformSet::Specific(set) => PlatformSetRepr::List(set.iter().copied().collect()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlatformSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PlatformSetRepr::deserialize(deserializer)? {
            PlatformSetRepr::Keyword(kw) => match kw.as_str() {
                "all" => Ok(PlatformSet::All),
                "none" => Ok(PlatformSet::None),
                other => Err(serde::de::Error::custom(format!(
                    "unknown platform set `{}` (expected \"all\", \"none\", or a list)",
                    other
                ))),
            },
            PlatformSetRepr::List(list) => Ok(PlatformSet::specific(list)),
        }
    }
}

/// The platform id of the machine rdeps is running on.
pub fn host_platform() -> InternedString {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    InternedString::new(format!("{}-{}", std::env::consts::ARCH, os))
}
