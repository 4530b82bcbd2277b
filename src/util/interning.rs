//! Interned package names.
//!
//! Registries hold tens of thousands of records and every build input refers
//! back to another record by name, so names are interned once and compared
//! by pointer afterwards.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NAMES: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// An interned string with O(1) equality and `Copy` semantics.
#[derive(Clone, Copy)]
pub struct InternedString {
    inner: &'static str,
}

impl InternedString {
    /// Intern `s`, reusing the existing allocation if it was seen before.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        if let Some(&interned) = NAMES
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(s)
        {
            return InternedString { inner: interned };
        }

        let mut names = NAMES
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another thread may have won the race between the two locks.
        if let Some(&interned) = names.get(s) {
            return InternedString { inner: interned };
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        names.insert(leaked);
        InternedString { inner: leaked }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.inner
    }
}

impl Default for InternedString {
    fn default() -> Self {
        InternedString::new("")
    }
}

impl Deref for InternedString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.inner
    }
}

impl AsRef<str> for InternedString {
    #[inline]
    fn as_ref(&self) -> &str {
        self.inner
    }
}

impl Borrow<str> for InternedString {
    #[inline]
    fn borrow(&self) -> &str {
        self.inner
    }
}

impl PartialEq for InternedString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for InternedString {}

impl PartialEq<str> for InternedString {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for InternedString {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

impl PartialOrd for InternedString {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedString {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

// Must agree with `Borrow<str>`: hash the contents, not the pointer, so
// `HashMap<InternedString, _>::get("name")` works.
impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner, f)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}

impl From<&str> for InternedString {
    fn from(s: &str) -> Self {
        InternedString::new(s)
    }
}

impl From<String> for InternedString {
    fn from(s: String) -> Self {
        InternedString::new(s)
    }
}

impl From<&String> for InternedString {
    fn from(s: &String) -> Self {
        InternedString::new(s)
    }
}

impl Serialize for InternedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.inner)
    }
}

impl<'de> Deserialize<'de> for InternedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(InternedString::new(s))
    }
}
