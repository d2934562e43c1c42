//! Content fingerprint: a fast 32-bit rolling hash over page text.
//!
//! The fingerprint is the classic `h = h * 31 + c` polynomial hash (the shape of
//! Java's `String.hashCode`), computed as `(h << 5) - h + c` with 32-bit
//! two's-complement wraparound on every step. It is not collision resistant;
//! it only needs to tell "same page text" from "different page text" cheaply.
//!
//! Characters are fed as UTF-16 code units. For every character in the Basic
//! Multilingual Plane this is the code point itself, and it keeps values
//! bit-compatible with fingerprints persisted by browser hosts.

use std::fmt;
use std::str::FromStr;

/// A 32-bit content fingerprint, persisted as its decimal string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentFingerprint(i32);

impl ContentFingerprint {
    /// Compute the fingerprint of `text`.
    pub fn of(text: &str) -> Self {
        let hash = text.encode_utf16().fold(0i32, |acc, unit| {
            acc.wrapping_shl(5)
                .wrapping_sub(acc)
                .wrapping_add(i32::from(unit))
        });
        Self(hash)
    }

    /// Raw signed value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ContentFingerprint {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentFingerprint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}

/// Fingerprint `text` and return the decimal string that gets persisted.
///
/// # Example
/// ```
/// use retranslate_guard::fingerprint;
///
/// assert_eq!(fingerprint(""), "0");
/// assert_eq!(fingerprint("AB"), "2081");
/// ```
pub fn fingerprint(text: &str) -> String {
    ContentFingerprint::of(text).to_string()
}
