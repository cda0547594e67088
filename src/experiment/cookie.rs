//! Sticky-assignment cookie parsing.
//!
//! Only one cookie is ever looked at, and only two values are ever honoured.
//! Anything unexpected degrades to "no cookie" instead of an error.

use std::fmt;

/// Name of the cookie that records a visitor's variant.
pub const COOKIE_NAME: &str = "james_yummy_cookie";

/// Position of a variant in the catalog. The domain is closed: `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantIndex {
    First,
    Second,
}

impl VariantIndex {
    pub const ALL: [VariantIndex; 2] = [VariantIndex::First, VariantIndex::Second];

    /// Zero-based catalog position.
    pub fn as_usize(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// One-based number shown to visitors.
    pub fn number(self) -> u8 {
        self.as_usize() as u8 + 1
    }

    /// Accept exactly the literals `0` and `1`.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(Self::First),
            "1" => Some(Self::Second),
            _ => None,
        }
    }

    /// `Set-Cookie` value recording this assignment.
    pub fn set_cookie_value(self) -> String {
        format!("{}={}", COOKIE_NAME, self)
    }
}

impl fmt::Display for VariantIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_usize())
    }
}

/// Resolve the raw `Cookie` header to a previously assigned variant.
pub fn resolve_cookie(header: Option<&str>) -> Option<VariantIndex> {
    let header = header?;

    let (_, value) = header
        .split(';')
        .map(str::trim)
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (entry, None),
        })
        .find(|(name, _)| *name == COOKIE_NAME)?;

    VariantIndex::from_cookie_value(value?)
}
