//! LIKE-style matching for title search.
//!
//! `%` matches any run of characters (including none). Every other character
//! matches itself, case-sensitively. There is no escape syntax, so a `%` in a
//! search term acts as a wildcard too.

use std::fmt;

/// Wildcard marker.
pub const WILDCARD: char = '%';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePattern {
    raw: String,
}

impl TitlePattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Substring pattern: the term wrapped in wildcards on both ends.
    pub fn contains(term: &str) -> Self {
        Self::new(format!("{WILDCARD}{term}{WILDCARD}"))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, text: &str) -> bool {
        let parts: Vec<&str> = self.raw.split(WILDCARD).collect();
        let (first, rest) = match parts.split_first() {
            Some(split) => split,
            None => return text.is_empty(),
        };
        let Some((last, middle)) = rest.split_last() else {
            return text == *first;
        };

        let Some(remaining) = text.strip_prefix(first) else {
            return false;
        };
        let Some(mut remaining) = remaining.strip_suffix(last) else {
            return false;
        };
        for part in middle {
            match remaining.find(part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }
        true
    }
}

impl fmt::Display for TitlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
