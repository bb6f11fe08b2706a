//! # Dimension Algebra
//!
//! A quantity's dimension is written as a compact string: `.` multiplies and
//! every `/` flips the side that subsequent terms are added to.
//!
//! | Input        | Numerator  | Denominator |
//! |--------------|------------|-------------|
//! | `J/s`        | `J`        | `s`         |
//! | `m.m`        | `m`, `m`   |             |
//! | `Op/J/s`     | `Op`, `s`  | `J`         |
//! | `/s`         |            | `s`         |
//! | (empty)      |            |             |
//!
//! Individual dimension tokens are opaque: two tokens are the same dimension
//! exactly when their normalized text is equal.
//!
//! ## Examples
//!
//! ```rust
//! use statsdb::Quantity;
//!
//! let speed = Quantity::new("Speed", "m/s", 10.0).unwrap();
//! let time = Quantity::new("Time", "s", 5.0).unwrap();
//!
//! let distance = Quantity::multiply([&speed, &time], "Distance").reduced();
//! let metres = Quantity::new("Query", "m", 0.0).unwrap();
//! assert!(distance.compare_dimensions(&metres));
//! assert_eq!(distance.value(), 50.0);
//! ```

pub mod parse;
pub mod quantity;

use std::fmt;
use std::str::FromStr;

use icu_normalizer::ComposingNormalizer;
use log::warn;
use serde::Serialize;

use crate::errors::StatsError;

pub use quantity::{Origin, Quantity};

/// A single symbolic unit name such as `J`, `s` or `Op`.
///
/// Tokens are NFKC-normalized on construction so that compatibility forms
/// (full-width letters, the micro sign) compare equal to their canonical
/// spelling. Case is significant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Dimension(String);

impl Dimension {
    /// Parses a single dimension token.
    ///
    /// Whitespace around the token is ignored. The token must be non-empty
    /// and consist of alphanumerics, `_`, `$` or `%`.
    pub fn parse(input: &str) -> Result<Self, StatsError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(StatsError::malformed(input, "empty dimension token"));
        }

        let normalized = ComposingNormalizer::new_nfkc().normalize(trimmed);
        if normalized != trimmed {
            warn!(
                "Dimension token '{}' normalized to '{}'",
                trimmed, normalized
            );
        }

        if let Some(ch) = normalized.chars().find(|&c| !is_token_char(c)) {
            return Err(StatsError::malformed(
                input,
                format!("invalid character '{}' in dimension token", ch),
            ));
        }

        Ok(Dimension(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Characters permitted inside a dimension token.
pub(crate) fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '%')
}

impl FromStr for Dimension {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::parse(s)
    }
}

impl AsRef<str> for Dimension {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
