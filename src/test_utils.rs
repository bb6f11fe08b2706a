#![cfg(test)]

use crate::db::{LoadOptions, StatsDb};
use crate::dimension::Dimension;
use crate::record::Record;
use crate::tags::Tag;

// Helper function to assert floating point equality with tolerance
pub fn assert_float_eq(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() < tolerance,
        "Expected {} to be approximately equal to {} (tolerance: {})",
        a,
        b,
        tolerance
    );
}

/// Parse a list of dimension tokens.
pub fn dims(tokens: &[&str]) -> Vec<Dimension> {
    tokens
        .iter()
        .map(|t| Dimension::parse(t).expect("Invalid dimension token"))
        .collect()
}

/// Build tags from bare names (no leading `#`).
pub fn tags(names: &[&str]) -> Vec<Tag> {
    names.iter().map(|n| Tag::new(*n)).collect()
}

/// Load records into a fresh database, failing the test on any error.
pub fn db_from(records: Vec<Record>) -> StatsDb {
    StatsDb::from_records(records, &LoadOptions::default()).expect("Failed to load records")
}
