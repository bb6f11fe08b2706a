pub mod db;
pub mod dimension;
pub mod errors;
pub mod io;
pub mod record;
pub mod tags;

#[cfg(test)]
mod test_utils;

pub use crate::db::{LoadOptions, LoadSummary, QueryMatch, QueryOutcome, SearchOptions, StatsDb};
pub use crate::dimension::{Dimension, Origin, Quantity};
pub use crate::errors::{ErrorCollection, ErrorContext, StatsError};
pub use crate::record::Record;
pub use crate::tags::{Tag, parse_tags};
