//! # Quantity Database
//!
//! [`StatsDb`] owns every known [`Quantity`] together with a bidirectional
//! tag index. Each loaded record contributes the quantity itself and its
//! inverse (named with [`INVERSE_SUFFIX`]), so that a query only ever has to
//! multiply to reach dimensions that need a division.
//!
//! ## Examples
//!
//! ```rust
//! use statsdb::{LoadOptions, Record, SearchOptions, StatsDb};
//!
//! let mut db = StatsDb::new();
//! db.load(
//!     vec![
//!         Record::new("Speed", "m/s", "10", "#kin"),
//!         Record::new("Time", "s", "5", "#kin"),
//!     ],
//!     &LoadOptions::default(),
//! )
//! .unwrap();
//!
//! let outcome = db.query("m", Some("#kin"), &SearchOptions::default()).unwrap();
//! assert!(outcome.matches().iter().any(|m| m.product.value() == 50.0));
//! ```

pub mod query;
pub mod subsets;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dimension::Quantity;
use crate::errors::{ErrorCollection, ErrorContext, StatsError};
use crate::record::Record;
use crate::tags::{Tag, format_tags, parse_tags};

pub use query::{QueryMatch, QueryOutcome, SearchOptions};
pub use subsets::Subsets;

/// Name suffix of the inverse stored alongside every quantity.
pub const INVERSE_SUFFIX: &str = "_gen";

/// Position of a quantity within its database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuantityId(usize);

/// Controls how [`StatsDb::load`] treats records that fail to load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Skip failing records instead of aborting at the first one.
    pub lenient: bool,
}

/// What a call to [`StatsDb::load`] did.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Records that loaded successfully.
    pub loaded: usize,
    /// Quantities inserted, inverses included.
    pub inserted: usize,
    /// Failures of skipped records (lenient loading only).
    pub skipped: ErrorCollection,
}

impl LoadSummary {
    /// Turns skipped records into an error, if there were any.
    pub fn into_result(self) -> Result<usize, StatsError> {
        let loaded = self.loaded;
        match self.skipped.into_error() {
            Some(error) => Err(error),
            None => Ok(loaded),
        }
    }
}

/// A set of quantities indexed by tag.
#[derive(Debug, Clone, Default)]
pub struct StatsDb {
    quantities: Vec<Quantity>,
    tags_to_quantities: BTreeMap<Tag, BTreeSet<QuantityId>>,
    quantities_to_tags: BTreeMap<QuantityId, BTreeSet<Tag>>,
}

impl StatsDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from records.
    pub fn from_records<I>(records: I, options: &LoadOptions) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut db = StatsDb::new();
        db.load(records, options)?;
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn get(&self, id: QuantityId) -> Option<&Quantity> {
        self.quantities.get(id.0)
    }

    /// All quantities in insertion order.
    pub fn quantities(&self) -> impl Iterator<Item = (QuantityId, &Quantity)> {
        self.quantities
            .iter()
            .enumerate()
            .map(|(idx, q)| (QuantityId(idx), q))
    }

    /// Quantities whose name is exactly `name`.
    pub fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Quantity> + 'a {
        self.quantities.iter().filter(move |q| q.name() == name)
    }

    /// Every tag that has at least one quantity.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags_to_quantities.keys()
    }

    pub fn tags_of(&self, id: QuantityId) -> Option<&BTreeSet<Tag>> {
        self.quantities_to_tags.get(&id)
    }

    pub fn tagged(&self, tag: &Tag) -> Option<&BTreeSet<QuantityId>> {
        self.tags_to_quantities.get(tag)
    }

    /// Stores a quantity under `tags` and updates both sides of the index.
    ///
    /// A quantity identical to one already stored is not duplicated; the
    /// stored entry gains the new tags instead.
    pub fn insert(&mut self, quantity: Quantity, tags: &[Tag]) -> QuantityId {
        let id = match self.quantities.iter().position(|q| *q == quantity) {
            Some(idx) => QuantityId(idx),
            None => {
                self.quantities.push(quantity);
                QuantityId(self.quantities.len() - 1)
            }
        };

        let own_tags = self.quantities_to_tags.entry(id).or_default();
        for tag in tags {
            own_tags.insert(tag.clone());
            self.tags_to_quantities
                .entry(tag.clone())
                .or_default()
                .insert(id);
        }

        id
    }

    /// Loads records in order.
    ///
    /// A failing record never leaves partial state behind. In strict mode
    /// the first failure aborts the load; records before it stay loaded.
    pub fn load<I>(&mut self, records: I, options: &LoadOptions) -> Result<LoadSummary, StatsError>
    where
        I: IntoIterator<Item = Record>,
    {
        self.load_rows(records.into_iter().map(Ok), options)
    }

    /// Like [`load`](StatsDb::load), for sources that can fail per row
    /// (see [`io::Rows`](crate::io::Rows)). A row error counts as a failing
    /// record.
    pub fn load_rows<I>(&mut self, rows: I, options: &LoadOptions) -> Result<LoadSummary, StatsError>
    where
        I: IntoIterator<Item = Result<Record, StatsError>>,
    {
        let mut summary = LoadSummary::default();

        for (idx, row) in rows.into_iter().enumerate() {
            let result = row.and_then(|record| {
                self.load_record(&record).map_err(|error| {
                    error.in_context(
                        ErrorContext::new()
                            .at_line(record.line)
                            .while_parsing(format!("record {} ('{}')", idx + 1, record.name)),
                    )
                })
            });

            match result {
                Ok(inserted) => {
                    summary.loaded += 1;
                    summary.inserted += inserted;
                }
                Err(error) if options.lenient => {
                    warn!("Skipping record: {}", error);
                    summary.skipped.push(error);
                }
                Err(error) => return Err(error),
            }
        }

        debug!(
            "Loaded {} record(s), inserted {} quantities, skipped {}",
            summary.loaded,
            summary.inserted,
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Loads one record and returns the number of quantities inserted.
    pub fn load_record(&mut self, record: &Record) -> Result<usize, StatsError> {
        let tags = parse_tags(&record.tags);
        let name = record.name.trim();

        let pairs = if record.is_equivalence() {
            self.equivalences(name, record.value.trim())?
        } else {
            let value = parse_value(name, &record.value)?;
            let quantity = Quantity::new(name, record.dim.trim(), value)?;
            vec![with_inverse(quantity, INVERSE_SUFFIX)?]
        };

        let mut inserted = 0;
        for (quantity, inverse) in pairs {
            debug!("Inserting {} under [{}]", quantity, format_tags(&tags));
            self.insert(quantity, &tags);
            self.insert(inverse, &tags);
            inserted += 2;
        }
        Ok(inserted)
    }

    /// Derives `lhs` from every stored quantity containing `rhs`.
    fn equivalences(&self, lhs: &str, rhs: &str) -> Result<Vec<(Quantity, Quantity)>, StatsError> {
        let mut pairs = Vec::new();
        for quantity in &self.quantities {
            if let Some(derived) = quantity.partial_dimension_match(lhs, rhs)? {
                pairs.push(with_inverse(derived, INVERSE_SUFFIX)?);
            }
        }
        if pairs.is_empty() {
            debug!("Equivalence {} = {} matched no stored quantity", lhs, rhs);
        }
        Ok(pairs)
    }

    /// A new database with the quantities associated with ANY of `tags`.
    ///
    /// Each selected quantity keeps its full tag set, so filtering never
    /// changes which combinations pass the common-tag test.
    pub fn subset(&self, tags: &[Tag]) -> Result<StatsDb, StatsError> {
        let mut selected = BTreeSet::new();
        for tag in tags {
            let ids = self
                .tags_to_quantities
                .get(tag)
                .ok_or_else(|| StatsError::UnknownTag(tag.as_str().to_string()))?;
            selected.extend(ids.iter().copied());
        }

        let mut subset = StatsDb::new();
        for id in selected {
            let tags: Vec<Tag> = self
                .tags_of(id)
                .map(|tags| tags.iter().cloned().collect())
                .unwrap_or_default();
            subset.insert(self.quantities[id.0].clone(), &tags);
        }
        Ok(subset)
    }

    /// The export view: one record per non-generated quantity.
    pub fn records(&self) -> Vec<Record> {
        self.quantities()
            .filter(|(_, q)| !q.is_generated())
            .map(|(id, q)| {
                let tags = self
                    .tags_of(id)
                    .map(|tags| format_tags(tags))
                    .unwrap_or_default();
                Record::new(q.name(), q.dimension_string(), q.value().to_string(), tags)
            })
            .collect()
    }
}

/// Finite numbers only: `NaN` never compares equal, so it could not merge.
fn parse_value(name: &str, value: &str) -> Result<f64, StatsError> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(StatsError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn with_inverse(quantity: Quantity, suffix: &str) -> Result<(Quantity, Quantity), StatsError> {
    let inverse = quantity.invert(format!("{}{}", quantity.name(), suffix))?;
    Ok((quantity, inverse))
}
