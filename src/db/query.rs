//! Target-dimension queries.
//!
//! A query searches every subset of the pool, smallest first, for products
//! whose reduced dimensions equal the target. A subset is only considered
//! when the tags of its first member occur on every other member; since the
//! first member is fixed by pool order, reordering the pool can change which
//! subsets pass when tag sets overlap without nesting.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::subsets::Subsets;
use super::{INVERSE_SUFFIX, StatsDb};
use crate::dimension::{Origin, Quantity};
use crate::errors::StatsError;
use crate::tags::{Tag, parse_tags};

/// Name given to the accumulated sum of all matches.
pub const TOTAL_NAME: &str = "Total";

/// Tunables for [`StatsDb::query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Largest subset examined. `None` searches every size up to the pool.
    pub max_combination_size: Option<usize>,
    /// Add a [`TOTAL_NAME`] result summing every match.
    pub accumulate: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_combination_size: None,
            accumulate: true,
        }
    }
}

/// A subset whose product has the target dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    /// The reduced product, named after every member of the subset.
    pub product: Quantity,
    /// Names of the members that contribute to the product. A quantity and
    /// its own generated inverse cancel out, so both are left out.
    pub factors: Vec<String>,
}

/// The result of a query: either some matches or an explicit no-match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Matched {
        target: Quantity,
        matches: Vec<QueryMatch>,
        total: Option<Quantity>,
    },
    NoMatch {
        target: Quantity,
    },
}

impl QueryOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, QueryOutcome::Matched { .. })
    }

    pub fn target(&self) -> &Quantity {
        match self {
            QueryOutcome::Matched { target, .. } | QueryOutcome::NoMatch { target } => target,
        }
    }

    /// Matches in search order; empty on no-match.
    pub fn matches(&self) -> &[QueryMatch] {
        match self {
            QueryOutcome::Matched { matches, .. } => matches,
            QueryOutcome::NoMatch { .. } => &[],
        }
    }

    pub fn total(&self) -> Option<&Quantity> {
        match self {
            QueryOutcome::Matched { total, .. } => total.as_ref(),
            QueryOutcome::NoMatch { .. } => None,
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Matched { matches, total, .. } => {
                for m in matches {
                    writeln!(f, "{}", m.product)?;
                }
                if let Some(total) = total {
                    writeln!(f, "{}", total)?;
                }
                Ok(())
            }
            QueryOutcome::NoMatch { target } => {
                writeln!(f, "Given dims cannot be computed: {}", target.dimension_string())
            }
        }
    }
}

/// A pool member together with the tags it carries in the pool.
struct PoolEntry<'a> {
    quantity: &'a Quantity,
    tags: &'a BTreeSet<Tag>,
}

impl StatsDb {
    /// Finds every product of pool quantities with the dimensions of
    /// `target`.
    ///
    /// With a `tag_filter` such as `"#CX#TX"` the pool is the
    /// [`subset`](StatsDb::subset) for those tags; otherwise it is the whole
    /// database. Fails only on a malformed target or an unknown tag.
    pub fn query(
        &self,
        target: &str,
        tag_filter: Option<&str>,
        options: &SearchOptions,
    ) -> Result<QueryOutcome, StatsError> {
        let reference = Quantity::new("Query", target, 0.0)?;

        match tag_filter {
            Some(filter) => self.subset(&parse_tags(filter))?.search(reference, options),
            None => self.search(reference, options),
        }
    }

    fn search(&self, reference: Quantity, options: &SearchOptions) -> Result<QueryOutcome, StatsError> {
        let no_tags = BTreeSet::new();
        let pool: Vec<PoolEntry<'_>> = self
            .quantities()
            .map(|(id, quantity)| PoolEntry {
                quantity,
                tags: self.tags_of(id).unwrap_or(&no_tags),
            })
            .collect();

        let mut matches = Vec::new();
        let mut examined = 0usize;
        let mut skipped = 0usize;

        for combination in Subsets::new(&pool, options.max_combination_size) {
            examined += 1;
            if !shares_first_tags(&combination) {
                skipped += 1;
                continue;
            }

            let product = Quantity::multiply(
                combination.iter().map(|entry| entry.quantity),
                combination.iter().map(|entry| entry.quantity.name()).join(" * "),
            )
            .reduced();

            if product.compare_dimensions(&reference) {
                trace!("Match: {}", product);
                let factors = contributing_factors(&combination);
                matches.push(QueryMatch { product, factors });
            }
        }

        debug!(
            "Query {}: pool of {}, examined {} subsets ({} skipped by tags), {} match(es)",
            reference.dimension_string(),
            pool.len(),
            examined,
            skipped,
            matches.len()
        );

        if matches.is_empty() {
            return Ok(QueryOutcome::NoMatch { target: reference });
        }

        let total = options.accumulate.then(|| {
            let sum = matches.iter().map(|m| m.product.value()).sum();
            Quantity::from_parts(
                TOTAL_NAME,
                reference.numerator().to_vec(),
                reference.denominator().to_vec(),
                sum,
            )
            .with_origin(Origin::Product)
        });

        Ok(QueryOutcome::Matched {
            target: reference,
            matches,
            total,
        })
    }
}

/// The first member's tags must occur on every other member.
fn shares_first_tags(combination: &[&PoolEntry<'_>]) -> bool {
    match combination.split_first() {
        Some((first, rest)) => rest.iter().all(|entry| first.tags.is_subset(entry.tags)),
        None => false,
    }
}

/// Member names, minus every quantity paired with its own generated inverse.
///
/// Pairing goes by identity, not name alone: two distinct quantities may share
/// a name, and only the inverse actually built from a member cancels it.
fn contributing_factors(combination: &[&PoolEntry<'_>]) -> Vec<String> {
    let mut cancelled = vec![false; combination.len()];

    for (i, entry) in combination.iter().enumerate() {
        if cancelled[i] || !entry.quantity.is_generated() {
            continue;
        }
        let partner = combination
            .iter()
            .enumerate()
            .position(|(j, base)| !cancelled[j] && is_inverse_pair(base.quantity, entry.quantity));
        if let Some(j) = partner {
            cancelled[i] = true;
            cancelled[j] = true;
        }
    }

    combination
        .iter()
        .zip(cancelled)
        .filter(|(_, cancelled)| !cancelled)
        .map(|(entry, _)| entry.quantity.name().to_string())
        .collect()
}

fn is_inverse_pair(base: &Quantity, inverse: &Quantity) -> bool {
    !base.is_generated()
        && inverse.is_generated()
        && inverse.name().strip_suffix(INVERSE_SUFFIX) == Some(base.name())
        && base.numerator() == inverse.denominator()
        && base.denominator() == inverse.numerator()
        && inverse.value() == 1.0 / base.value()
}
