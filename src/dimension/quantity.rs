use std::fmt;

use serde::Serialize;

use super::Dimension;
use super::parse::parse_dimension_string;
use crate::errors::StatsError;

/// How a quantity came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Loaded directly from an input record.
    #[default]
    Record,
    /// The multiplicative inverse generated alongside another quantity.
    Inverse,
    /// Derived from a dimension equivalence such as `W = J/s`.
    Equivalence,
    /// The product (or sum) computed by a query.
    Product,
}

/// A named value carrying a numerator and denominator of dimension tokens.
///
/// Token order within each side is irrelevant; duplicates are meaningful
/// (`m.m` is an area). All algebraic operations return a new quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    name: String,
    value: f64,
    numerator: Vec<Dimension>,
    denominator: Vec<Dimension>,
    origin: Origin,
}

impl Quantity {
    /// Parses `dimension` and reduces it.
    pub fn new<N>(name: N, dimension: &str, value: f64) -> Result<Self, StatsError>
    where
        N: Into<String>,
    {
        let (numerator, denominator) = parse_dimension_string(dimension)?;
        let (numerator, denominator) = reduce(numerator, denominator);
        Ok(Self::from_parts(name, numerator, denominator, value))
    }

    /// Builds a quantity from token lists as given, without reduction.
    pub fn from_parts<N>(
        name: N,
        numerator: Vec<Dimension>,
        denominator: Vec<Dimension>,
        value: f64,
    ) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            value,
            numerator,
            denominator,
            origin: Origin::Record,
        }
    }

    pub(crate) fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn numerator(&self) -> &[Dimension] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[Dimension] {
        &self.denominator
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Inverses are bookkeeping and are left out of listings and exports.
    pub fn is_generated(&self) -> bool {
        self.origin == Origin::Inverse
    }

    pub fn is_dimensionless(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// Canonical `num/den` form of this quantity's dimensions.
    pub fn dimension_string(&self) -> String {
        format_dimension_string(&self.numerator, &self.denominator)
    }

    /// Returns a copy with matching numerator/denominator tokens cancelled.
    pub fn reduced(&self) -> Quantity {
        let (numerator, denominator) = reduce(self.numerator.clone(), self.denominator.clone());
        Quantity {
            numerator,
            denominator,
            ..self.clone()
        }
    }

    /// Multiplies quantities: token lists are concatenated and values
    /// multiplied. The product is not reduced.
    pub fn multiply<'a, I, N>(quantities: I, name: N) -> Quantity
    where
        I: IntoIterator<Item = &'a Quantity>,
        N: Into<String>,
    {
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        let mut value = 1.0;

        for quantity in quantities {
            numerator.extend_from_slice(&quantity.numerator);
            denominator.extend_from_slice(&quantity.denominator);
            value *= quantity.value;
        }

        Quantity::from_parts(name, numerator, denominator, value).with_origin(Origin::Product)
    }

    /// Swaps numerator and denominator and takes the reciprocal value.
    pub fn invert<N>(&self, name: N) -> Result<Quantity, StatsError>
    where
        N: Into<String>,
    {
        if self.value == 0.0 {
            return Err(StatsError::DivisionByZero {
                name: self.name.clone(),
            });
        }

        Ok(Quantity::from_parts(
            name,
            self.denominator.clone(),
            self.numerator.clone(),
            1.0 / self.value,
        )
        .with_origin(Origin::Inverse))
    }

    /// Exact multiset equality of both sides. No cancellation is applied,
    /// so `m/s` and `m.s/s.s` differ unless both were reduced first.
    pub fn compare_dimensions(&self, other: &Quantity) -> bool {
        sorted(&self.numerator) == sorted(&other.numerator)
            && sorted(&self.denominator) == sorted(&other.denominator)
    }

    /// Checks whether the dimensions of `rhs` occur within this quantity.
    ///
    /// On a match the derived quantity is named `lhs`, carries this
    /// quantity's value, and keeps only the tokens of this quantity that do
    /// not occur in `rhs`. Containment and removal both go by membership:
    /// repeated tokens in `rhs` are not counted, and every occurrence of a
    /// matched token is removed.
    pub fn partial_dimension_match(
        &self,
        lhs: &str,
        rhs: &str,
    ) -> Result<Option<Quantity>, StatsError> {
        let candidate = Quantity::new(lhs, rhs, 0.0)?;

        let matched = is_subset(&candidate.numerator, &self.numerator)
            && is_subset(&candidate.denominator, &self.denominator);
        if !matched {
            return Ok(None);
        }

        let numerator = remaining(&self.numerator, &candidate.numerator);
        let denominator = remaining(&self.denominator, &candidate.denominator);

        Ok(Some(
            Quantity::from_parts(lhs, numerator, denominator, self.value)
                .with_origin(Origin::Equivalence),
        ))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} {}", self.name, self.value, self.dimension_string())
    }
}

/// Cancels tokens that appear on both sides.
///
/// A single forward pass over the numerator: when the token under the
/// cursor is found in the denominator, one occurrence is removed from each
/// side and the cursor still advances, so the token that slid into its slot
/// is not examined. `m.m/m.m` therefore reduces to `m/m`.
pub fn reduce(
    mut numerator: Vec<Dimension>,
    mut denominator: Vec<Dimension>,
) -> (Vec<Dimension>, Vec<Dimension>) {
    let mut idx = 0;
    while idx < numerator.len() {
        if let Some(pos) = denominator.iter().position(|d| *d == numerator[idx]) {
            numerator.remove(idx);
            denominator.remove(pos);
        }
        idx += 1;
    }
    (numerator, denominator)
}

/// `num.num/den.den`; an empty side leaves an empty run.
pub fn format_dimension_string(numerator: &[Dimension], denominator: &[Dimension]) -> String {
    format!("{}/{}", join(numerator), join(denominator))
}

fn join(dims: &[Dimension]) -> String {
    dims.iter()
        .map(Dimension::as_str)
        .collect::<Vec<_>>()
        .join(".")
}

fn sorted(dims: &[Dimension]) -> Vec<&Dimension> {
    let mut refs: Vec<&Dimension> = dims.iter().collect();
    refs.sort();
    refs
}

fn is_subset(sub: &[Dimension], sup: &[Dimension]) -> bool {
    sub.iter().all(|d| sup.contains(d))
}

fn remaining(dims: &[Dimension], matched: &[Dimension]) -> Vec<Dimension> {
    dims.iter()
        .filter(|d| !matched.contains(d))
        .cloned()
        .collect()
}
