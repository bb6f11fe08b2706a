//! Error types for loading records, building quantities and running queries.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the dimension algebra, the query engine and record I/O.
///
/// Parsing and inversion failures abort the single operation that raised
/// them. A query that finds nothing is not an error; see
/// [`QueryOutcome::NoMatch`](crate::db::QueryOutcome::NoMatch).
#[derive(Debug, Error)]
pub enum StatsError {
    /// The dimension string does not follow the `a.b/c.d` grammar.
    #[error("Malformed dimension string '{input}': {reason}")]
    MalformedDimensionString { input: String, reason: String },

    /// A zero-valued quantity cannot be inverted.
    #[error("Division by zero while inverting '{name}'")]
    DivisionByZero { name: String },

    /// A tag used for subsetting or querying was never inserted.
    #[error("Unknown tag '#{0}'")]
    UnknownTag(String),

    /// The value column of a record is not a number.
    #[error("Invalid value '{value}' for '{name}'")]
    InvalidValue { name: String, value: String },

    /// IO error occurred while reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV layer rejected the input or output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A failure tied to a particular input record.
    #[error("Record error{context}: {source}")]
    Record {
        context: ErrorContext,
        #[source]
        source: Box<StatsError>,
    },

    /// Multiple records failed during a lenient load.
    #[error("Multiple errors occurred:\n{}", format_errors(.0))]
    Multiple(Vec<StatsError>),
}

impl StatsError {
    pub(crate) fn malformed<I, R>(input: I, reason: R) -> Self
    where
        I: Into<String>,
        R: Into<String>,
    {
        StatsError::MalformedDimensionString {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Attach record context to an error.
    pub fn in_context(self, context: ErrorContext) -> Self {
        StatsError::Record {
            context,
            source: Box::new(self),
        }
    }
}

fn format_errors(errors: &[StatsError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(idx, error)| format!("  {}. {}", idx + 1, error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where a failure happened: source file, line and the item being read.
///
/// Built with chained setters, e.g.
/// `ErrorContext::new().in_file(path).at_line(3).while_parsing("CSV row")`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub parsing: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Records the source line. `None` leaves any known line in place.
    pub fn at_line(mut self, line: impl Into<Option<usize>>) -> Self {
        if let Some(line) = line.into() {
            self.line = Some(line);
        }
        self
    }

    pub fn while_parsing<S: Into<String>>(mut self, what: S) -> Self {
        self.parsing = Some(what.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = " ";
        if let Some(path) = &self.file_path {
            write!(f, "{}in file '{}'", sep, path.display())?;
            sep = ", ";
        }
        if let Some(line) = self.line {
            write!(f, "{}at line {}", sep, line)?;
            sep = ", ";
        }
        if let Some(parsing) = &self.parsing {
            write!(f, "{}while parsing {}", sep, parsing)?;
        }
        Ok(())
    }
}

/// Failures gathered while loading leniently.
#[derive(Debug, Default)]
pub struct ErrorCollection(Vec<StatsError>);

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: StatsError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatsError> {
        self.0.iter()
    }

    /// `None` when empty, the error itself when there is one,
    /// [`StatsError::Multiple`] otherwise.
    pub fn into_error(mut self) -> Option<StatsError> {
        match self.0.len() {
            0 => None,
            1 => self.0.pop(),
            _ => Some(StatsError::Multiple(self.0)),
        }
    }
}

impl Extend<StatsError> for ErrorCollection {
    fn extend<I: IntoIterator<Item = StatsError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<StatsError> for ErrorCollection {
    fn from_iter<I: IntoIterator<Item = StatsError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a StatsError;
    type IntoIter = std::slice::Iter<'a, StatsError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let context = ErrorContext::new()
            .in_file("vars.csv")
            .at_line(4)
            .while_parsing("record 'Power'");
        assert_eq!(
            context.to_string(),
            " in file 'vars.csv', at line 4, while parsing record 'Power'"
        );
    }

    #[test]
    fn test_empty_context_renders_nothing() {
        assert_eq!(ErrorContext::new().to_string(), "");
    }

    #[test]
    fn test_unknown_line_keeps_previous() {
        let context = ErrorContext::new().at_line(7).at_line(None);
        assert_eq!(context.line, Some(7));
        assert_eq!(context.to_string(), " at line 7");
    }

    #[test]
    fn test_record_error_wraps_source() {
        let error = StatsError::DivisionByZero {
            name: "Rate".to_string(),
        }
        .in_context(ErrorContext::new().at_line(2));
        let message = error.to_string();
        assert!(message.contains("line 2"));
        assert!(message.contains("Rate"));
    }

    #[test]
    fn test_error_collection() {
        let mut collection = ErrorCollection::new();
        assert!(collection.is_empty());
        assert!(ErrorCollection::new().into_error().is_none());

        collection.push(StatsError::UnknownTag("a".to_string()));
        collection.extend([StatsError::UnknownTag("b".to_string())]);
        assert_eq!(collection.len(), 2);
        assert_eq!((&collection).into_iter().count(), 2);

        match collection.into_error() {
            Some(StatsError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected Multiple error variant, got {:?}", other),
        }
    }

    #[test]
    fn test_single_error_is_not_wrapped() {
        let collection: ErrorCollection =
            std::iter::once(StatsError::UnknownTag("x".to_string())).collect();
        assert!(matches!(
            collection.into_error(),
            Some(StatsError::UnknownTag(_))
        ));
    }
}
