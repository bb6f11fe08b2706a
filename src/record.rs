use serde::{Deserialize, Serialize};

/// Dimension column value declaring an equivalence such as `W = J/s`.
pub const EQUIVALENCE_MARKER: &str = "=";

/// One input row: `Name, Dim, Value, Tags`.
///
/// When `dim` is [`EQUIVALENCE_MARKER`], `value` holds the right-hand
/// dimension string instead of a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Dim")]
    pub dim: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Tags", default)]
    pub tags: String,
    /// Source line, when the record was read from a file.
    #[serde(skip)]
    pub line: Option<usize>,
}

impl Record {
    pub fn new<N, D, V, T>(name: N, dim: D, value: V, tags: T) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        V: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            dim: dim.into(),
            value: value.into(),
            tags: tags.into(),
            line: None,
        }
    }

    pub fn is_equivalence(&self) -> bool {
        self.dim.trim() == EQUIVALENCE_MARKER
    }
}
