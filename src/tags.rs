//! Tags group quantities that belong together, e.g. `#CX` or `#kin`.
//!
//! Tags are written in a free-text annotation: every tag starts with `#` and
//! runs until whitespace or the next `#`, so `#a #b#c` names `a`, `b` and `c`.
//! Text before the first `#` is ignored.

use std::fmt;

use nom::{
    IResult, Parser,
    bytes::complete::take_till,
    character::complete::char,
    multi::many0,
    sequence::preceded,
};
use serde::Serialize;

/// A case-sensitive label, stored without its leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Tag(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parse a single `#tag` token
fn tag_token(input: &str) -> IResult<&str, &str> {
    preceded(
        char('#'),
        take_till(|c: char| c.is_whitespace() || c == '#'),
    )
    .parse(input)
}

/// Parse every `#tag` token in an annotation, skipping text in between
fn annotation(input: &str) -> IResult<&str, Vec<&str>> {
    many0(preceded(take_till(|c: char| c == '#'), tag_token)).parse(input)
}

/// Extracts the distinct, non-empty tags of an annotation in order of
/// first appearance.
pub fn parse_tags(text: &str) -> Vec<Tag> {
    let tokens = match annotation(text) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    };

    let mut tags: Vec<Tag> = Vec::new();
    for token in tokens.into_iter().filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.as_str() == token) {
            tags.push(Tag::new(token));
        }
    }
    tags
}

/// Renders tags back into annotation form, e.g. `#a #b`.
pub fn format_tags<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = &'a Tag>,
{
    tags.into_iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
