use nom::{
    IResult, Parser,
    bytes::complete::take_while,
    character::complete::{char, multispace0},
    multi::separated_list1,
    sequence::delimited,
};

use super::{Dimension, is_token_char};
use crate::errors::StatsError;

/// Parse a raw token, possibly empty, with surrounding whitespace
fn raw_token(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, take_while(is_token_char), multispace0).parse(input)
}

/// Parse one `/`-delimited segment into its `.`-separated tokens
fn segment(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('.'), raw_token).parse(input)
}

/// Parse a dimension string into its `/`-delimited segments
pub fn dimension_segments(input: &str) -> IResult<&str, Vec<Vec<&str>>> {
    separated_list1(char('/'), segment).parse(input)
}

/// Parses a dimension string into `(numerator, denominator)` token lists.
///
/// Segment `i` of the `/`-split input feeds the numerator when `i` is even
/// and the denominator when it is odd. Empty segments and empty tokens
/// contribute nothing, so `""` and `"/"` are both dimensionless.
pub fn parse_dimension_string(
    input: &str,
) -> Result<(Vec<Dimension>, Vec<Dimension>), StatsError> {
    let (rest, segments) =
        dimension_segments(input).map_err(|e| StatsError::malformed(input, e.to_string()))?;

    if let Some(ch) = rest.chars().next() {
        return Err(StatsError::malformed(
            input,
            format!(
                "unexpected character '{}' at offset {}",
                ch,
                input.len() - rest.len()
            ),
        ));
    }

    let mut numerator = Vec::new();
    let mut denominator = Vec::new();

    for (idx, tokens) in segments.into_iter().enumerate() {
        let side = if idx % 2 == 0 {
            &mut numerator
        } else {
            &mut denominator
        };
        for raw in tokens.into_iter().filter(|t| !t.is_empty()) {
            side.push(Dimension::parse(raw)?);
        }
    }

    Ok((numerator, denominator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(dims: &[Dimension]) -> Vec<&str> {
        dims.iter().map(Dimension::as_str).collect()
    }

    #[test]
    fn test_single_division() {
        let (num, den) = parse_dimension_string("J/s").unwrap();
        assert_eq!(strings(&num), vec!["J"]);
        assert_eq!(strings(&den), vec!["s"]);
    }

    #[test]
    fn test_products_on_both_sides() {
        let (num, den) = parse_dimension_string("kg.m.m/s.s").unwrap();
        assert_eq!(strings(&num), vec!["kg", "m", "m"]);
        assert_eq!(strings(&den), vec!["s", "s"]);
    }

    #[test]
    fn test_each_slash_flips_side() {
        let (num, den) = parse_dimension_string("Op/J/s").unwrap();
        assert_eq!(strings(&num), vec!["Op", "s"]);
        assert_eq!(strings(&den), vec!["J"]);

        let (num, den) = parse_dimension_string("a/b/c/d").unwrap();
        assert_eq!(strings(&num), vec!["a", "c"]);
        assert_eq!(strings(&den), vec!["b", "d"]);
    }

    #[test]
    fn test_empty_segments() {
        let (num, den) = parse_dimension_string("").unwrap();
        assert!(num.is_empty() && den.is_empty());

        let (num, den) = parse_dimension_string("/").unwrap();
        assert!(num.is_empty() && den.is_empty());

        let (num, den) = parse_dimension_string("/s").unwrap();
        assert!(num.is_empty());
        assert_eq!(strings(&den), vec!["s"]);

        let (num, _) = parse_dimension_string("m..s").unwrap();
        assert_eq!(strings(&num), vec!["m", "s"]);
    }

    #[test]
    fn test_whitespace_around_tokens() {
        let (num, den) = parse_dimension_string(" J / s ").unwrap();
        assert_eq!(strings(&num), vec!["J"]);
        assert_eq!(strings(&den), vec!["s"]);
    }

    #[test]
    fn test_invalid_characters_fail_fast() {
        for input in ["m*s", "J/s^2", "m-s", "(m)", "m s"] {
            assert!(
                matches!(
                    parse_dimension_string(input),
                    Err(StatsError::MalformedDimensionString { .. })
                ),
                "expected '{}' to be rejected",
                input
            );
        }
    }
}
