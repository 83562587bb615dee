use tracing::trace;

use super::cursor::Cursor;
use super::error::{ParseError, ParseResult};
use super::literal::parse_literal;
use super::shape::{dimensions_with, flatten, ShapeMode};

/// Turn `a = 1, nums = [1,2], s = "x"` into one judge-ready token line.
///
/// Variable names are dropped. Each array becomes its dimension sizes
/// followed by its flattened elements; scalars and quoted strings are
/// copied verbatim (quotes removed).
///
/// The scanner expects exactly one character (a space) after every `=`,
/// and finds the end of an `n`-deep array at the first run of `n` closing
/// brackets. Input that breaks either convention is not recovered.
pub fn normalize_input(line: &str) -> ParseResult<String> {
    normalize_input_with(line, ShapeMode::default())
}

pub fn normalize_input_with(line: &str, mode: ShapeMode) -> ParseResult<String> {
    // The sentinel comma lets the last scalar end like every other one.
    let augmented = format!("{line},");
    let mut cursor = Cursor::new(&augmented);
    let mut groups = Vec::new();

    while let Some(ch) = cursor.advance() {
        if ch != '=' {
            continue;
        }
        cursor.bump("the space after '='")?;
        groups.push(scan_value(&mut cursor, mode)?);
    }

    Ok(groups.join(" "))
}

/// Consume one value starting at the cursor and return its token group.
fn scan_value(cursor: &mut Cursor<'_>, mode: ShapeMode) -> ParseResult<String> {
    let start = cursor.pos();
    let ndim = cursor.count_run('[');

    if ndim > 0 {
        cursor.seek(start);
        let closing = "]".repeat(ndim);
        let end = cursor.find(&closing)? + ndim;
        let literal = cursor.slice(start, end);
        cursor.seek(end);
        return array_tokens(literal, ndim, mode);
    }

    if cursor.peek() == Some('"') {
        cursor.advance();
        let contents = cursor.take_until('"')?;
        cursor.advance();
        return Ok(contents.to_string());
    }

    Ok(cursor.take_until(',')?.to_string())
}

fn array_tokens(literal: &str, ndim: usize, mode: ShapeMode) -> ParseResult<String> {
    let value = parse_literal(literal)?;
    let dims = dimensions_with(&value, mode)?;
    trace!(literal, ?dims, "array value");

    if dims.is_empty() && ndim == 1 {
        return Ok("0".to_string());
    }
    if dims.len() != ndim {
        return Err(ParseError::ShapeMismatch {
            literal: literal.to_string(),
            expected: ndim,
            found: dims.len(),
        });
    }

    let tokens: Vec<String> = dims
        .iter()
        .map(ToString::to_string)
        .chain(flatten(&value).map(ToString::to_string))
        .collect();
    Ok(tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_then_scalar() {
        assert_eq!(
            normalize_input("nums = [2,7,11,15], target = 9").unwrap(),
            "4 2 7 11 15 9"
        );
    }

    #[test]
    fn quoted_string_is_unquoted() {
        assert_eq!(normalize_input(r#"s = "abc""#).unwrap(), "abc");
    }

    #[test]
    fn quoted_string_keeps_commas_and_equals() {
        assert_eq!(
            normalize_input(r#"s = "a,b=c", k = 2"#).unwrap(),
            "a,b=c 2"
        );
    }

    #[test]
    fn matrix_is_row_major_with_both_sizes() {
        assert_eq!(
            normalize_input("grid = [[1,2,3],[4,5,6]]").unwrap(),
            "2 3 1 2 3 4 5 6"
        );
    }

    #[test]
    fn three_dimensional() {
        assert_eq!(
            normalize_input("cube = [[[1,2]],[[3,4]]], n = 1").unwrap(),
            "2 1 2 1 2 3 4 1"
        );
    }

    #[test]
    fn string_array_elements_unquoted() {
        assert_eq!(
            normalize_input(r#"words = ["hello","world"], k = 1"#).unwrap(),
            "2 hello world 1"
        );
    }

    #[test]
    fn empty_array_is_zero_length() {
        assert_eq!(normalize_input("nums = [], k = 3").unwrap(), "0 3");
    }

    #[test]
    fn empty_rows_do_not_match_bracket_depth() {
        let err = normalize_input("grid = [[],[]]").unwrap_err();
        assert_eq!(
            err,
            ParseError::ShapeMismatch {
                literal: "[[],[]]".into(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn names_are_dropped_and_order_kept() {
        assert_eq!(
            normalize_input("a = 1, b = true, c = -5").unwrap(),
            "1 true -5"
        );
    }

    #[test]
    fn scalar_statements_are_copied_through() {
        // With no arrays nothing is expanded: the same statement always
        // yields the same tokens, and quoting a scalar does not change them.
        let line = "n = 5, s = \"xy\"";
        let once = normalize_input(line).unwrap();
        assert_eq!(once, "5 xy");
        assert_eq!(normalize_input(line).unwrap(), once);
        assert_eq!(normalize_input("n = 5, s = xy").unwrap(), once);
    }

    #[test]
    fn integers_wider_than_i64_pass_through() {
        assert_eq!(
            normalize_input("nums = [9223372036854775808, 1]").unwrap(),
            "2 9223372036854775808 1"
        );
    }

    #[test]
    fn tiny_floats_in_exponent_form() {
        assert_eq!(
            normalize_input("p = [0.00001, 1e-7], q = 0.5").unwrap(),
            "2 1e-05 1e-07 0.5"
        );
    }

    #[test]
    fn tree_literal_with_nulls() {
        assert_eq!(
            normalize_input("root = [1,null,2,3]").unwrap(),
            "4 1 null 2 3"
        );
    }

    #[test]
    fn unterminated_quote_overruns() {
        assert!(matches!(
            normalize_input(r#"s = "abc"#).unwrap_err(),
            ParseError::ScanOverrun { .. }
        ));
    }

    #[test]
    fn unterminated_array_overruns() {
        assert!(matches!(
            normalize_input("nums = [1,2").unwrap_err(),
            ParseError::ScanOverrun { .. }
        ));
    }

    #[test]
    fn missing_space_after_equals_at_end() {
        assert!(matches!(
            normalize_input("n=").unwrap_err(),
            ParseError::ScanOverrun { .. }
        ));
    }

    #[test]
    fn no_assignments_is_empty() {
        assert_eq!(normalize_input("").unwrap(), "");
        assert_eq!(normalize_input("nothing here").unwrap(), "");
    }

    #[test]
    fn strict_mode_rejects_jagged_input() {
        assert!(normalize_input("g = [[1,2],[3]]").is_ok());
        assert!(matches!(
            normalize_input_with("g = [[1,2],[3]]", ShapeMode::Strict).unwrap_err(),
            ParseError::JaggedArray { .. }
        ));
    }
}
