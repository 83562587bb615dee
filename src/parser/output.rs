use super::cursor::Cursor;
use super::error::ParseResult;
use super::literal::parse_literal;
use super::shape::{dimensions_with, flat_line, ShapeMode};

/// Normalize one expected-output literal (label and leading space already
/// removed).
///
/// - `"text"` becomes `text`
/// - a 1-D array becomes one space-joined line
/// - a 2-D or deeper array becomes one line per outer element
/// - anything else is returned as-is
pub fn normalize_output(line: &str) -> ParseResult<String> {
    normalize_output_with(line, ShapeMode::default())
}

pub fn normalize_output_with(line: &str, mode: ShapeMode) -> ParseResult<String> {
    let mut cursor = Cursor::new(line);
    match cursor.peek() {
        Some('"') => {
            cursor.advance();
            Ok(cursor.take_until('"')?.to_string())
        }
        Some('[') => {
            let value = parse_literal(line)?;
            let dims = dimensions_with(&value, mode)?;
            match value.as_array() {
                Some(rows) if dims.len() > 1 => Ok(rows
                    .iter()
                    .map(flat_line)
                    .collect::<Vec<_>>()
                    .join("\n")),
                _ => Ok(flat_line(&value)),
            }
        }
        _ => Ok(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::ParseError;

    #[test]
    fn grid_output() {
        assert_eq!(normalize_output("[[1,2],[3,4]]").unwrap(), "1 2\n3 4");
    }

    #[test]
    fn flat_output() {
        assert_eq!(normalize_output("[1,2,3]").unwrap(), "1 2 3");
    }

    #[test]
    fn string_output() {
        assert_eq!(normalize_output(r#""hello""#).unwrap(), "hello");
    }

    #[test]
    fn string_output_ignores_trailing_text() {
        assert_eq!(normalize_output(r#""bab" (also "aba")"#).unwrap(), "bab");
    }

    #[test]
    fn scalar_output_unchanged() {
        assert_eq!(normalize_output("42").unwrap(), "42");
        assert_eq!(normalize_output("true").unwrap(), "true");
    }

    #[test]
    fn empty_array_output() {
        assert_eq!(normalize_output("[]").unwrap(), "");
    }

    #[test]
    fn string_grid() {
        assert_eq!(
            normalize_output(r#"[["a","b"],["c","d"]]"#).unwrap(),
            "a b\nc d"
        );
    }

    #[test]
    fn deep_rows_are_flattened_per_line() {
        assert_eq!(
            normalize_output("[[[1,2],[3]],[[4,5],[6]]]").unwrap(),
            "1 2 3\n4 5 6"
        );
    }

    #[test]
    fn jagged_grid_keeps_rows() {
        assert_eq!(normalize_output("[[1,2],[3]]").unwrap(), "1 2\n3");
    }

    #[test]
    fn trailing_whitespace_after_array() {
        assert_eq!(normalize_output("[0,1] ").unwrap(), "0 1");
    }

    #[test]
    fn unterminated_string_overruns() {
        assert!(matches!(
            normalize_output(r#""abc"#).unwrap_err(),
            ParseError::ScanOverrun { .. }
        ));
    }

    #[test]
    fn malformed_array_is_an_error() {
        assert!(normalize_output("[1,2").is_err());
    }
}
