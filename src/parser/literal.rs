use std::fmt;

use super::cursor::Cursor;
use super::error::{ParseError, ParseResult};

/// A value as written in an example: a scalar or a nested array.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer digits as written (minus any leading `+`), any magnitude.
    Int(String),
    Float(f64),
    Str(String),
    /// Unquoted identifier such as `true`, `false` or `null`.
    Word(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Scalars render as bare tokens: strings unquoted, floats the way Python's
/// `repr` prints them. Arrays render as `[a, b]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(x) => fmt_float(*x, f),
            Value::Int(s) | Value::Str(s) | Value::Word(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Shortest round-trip digits; exponent form (`1e-05`, `1e+16`) below 1e-4
/// or from 1e16 up, and a trailing `.0` on integral values.
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let magnitude = x.abs();
    if !x.is_finite() || x == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return if x.is_finite() && x.fract() == 0.0 {
            write!(f, "{x:.1}")
        } else {
            write!(f, "{x}")
        };
    }

    let sci = format!("{x:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
}

/// Parse a complete literal. Surrounding whitespace is allowed, anything
/// else after the value is an error.
pub fn parse_literal(text: &str) -> ParseResult<Value> {
    let mut cursor = Cursor::new(text);
    let value = parse_value(&mut cursor)?;
    cursor.skip_whitespace();
    if !cursor.is_eof() {
        return Err(ParseError::TrailingInput {
            pos: cursor.pos(),
            rest: cursor.rest().to_string(),
        });
    }
    Ok(value)
}

fn parse_value(cursor: &mut Cursor<'_>) -> ParseResult<Value> {
    cursor.skip_whitespace();
    match cursor.peek() {
        None => Err(ParseError::UnexpectedEnd { expected: "a value" }),
        Some('[') => parse_array(cursor),
        Some(q @ ('"' | '\'')) => parse_string(cursor, q).map(Value::Str),
        Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => parse_number(cursor),
        Some(c) if c.is_alphabetic() || c == '_' => {
            let word = cursor.take_while(|c| c.is_alphanumeric() || c == '_');
            Ok(Value::Word(word.to_string()))
        }
        Some(found) => Err(ParseError::UnexpectedChar {
            pos: cursor.pos(),
            found,
            expected: "a value",
        }),
    }
}

fn parse_array(cursor: &mut Cursor<'_>) -> ParseResult<Value> {
    cursor.advance(); // '['
    let mut items = Vec::new();

    cursor.skip_whitespace();
    if cursor.peek() == Some(']') {
        cursor.advance();
        return Ok(Value::Array(items));
    }

    loop {
        items.push(parse_value(cursor)?);
        cursor.skip_whitespace();
        let pos = cursor.pos();
        match cursor.advance() {
            Some(',') => {
                // Trailing comma: `[1, 2,]`
                cursor.skip_whitespace();
                if cursor.peek() == Some(']') {
                    cursor.advance();
                    break;
                }
            }
            Some(']') => break,
            Some(found) => {
                return Err(ParseError::UnexpectedChar {
                    pos,
                    found,
                    expected: "',' or ']'",
                })
            }
            None => return Err(ParseError::UnexpectedEnd { expected: "',' or ']'" }),
        }
    }

    Ok(Value::Array(items))
}

fn parse_string(cursor: &mut Cursor<'_>, quote: char) -> ParseResult<String> {
    cursor.advance(); // opening quote
    let mut out = String::new();
    loop {
        match cursor.advance() {
            None => return Err(ParseError::UnexpectedEnd { expected: "closing quote" }),
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match cursor.advance() {
                None => return Err(ParseError::UnexpectedEnd { expected: "escape sequence" }),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some(c @ ('\\' | '"' | '\'')) => out.push(c),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
            },
            Some(c) => out.push(c),
        }
    }
}

fn parse_number(cursor: &mut Cursor<'_>) -> ParseResult<Value> {
    let start = cursor.pos();
    if matches!(cursor.peek(), Some('-' | '+')) {
        cursor.advance();
    }
    let mut prev = ' ';
    cursor.take_while(|c| {
        // A sign is only part of the number right after an exponent marker.
        let ok = c.is_ascii_digit()
            || matches!(c, '.' | 'e' | 'E')
            || (matches!(c, '-' | '+') && matches!(prev, 'e' | 'E'));
        prev = c;
        ok
    });
    let text = cursor.slice(start, cursor.pos());

    let invalid = || ParseError::InvalidNumber {
        text: text.to_string(),
    };
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().map(Value::Float).map_err(|_| invalid())
    } else {
        let digits = text.trim_start_matches('+');
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Value::Int(digits.to_string()))
    }
}
