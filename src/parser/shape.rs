use std::slice;

use super::error::{ParseError, ParseResult};
use super::literal::Value;

/// How array dimensions are inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapeMode {
    /// Follow the first element at every depth and assume siblings match.
    /// Jagged arrays are not detected and give a meaningless shape.
    #[default]
    FirstElement,
    /// Require every sibling to have the same shape as the first.
    Strict,
}

/// Sizes along each nesting depth, read off the first element.
/// Scalars and empty arrays have no dimensions.
pub fn dimensions(value: &Value) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut current = value;
    while let Value::Array(items) = current {
        let Some(first) = items.first() else { break };
        dims.push(items.len());
        current = first;
    }
    dims
}

pub fn dimensions_with(value: &Value, mode: ShapeMode) -> ParseResult<Vec<usize>> {
    match mode {
        ShapeMode::FirstElement => Ok(dimensions(value)),
        ShapeMode::Strict => strict_dimensions(value),
    }
}

fn strict_dimensions(value: &Value) -> ParseResult<Vec<usize>> {
    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Ok(Vec::new()),
    };

    let inner = strict_dimensions(&items[0])?;
    for (index, item) in items.iter().enumerate().skip(1) {
        let found = strict_dimensions(item)?;
        // A scalar next to an array also has a different shape.
        if found != inner || item.as_array().is_some() != items[0].as_array().is_some() {
            return Err(ParseError::JaggedArray {
                index,
                expected: inner,
                found,
            });
        }
    }

    let mut dims = Vec::with_capacity(inner.len() + 1);
    dims.push(items.len());
    dims.extend(inner);
    Ok(dims)
}

/// Depth-first iterator over the scalar leaves of a value.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    stack: Vec<slice::Iter<'a, Value>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Value::Array(items)) => self.stack.push(items.iter()),
                Some(leaf) => return Some(leaf),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Lazily yield every non-array leaf in source order. A scalar yields itself.
pub fn flatten(value: &Value) -> Flatten<'_> {
    let root = match value {
        Value::Array(items) => items.iter(),
        leaf => slice::from_ref(leaf).iter(),
    };
    Flatten { stack: vec![root] }
}

/// Space-joined rendering of the leaves of `value`.
pub fn flat_line(value: &Value) -> String {
    flatten(value)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::literal::parse_literal;

    fn lit(s: &str) -> Value {
        parse_literal(s).unwrap()
    }

    #[test]
    fn scalar_has_no_dimensions() {
        assert!(dimensions(&Value::Int("5".into())).is_empty());
        assert!(dimensions(&lit("[]")).is_empty());
    }

    #[test]
    fn rectangular_shapes() {
        assert_eq!(dimensions(&lit("[1,2,3]")), vec![3]);
        assert_eq!(dimensions(&lit("[[1,2,3],[4,5,6]]")), vec![2, 3]);
        assert_eq!(dimensions(&lit("[[[1],[2]],[[3],[4]]]")), vec![2, 2, 1]);
    }

    #[test]
    fn empty_inner_stops_early() {
        assert_eq!(dimensions(&lit("[[],[]]")), vec![2]);
    }

    #[test]
    fn jagged_follows_first_element() {
        assert_eq!(dimensions(&lit("[[1,2],[3]]")), vec![2, 2]);
        assert_eq!(dimensions(&lit("[1,[2,3]]")), vec![2]);
    }

    #[test]
    fn strict_rejects_jagged() {
        let err = dimensions_with(&lit("[[1,2],[3]]"), ShapeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            ParseError::JaggedArray {
                index: 1,
                expected: vec![2],
                found: vec![1],
            }
        );
        assert!(dimensions_with(&lit("[1,[2]]"), ShapeMode::Strict).is_err());
        assert!(dimensions_with(&lit("[[],1]"), ShapeMode::Strict).is_err());
    }

    #[test]
    fn strict_accepts_rectangular() {
        let v = lit("[[1,2],[3,4],[5,6]]");
        assert_eq!(dimensions_with(&v, ShapeMode::Strict).unwrap(), vec![3, 2]);
    }

    #[test]
    fn flatten_is_depth_first() {
        let v = lit("[[1,[2,3]],[],[4],5]");
        assert_eq!(flat_line(&v), "1 2 3 4 5");
    }

    #[test]
    fn flatten_is_restartable() {
        let v = lit("[[1,2],[3,4]]");
        let it = flatten(&v);
        assert_eq!(it.clone().count(), 4);
        assert_eq!(it.count(), 4);
        assert_eq!(flatten(&v).count(), 4);
    }

    #[test]
    fn flatten_len_matches_shape_product() {
        for text in ["[1,2,3]", "[[1,2],[3,4],[5,6]]", "[[[1,2,3]],[[4,5,6]]]"] {
            let v = lit(text);
            let dims = dimensions(&v);
            let expected: usize = if dims.is_empty() { 0 } else { dims.iter().product() };
            assert_eq!(flatten(&v).count(), expected, "{text}");
        }
    }

    #[test]
    fn flatten_scalar_yields_itself() {
        assert_eq!(flat_line(&Value::Str("x".into())), "x");
    }
}
