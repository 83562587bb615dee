use thiserror::Error;

/// Everything that can go wrong between raw example text and normalized lines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("scan ran past end of input at byte {pos} while looking for {expected}")]
    ScanOverrun { pos: usize, expected: String },

    #[error("unexpected character {found:?} at byte {pos}, expected {expected}")]
    UnexpectedChar {
        pos: usize,
        found: char,
        expected: &'static str,
    },

    #[error("unexpected end of literal, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("invalid number literal {text:?}")]
    InvalidNumber { text: String },

    #[error("trailing input after literal at byte {pos}: {rest:?}")]
    TrailingInput { pos: usize, rest: String },

    #[error("array literal {literal:?} has {found} dimension(s) but {expected} bracket level(s)")]
    ShapeMismatch {
        literal: String,
        expected: usize,
        found: usize,
    },

    #[error("jagged array: element {index} has shape {found:?}, first element has {expected:?}")]
    JaggedArray {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("example block {block} has no output line")]
    MissingOutputLine { block: usize },

    #[error("example block {block} has an empty output line")]
    EmptyOutput { block: usize },

    #[error("extracted {inputs} inputs but {outputs} outputs")]
    StructuralMismatch { inputs: usize, outputs: usize },
}

pub type ParseResult<T> = Result<T, ParseError>;
