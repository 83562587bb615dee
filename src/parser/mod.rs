pub mod blocks;
pub mod cursor;
pub mod error;
pub mod input;
pub mod literal;
pub mod output;
pub mod shape;

use tracing::{debug, warn};

pub use error::{ParseError, ParseResult};
pub use shape::ShapeMode;

/// What to do with an example block that fails to normalize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockPolicy {
    /// Fail the whole page on the first bad block.
    #[default]
    Abort,
    /// Drop the block from both inputs and outputs and keep going.
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub shape_mode: ShapeMode,
    pub on_block_error: BlockPolicy,
}

/// Normalized inputs and outputs of a page, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCases {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl TestCases {
    pub fn from_parts(inputs: Vec<String>, outputs: Vec<String>) -> ParseResult<Self> {
        if inputs.len() != outputs.len() {
            return Err(ParseError::StructuralMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inputs
            .iter()
            .zip(&self.outputs)
            .map(|(i, o)| (i.as_str(), o.as_str()))
    }
}

/// HTML page → example blocks → (input, output) pairs → normalized lines.
pub fn extract_cases(html: &str, opts: &ExtractOptions) -> ParseResult<TestCases> {
    let texts = blocks::example_texts(html);
    debug!("Found {} example blocks", texts.len());

    let mut inputs = Vec::with_capacity(texts.len());
    let mut outputs = Vec::with_capacity(texts.len());

    for (index, text) in texts.iter().enumerate() {
        match normalize_block(index, text, opts.shape_mode) {
            Ok((input, output)) => {
                inputs.push(input);
                outputs.push(output);
            }
            Err(e) => match opts.on_block_error {
                BlockPolicy::Abort => return Err(e),
                BlockPolicy::Skip => warn!("Skipping example block {}: {}", index, e),
            },
        }
    }

    TestCases::from_parts(inputs, outputs)
}

fn normalize_block(index: usize, text: &str, mode: ShapeMode) -> ParseResult<(String, String)> {
    let pair = blocks::split_pair(text, index)?;
    if pair.output.trim().is_empty() {
        return Err(ParseError::EmptyOutput { block: index });
    }
    let output = output::normalize_output_with(&pair.output, mode)?;
    let input = input::normalize_input_with(&pair.input, mode)?;
    Ok((input, output))
}
