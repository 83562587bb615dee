use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::error::{ParseError, ParseResult};

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Input:|Output:|Explanation:)\s*").unwrap());
static PRE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").unwrap());
static EXAMPLE_BLOCK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.example-block").unwrap());

/// Raw input and output statements of one example, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplePair {
    pub input: String,
    pub output: String,
}

/// Visible text of every example block in document order.
///
/// `<pre>` elements win; pages without any fall back to
/// `div.example-block`. Child text runs are joined with a single space.
pub fn example_texts(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    let mut nodes: Vec<ElementRef<'_>> = doc.select(&PRE_SEL).collect();
    if nodes.is_empty() {
        nodes = doc.select(&EXAMPLE_BLOCK_SEL).collect();
    }

    nodes
        .iter()
        .map(|node| node.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .collect()
}

/// Strip the labels and split a block into its input and output lines.
///
/// The first line is the input statement. The second line, minus its first
/// character (the space left behind by the `Output:` label), is the output.
/// Anything after that is explanation and ignored. Trailing whitespace left
/// by inline markup is trimmed from both lines.
pub fn split_pair(text: &str, block: usize) -> ParseResult<ExamplePair> {
    let cleaned = LABEL_RE.replace_all(text, "");
    let mut lines = cleaned.lines().map(str::trim_end);

    let input = lines.next().unwrap_or_default().to_string();
    let output = lines
        .next()
        .ok_or(ParseError::MissingOutputLine { block })?
        .chars()
        .skip(1)
        .collect();

    Ok(ExamplePair { input, output })
}
