use regex::Regex;
use std::sync::LazyLock;

static SPACE_OR_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\s\p{Z}\p{P}]+").expect("tokenizer pattern is valid"));

/// Split text into lower-cased terms on whitespace and punctuation.
pub fn tokenize(text: &str) -> Vec<String> {
    SPACE_OR_PUNCTUATION
        .split(text)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}
