// piiguard-ner/src/tokenizer/mod.rs
//! Splits text into alphanumeric word tokens with byte offsets.
//!
//! Tokens never contain punctuation. The recognizer inspects the gap
//! between two tokens to decide whether they may belong to one entity.

use alloc::vec::Vec;

/// A word token borrowed from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Token<'a> {
    /// True when the first character is uppercase (`John`, `SSN`).
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn is_numeric(&self) -> bool {
        !self.text.is_empty() && self.text.bytes().all(|b| b.is_ascii_digit())
    }

    /// Parses the token as a small unsigned number, if it is one.
    pub fn as_number(&self) -> Option<u32> {
        if self.is_numeric() && self.text.len() <= 4 {
            self.text.parse().ok()
        } else {
            None
        }
    }
}

/// Splits `text` into maximal runs of alphanumeric characters.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut current: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if current.is_none() {
                current = Some(idx);
            }
        } else if let Some(start) = current.take() {
            tokens.push(Token { text: &text[start..idx], start, end: idx });
        }
    }
    if let Some(start) = current {
        tokens.push(Token { text: &text[start..], start, end: text.len() });
    }

    tokens
}

/// Returns the text between two tokens.
pub fn gap<'a>(text: &'a str, left: &Token<'_>, right: &Token<'_>) -> &'a str {
    &text[left.end..right.start]
}

/// True when two tokens are separated by a single space, i.e. they can be
/// read as one multi-word name.
pub fn is_joinable(text: &str, left: &Token<'_>, right: &Token<'_>) -> bool {
    gap(text, left, right) == " "
}
