//! Word classification and normalization
//!
//! The sole gatekeepers in front of every store write: single words are
//! lowercased runs of letters with optional internal apostrophes, titles are
//! title-cased sequences of such words separated by non-letter characters.

use crate::error::{ConcordError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// A word: letters with optional single internal apostrophes, starting and
/// ending with a letter. Unicode letter class; digits and underscores are not
/// word characters.
pub(crate) static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}+(?:'\p{L}+)*").expect("word pattern"));

static SINGLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}+(?:'\p{L}+)*$").expect("single word pattern"));

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{L}+(?:'\p{L}+)*(?:[^\p{L}]+\p{L}+(?:'\p{L}+)*)*$").expect("title pattern")
});

/// Check whether `s` is a single valid word.
pub fn is_valid_word(s: &str) -> bool {
    SINGLE_WORD.is_match(s)
}

/// Trim and lowercase `s`, failing unless the result is a valid single word.
pub fn normalize_word(s: &str) -> Result<String> {
    let word = s.trim().to_lowercase();
    if !is_valid_word(&word) {
        return Err(ConcordError::InvalidWord(s.to_string()));
    }
    Ok(word)
}

/// Trim and title-case `s`, failing unless the result is one or more valid
/// words separated by non-letter characters.
pub fn normalize_title(s: &str) -> Result<String> {
    let title = to_title_case(s.trim());
    if !TITLE.is_match(&title) {
        return Err(ConcordError::InvalidTitle(s.to_string()));
    }
    Ok(title)
}

/// Uppercase the first letter of every letter run, lowercase the rest.
fn to_title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_run {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}
