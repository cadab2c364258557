//! Document file reading
//!
//! The file-facing collaborator in front of the tokenizer: decodes raw bytes
//! by trying a short ordered list of candidate encodings, and pulls document
//! metadata (`Title:` / `Author:` headers, size, creation date) out of the
//! file.

use crate::error::{ConcordError, Result};
use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Title: (.+)$").expect("title pattern"));
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Author: (.+)$").expect("author pattern"));

/// A decoded document file with its metadata.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub title: Option<String>,
    pub author: Option<String>,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub text: String,
}

/// Read and decode the file at `path`.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConcordError::MissingFile(path.display().to_string()));
    }

    let bytes = fs::read(path)?;
    // Candidate encodings, tried in order.
    let encodings: [&Encoding; 2] = [UTF_8, WINDOWS_1252];
    for encoding in encodings {
        let (text, _, had_errors) = encoding.decode(&bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
    }

    Err(ConcordError::Decode(path.display().to_string()))
}

/// Read a document file: decode its text and extract title, author, size,
/// and creation date (falling back to the modification date, then to now).
pub fn parse_document_file(path: impl AsRef<Path>) -> Result<DocumentFile> {
    let path = path.as_ref();
    let text = read_text(path)?;

    let mut title = None;
    let mut author = None;
    for line in text.lines() {
        if title.is_none() {
            title = TITLE.captures(line).map(|caps| caps[1].to_string());
        }
        if author.is_none() {
            author = AUTHOR.captures(line).map(|caps| caps[1].to_string());
        }
        if title.is_some() && author.is_some() {
            break;
        }
    }

    let metadata = fs::metadata(path)?;
    let created = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(DocumentFile {
        title,
        author,
        size: metadata.len(),
        created,
        text,
    })
}
