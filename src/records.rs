//! Stored record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document row. Word appearances are owned by the document and die with
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub document_id: i64,
    pub title: String,
    pub author: String,
    pub file_path: String,
    pub file_size: u64,
    pub creation_date: DateTime<Utc>,
}

/// One occurrence of a word in a document. For a fixed document,
/// `word_index` runs densely from 1 with no gaps, and
/// `(document_id, word_index)` identifies the appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAppearance {
    pub document_id: i64,
    pub word_id: i64,
    pub word_index: u32,
    pub paragraph: u32,
    pub line: u32,
    pub line_index: u32,
    pub line_offset: u32,
    pub sentence: u32,
    pub sentence_index: u32,
}

/// A phrase occurrence inside one sentence of a document, as sentence-relative
/// word positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub sentence: u32,
    pub start_index: u32,
    pub end_index: u32,
}
