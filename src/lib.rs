//! Concord - positional word-index core for a desktop concordance tool
//!
//! Tokenizes plain-text documents into word appearances with full positional
//! metadata, stores them in SQLite, and answers word, phrase, and document
//! searches over the resulting index.

pub mod error;
pub mod records;
pub mod words;
pub mod tokenizer;
pub mod query;
pub mod phrase;
pub mod store;
pub mod reader;
pub mod index;

pub use error::{ConcordError, Result};
pub use index::{
    AppearanceFilters, CorpusStats, DocumentFilters, DocumentIndex, WordOrder,
};
pub use phrase::locate_phrase;
pub use query::{escape_like, QuerySpec};
pub use reader::{parse_document_file, read_text, DocumentFile};
pub use records::{Document, PhraseMatch, WordAppearance};
pub use store::Store;
pub use tokenizer::{tokenize, RawAppearance, Tokenizer};
pub use words::{is_valid_word, normalize_title, normalize_word};
