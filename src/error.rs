//! Error types for Concord

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConcordError {
    #[error("Invalid word: {0:?}")]
    InvalidWord(String),

    #[error("Invalid title: {0:?}")]
    InvalidTitle(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query spec has no tables")]
    EmptyTableSet,

    #[error("Unknown identifier: {0:?}")]
    UnknownIdentifier(String),

    #[error("Could not decode {0:?} with any candidate encoding")]
    Decode(String),

    #[error("File not found: {0:?}")]
    MissingFile(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConcordError>;

impl serde::Serialize for ConcordError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
