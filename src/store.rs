//! SQLite appearance store
//!
//! Thin wrapper around a rusqlite connection: schema initialization, a
//! generic `execute` for queries rendered by the builder, and translation of
//! backend constraint failures into the crate's error taxonomy so callers
//! never see raw SQLite shapes.

use crate::error::{ConcordError, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS document (
    document_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    file_path TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    creation_date TEXT NOT NULL
);

-- Words are shared across documents and phrases; the CHECK repeats the
-- classifier's rules as defense in depth.
CREATE TABLE IF NOT EXISTS word (
    word_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    length INTEGER NOT NULL,
    CHECK (length > 0 AND name = lower(name) AND name NOT LIKE '% %')
);

CREATE TABLE IF NOT EXISTS word_appearance (
    document_id INTEGER NOT NULL REFERENCES document(document_id) ON DELETE CASCADE,
    word_id INTEGER NOT NULL REFERENCES word(word_id),
    word_index INTEGER NOT NULL,
    paragraph INTEGER NOT NULL,
    line INTEGER NOT NULL,
    line_index INTEGER NOT NULL,
    line_offset INTEGER NOT NULL,
    sentence INTEGER NOT NULL,
    sentence_index INTEGER NOT NULL,
    PRIMARY KEY (document_id, word_index)
);

CREATE INDEX IF NOT EXISTS idx_word_appearance_word
ON word_appearance(word_id);

CREATE INDEX IF NOT EXISTS idx_word_appearance_sentence
ON word_appearance(document_id, sentence, sentence_index);

CREATE TABLE IF NOT EXISTS phrase (
    phrase_id INTEGER PRIMARY KEY AUTOINCREMENT,
    phrase_text TEXT NOT NULL,
    words_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS word_in_phrase (
    phrase_id INTEGER NOT NULL REFERENCES phrase(phrase_id) ON DELETE CASCADE,
    word_id INTEGER NOT NULL REFERENCES word(word_id),
    phrase_index INTEGER NOT NULL,
    PRIMARY KEY (phrase_id, phrase_index)
);

CREATE TABLE IF NOT EXISTS words_group (
    group_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS word_in_group (
    group_id INTEGER NOT NULL REFERENCES words_group(group_id) ON DELETE CASCADE,
    word_id INTEGER NOT NULL REFERENCES word(word_id),
    PRIMARY KEY (group_id, word_id)
);
"#;

/// An open connection to the index schema, on disk or in memory.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if missing) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(translate)?;
        let store = Self {
            conn,
            path: Some(path.as_ref().to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a fresh in-memory store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(translate)?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA).map_err(translate)
    }

    /// Backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a rendered query and collect its rows as generic values.
    pub fn execute(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self.conn.prepare(sql).map_err(translate)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(rows)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn.transaction().map_err(translate)
    }
}

/// Map constraint failures onto the crate taxonomy; everything else passes
/// through as a database error.
pub(crate) fn translate(err: rusqlite::Error) -> ConcordError {
    if let rusqlite::Error::SqliteFailure(_, Some(message)) = &err {
        if message.starts_with("UNIQUE constraint failed") {
            return ConcordError::DuplicateEntry(message.clone());
        }
        if message.starts_with("CHECK constraint failed") {
            return ConcordError::ConstraintViolation(message.clone());
        }
    }
    ConcordError::Database(err)
}
