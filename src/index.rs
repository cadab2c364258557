//! Document index
//!
//! The store-facing component: word get-or-create with an LRU id cache,
//! whole-document ingestion (tokenize, then one all-or-nothing transaction),
//! phrase storage and lookup, filtered searches over the positional schema,
//! and corpus statistics.

use crate::error::{ConcordError, Result};
use crate::phrase::locate_phrase;
use crate::query::QuerySpec;
use crate::reader;
use crate::records::{Document, PhraseMatch, WordAppearance};
use crate::store::{translate, Store};
use crate::tokenizer::tokenize;
use crate::words::{normalize_title, normalize_word, WORD};
use lru::LruCache;
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{debug, info};

/// Word-id lookups repeat heavily within and across documents.
const WORD_ID_CACHE_CAPACITY: usize = 1000;

/// Group names reserved by the presentation layer.
const RESERVED_GROUP_NAMES: [&str; 2] = ["None", "All"];

const INSERT_APPEARANCE: &str = "INSERT INTO word_appearance(document_id, word_id, word_index, \
     paragraph, line, line_index, line_offset, sentence, sentence_index) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const SELECT_APPEARANCES: &str = "SELECT document_id, word_id, word_index, paragraph, line, \
     line_index, line_offset, sentence, sentence_index \
     FROM word_appearance WHERE document_id == ?1 ORDER BY word_index";

/// Ordering presets for word-appearance searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOrder {
    Alphabetical,
    Appearances,
    Length,
}

impl WordOrder {
    fn sql(self) -> &'static str {
        match self {
            WordOrder::Alphabetical => "name",
            WordOrder::Appearances => "COUNT(word_index)",
            WordOrder::Length => "length",
        }
    }
}

/// Filters for document searches. Text filters are LIKE patterns.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilters {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Only documents containing this word.
    pub word: Option<String>,
}

/// Filters for word-appearance searches.
#[derive(Debug, Clone, Default)]
pub struct AppearanceFilters {
    pub word: Option<String>,
    pub document_id: Option<i64>,
    pub paragraph: Option<i64>,
    pub sentence: Option<i64>,
    /// Collapse repeated words to one row each.
    pub unique_words: bool,
    pub order: Option<WordOrder>,
}

/// Corpus-level counters, optionally scoped to one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    pub documents: u64,
    pub total_words: u64,
    pub distinct_words: u64,
    pub total_letters: u64,
    pub avg_word_length: f64,
}

pub struct DocumentIndex {
    store: Store,
    word_ids: LruCache<String, i64>,
}

impl DocumentIndex {
    pub fn new(store: Store) -> Self {
        let capacity = NonZeroUsize::new(WORD_ID_CACHE_CAPACITY).expect("nonzero capacity");
        Self {
            store,
            word_ids: LruCache::new(capacity),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Store::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Store::in_memory()?))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Switch to another store. The word-id cache belongs to the old
    /// connection and is invalidated.
    pub fn swap_store(&mut self, store: Store) {
        self.store = store;
        self.invalidate_word_cache();
    }

    pub fn invalidate_word_cache(&mut self) {
        debug!("invalidating word id cache");
        self.word_ids.clear();
    }

    //
    // Words
    //

    /// Insert a fresh word, failing with a duplicate error if it exists.
    pub fn create_word(&mut self, word: &str) -> Result<i64> {
        let word = normalize_word(word)?;
        self.store
            .conn()
            .execute(
                "INSERT INTO word(name, length) VALUES (?1, ?2)",
                params![word, word.chars().count() as i64],
            )
            .map_err(translate)?;
        let word_id = self.store.conn().last_insert_rowid();
        self.word_ids.put(word, word_id);
        Ok(word_id)
    }

    /// Insert a word if it is not stored yet; either way, return its id.
    pub fn insert_word(&mut self, word: &str) -> Result<i64> {
        let word = normalize_word(word)?;
        self.store
            .conn()
            .execute(
                "INSERT OR IGNORE INTO word(name, length) VALUES (?1, ?2)",
                params![word, word.chars().count() as i64],
            )
            .map_err(translate)?;
        let word_id = self
            .store
            .conn()
            .query_row(
                "SELECT word_id FROM word WHERE name == ?1",
                params![word],
                |row| row.get(0),
            )
            .map_err(translate)?;
        self.word_ids.put(word, word_id);
        Ok(word_id)
    }

    /// Look a word up without creating it.
    pub fn lookup_word_id(&self, word: &str) -> Result<Option<i64>> {
        let word = normalize_word(word)?;
        if let Some(&word_id) = self.word_ids.peek(&word) {
            return Ok(Some(word_id));
        }
        self.store
            .conn()
            .query_row(
                "SELECT word_id FROM word WHERE name == ?1",
                params![word],
                |row| row.get(0),
            )
            .optional()
            .map_err(translate)
    }

    /// Read-or-create word id, cached. Never fails on an existing word.
    pub fn get_word_id(&mut self, word: &str) -> Result<i64> {
        let word = normalize_word(word)?;
        if let Some(&word_id) = self.word_ids.get(&word) {
            return Ok(word_id);
        }

        // Most lookups hit existing words; search before inserting.
        let found: Option<i64> = self
            .store
            .conn()
            .query_row(
                "SELECT word_id FROM word WHERE name == ?1",
                params![word],
                |row| row.get(0),
            )
            .optional()
            .map_err(translate)?;

        let word_id = match found {
            Some(word_id) => word_id,
            None => {
                self.store
                    .conn()
                    .execute(
                        "INSERT INTO word(name, length) VALUES (?1, ?2)",
                        params![word, word.chars().count() as i64],
                    )
                    .map_err(translate)?;
                self.store.conn().last_insert_rowid()
            }
        };

        self.word_ids.put(word, word_id);
        Ok(word_id)
    }

    /// All stored words as (id, name), alphabetical.
    pub fn words(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT word_id, name FROM word ORDER BY name")
            .map_err(translate)?;
        let words = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(words)
    }

    //
    // Appearances
    //

    /// Bulk-insert pre-built appearance rows in one transaction.
    pub fn insert_appearances(&mut self, rows: &[WordAppearance]) -> Result<()> {
        let tx = self.store.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_APPEARANCE).map_err(translate)?;
            for row in rows {
                stmt.execute(params![
                    row.document_id,
                    row.word_id,
                    row.word_index,
                    row.paragraph,
                    row.line,
                    row.line_index,
                    row.line_offset,
                    row.sentence,
                    row.sentence_index,
                ])
                .map_err(translate)?;
            }
        }
        tx.commit().map_err(translate)
    }

    /// One document's appearance stream, ordered by `word_index`.
    pub fn document_appearances(&self, document_id: i64) -> Result<Vec<WordAppearance>> {
        let mut stmt = self
            .store
            .conn()
            .prepare(SELECT_APPEARANCES)
            .map_err(translate)?;
        let rows = stmt
            .query_map(params![document_id], |row| {
                Ok(WordAppearance {
                    document_id: row.get(0)?,
                    word_id: row.get(1)?,
                    word_index: row.get(2)?,
                    paragraph: row.get(3)?,
                    line: row.get(4)?,
                    line_index: row.get(5)?,
                    line_offset: row.get(6)?,
                    sentence: row.get(7)?,
                    sentence_index: row.get(8)?,
                })
            })
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(rows)
    }

    //
    // Documents
    //

    /// Ingest the document at `path`: decode, tokenize, and persist the
    /// document row, any new words, and the full appearance batch in a
    /// single transaction. Nothing is committed on failure.
    pub fn add_document(&mut self, title: &str, author: &str, path: impl AsRef<Path>) -> Result<i64> {
        let path = path.as_ref();
        let title = normalize_title(title)?;
        let author = normalize_title(author)?;
        let file = reader::parse_document_file(path)?;

        let mut appearances = Vec::new();
        for raw in tokenize(&file.text) {
            appearances.push((normalize_word(raw.word)?, raw));
        }

        let tx = self.store.transaction()?;
        tx.execute(
            "INSERT INTO document(title, author, file_path, file_size, creation_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title,
                author,
                path.display().to_string(),
                file.size,
                file.created
            ],
        )
        .map_err(translate)?;
        let document_id = tx.last_insert_rowid();

        {
            let mut insert_word = tx
                .prepare("INSERT OR IGNORE INTO word(name, length) VALUES (?1, ?2)")
                .map_err(translate)?;
            let mut select_word = tx
                .prepare("SELECT word_id FROM word WHERE name == ?1")
                .map_err(translate)?;
            let mut insert_appearance = tx.prepare(INSERT_APPEARANCE).map_err(translate)?;

            let mut ids: HashMap<&str, i64> = HashMap::new();
            for (word, raw) in &appearances {
                let word_id = match ids.get(word.as_str()) {
                    Some(&word_id) => word_id,
                    None => {
                        insert_word
                            .execute(params![word, word.chars().count() as i64])
                            .map_err(translate)?;
                        let word_id = select_word
                            .query_row(params![word], |row| row.get(0))
                            .map_err(translate)?;
                        ids.insert(word.as_str(), word_id);
                        word_id
                    }
                };

                insert_appearance
                    .execute(params![
                        document_id,
                        word_id,
                        raw.word_index,
                        raw.paragraph,
                        raw.line,
                        raw.line_index,
                        raw.line_offset,
                        raw.sentence,
                        raw.sentence_index,
                    ])
                    .map_err(translate)?;
            }
        }

        tx.commit().map_err(translate)?;
        info!(document_id, words = appearances.len(), %title, "indexed document");
        Ok(document_id)
    }

    /// Delete a document; its appearances go with it.
    pub fn remove_document(&mut self, document_id: i64) -> Result<()> {
        let affected = self
            .store
            .conn()
            .execute(
                "DELETE FROM document WHERE document_id == ?1",
                params![document_id],
            )
            .map_err(translate)?;
        if affected == 0 {
            return Err(ConcordError::NotFound(format!("document {document_id}")));
        }
        info!(document_id, "removed document");
        Ok(())
    }

    pub fn documents(&self) -> Result<Vec<Document>> {
        self.query_documents(
            "SELECT document_id, title, author, file_path, file_size, creation_date FROM document",
        )
    }

    pub fn document_title(&self, document_id: i64) -> Result<String> {
        self.store
            .conn()
            .query_row(
                "SELECT title FROM document WHERE document_id == ?1",
                params![document_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(translate)?
            .ok_or_else(|| ConcordError::NotFound(format!("document {document_id}")))
    }

    /// "TITLE by AUTHOR".
    pub fn document_full_name(&self, document_id: i64) -> Result<String> {
        self.store
            .conn()
            .query_row(
                "SELECT title || ' by ' || author FROM document WHERE document_id == ?1",
                params![document_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(translate)?
            .ok_or_else(|| ConcordError::NotFound(format!("document {document_id}")))
    }

    pub fn document_path(&self, document_id: i64) -> Result<String> {
        self.store
            .conn()
            .query_row(
                "SELECT file_path FROM document WHERE document_id == ?1",
                params![document_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(translate)?
            .ok_or_else(|| ConcordError::NotFound(format!("document {document_id}")))
    }

    //
    // Phrases
    //

    /// Store a phrase as an ordered word-reference list. Occurrences are not
    /// stored; they are located on demand.
    pub fn add_phrase(&mut self, text: &str) -> Result<i64> {
        let words = WORD
            .find_iter(text)
            .map(|m| normalize_word(m.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let tx = self.store.transaction()?;
        tx.execute(
            "INSERT INTO phrase(phrase_text, words_count) VALUES (?1, ?2)",
            params![text, words.len() as i64],
        )
        .map_err(translate)?;
        let phrase_id = tx.last_insert_rowid();

        {
            let mut insert_word = tx
                .prepare("INSERT OR IGNORE INTO word(name, length) VALUES (?1, ?2)")
                .map_err(translate)?;
            let mut select_word = tx
                .prepare("SELECT word_id FROM word WHERE name == ?1")
                .map_err(translate)?;
            let mut insert_member = tx
                .prepare(
                    "INSERT INTO word_in_phrase(phrase_id, word_id, phrase_index) \
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(translate)?;

            for (index, word) in words.iter().enumerate() {
                insert_word
                    .execute(params![word, word.chars().count() as i64])
                    .map_err(translate)?;
                let word_id: i64 = select_word
                    .query_row(params![word], |row| row.get(0))
                    .map_err(translate)?;
                insert_member
                    .execute(params![phrase_id, word_id, index as i64 + 1])
                    .map_err(translate)?;
            }
        }

        tx.commit().map_err(translate)?;
        info!(phrase_id, words = words.len(), "stored phrase");
        Ok(phrase_id)
    }

    /// All stored phrases as (id, text).
    pub fn phrases(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT phrase_id, phrase_text FROM phrase")
            .map_err(translate)?;
        let phrases = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(phrases)
    }

    /// A phrase's word ids in phrase order.
    pub fn phrase_words(&self, phrase_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .store
            .conn()
            .prepare(
                "SELECT word_id FROM word_in_phrase \
                 WHERE phrase_id == ?1 ORDER BY phrase_index",
            )
            .map_err(translate)?;
        let ids = stmt
            .query_map(params![phrase_id], |row| row.get(0))
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(ids)
    }

    /// Locate a stored phrase inside one document.
    pub fn find_phrase(&self, phrase_id: i64, document_id: i64) -> Result<Vec<PhraseMatch>> {
        let phrase = self.phrase_words(phrase_id)?;
        let appearances = self.document_appearances(document_id)?;
        Ok(locate_phrase(&phrase, &appearances))
    }

    /// Locate a stored phrase across the whole corpus, as
    /// (document_id, match) pairs.
    pub fn find_phrase_everywhere(&self, phrase_id: i64) -> Result<Vec<(i64, PhraseMatch)>> {
        let phrase = self.phrase_words(phrase_id)?;
        let mut hits = Vec::new();
        for document in self.documents()? {
            let appearances = self.document_appearances(document.document_id)?;
            for found in locate_phrase(&phrase, &appearances) {
                hits.push((document.document_id, found));
            }
        }
        Ok(hits)
    }

    /// Resolve a sentence-relative word position to (line, line_offset).
    /// With `end` set, the offset points just past the word, for
    /// highlighting its end.
    pub fn word_location_to_offset(
        &self,
        document_id: i64,
        sentence: u32,
        sentence_index: u32,
        end: bool,
    ) -> Result<Option<(u32, u32)>> {
        let sql = if end {
            "SELECT line, line_offset + length FROM word_appearance NATURAL JOIN word \
             WHERE document_id == ?1 AND sentence == ?2 AND sentence_index == ?3"
        } else {
            "SELECT line, line_offset FROM word_appearance \
             WHERE document_id == ?1 AND sentence == ?2 AND sentence_index == ?3"
        };
        self.store
            .conn()
            .query_row(sql, params![document_id, sentence, sentence_index], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(translate)
    }

    //
    // Word groups
    //

    /// Create a named word group. The name is a title; a couple of names are
    /// reserved by the presentation layer.
    pub fn add_group(&mut self, name: &str) -> Result<i64> {
        let name = normalize_title(name)?;
        if RESERVED_GROUP_NAMES.contains(&name.as_str()) {
            return Err(ConcordError::ConstraintViolation(format!(
                "reserved group name: {name}"
            )));
        }
        self.store
            .conn()
            .execute("INSERT INTO words_group(name) VALUES (?1)", params![name])
            .map_err(translate)?;
        Ok(self.store.conn().last_insert_rowid())
    }

    /// Add a word (created if new) to a group.
    pub fn add_word_to_group(&mut self, group_id: i64, word: &str) -> Result<()> {
        let word_id = self.get_word_id(word)?;
        self.store
            .conn()
            .execute(
                "INSERT INTO word_in_group(group_id, word_id) VALUES (?1, ?2)",
                params![group_id, word_id],
            )
            .map_err(translate)?;
        Ok(())
    }

    pub fn groups(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT group_id, name FROM words_group")
            .map_err(translate)?;
        let groups = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(groups)
    }

    /// Words in a group as (id, name), alphabetical.
    pub fn group_words(&self, group_id: i64) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .store
            .conn()
            .prepare(
                "SELECT word_id, name FROM word NATURAL JOIN word_in_group \
                 WHERE group_id == ?1 ORDER BY name",
            )
            .map_err(translate)?;
        let words = stmt
            .query_map(params![group_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(words)
    }

    //
    // Dynamic searches
    //

    /// Search documents with dynamic filters.
    pub fn search_documents(&self, filters: &DocumentFilters) -> Result<Vec<Document>> {
        let mut spec = QuerySpec::new()
            .table("document")
            .columns([
                "document_id",
                "title",
                "author",
                "file_path",
                "file_size",
                "creation_date",
            ])
            .filter_text("title", filters.title.as_deref())
            .filter_text("author", filters.author.as_deref());

        if filters.word.is_some() {
            spec = spec
                .table("word")
                .table("word_appearance")
                .filter_text("name", filters.word.as_deref())
                .group_by("document_id");
        }

        self.query_documents(&spec.render()?)
    }

    /// Search word appearances with dynamic filters, as (word name, row).
    pub fn search_appearances(
        &self,
        filters: &AppearanceFilters,
    ) -> Result<Vec<(String, WordAppearance)>> {
        let mut spec = QuerySpec::new()
            .table("word")
            .table("word_appearance")
            .columns([
                "name",
                "document_id",
                "word_id",
                "word_index",
                "paragraph",
                "line",
                "line_index",
                "line_offset",
                "sentence",
                "sentence_index",
            ])
            .filter_text("name", filters.word.as_deref())
            .filter_int("document_id", filters.document_id)
            .filter_int("paragraph", filters.paragraph)
            .filter_int("sentence", filters.sentence);

        if filters.unique_words {
            spec = spec.group_by("word_id");
        }
        if let Some(order) = filters.order {
            spec = spec.order_by(order.sql());
        }

        let sql = spec.render()?;
        let mut stmt = self.store.conn().prepare(&sql).map_err(translate)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    WordAppearance {
                        document_id: row.get(1)?,
                        word_id: row.get(2)?,
                        word_index: row.get(3)?,
                        paragraph: row.get(4)?,
                        line: row.get(5)?,
                        line_index: row.get(6)?,
                        line_offset: row.get(7)?,
                        sentence: row.get(8)?,
                        sentence_index: row.get(9)?,
                    },
                ))
            })
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(rows)
    }

    //
    // Statistics
    //

    /// Corpus counters, scoped to one document when `document_id` is given.
    pub fn stats(&self, document_id: Option<i64>) -> Result<CorpusStats> {
        let documents = scalar_u64(
            &self
                .store
                .execute("SELECT COUNT(document_id) FROM document")?,
        );

        let total_words = self.scalar_stat("COUNT(word_index)", false, document_id)?;
        let distinct_words = self.scalar_stat("COUNT(DISTINCT word_id)", false, document_id)?;
        let total_letters = self.scalar_stat("SUM(length)", true, document_id)?;

        let avg_word_length = if total_words == 0 {
            0.0
        } else {
            total_letters as f64 / total_words as f64
        };

        Ok(CorpusStats {
            documents,
            total_words,
            distinct_words,
            total_letters,
            avg_word_length,
        })
    }

    fn scalar_stat(&self, column: &str, join_word: bool, document_id: Option<i64>) -> Result<u64> {
        let mut spec = QuerySpec::new()
            .table("word_appearance")
            .column(column)
            .filter_int("document_id", document_id);
        if join_word {
            spec = spec.table("word");
        }
        Ok(scalar_u64(&self.store.execute(&spec.render()?)?))
    }

    fn query_documents(&self, sql: &str) -> Result<Vec<Document>> {
        let mut stmt = self.store.conn().prepare(sql).map_err(translate)?;
        let documents = stmt
            .query_map([], |row| {
                Ok(Document {
                    document_id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    file_path: row.get(3)?,
                    file_size: row.get(4)?,
                    creation_date: row.get(5)?,
                })
            })
            .map_err(translate)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(translate)?;
        Ok(documents)
    }
}

fn scalar_u64(rows: &[Vec<Value>]) -> u64 {
    match rows.first().and_then(|row| row.first()) {
        Some(Value::Integer(n)) => *n as u64,
        Some(Value::Real(f)) => *f as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn index() -> DocumentIndex {
        DocumentIndex::in_memory().unwrap()
    }

    fn document_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_get_word_id_idempotent() {
        let mut index = index();
        let first = index.get_word_id("Cat").unwrap();
        let second = index.get_word_id("cat ").unwrap();
        assert_eq!(first, second);
        assert_eq!(index.words().unwrap(), [(first, "cat".to_string())]);
    }

    #[test]
    fn test_create_word_rejects_duplicates() {
        let mut index = index();
        let word_id = index.create_word("cat").unwrap();
        assert!(matches!(
            index.create_word("cat"),
            Err(ConcordError::DuplicateEntry(_))
        ));
        // The idempotent path still succeeds.
        assert_eq!(index.insert_word("cat").unwrap(), word_id);
    }

    #[test]
    fn test_invalid_words_rejected_before_writes() {
        let mut index = index();
        assert!(matches!(
            index.get_word_id("123"),
            Err(ConcordError::InvalidWord(_))
        ));
        assert!(index.words().unwrap().is_empty());
    }

    #[test]
    fn test_add_document_round_trip() {
        let file =
            document_file("Title: Foo\nAuthor: Bar\nHello world. Nice day!\n\nNew paragraph here.");
        let mut index = index();
        let document_id = index
            .add_document("foo", "bar", file.path())
            .unwrap();

        assert_eq!(index.document_title(document_id).unwrap(), "Foo");
        assert_eq!(
            index.document_full_name(document_id).unwrap(),
            "Foo by Bar"
        );

        let appearances = index.document_appearances(document_id).unwrap();
        let indices: Vec<u32> = appearances.iter().map(|a| a.word_index).collect();
        assert_eq!(indices, (1..=7).collect::<Vec<u32>>());
        let sentences: Vec<u32> = appearances.iter().map(|a| a.sentence).collect();
        assert_eq!(sentences, [1, 1, 2, 2, 3, 3, 3]);

        // Stored words are normalized to lowercase.
        assert!(index.lookup_word_id("hello").unwrap().is_some());
        assert!(index.lookup_word_id("paragraph").unwrap().is_some());
    }

    #[test]
    fn test_add_document_missing_file() {
        let mut index = index();
        assert!(matches!(
            index.add_document("foo", "bar", "/no/such/file.txt"),
            Err(ConcordError::MissingFile(_))
        ));
        assert!(index.documents().unwrap().is_empty());
    }

    #[test]
    fn test_remove_document_cascades() {
        let file = document_file("some words here.");
        let mut index = index();
        let document_id = index.add_document("doc", "me", file.path()).unwrap();
        assert!(!index.document_appearances(document_id).unwrap().is_empty());

        index.remove_document(document_id).unwrap();
        assert!(index.document_appearances(document_id).unwrap().is_empty());
        assert!(index.documents().unwrap().is_empty());
        assert!(matches!(
            index.remove_document(document_id),
            Err(ConcordError::NotFound(_))
        ));
    }

    #[test]
    fn test_phrase_round_trip() {
        let file = document_file("the quick brown fox. the lazy dog.");
        let mut index = index();
        let document_id = index.add_document("foxes", "me", file.path()).unwrap();
        let phrase_id = index.add_phrase("Quick Brown").unwrap();

        assert_eq!(index.phrase_words(phrase_id).unwrap().len(), 2);
        let matches = index.find_phrase(phrase_id, document_id).unwrap();
        assert_eq!(
            matches,
            [PhraseMatch { sentence: 1, start_index: 2, end_index: 3 }]
        );

        let everywhere = index.find_phrase_everywhere(phrase_id).unwrap();
        assert_eq!(everywhere, [(document_id, matches[0])]);
    }

    #[test]
    fn test_phrase_does_not_cross_sentences() {
        let file = document_file("one two. three four.");
        let mut index = index();
        let document_id = index.add_document("doc", "me", file.path()).unwrap();
        let phrase_id = index.add_phrase("two three").unwrap();
        assert!(index.find_phrase(phrase_id, document_id).unwrap().is_empty());
    }

    #[test]
    fn test_word_location_to_offset() {
        let file = document_file("Hello world.");
        let mut index = index();
        let document_id = index.add_document("doc", "me", file.path()).unwrap();

        let start = index
            .word_location_to_offset(document_id, 1, 2, false)
            .unwrap();
        assert_eq!(start, Some((1, 6)));

        // End offset adds the word's length.
        let end = index
            .word_location_to_offset(document_id, 1, 2, true)
            .unwrap();
        assert_eq!(end, Some((1, 11)));

        let missing = index
            .word_location_to_offset(document_id, 9, 9, false)
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_search_documents_by_contained_word() {
        let first = document_file("common aardvark.");
        let second = document_file("common words only.");
        let mut index = index();
        let first_id = index.add_document("first", "me", first.path()).unwrap();
        index.add_document("second", "me", second.path()).unwrap();

        let filters = DocumentFilters {
            word: Some("aardvark".to_string()),
            ..Default::default()
        };
        let found = index.search_documents(&filters).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].document_id, first_id);

        let all = index.search_documents(&DocumentFilters::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_search_appearances_unique_and_ordered() {
        let file = document_file("beta beta alpha.");
        let mut index = index();
        index.add_document("doc", "me", file.path()).unwrap();

        let filters = AppearanceFilters {
            unique_words: true,
            order: Some(WordOrder::Alphabetical),
            ..Default::default()
        };
        let rows = index.search_appearances(&filters).unwrap();
        let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[test]
    fn test_groups() {
        let mut index = index();
        let group_id = index.add_group("small animals").unwrap();
        index.add_word_to_group(group_id, "cat").unwrap();
        index.add_word_to_group(group_id, "Bat").unwrap();

        let names: Vec<String> = index
            .group_words(group_id)
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, ["bat", "cat"]);

        assert!(matches!(
            index.add_group("all"),
            Err(ConcordError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_stats() {
        let file = document_file("aa bb aa.");
        let mut index = index();
        let document_id = index.add_document("doc", "me", file.path()).unwrap();

        let stats = index.stats(Some(document_id)).unwrap();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.distinct_words, 2);
        assert_eq!(stats.total_letters, 6);
        assert!((stats.avg_word_length - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_swap_store_invalidates_word_cache() {
        let mut index = index();
        index.get_word_id("cat").unwrap();

        index.swap_store(Store::in_memory().unwrap());
        // A stale cache would still answer for "cat" here.
        assert_eq!(index.lookup_word_id("cat").unwrap(), None);
    }
}
