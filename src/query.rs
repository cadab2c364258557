//! Typed query-spec builder
//!
//! Assembles ad-hoc SELECT statements over the positional index from
//! structured input. Structural identifiers (tables, columns, GROUP BY /
//! ORDER BY expressions) are checked against the schema allow-list rather
//! than trusted; pattern filter values have embedded quotes escaped before
//! rendering. Tables are combined with NATURAL JOIN, so callers must pick
//! tables that share their join-key columns.

use crate::error::{ConcordError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Tables the builder will join.
const KNOWN_TABLES: &[&str] = &[
    "document",
    "word",
    "word_appearance",
    "phrase",
    "word_in_phrase",
    "words_group",
    "word_in_group",
];

/// Columns the builder will select or filter on.
const KNOWN_COLUMNS: &[&str] = &[
    "document_id",
    "title",
    "author",
    "file_path",
    "file_size",
    "creation_date",
    "word_id",
    "name",
    "length",
    "word_index",
    "paragraph",
    "line",
    "line_index",
    "line_offset",
    "sentence",
    "sentence_index",
    "phrase_id",
    "phrase_text",
    "words_count",
    "phrase_index",
    "group_id",
];

static AGGREGATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:COUNT|SUM|AVG|MIN|MAX)\(\s*(?:DISTINCT\s+)?([a-z_]+|\*)\s*\)$")
        .expect("aggregate pattern")
});

#[derive(Debug, Clone)]
enum FilterValue {
    Text(String),
    Int(i64),
}

/// Structured specification of a SELECT over the index schema.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    columns: Vec<String>,
    tables: BTreeSet<String>,
    filters: Vec<(String, FilterValue)>,
    group_by: Option<String>,
    order_by: Option<String>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to join. A name containing whitespace is treated as a
    /// sub-query and rendered parenthesized, without further checks.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.tables.insert(table.into());
        self
    }

    /// Add a column to select. An empty column list selects `*`.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add a pattern filter. `None` and empty values are silently dropped.
    /// The value is rendered into a LIKE clause, so `%` and `_` act as
    /// wildcards unless pre-escaped with [`escape_like`].
    pub fn filter_text(mut self, column: impl Into<String>, value: Option<&str>) -> Self {
        if let Some(value) = value {
            if !value.is_empty() {
                self.filters
                    .push((column.into(), FilterValue::Text(value.to_string())));
            }
        }
        self
    }

    /// Add an equality filter. `None` is silently dropped.
    pub fn filter_int(mut self, column: impl Into<String>, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.filters.push((column.into(), FilterValue::Int(value)));
        }
        self
    }

    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_by = Some(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    /// Render the spec to SQL text.
    pub fn render(&self) -> Result<String> {
        if self.tables.is_empty() {
            return Err(ConcordError::EmptyTableSet);
        }

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            for column in &self.columns {
                validate_expr(column)?;
            }
            self.columns.join(", ")
        };

        let tables = self
            .tables
            .iter()
            .map(|table| render_table(table))
            .collect::<Result<Vec<_>>>()?
            .join(" NATURAL JOIN ");

        let mut query = format!("SELECT {columns} FROM {tables}");

        let mut constraints = Vec::new();
        for (column, value) in &self.filters {
            if !is_known_column(column) {
                return Err(ConcordError::UnknownIdentifier(column.clone()));
            }
            match value {
                FilterValue::Text(text) => {
                    let escaped = text.replace('"', "\"\"");
                    if escaped.contains('\\') {
                        constraints.push(format!("{column} LIKE \"{escaped}\" ESCAPE \"\\\""));
                    } else {
                        constraints.push(format!("{column} LIKE \"{escaped}\""));
                    }
                }
                FilterValue::Int(n) => constraints.push(format!("{column} == {n}")),
            }
        }

        if !constraints.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&constraints.join(" AND "));
        }

        if let Some(group_by) = &self.group_by {
            validate_expr(group_by)?;
            query.push_str(" GROUP BY ");
            query.push_str(group_by);
        }

        if let Some(order_by) = &self.order_by {
            validate_order(order_by)?;
            query.push_str(" ORDER BY ");
            query.push_str(order_by);
        }

        Ok(query)
    }
}

/// Escape LIKE wildcard metacharacters for literal matching.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_known_column(name: &str) -> bool {
    KNOWN_COLUMNS.contains(&name)
}

fn render_table(table: &str) -> Result<String> {
    if table.contains(char::is_whitespace) {
        // Sub-query from a trusted caller.
        return Ok(format!("({table})"));
    }
    if !KNOWN_TABLES.contains(&table) {
        return Err(ConcordError::UnknownIdentifier(table.to_string()));
    }
    Ok(table.to_string())
}

/// A selectable expression: a schema column or an aggregate over one.
fn validate_expr(expr: &str) -> Result<()> {
    if is_known_column(expr) {
        return Ok(());
    }
    if let Some(caps) = AGGREGATE.captures(expr) {
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if inner == "*" || is_known_column(inner) {
            return Ok(());
        }
    }
    Err(ConcordError::UnknownIdentifier(expr.to_string()))
}

fn validate_order(expr: &str) -> Result<()> {
    let expr = expr
        .strip_suffix(" DESC")
        .or_else(|| expr.strip_suffix(" ASC"))
        .unwrap_or(expr);
    validate_expr(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_table_pattern_filter() {
        let query = QuerySpec::new()
            .table("word")
            .filter_text("name", Some("cat"))
            .render()
            .unwrap();
        assert_eq!(query, "SELECT * FROM word WHERE name LIKE \"cat\"");
    }

    #[test]
    fn test_empty_filters_omit_where() {
        let query = QuerySpec::new()
            .table("word")
            .filter_text("name", None)
            .filter_text("name", Some(""))
            .filter_int("word_id", None)
            .render()
            .unwrap();
        assert_eq!(query, "SELECT * FROM word");
    }

    #[test]
    fn test_int_filter_and_conjunction() {
        let query = QuerySpec::new()
            .table("word_appearance")
            .filter_int("document_id", Some(3))
            .filter_int("sentence", Some(7))
            .render()
            .unwrap();
        assert_eq!(
            query,
            "SELECT * FROM word_appearance WHERE document_id == 3 AND sentence == 7"
        );
    }

    #[test]
    fn test_natural_join_and_clauses() {
        let query = QuerySpec::new()
            .table("word_appearance")
            .table("word")
            .columns(["name", "COUNT(word_index)"])
            .filter_int("document_id", Some(1))
            .group_by("word_id")
            .order_by("COUNT(word_index) DESC")
            .render()
            .unwrap();
        assert_eq!(
            query,
            "SELECT name, COUNT(word_index) FROM word NATURAL JOIN word_appearance \
             WHERE document_id == 1 GROUP BY word_id ORDER BY COUNT(word_index) DESC"
        );
    }

    #[test]
    fn test_subquery_table_passes_through() {
        let query = QuerySpec::new()
            .table("SELECT word_id FROM word_in_group")
            .render()
            .unwrap();
        assert_eq!(query, "SELECT * FROM (SELECT word_id FROM word_in_group)");
    }

    #[test]
    fn test_no_tables_fails() {
        assert!(matches!(
            QuerySpec::new().render(),
            Err(ConcordError::EmptyTableSet)
        ));
    }

    #[test]
    fn test_unknown_identifiers_rejected() {
        assert!(matches!(
            QuerySpec::new().table("secrets").render(),
            Err(ConcordError::UnknownIdentifier(_))
        ));
        assert!(matches!(
            QuerySpec::new()
                .table("word")
                .column("name;--")
                .render(),
            Err(ConcordError::UnknownIdentifier(_))
        ));
        assert!(matches!(
            QuerySpec::new()
                .table("word")
                .filter_text("password", Some("x"))
                .render(),
            Err(ConcordError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_quote_escaping_in_pattern() {
        let query = QuerySpec::new()
            .table("word")
            .filter_text("name", Some("a\"b"))
            .render()
            .unwrap();
        assert_eq!(query, "SELECT * FROM word WHERE name LIKE \"a\"\"b\"");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
