//! Document, Field, Query, and result types shared between the engine and
//! the HTTP layer.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::Token;

/// The default number of results per page when a query doesn't specify one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A single named value on a document, plus the token set derived from it.
///
/// The token set is populated by the engine during indexing and is what
/// removal uses to know which inverted-index entries to purge; it is not
/// meant to be set directly by callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub value: String,
    #[serde(default)]
    pub tokens: HashSet<Token>,
}

impl Field {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tokens: HashSet::new(),
        }
    }
}

/// A document as stored by a collection.
///
/// `uid` is assigned by the engine on first index and never changes
/// afterwards; `id` is the caller-supplied external identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub uid: u64,
    pub id: String,
    pub fields: HashMap<String, Field>,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl Document {
    /// A new, not-yet-indexed document. Timestamps are placeholders; the
    /// engine overwrites them on `index`.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid: 0,
            id: id.into(),
            fields: HashMap::new(),
            date_added: now,
            date_updated: now,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Field::new(value));
        self
    }
}

/// A search query against a single collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub terms: String,
    /// Pipe-delimited field-name list; empty means "return only id".
    pub return_fields: String,
    pub page_size: usize,
    pub page: usize,
    pub partial_match: bool,
}

impl Query {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            ..Default::default()
        }
    }
}

/// One matched document in a [`SearchResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocResult {
    pub id: String,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub fields: HashMap<String, String>,
}

/// The response of [`crate::engine::SearchEngine::query`] or `query_field`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub hits: usize,
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    pub documents: Vec<DocResult>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            hits: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            documents: Vec::new(),
        }
    }
}
