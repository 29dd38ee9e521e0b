//! Per-collection search engine: indexing, removal, and querying.
//!
//! All state is owned by one engine and every public operation serializes
//! through a single [`tokio::sync::Mutex`], which is a deliberate
//! strengthening beyond locking only the id counter: the system this crate
//! ports leaves `Add`/`Remove` unsynchronized and only guards the id
//! counter, a gap called out in its own comments.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

use crate::engine::document::{DEFAULT_PAGE_SIZE, DocResult, Document, Query, SearchResult};
use crate::error::Result;
use crate::index::{InvertedIndex, KGramIndex};
use crate::persistence::{self, IndexSnapshot};
use crate::text::{SimpleTokenizer, TextAnalyzer, Token};

/// Fallback persistence root used when a caller constructs a persistent
/// engine directly with an empty path, bypassing the collection manager.
pub const DEFAULT_SAVE_PATH_TEMPLATE: &str = "/te_search_data";
pub const DEFAULT_SAVE_NAME: &str = "__default_collection";

fn default_save_path() -> PathBuf {
    Path::new(DEFAULT_SAVE_PATH_TEMPLATE).join(DEFAULT_SAVE_NAME)
}

struct EngineState {
    tokenizer: SimpleTokenizer,
    documents: HashMap<u64, Document>,
    external_to_internal: HashMap<String, u64>,
    inverted_index: InvertedIndex,
    kgram_index: KGramIndex,
}

impl EngineState {
    fn new() -> Self {
        Self {
            tokenizer: SimpleTokenizer::new(),
            documents: HashMap::new(),
            external_to_internal: HashMap::new(),
            inverted_index: InvertedIndex::new(),
            kgram_index: KGramIndex::new(),
        }
    }

    fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            external_to_internal_id: self.external_to_internal.clone(),
            index: self.inverted_index.table().clone(),
            k_index: self.kgram_index.table().clone(),
            next_index: self.inverted_index.current_index(),
        }
    }
}

/// A single collection's full-text index, documents, and (optionally) its
/// on-disk persistence path.
pub struct SearchEngine {
    state: Mutex<EngineState>,
    save_path: Option<PathBuf>,
    support_wildcard: bool,
}

impl SearchEngine {
    /// An in-memory engine with wildcard (k-gram) support enabled.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::new()),
            save_path: None,
            support_wildcard: true,
        }
    }

    /// Disables or re-enables k-gram indexing. Disabling trades away
    /// partial/prefix matching for lower memory use.
    pub fn with_wildcard(mut self, enabled: bool) -> Self {
        self.support_wildcard = enabled;
        self
    }

    /// A persistent engine rooted at `save_path`, restoring any prior state
    /// found there. An empty path falls back to [`DEFAULT_SAVE_PATH_TEMPLATE`].
    pub async fn persistent(save_path: impl Into<PathBuf>) -> Result<Self> {
        let save_path = save_path.into();
        let save_path = if save_path.as_os_str().is_empty() {
            default_save_path()
        } else {
            save_path
        };

        persistence::ensure_dir(&save_path).await?;

        let mut state = EngineState::new();
        if let Some(snapshot) = persistence::read_index(&save_path).await {
            state.external_to_internal = snapshot.external_to_internal_id;
            state.inverted_index.set_table(snapshot.index);
            state.inverted_index.set_next_index(snapshot.next_index);
            state.kgram_index.set_table(snapshot.k_index);
        }

        for doc in persistence::read_documents(&save_path).await {
            state.documents.insert(doc.uid, doc);
        }

        Ok(Self {
            state: Mutex::new(state),
            save_path: Some(save_path),
            support_wildcard: true,
        })
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Writes or updates `doc`. If `doc.id` already exists its internal id
    /// and `date_added` are preserved; otherwise a new internal id is
    /// assigned. Persists to disk when the engine is persistent.
    #[instrument(skip(self, doc), fields(collection_doc_id = %doc.id))]
    pub async fn index(&self, mut doc: Document) -> Result<()> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let existing_uid = state.external_to_internal.get(&doc.id).copied();
        let (uid, is_new) = match existing_uid {
            Some(uid) => (uid, false),
            None => {
                let uid = state.inverted_index.next_index();
                state.external_to_internal.insert(doc.id.clone(), uid);
                (uid, true)
            }
        };

        doc.uid = uid;
        doc.date_added = if is_new {
            now
        } else {
            state
                .documents
                .get(&uid)
                .map(|d| d.date_added)
                .unwrap_or(now)
        };
        doc.date_updated = now;

        if !is_new {
            if let Some(prior) = state.documents.get(&uid) {
                let prior_tokens: Vec<Token> = prior
                    .fields
                    .values()
                    .flat_map(|f| f.tokens.iter().cloned())
                    .collect();
                for token in prior_tokens {
                    state.inverted_index.remove(&token, uid);
                }
            }
        }

        let mut unique_tokens: HashSet<Token> = HashSet::new();
        for field in doc.fields.values_mut() {
            let field_tokens = state.tokenizer.tokenize(&field.value, false);
            field.tokens = field_tokens.iter().cloned().collect();
            unique_tokens.extend(field_tokens);
        }
        for token in &unique_tokens {
            state.inverted_index.add(token, uid);
        }

        if self.support_wildcard {
            let mut words = Vec::new();
            for field in doc.fields.values() {
                words.extend(state.tokenizer.clean_and_split(&field.value));
            }
            for word in words {
                if state.tokenizer.is_stop_word(&word) {
                    continue;
                }
                let stem = state.tokenizer.stem(&word);
                state.kgram_index.add(&stem);
                state.kgram_index.add(&word);
            }
        }

        state.documents.insert(uid, doc.clone());
        debug!(uid, is_new, "indexed document");

        if let Some(save_path) = &self.save_path {
            persistence::ensure_dir(save_path).await?;
            if let Err(e) = persistence::write_document(save_path, &doc).await {
                error!(error = %e, uid, "failed to persist document");
                return Err(e.into());
            }
            let snapshot = state.snapshot();
            if let Err(e) = persistence::write_index(save_path, &snapshot).await {
                error!(error = %e, "failed to persist index");
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Removes the document identified by `external_id`. A no-op if
    /// unknown. The external→internal mapping is intentionally left in
    /// place (matching the ported behavior) so the internal id is not
    /// reused if the same external id is indexed again.
    #[instrument(skip(self))]
    pub async fn remove(&self, external_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;

        let Some(&uid) = state.external_to_internal.get(external_id) else {
            return Ok(());
        };

        if let Some(doc) = state.documents.remove(&uid) {
            let tokens: Vec<Token> = doc
                .fields
                .values()
                .flat_map(|f| f.tokens.iter().cloned())
                .collect();
            for token in tokens {
                state.inverted_index.remove(&token, uid);
            }
        }

        if let Some(save_path) = &self.save_path {
            let snapshot = state.snapshot();
            persistence::write_index(save_path, &snapshot).await?;
        }

        Ok(())
    }

    /// Paginated full-text search across all fields.
    #[instrument(skip(self, query), fields(terms = %query.terms))]
    pub async fn query(&self, mut query: Query) -> SearchResult {
        if query.page < 1 {
            query.page = 1;
        }
        if query.page_size == 0 {
            query.page_size = DEFAULT_PAGE_SIZE;
        }

        let mut state = self.state.lock().await;
        let tokens = state.tokenizer.tokenize(&query.terms, !query.partial_match);
        let docids = all_docs(
            &state.inverted_index,
            &state.kgram_index,
            &tokens,
            query.partial_match,
        );

        let hits = docids.len();
        let mut result = SearchResult {
            hits,
            page: query.page,
            page_size: query.page_size,
            documents: Vec::new(),
        };

        let start = (query.page - 1) * query.page_size;
        if start >= hits {
            return result;
        }
        let end = (start + query.page_size).min(hits);

        let return_fields: HashSet<&str> = if query.return_fields.is_empty() {
            HashSet::new()
        } else {
            query.return_fields.split('|').collect()
        };

        for &docid in &docids[start..end] {
            let Some(doc) = state.documents.get(&docid) else {
                continue;
            };
            let mut res = DocResult {
                id: doc.id.clone(),
                fields: HashMap::new(),
            };
            if !query.return_fields.is_empty() {
                for (name, field) in &doc.fields {
                    if return_fields.contains(name.as_str()) {
                        res.fields.insert(name.clone(), field.value.clone());
                    }
                }
            }
            result.documents.push(res);
        }

        result
    }

    /// Searches a single field. Unlike [`Self::query`], a document is
    /// emitted once per matching token rather than once overall — a
    /// quirk preserved from the ported behavior.
    #[instrument(skip(self, terms))]
    pub async fn query_field(&self, field: &str, terms: &str) -> SearchResult {
        let mut state = self.state.lock().await;
        let tokens = state.tokenizer.tokenize(terms, false);
        let docids = all_docs(&state.inverted_index, &state.kgram_index, &tokens, false);

        let mut documents = Vec::new();
        for &docid in &docids {
            let Some(doc) = state.documents.get(&docid) else {
                continue;
            };
            let Some(f) = doc.fields.get(field) else {
                continue;
            };
            for token in &tokens {
                if f.tokens.contains(token) {
                    let fields = doc
                        .fields
                        .iter()
                        .map(|(name, field)| (name.clone(), field.value.clone()))
                        .collect();
                    documents.push(DocResult {
                        id: doc.id.clone(),
                        fields,
                    });
                }
            }
        }

        let hits = documents.len();
        SearchResult {
            hits,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            documents,
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a token list to an ordered, deduplicated list of internal ids.
/// When `partial_matches` is set, a token with no exact postings falls back
/// to its k-gram prefix candidates, resolved non-recursively beyond one
/// level (the candidates themselves are looked up with partial matching
/// off).
fn all_docs(
    inverted: &InvertedIndex,
    kgram: &KGramIndex,
    tokens: &[Token],
    partial_matches: bool,
) -> Vec<u64> {
    let mut docs = Vec::new();
    let mut found = HashSet::new();

    for token in tokens {
        let mut postings = inverted.get(token).to_vec();

        if partial_matches && postings.is_empty() {
            let candidates = kgram.get(token);
            postings = all_docs(inverted, kgram, &candidates, false);
        }

        for docid in postings {
            if found.insert(docid) {
                docs.push(docid);
            }
        }
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::document::Field;
    use assert2::check;
    use tempfile::tempdir;

    fn doc(id: &str, fields: &[(&str, &str)]) -> Document {
        let mut d = Document::new(id);
        for (name, value) in fields {
            d.fields.insert((*name).to_string(), Field::new(*value));
        }
        d
    }

    #[tokio::test]
    async fn scenario_single_document() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "dog fish cat")]))
            .await
            .unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 1);
        check!(engine.query(Query::new("cat")).await.hits == 1);
        check!(engine.query(Query::new("apple")).await.hits == 0);
        check!(engine.query(Query::new("apple cat")).await.hits == 1);
        check!(engine.query(Query::new("dog cat")).await.hits == 1);
    }

    #[tokio::test]
    async fn scenario_multiple_documents() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "dog fish cat")]))
            .await
            .unwrap();
        engine
            .index(doc("2", &[("title", "fish rat brat")]))
            .await
            .unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 1);
        check!(engine.query(Query::new("rat")).await.hits == 1);
        check!(engine.query(Query::new("fish")).await.hits == 2);
        check!(engine.query(Query::new("apple")).await.hits == 0);
    }

    #[tokio::test]
    async fn scenario_case_insensitive_and_stop_words() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "Dog Fish Cat")]))
            .await
            .unwrap();
        engine
            .index(doc("2", &[("title", "fish rat brat")]))
            .await
            .unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 1);
        check!(engine.query(Query::new("fish")).await.hits == 2);
        check!(engine.query(Query::new("and")).await.hits == 0);
    }

    #[tokio::test]
    async fn scenario_remove() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "Dog Fish Cat")]))
            .await
            .unwrap();
        engine.remove("1").await.unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 0);
    }

    #[tokio::test]
    async fn scenario_punctuation_and_hyphenation() {
        let engine = SearchEngine::new();
        engine
            .index(doc(
                "1",
                &[
                    ("title", "Dogs? bears' Cat's turbo-snail"),
                    ("body", "Planes, trains, automobiles!, O'Niel"),
                ],
            ))
            .await
            .unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 1);
        check!(engine.query(Query::new("plane")).await.hits == 1);
        check!(engine.query(Query::new("automobiles")).await.hits == 1);
        check!(engine.query(Query::new("bear")).await.hits == 1);
        check!(engine.query(Query::new("cat")).await.hits == 1);
        check!(engine.query(Query::new("turbo")).await.hits == 1);
        check!(engine.query(Query::new("snail")).await.hits == 1);
        check!(engine.query(Query::new("turbo-snail")).await.hits == 1);
        check!(engine.query(Query::new("ONiel")).await.hits == 1);
        check!(engine.query(Query::new("O'Niel")).await.hits == 1);
    }

    #[tokio::test]
    async fn scenario_partial_match_via_kgram() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "program? programming, progress!")]))
            .await
            .unwrap();
        engine
            .index(doc("2", &[("title", "its progress!")]))
            .await
            .unwrap();

        let mut exact = Query::new("pro");
        exact.partial_match = false;
        check!(engine.query(exact).await.hits == 0);

        let mut partial = Query::new("pro");
        partial.partial_match = true;
        check!(engine.query(partial).await.hits == 2);

        let with_tomb = SearchEngine::new();
        with_tomb
            .index(doc("1", &[("title", "tomb program? programming, progress!")]))
            .await
            .unwrap();

        let mut to_partial = Query::new("to");
        to_partial.partial_match = true;
        check!(with_tomb.query(to_partial).await.hits >= 1);
    }

    #[tokio::test]
    async fn scenario_persistence_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_path_buf();

        {
            let engine = SearchEngine::persistent(path.clone()).await.unwrap();
            engine
                .index(doc(
                    "1",
                    &[
                        ("title", "Dogs? bears' Cat's turbo-snail"),
                        ("body", "Planes, trains, automobiles!, O'Niel"),
                    ],
                ))
                .await
                .unwrap();
        }

        let restored = SearchEngine::persistent(path).await.unwrap();
        check!(restored.query(Query::new("bear")).await.hits == 1);

        let state = restored.state.lock().await;
        check!(state.inverted_index.table().get("automobil").map(Vec::len) == Some(1));
    }

    #[tokio::test]
    async fn indexing_same_document_twice_is_idempotent_on_postings() {
        let engine = SearchEngine::new();
        engine
            .index(doc("1", &[("title", "dog fish cat")]))
            .await
            .unwrap();
        engine
            .index(doc("1", &[("title", "dog fish cat")]))
            .await
            .unwrap();

        check!(engine.query(Query::new("dog")).await.hits == 1);
    }

    #[tokio::test]
    async fn query_field_matches_named_field() {
        let engine = SearchEngine::new();
        engine
            .index(doc(
                "1",
                &[("title", "dog fish"), ("tag", "animal pet")],
            ))
            .await
            .unwrap();

        let result = engine.query_field("tag", "animal").await;
        check!(result.hits >= 1);

        let miss = engine.query_field("title", "animal").await;
        check!(miss.hits == 0);
    }
}
