//! Collection manager: a named set of [`SearchEngine`]s, all rooted under
//! one persistence directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::instrument;

use crate::engine::{Document, Query, SearchEngine, SearchResult};
use crate::error::Result;
use crate::persistence;

/// Owns one [`SearchEngine`] per collection name and forwards operations to
/// the named engine. Unknown names are silent no-ops, matching the engine's
/// own "unknown id" policy.
pub struct CollectionManager {
    root: Option<PathBuf>,
    engines: RwLock<HashMap<String, SearchEngine>>,
}

impl CollectionManager {
    /// An in-memory manager; collections created under it are not persisted.
    pub fn new() -> Self {
        Self {
            root: None,
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// A manager that persists every collection it creates under
    /// `root/{name}`.
    pub fn persistent(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            engines: RwLock::new(HashMap::new()),
        }
    }

    fn collection_path(&self, name: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(name))
    }

    /// Creates a new, empty collection. Returns `false` without touching
    /// the existing engine if `name` is already taken.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<bool> {
        let mut engines = self.engines.write().await;
        if engines.contains_key(name) {
            return Ok(false);
        }

        let engine = match self.collection_path(name) {
            Some(path) => SearchEngine::persistent(path).await?,
            None => SearchEngine::new(),
        };

        engines.insert(name.to_string(), engine);
        Ok(true)
    }

    /// Removes a collection and, if persistent, its on-disk directory.
    /// A no-op for an unknown name.
    #[instrument(skip(self))]
    pub async fn destroy(&self, name: &str) -> Result<()> {
        let mut engines = self.engines.write().await;
        engines.remove(name);

        if let Some(path) = self.collection_path(name) {
            persistence::remove_collection_dir(&path).await?;
        }

        Ok(())
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.engines.read().await.contains_key(name)
    }

    /// Ensures `name` exists, creating it if necessary. Used at startup for
    /// the CLI's `--collections` flag.
    pub async fn ensure_exists(&self, name: &str) -> Result<()> {
        self.create(name).await.map(|_| ())
    }

    pub async fn query(&self, collection: &str, query: Query) -> SearchResult {
        let engines = self.engines.read().await;
        match engines.get(collection) {
            Some(engine) => engine.query(query).await,
            None => SearchResult::empty(),
        }
    }

    pub async fn query_field(&self, collection: &str, field: &str, terms: &str) -> SearchResult {
        let engines = self.engines.read().await;
        match engines.get(collection) {
            Some(engine) => engine.query_field(field, terms).await,
            None => SearchResult::empty(),
        }
    }

    pub async fn index(&self, collection: &str, doc: Document) -> Result<()> {
        let engines = self.engines.read().await;
        if let Some(engine) = engines.get(collection) {
            engine.index(doc).await?;
        }
        Ok(())
    }

    pub async fn remove(&self, collection: &str, docid: &str) -> Result<()> {
        let engines = self.engines.read().await;
        if let Some(engine) = engines.get(collection) {
            engine.remove(docid).await?;
        }
        Ok(())
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

impl Default for CollectionManager {
    fn default() -> Self {
        Self::new()
    }
}
