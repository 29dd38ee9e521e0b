//! Directory-per-collection, full-file-rewrite persistence.
//!
//! Layout under a collection's `save_path`:
//! - `_index` — JSON snapshot of the inverted/k-gram indexes and the
//!   external→internal id map.
//! - `{uid}` — one JSON file per document, named by its internal id.
//!
//! Every write rewrites the whole file; there is no atomic rename, matching
//! the non-atomic write policy of the system this crate ports.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::Document;
use crate::error::{PersistenceError, Result};
use crate::text::Token;

const INDEX_FILE_NAME: &str = "_index";

/// The JSON-serializable shape of an engine's index state, used by
/// [`write_index`] and [`read_index`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub external_to_internal_id: HashMap<String, u64>,
    pub index: HashMap<Token, Vec<u64>>,
    pub k_index: HashMap<String, Vec<String>>,
    pub next_index: u64,
}

fn io_err(path: &Path, source: std::io::Error) -> anyhow::Error {
    PersistenceError::Write {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Ensures `save_path` exists, creating parent directories as needed.
pub async fn ensure_dir(save_path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(save_path).await.map_err(|e| {
        PersistenceError::CreateDir {
            path: save_path.display().to_string(),
            source: e,
        }
        .into()
    })
}

/// Rewrites `_index` under `save_path` in full.
pub async fn write_index(save_path: &Path, snapshot: &IndexSnapshot) -> Result<()> {
    let path = save_path.join(INDEX_FILE_NAME);
    let json = serde_json::to_vec_pretty(snapshot).expect("IndexSnapshot is always serializable");
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Writes a single document's file, named by its internal id.
pub async fn write_document(save_path: &Path, doc: &Document) -> Result<()> {
    let path = save_path.join(doc.uid.to_string());
    let json = serde_json::to_vec_pretty(doc).map_err(|_| {
        anyhow::Error::from(crate::error::EngineError::Serialize { uid: doc.uid })
    })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Reads `_index` if present. Returns `None` if the file doesn't exist;
/// parse failures are logged and also treated as "nothing to restore".
pub async fn read_index(save_path: &Path) -> Option<IndexSnapshot> {
    let path = save_path.join(INDEX_FILE_NAME);
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read index file");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse index file");
            None
        }
    }
}

/// Scans `save_path` for per-document files (everything except `_index`)
/// and parses each as a [`Document`]. Unreadable or unparsable files are
/// logged and skipped, not fatal.
pub async fn read_documents(save_path: &Path) -> Vec<Document> {
    let mut entries = match tokio::fs::read_dir(save_path).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %save_path.display(), error = %e, "failed to list collection directory");
            return Vec::new();
        }
    };

    let mut documents = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(path = %save_path.display(), error = %e, "failed to read directory entry");
                break;
            }
        };

        if entry.file_name() == INDEX_FILE_NAME {
            continue;
        }

        let path: PathBuf = entry.path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read document file");
                continue;
            }
        };

        match serde_json::from_slice::<Document>(&bytes) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse document file");
            }
        }
    }

    documents
}

/// Recursively removes a collection's directory. A no-op (not an error) if
/// the directory doesn't exist.
pub async fn remove_collection_dir(save_path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(save_path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PersistenceError::RemoveDir {
            path: save_path.display().to_string(),
            source: e,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use tempfile::tempdir;

    #[tokio::test]
    async fn write_then_read_index_round_trips() {
        let dir = tempdir().unwrap();
        let mut snapshot = IndexSnapshot::default();
        snapshot.next_index = 3;
        snapshot
            .external_to_internal_id
            .insert("doc-1".to_string(), 1);

        write_index(dir.path(), &snapshot).await.unwrap();
        let loaded = read_index(dir.path()).await.unwrap();
        check!(loaded.next_index == 3);
        check!(loaded.external_to_internal_id.get("doc-1") == Some(&1));
    }

    #[tokio::test]
    async fn read_index_missing_file_is_none() {
        let dir = tempdir().unwrap();
        check!(read_index(dir.path()).await.is_none());
    }

    #[tokio::test]
    async fn write_and_scan_documents_skips_index_file() {
        let dir = tempdir().unwrap();
        let doc = Document::new("doc-1");
        let mut doc = doc;
        doc.uid = 7;
        write_document(dir.path(), &doc).await.unwrap();
        write_index(dir.path(), &IndexSnapshot::default())
            .await
            .unwrap();

        let docs = read_documents(dir.path()).await;
        check!(docs.len() == 1);
        check!(docs[0].uid == 7);
    }

    #[tokio::test]
    async fn remove_missing_collection_dir_is_ok() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        check!(remove_collection_dir(&missing).await.is_ok());
    }
}
