//! Centralized error handling with typed error enums.
//!
//! # Error Hierarchy
//!
//! ```text
//! SearchError (top-level)
//! ├── Engine(EngineError)           - index/remove/query failures
//! ├── Persistence(PersistenceError) - on-disk read/write failures
//! └── Http(HttpError)               - malformed requests at the wire boundary
//! ```

use thiserror::Error;

/// A specialized Result type for engine operations.
pub type Result<T> = anyhow::Result<T>;

/// Primary error type for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    Http(#[from] HttpError),
}

impl SearchError {
    /// Get optional help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Engine(e) => e.help(),
            Self::Persistence(e) => e.help(),
            Self::Http(e) => e.help(),
        }
    }

    /// Get a user-friendly message with optional help text appended.
    pub fn user_message(&self) -> String {
        match self.help() {
            Some(help) => format!("{self}\n\n{help}"),
            None => self.to_string(),
        }
    }
}

/// Errors from the per-collection search engine itself. Unknown-collection
/// and lookup-miss conditions are deliberately *not* variants here: per
/// the source behavior, those are silent (empty results, no-op writes),
/// not failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to serialize document {uid} for persistence")]
    Serialize { uid: u64 },
}

impl EngineError {
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Serialize { .. } => {
                Some("check that all field values are valid UTF-8 strings")
            }
        }
    }
}

/// Errors writing or restoring a collection's on-disk state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create collection directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to remove collection directory {path}: {source}")]
    RemoveDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::CreateDir { .. } | Self::RemoveDir { .. } => {
                Some("check that the search server's process has write access to the data directory")
            }
            Self::Write { .. } => {
                Some("the in-memory index was already updated; retrying the same document is safe")
            }
            Self::Read { .. } | Self::Parse { .. } => {
                Some("the collection's on-disk state may be corrupted or was written by an incompatible version")
            }
        }
    }
}

/// Errors surfaced at the HTTP boundary, distinct from engine errors because
/// they're rejected before ever reaching the engine.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Collection query parameter is required")]
    MissingCollection,

    #[error("Collection already exists")]
    CollectionExists,

    #[error("Collection does not exist")]
    CollectionMissing,

    /// Same condition as [`Self::CollectionMissing`] but raised from the
    /// query path, which reports it with different wording.
    #[error("Specified collection does not exist")]
    CollectionMissingForQuery,

    #[error("Error reading body")]
    BodyRead,

    #[error("Error document missing")]
    EmptyBody,

    #[error("Error parsing document JSON")]
    InvalidJson,

    #[error("Error document id is required, not found in: {body}")]
    MissingId { body: String },

    #[error("Error document is missing fields")]
    EmptyFields,

    #[error("docid query parameter is required")]
    MissingDocId,

    #[error("Auth token invalid")]
    InvalidAuthToken,

    #[error("Unknown action specified")]
    UnknownAction,

    #[error("unsupport HTTP method")]
    UnsupportedMethod,
}

impl HttpError {
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAuthToken => {
                Some("pass authtoken= matching the server's configured token")
            }
            Self::UnknownAction => Some("action must be one of create, destroy, index, remove"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn user_message_appends_help_when_present() {
        let err = SearchError::Http(HttpError::InvalidAuthToken);
        check!(err.user_message().contains("pass authtoken="));
    }

    #[test]
    fn user_message_is_bare_display_without_help() {
        let err = SearchError::Http(HttpError::MissingCollection);
        check!(err.user_message() == "Collection query parameter is required");
    }

    #[test]
    fn engine_error_help_mentions_utf8() {
        let err = EngineError::Serialize { uid: 7 };
        check!(err.help().unwrap().contains("UTF-8"));
    }
}
