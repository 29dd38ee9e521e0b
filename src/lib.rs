#![warn(unreachable_pub)]
#![warn(dead_code)]

pub mod cli;
pub mod engine;
pub mod error;
pub mod index;
pub mod manager;
pub mod persistence;
pub mod server;
pub mod text;
pub mod tracing;

pub use cli::Cli;
pub use engine::{DEFAULT_PAGE_SIZE, DocResult, Document, Field, Query, SearchEngine, SearchResult};
pub use error::{EngineError, HttpError, PersistenceError, Result, SearchError};
pub use index::{InvertedIndex, KGramIndex};
pub use manager::CollectionManager;
pub use server::AppState;
pub use text::{SimpleTokenizer, TextAnalyzer, Token};
