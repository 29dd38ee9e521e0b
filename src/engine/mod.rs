//! Document types and the per-collection search engine built on them.

mod document;
mod engine;

pub use document::{DEFAULT_PAGE_SIZE, DocResult, Document, Field, Query, SearchResult};
pub use engine::{DEFAULT_SAVE_NAME, DEFAULT_SAVE_PATH_TEMPLATE, SearchEngine};
