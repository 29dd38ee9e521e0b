//! The two on-disk/in-memory indexes that back the search engine: the
//! inverted (token → docs) index and the k-gram (prefix) index.

mod inverted;
mod kgram;

pub use inverted::InvertedIndex;
pub use kgram::KGramIndex;
