//! Text analysis: HTML stripping, punctuation normalization, stop words,
//! Porter stemming, and the tokenizer pipeline that composes them.

mod html;
mod punctuation;
mod stemmer;
mod stopwords;
mod tokenizer;

pub use stemmer::PorterStemmer;
pub use tokenizer::{SimpleTokenizer, TextAnalyzer, Token};
