//! Tokenization pipeline: HTML strip → lowercase → split → punctuation →
//! (optional) stop-word removal → stem → dedupe.

use super::html::strip_html;
use super::punctuation::clean_punctuation;
use super::stemmer::PorterStemmer;
use super::stopwords::is_stop_word;

/// A normalized token: a non-empty, lowercase, punctuation-stripped,
/// (optionally) stop-word-filtered, Porter-stemmed word.
pub type Token = String;

/// Capability set the search engine depends on: tokenizing full text,
/// splitting-without-stemming for the k-gram indexer, and the two lower
/// level primitives (`stem`, `is_stop_word`) that back both.
///
/// Modeled as a trait so the engine is not coupled to a concrete
/// tokenizer identity; tokenizer choice is never part of the persisted
/// format.
pub trait TextAnalyzer {
    fn tokenize(&mut self, text: &str, strip_stop_words: bool) -> Vec<Token>;
    fn clean_and_split(&self, text: &str) -> Vec<String>;
    fn is_stop_word(&self, word: &str) -> bool;
    fn stem(&mut self, word: &str) -> String;
}

/// Default `TextAnalyzer`, backed by the Porter stemmer.
#[derive(Default)]
pub struct SimpleTokenizer {
    stemmer: PorterStemmer,
}

impl SimpleTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextAnalyzer for SimpleTokenizer {
    fn tokenize(&mut self, text: &str, strip_stop_words: bool) -> Vec<Token> {
        let stripped = strip_html(text);
        let words: Vec<String> = stripped.split_whitespace().map(str::to_string).collect();
        let clean = clean_punctuation(&words);

        let mut tokens = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for word in clean {
            let lower = word.to_lowercase();
            if lower.is_empty() {
                continue;
            }
            if strip_stop_words && is_stop_word(&lower) {
                continue;
            }

            let stemmed = self.stemmer.stem(&lower);
            if seen.insert(stemmed.clone()) {
                tokens.push(stemmed);
            }
        }

        tokens
    }

    fn clean_and_split(&self, text: &str) -> Vec<String> {
        let stripped = strip_html(text);
        let words: Vec<String> = stripped.split_whitespace().map(str::to_string).collect();
        clean_punctuation(&words)
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn is_stop_word(&self, word: &str) -> bool {
        is_stop_word(word)
    }

    fn stem(&mut self, word: &str) -> String {
        self.stemmer.stem(word)
    }
}
