//! Punctuation normalization and compound-word splitting.
//!
//! Examples:
//! - `car's` becomes `car`
//! - `cars'` becomes `cars`
//! - `co-sleep` becomes `sleep` (and `co` is discarded as a common prefix)
//! - `right-of-way` becomes `right-of-way`, `right`, `of`, `way`
//! - Standard punctuation (`!?,.` etc.) is stripped entirely.

const PUNCTUATION: &[char] = &[
    '.', ',', ':', ';', '{', '}', '[', ']', '?', '/', '!', '%', '&', '(', ')', '<', '>', '\\',
    '|', '`', '~', '+', '*', '$', '#', '"', '\u{2014}',
];

fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

fn is_hyphen(c: char) -> bool {
    c == '-'
}

/// Words that, when they are the first part of a hyphenated compound, carry
/// no useful meaning on their own and are dropped (`co-sleep` → not `co`).
fn is_common_prefix(s: &str) -> bool {
    matches!(s, "co" | "re")
}

/// Normalizes punctuation across a sequence of whitespace-split words,
/// returning a new sequence suitable for downstream tokenization.
pub fn clean_punctuation(words: &[String]) -> Vec<String> {
    let mut clean = Vec::new();
    let mut compound_words = Vec::new();

    for word in words {
        let mut compound = false;
        let mut buf = String::with_capacity(word.len());

        for (i, c) in word.chars().enumerate() {
            if is_punctuation(c) {
                continue;
            }

            if is_hyphen(c) {
                compound = true;
            }

            if c == '\'' {
                // At position 0 or 1, just drop the apostrophe and keep scanning
                // (handles a leading quote and short possessives/names like O'Niel).
                // At position >= 2 the rest of the word is truncated here.
                if i > 1 {
                    break;
                }
                continue;
            }

            buf.push(c);
        }

        if compound {
            let parts: Vec<&str> = buf.split('-').collect();
            if !parts.is_empty() {
                if is_common_prefix(parts[0]) {
                    compound_words.extend(parts[1..].iter().map(|s| s.to_string()));
                } else {
                    compound_words.extend(parts.iter().map(|s| s.to_string()));
                }
            }
        }

        if !buf.is_empty() {
            clean.push(buf);
        }
    }

    clean.extend(compound_words);
    clean
}
