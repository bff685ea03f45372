//! Keyword extraction and stemming.

use crate::config::{IndexingConfig, MIN_KEYWORD_LENGTH};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]+\b").expect("word pattern is valid"));

/// Common English words excluded from the index.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up",
    "about", "as", "into", "through", "during", "an", "a", "is", "are", "was", "were", "been",
    "be", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may",
    "might", "must", "can", "this", "that", "these", "those", "there", "here", "when", "where",
    "why", "how", "what", "which", "who", "whom",
];

/// Lowercases, filters and stems words for indexing and querying.
pub struct Tokenizer {
    min_length: usize,
    max_length: usize,
    stemmer: Option<Stemmer>,
    stop_words: BTreeSet<&'static str>,
}

impl Tokenizer {
    /// Create a tokenizer from the indexing settings.
    pub fn new(config: &IndexingConfig) -> Self {
        let stemmer = if config.stem {
            Some(Stemmer::create(Algorithm::English))
        } else {
            None
        };

        let stop_words = if config.remove_stop_words {
            STOP_WORDS.iter().copied().collect()
        } else {
            BTreeSet::new()
        };

        Self {
            min_length: config.min_keyword_length.max(MIN_KEYWORD_LENGTH),
            max_length: config.max_keyword_length,
            stemmer,
            stop_words,
        }
    }

    /// Lowercase alphabetic runs within the length bounds, in text order.
    pub fn words(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        WORD.find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| (self.min_length..=self.max_length).contains(&w.len()))
            .map(str::to_string)
            .collect()
    }

    /// Distinct index words of a text: `words` minus stop words.
    pub fn keywords(&self, text: &str) -> BTreeSet<String> {
        self.words(text)
            .into_iter()
            .filter(|w| !self.stop_words.contains(w.as_str()))
            .collect()
    }

    /// Reduce a lowercase word to its index term.
    pub fn stem(&self, word: &str) -> String {
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(word).into_owned(),
            None => word.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(&IndexingConfig::default())
    }

    #[test]
    fn test_words_are_lowercase_alphabetic_runs() {
        let words = tokenizer().words("Project PLANNING, v2 go-live 42 at Scale");
        assert_eq!(words, vec!["project", "planning", "live", "scale"]);
    }

    #[test]
    fn test_words_respect_max_length() {
        let config = IndexingConfig {
            max_keyword_length: 5,
            ..IndexingConfig::default()
        };
        let words = Tokenizer::new(&config).words("short lengthy");
        assert_eq!(words, vec!["short"]);
    }

    #[test]
    fn test_short_words_never_become_terms() {
        let config = IndexingConfig {
            min_keyword_length: 1,
            ..IndexingConfig::default()
        };
        let t = Tokenizer::new(&config);
        assert!(t.words("ab x y go").is_empty());
        assert!(t.keywords("1 Go ab x y").is_empty());
        assert_eq!(t.words("ab cat"), vec!["cat"]);
    }

    #[test]
    fn test_digits_glued_to_letters_are_not_words() {
        assert!(tokenizer().words("abc123 x9y").is_empty());
    }

    #[test]
    fn test_keywords_drop_stop_words_and_duplicates() {
        let keywords = tokenizer().keywords("The plan and the PLAN about budget");
        let expected: BTreeSet<String> = ["plan", "budget"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn test_stop_words_can_be_kept() {
        let config = IndexingConfig {
            remove_stop_words: false,
            ..IndexingConfig::default()
        };
        assert!(Tokenizer::new(&config).keywords("the plan").contains("the"));
    }

    #[test]
    fn test_stemming_reduces_inflections() {
        let t = tokenizer();
        assert_eq!(t.stem("planning"), "plan");
        assert_eq!(t.stem("plans"), "plan");
        assert_eq!(t.stem("plan"), "plan");
    }

    #[test]
    fn test_stemming_disabled_returns_word() {
        let config = IndexingConfig {
            stem: false,
            ..IndexingConfig::default()
        };
        assert_eq!(Tokenizer::new(&config).stem("planning"), "planning");
    }
}
