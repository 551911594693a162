//! Comment normalization helpers
//!
//! - Exact-text deduplication (first occurrence wins)
//! - Lowercasing and punctuation stripping
//! - Stopword removal
//!
//! # Examples
//!
//! ```
//! use map_reviews::text::{normalize_comment, Stopwords};
//!
//! let stopwords = Stopwords::english();
//! let cleaned = normalize_comment("The coffee was GREAT, really!", &stopwords);
//! assert_eq!(cleaned, "coffee great");
//! ```

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// English stopwords, close to the list shipped with common NLP toolkits
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
    "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
    "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at", "be",
    "became", "because", "become", "becomes", "been", "before", "being", "below", "beside",
    "besides", "between", "both", "but", "by", "can", "cannot", "could", "did", "do", "does",
    "doing", "done", "down", "during", "each", "either", "else", "elsewhere", "enough", "even",
    "ever", "every", "everyone", "everything", "everywhere", "few", "for", "from", "further",
    "had", "has", "have", "having", "he", "hence", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "however", "i", "if", "in", "indeed", "into", "is", "it", "its",
    "itself", "just", "least", "less", "made", "many", "may", "me", "meanwhile", "might",
    "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "neither",
    "never", "nevertheless", "next", "no", "nobody", "none", "noone", "nor", "not", "nothing",
    "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
    "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps",
    "please", "quite", "rather", "really", "same", "see", "seem", "seemed", "seems", "several",
    "she", "should", "since", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "therefore", "these", "they", "this", "those",
    "though", "through", "thus", "to", "together", "too", "toward", "towards", "under",
    "until", "up", "upon", "us", "used", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whenever", "where", "whereas", "whether", "which", "while", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("static punctuation pattern"))
}

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn english() -> Self {
        Self {
            words: ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Add caller-supplied words (compared lowercased)
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lowercase and drop every character that is neither a word character nor whitespace
pub fn strip_punctuation(text: &str) -> String {
    punctuation_re().replace_all(&text.to_lowercase(), "").into_owned()
}

pub fn remove_stopwords(text: &str, stopwords: &Stopwords) -> String {
    text.split_whitespace()
        .filter(|token| !stopwords.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full normalization applied to one comment
pub fn normalize_comment(text: &str, stopwords: &Stopwords) -> String {
    remove_stopwords(&strip_punctuation(text), stopwords)
}

/// Indices of the first occurrence of each distinct key, in input order.
///
/// Missing values compare equal to each other.
pub fn first_occurrences<K>(keys: &[Option<K>]) -> Vec<usize>
where
    K: Eq + std::hash::Hash,
{
    let mut seen: HashSet<Option<&K>> = HashSet::new();
    keys.iter()
        .enumerate()
        .filter(|(_, key)| seen.insert(key.as_ref()))
        .map(|(i, _)| i)
        .collect()
}

/// Drop exact duplicates, keeping the first instance of each comment
pub fn dedup_comments(comments: &[Option<String>]) -> Vec<Option<String>> {
    first_occurrences(comments)
        .into_iter()
        .map(|i| comments[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("Hello, World!!"), "hello world");
        assert_eq!(strip_punctuation("Очень вкусно :)"), "очень вкусно ");
        assert_eq!(strip_punctuation("snake_case stays"), "snake_case stays");
    }

    #[test]
    fn test_remove_stopwords_collapses_whitespace() {
        let stopwords = Stopwords::english();
        assert_eq!(
            remove_stopwords("the  staff   were friendly", &stopwords),
            "staff friendly"
        );
        assert_eq!(remove_stopwords("the and of", &stopwords), "");
    }

    #[test]
    fn test_extra_stopwords() {
        let stopwords = Stopwords::english().with_extra(["Coffee", " очень "]);
        assert!(stopwords.contains("coffee"));
        assert!(stopwords.contains("очень"));
        assert_eq!(
            normalize_comment("Очень good coffee", &stopwords),
            "good"
        );
    }

    #[test]
    fn test_dedup_keeps_one_of_each() {
        let comments = vec![
            Some("great".to_string()),
            Some("bad".to_string()),
            Some("great".to_string()),
            None,
            Some("Great".to_string()),
            None,
            Some("bad".to_string()),
        ];
        let deduped = dedup_comments(&comments);
        assert_eq!(
            deduped,
            vec![
                Some("great".to_string()),
                Some("bad".to_string()),
                None,
                Some("Great".to_string()),
            ]
        );
    }

    #[test]
    fn test_first_occurrences_on_unique_input() {
        let keys = vec![Some(1), Some(2), Some(3)];
        assert_eq!(first_occurrences(&keys), vec![0, 1, 2]);
    }
}
