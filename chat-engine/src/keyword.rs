//! Keyword extraction and merging. Pure functions, no side effects.
//!
//! Extraction tokenizes to lowercase alphanumeric runs, drops stopwords,
//! short tokens and pure numbers, ranks by frequency (ties broken by first
//! occurrence) and capitalizes the top N. Merging is a set union over the
//! comma-joined stored form, so repeating a merge changes nothing.

use std::collections::{BTreeSet, HashMap};

/// How many keywords a single message contributes by default.
pub const DEFAULT_TOP_N: usize = 5;

/// Fixed English stopword list applied during extraction.
static STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "get", "got", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "like", "me", "more", "most", "my", "myself", "need", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "ought", "our",
    "ours", "ourselves", "out", "over", "own", "please", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "want", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Extracts the top `top_n` salient terms from `text`, capitalized.
pub fn extract(text: &str, top_n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .filter(|w| w.len() > 2)
        .filter(|w| !is_stopword(w))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()));

    // Count occurrences, remembering first-occurrence order for ties.
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for token in tokens {
        let entry = counts.entry(token).or_insert_with(|| {
            order += 1;
            (0, order)
        });
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, _, _)| capitalize(word))
        .collect()
}

/// Splits a stored comma-joined keyword string back into entries.
pub fn split(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unions `new_keywords` into the stored comma-joined set and returns the
/// new stored form (sorted, deduplicated). Idempotent: merging the same
/// keywords twice yields the same string as merging once.
pub fn merge(existing_joined: &str, new_keywords: &[String]) -> String {
    let mut set: BTreeSet<String> = split(existing_joined).into_iter().collect();
    set.extend(new_keywords.iter().cloned());
    set.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_drops_stopwords_short_tokens_and_numbers() {
        let keywords = extract("I need a new laptop for 2025, under 800 dollars", 5);
        assert_eq!(keywords, vec!["New", "Laptop", "Dollars"]);
    }

    #[test]
    fn extract_ranks_by_frequency_then_first_occurrence() {
        let keywords = extract("camera camera lens tripod lens camera bag", 3);
        assert_eq!(keywords, vec!["Camera", "Lens", "Tripod"]);
    }

    #[test]
    fn extract_caps_at_top_n() {
        let keywords = extract("alpha beta gamma delta epsilon zeta eta", 5);
        assert_eq!(keywords.len(), 5);
    }

    #[test]
    fn extract_empty_text_yields_nothing() {
        assert!(extract("", 5).is_empty());
        assert!(extract("a an the 42", 5).is_empty());
    }

    #[test]
    fn merge_is_idempotent_under_repetition() {
        let new_keywords = vec!["Laptop".to_string(), "Camera".to_string()];
        let once = merge("", &new_keywords);
        let twice = merge(&once, &new_keywords);
        assert_eq!(once, twice);
        assert_eq!(split(&twice), vec!["Camera", "Laptop"]);
    }

    #[test]
    fn merge_round_trips_through_joined_string() {
        let merged = merge("Phone, Budget", &["Gaming".to_string()]);
        let restored = split(&merged);
        assert_eq!(restored, vec!["Budget", "Gaming", "Phone"]);
        // A second round trip neither loses nor duplicates entries.
        assert_eq!(merge(&merged, &[]), merged);
    }
}
