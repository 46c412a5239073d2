//! Tokenizing, counting and ranking words of one text.
//!
//! A word is a whitespace-separated token made only of ASCII letters, at least
//! `min_len` long, folded to lowercase. Ranking is by count, descending; equal
//! counts keep the order in which the words first appeared in the text.

use std::collections::HashMap;

/// Occurrence counts for one text, remembering first-occurrence order.
#[derive(Clone, Debug, Default)]
pub struct WordCounts {
    /// word -> (count, index of first occurrence among distinct words)
    counts: HashMap<String, (u64, usize)>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one (already normalized) word.
    pub fn add(&mut self, word: String) {
        let next = self.counts.len();
        self.counts.entry(word).or_insert((0, next)).0 += 1;
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).map(|(count, _)| *count)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `k` most frequent words, count descending, ties by first occurrence.
    pub fn top_k(&self, k: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(&String, u64, usize)> = self
            .counts
            .iter()
            .map(|(word, &(count, first))| (word, count, first))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(k)
            .map(|(word, count, _)| (word.clone(), count))
            .collect()
    }
}

/// True if `token` qualifies as a word: ASCII letters only and at least `min_len` long.
pub fn is_word(token: &str, min_len: usize) -> bool {
    token.len() >= min_len && token.bytes().all(|b| b.is_ascii_alphabetic())
}

/// ASCII whitespace including vertical tab (`\x0B`), which `char::is_ascii_whitespace` omits.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Split on ASCII whitespace and yield the qualifying tokens, lowercased.
/// Other whitespace (e.g. NBSP) stays inside the token and disqualifies it.
pub fn tokenize(text: &str, min_len: usize) -> impl Iterator<Item = String> + '_ {
    text.split(is_separator)
        .filter(|t| !t.is_empty())
        .filter(move |t| is_word(t, min_len))
        .map(|t| t.to_ascii_lowercase())
}

/// Count the words of `text`.
pub fn count_words(text: &str, min_len: usize) -> WordCounts {
    let mut counts = WordCounts::new();
    for word in tokenize(text, min_len) {
        counts.add(word);
    }
    counts
}

/// Count and rank in one go.
pub fn rank_words(text: &str, min_len: usize, k: usize) -> Vec<(String, u64)> {
    count_words(text, min_len).top_k(k)
}
