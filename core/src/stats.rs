//! Term and document frequency accounting.

use std::collections::{HashMap, HashSet};

/// Relative frequency of each term: occurrences / total tokens in the document.
/// An empty document yields an empty map.
pub fn term_frequency<S: AsRef<str>>(tokens: &[S]) -> HashMap<String, f64> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_ref()).or_insert(0) += 1;
    }
    let total = tokens.len() as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term.to_string(), count as f64 / total))
        .collect()
}

/// Smoothed inverse document frequency, `ln(N / (1 + df))`. Not clamped: terms
/// present in more than about a third of the corpus get a negative weight.
pub fn idf(document_frequency: u32, total_documents: u32) -> f64 {
    (total_documents as f64 / (1.0 + document_frequency as f64)).ln()
}

/// Corpus-wide count of documents containing each term.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentFrequency {
    counts: HashMap<String, u32>,
}

impl DocumentFrequency {
    pub fn new() -> Self { Self::default() }

    /// Count one document: every distinct term in `tokens` is incremented once.
    pub fn observe<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let distinct: HashSet<&str> = tokens.iter().map(AsRef::as_ref).collect();
        for term in distinct {
            self.increment(term);
        }
    }

    pub(crate) fn increment(&mut self, term: &str) {
        match self.counts.get_mut(term) {
            Some(c) => *c += 1,
            None => { self.counts.insert(term.to_string(), 1); }
        }
    }

    /// Fold another partial counter into this one.
    pub fn merge(&mut self, other: DocumentFrequency) {
        for (term, c) in other.counts {
            *self.counts.entry(term).or_insert(0) += c;
        }
    }

    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize { self.counts.len() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tf_sums_to_one() {
        let tokens = ["cat", "sat", "cat", "mat", "cat"];
        let tf = term_frequency(&tokens);
        assert_eq!(tf.len(), 3);
        assert!((tf["cat"] - 0.6).abs() < 1e-12);
        let sum: f64 = tf.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tf_of_empty_document_is_empty() {
        let tokens: [&str; 0] = [];
        assert!(term_frequency(&tokens).is_empty());
    }

    #[test]
    fn df_counts_each_document_once() {
        let mut df = DocumentFrequency::new();
        df.observe(&["cat", "cat", "sat"]);
        df.observe(&["dog", "sat", "sat", "sat"]);
        assert_eq!(df.get("cat"), 1);
        assert_eq!(df.get("dog"), 1);
        assert_eq!(df.get("sat"), 2);
        assert_eq!(df.get("bird"), 0);
        assert_eq!(df.num_terms(), 3);
    }

    #[test]
    fn merged_partials_match_sequential_counts() {
        let docs: Vec<Vec<&str>> = vec![vec!["a", "b"], vec!["b", "c"], vec!["c", "c", "a"]];
        let mut sequential = DocumentFrequency::new();
        for d in &docs {
            sequential.observe(d);
        }
        let mut left = DocumentFrequency::new();
        left.observe(&docs[0]);
        let mut right = DocumentFrequency::new();
        right.observe(&docs[1]);
        right.observe(&docs[2]);
        left.merge(right);
        assert_eq!(left, sequential);
    }

    #[test]
    fn idf_is_non_increasing_in_df() {
        let n = 50;
        let mut prev = f64::INFINITY;
        for df in 0..=n {
            let v = idf(df, n);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn idf_goes_negative_for_ubiquitous_terms() {
        assert!(idf(10, 10) < 0.0);
        assert!((idf(1, 2) - 0.0).abs() < 1e-12);
        assert!(idf(0, 10) > 0.0);
    }
}
