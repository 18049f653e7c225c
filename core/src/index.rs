use crate::stats::{idf, term_frequency, DocumentFrequency};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub type Term = String;
pub type DocId = String;
/// Document ID -> TF-IDF weight for a single term.
pub type Postings = BTreeMap<DocId, f64>;

/// Finalized, read-only term -> postings map. Only [`IndexBuilder`] creates one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: BTreeMap<Term, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_terms(terms: BTreeMap<Term, Postings>) -> Self { Self { terms } }

    pub fn postings(&self, term: &str) -> Option<&Postings> { self.terms.get(term) }

    pub fn weight(&self, term: &str, doc_id: &str) -> Option<f64> {
        self.terms.get(term).and_then(|p| p.get(doc_id)).copied()
    }

    pub fn contains_term(&self, term: &str) -> bool { self.terms.contains_key(term) }

    /// Terms in ascending byte order with their postings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Postings)> + '_ {
        self.terms.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Distinct document IDs referenced by any posting.
    pub fn document_ids(&self) -> BTreeSet<&str> {
        self.terms.values().flat_map(|p| p.keys().map(String::as_str)).collect()
    }

    pub fn num_documents(&self) -> usize { self.document_ids().len() }
}

/// Mutable build stage: collects raw TF and DF, then weights everything at once in [`IndexBuilder::finish`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    raw_tf: BTreeMap<Term, Postings>,
    df: DocumentFrequency,
    seen: HashSet<DocId>,
    documents: usize,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Record one document's tokens. Returns false (and records nothing) for an
    /// empty document or an ID that was already added.
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: &str, tokens: &[S]) -> bool {
        if !self.seen.insert(doc_id.to_string()) {
            tracing::warn!(doc_id, "document already added, ignoring repeat");
            return false;
        }
        if tokens.is_empty() {
            return false;
        }
        let tf = term_frequency(tokens);
        for (term, freq) in tf {
            self.df.increment(&term);
            self.raw_tf.entry(term).or_default().insert(doc_id.to_string(), freq);
        }
        self.documents += 1;
        true
    }

    /// Documents that contributed at least one token so far.
    pub fn documents(&self) -> usize { self.documents }

    pub fn document_frequency(&self) -> &DocumentFrequency { &self.df }

    /// Multiply each stored TF by `ln(total_documents / (1 + df))`.
    pub fn finish(self, total_documents: u32) -> InvertedIndex {
        let IndexBuilder { mut raw_tf, df, .. } = self;
        for (term, postings) in raw_tf.iter_mut() {
            let w = idf(df.get(term), total_documents);
            for tf in postings.values_mut() {
                *tf *= w;
            }
        }
        InvertedIndex::from_terms(raw_tf)
    }
}
