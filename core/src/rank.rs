use crate::index::InvertedIndex;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDoc {
    pub doc_id: String,
    pub score: f64,
}

/// Sum each query token's TF-IDF weight per document and order by score descending.
///
/// Tokens absent from the index contribute nothing; a repeated token counts
/// each time it appears. Equal scores are ordered by document ID ascending.
pub fn rank<S: AsRef<str>>(query_tokens: &[S], index: &InvertedIndex) -> Vec<RankedDoc> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for token in query_tokens {
        if let Some(postings) = index.postings(token.as_ref()) {
            for (doc_id, weight) in postings {
                *scores.entry(doc_id.as_str()).or_insert(0.0) += weight;
            }
        }
    }
    let mut ranked: Vec<RankedDoc> = scores
        .into_iter()
        .map(|(doc_id, score)| RankedDoc { doc_id: doc_id.to_string(), score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    ranked
}
