use crate::config::IndexConfig;
use crate::corpus::Manifest;
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::persist::IndexStore;
use crate::rank::{rank, RankedDoc};
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    /// Manifest value for the document, when a manifest is attached.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub terms: Vec<String>,
    /// Every document with a score, before truncation.
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub unique_documents: usize,
    pub unique_terms: usize,
    pub index_size_bytes: u64,
}

impl IndexStats {
    pub fn of(index: &InvertedIndex, index_size_bytes: u64) -> Self {
        Self { unique_documents: index.num_documents(), unique_terms: index.num_terms(), index_size_bytes }
    }

    pub fn size_kb(&self) -> f64 { self.index_size_bytes as f64 / 1024.0 }
}

/// Read-only query service over a loaded index.
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Arc<InvertedIndex>,
    tokenizer: Tokenizer,
    manifest: Option<Arc<Manifest>>,
    stats: IndexStats,
}

impl Searcher {
    pub fn new(index: InvertedIndex, tokenizer: Tokenizer, manifest: Option<Manifest>, index_size_bytes: u64) -> Self {
        let stats = IndexStats::of(&index, index_size_bytes);
        Self { index: Arc::new(index), tokenizer, manifest: manifest.map(Arc::new), stats }
    }

    /// Load the index from `store`. A missing or corrupt file is an error.
    pub fn open(store: &IndexStore, tokenizer: Tokenizer, manifest: Option<Manifest>) -> Result<Self> {
        let index = store.load()?;
        let size = store.size_bytes()?;
        Ok(Self::new(index, tokenizer, manifest, size))
    }

    /// Open the configured index, attaching the manifest when one exists on disk.
    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        let store = config.store();
        if let Ok(meta) = store.load_meta() {
            if meta.normalizer != config.normalizer {
                tracing::warn!(built_with = %meta.normalizer, querying_with = %config.normalizer, "normalizer differs from the one used to build the index");
            }
        }
        let manifest_path = config.manifest_path();
        let manifest = if manifest_path.is_file() {
            Some(Manifest::load(&manifest_path)?)
        } else {
            tracing::warn!(path = %manifest_path.display(), "manifest not found, results will have no locations");
            None
        };
        Self::open(&store, Tokenizer::for_normalizer(config.normalizer), manifest)
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn stats(&self) -> IndexStats { self.stats }

    pub fn location(&self, doc_id: &str) -> Option<&str> {
        self.manifest.as_ref().and_then(|m| m.get(doc_id))
    }

    /// Rank the whole index for `query`, keep the first `k` hits.
    pub fn search(&self, query: &str, k: usize) -> SearchResults {
        let terms = self.tokenizer.tokenize(query).into_vec();
        let ranked = rank(&terms, &self.index);
        let total_hits = ranked.len();
        let hits = ranked
            .into_iter()
            .take(k)
            .map(|RankedDoc { doc_id, score }| {
                let location = self.location(&doc_id).map(str::to_string);
                SearchHit { doc_id, score, location }
            })
            .collect();
        SearchResults { query: query.to_string(), terms, total_hits, hits }
    }
}
