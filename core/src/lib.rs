//! TF-IDF inverted index over a local document corpus: tokenization, term
//! statistics, weighting, persistence and ranked keyword search.

pub mod build;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod lemma;
pub mod persist;
pub mod rank;
pub mod search;
pub mod stats;
pub mod stopwords;
pub mod tokenizer;

pub use build::{build_index, BuildOptions, BuildOutput, BuildReport, SkippedDocument};
pub use config::{IndexConfig, IndexFormat, Normalizer};
pub use corpus::{DocumentSource, FsDocumentSource, Manifest, ManifestEntry};
pub use error::{IndexError, Result};
pub use index::{DocId, IndexBuilder, InvertedIndex, Postings, Term};
pub use persist::{IndexMeta, IndexStore};
pub use rank::{rank, RankedDoc};
pub use search::{IndexStats, SearchHit, SearchResults, Searcher};
pub use tokenizer::{tokenize, Tokenizer};
