use crate::error::{IndexError, Result};
use crate::persist::IndexStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MANIFEST_NAME: &str = "bookkeeping.json";
pub const DEFAULT_INDEX_PATH: &str = "./inverted_index";
pub const DEFAULT_TOP_K: usize = 20;

/// On-disk encoding of the inverted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    /// Pretty-printed JSON, terms in ascending order.
    #[default]
    Json,
    Bincode,
}

impl FromStr for IndexFormat {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(IndexFormat::Json),
            "bincode" | "bin" => Ok(IndexFormat::Bincode),
            other => Err(IndexError::Config(format!("unknown index format `{other}`"))),
        }
    }
}

impl fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexFormat::Json => f.write_str("json"),
            IndexFormat::Bincode => f.write_str("bincode"),
        }
    }
}

/// How surviving tokens are reduced to their base form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalizer {
    /// Dictionary-style noun lemmas (`cats` -> `cat`).
    #[default]
    Lemma,
    /// Snowball English stems (`running` -> `run`).
    Stem,
}

impl FromStr for Normalizer {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lemma" | "lemmatize" => Ok(Normalizer::Lemma),
            "stem" | "snowball" => Ok(Normalizer::Stem),
            other => Err(IndexError::Config(format!("unknown normalizer `{other}`"))),
        }
    }
}

impl fmt::Display for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalizer::Lemma => f.write_str("lemma"),
            Normalizer::Stem => f.write_str("stem"),
        }
    }
}

/// Everything the build and query entry points need, passed explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root directory holding the raw documents.
    pub corpus_dir: PathBuf,
    /// Manifest file; `None` means `<corpus_dir>/bookkeeping.json`.
    pub manifest: Option<PathBuf>,
    pub index_path: PathBuf,
    pub format: IndexFormat,
    pub normalizer: Normalizer,
    /// Build worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("."),
            manifest: None,
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            format: IndexFormat::default(),
            normalizer: Normalizer::default(),
            threads: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl IndexConfig {
    pub fn manifest_path(&self) -> PathBuf {
        match &self.manifest {
            Some(p) => p.clone(),
            None => self.corpus_dir.join(DEFAULT_MANIFEST_NAME),
        }
    }

    pub fn store(&self) -> IndexStore { IndexStore::new(&self.index_path, self.format) }

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(IndexError::Config("threads must be at least 1".into()));
        }
        if self.top_k == 0 {
            return Err(IndexError::Config("top_k must be at least 1".into()));
        }
        Ok(())
    }
}
