use crate::config::IndexConfig;
use crate::corpus::{DocumentSource, FsDocumentSource, Manifest};
use crate::error::{IndexError, Result};
use crate::index::{IndexBuilder, InvertedIndex};
use crate::persist::IndexMeta;
use crate::tokenizer::Tokenizer;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Dedicated worker count; `None` runs on the global rayon pool.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub doc_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Manifest entries, the N in `ln(N / (1 + df))`.
    pub total_documents: u32,
    /// Documents that contributed at least one token.
    pub indexed_documents: u32,
    /// Readable documents with no surviving tokens.
    pub empty_documents: u32,
    pub skipped: Vec<SkippedDocument>,
    pub elapsed_ms: u128,
}

pub struct BuildOutput {
    pub index: InvertedIndex,
    pub report: BuildReport,
}

/// Build a weighted index over every manifest entry.
///
/// Reading and tokenizing run in parallel; results are merged in manifest
/// order. Unreadable documents are logged and skipped. Any other error from
/// the source aborts the build.
pub fn build_index(
    manifest: &Manifest,
    source: &dyn DocumentSource,
    tokenizer: &Tokenizer,
    options: &BuildOptions,
) -> Result<BuildOutput> {
    match options.threads {
        Some(n) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("docrank-build-{i}"))
                .build()
                .map_err(|e| IndexError::Config(format!("failed to create thread pool: {e}")))?;
            pool.install(|| build_on_current_pool(manifest, source, tokenizer))
        }
        None => build_on_current_pool(manifest, source, tokenizer),
    }
}

/// Build from the corpus described by `config`, then persist the index and its sidecar.
/// Nothing is written unless the whole build succeeds.
pub fn build_from_config(config: &IndexConfig) -> Result<BuildOutput> {
    config.validate()?;
    let manifest_path = config.manifest_path();
    let store = config.store();
    let manifest = if manifest_path.is_file() {
        Manifest::load(&manifest_path)?
    } else if config.manifest.is_none() {
        tracing::info!(corpus = %config.corpus_dir.display(), "no manifest found, walking corpus directory");
        let mut exclude = store.owned_paths();
        exclude.push(manifest_path);
        Manifest::from_dir_excluding(&config.corpus_dir, &exclude)?
    } else {
        return Err(IndexError::manifest(manifest_path, "file not found"));
    };
    let source = FsDocumentSource::new(&config.corpus_dir);
    let tokenizer = Tokenizer::for_normalizer(config.normalizer);
    let out = build_index(&manifest, &source, &tokenizer, &BuildOptions { threads: config.threads })?;

    store.save(&out.index)?;
    store.save_meta(&IndexMeta::new(&out.report, &out.index, config.normalizer, config.format))?;
    Ok(out)
}

fn build_on_current_pool(manifest: &Manifest, source: &dyn DocumentSource, tokenizer: &Tokenizer) -> Result<BuildOutput> {
    let start = Instant::now();
    let total_documents = u32::try_from(manifest.len())
        .map_err(|_| IndexError::Config(format!("manifest too large: {} documents", manifest.len())))?;
    if total_documents == 0 {
        tracing::warn!("manifest is empty, building an empty index");
    }

    let tokenized: Vec<(&str, Result<Vec<String>>)> = manifest
        .entries()
        .par_iter()
        .map(|entry| {
            let tokens = source
                .read(&entry.doc_id)
                .map(|text| tokenizer.tokenize(&text).into_vec());
            (entry.doc_id.as_str(), tokens)
        })
        .collect();

    let mut builder = IndexBuilder::new();
    let mut report = BuildReport { total_documents, ..Default::default() };
    for (doc_id, tokens) in tokenized {
        match tokens {
            Ok(tokens) => {
                if builder.add_document(doc_id, &tokens) {
                    tracing::debug!(doc_id, tokens = tokens.len(), "indexed document");
                } else {
                    tracing::debug!(doc_id, "document has no indexable tokens");
                    report.empty_documents += 1;
                }
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(doc_id, error = %err, "skipping document");
                report.skipped.push(SkippedDocument { doc_id: doc_id.to_string(), reason: err.to_string() });
            }
            Err(err) => return Err(err),
        }
    }
    report.indexed_documents = builder.documents() as u32;

    let index = builder.finish(total_documents);
    report.elapsed_ms = start.elapsed().as_millis();
    tracing::info!(
        num_docs = total_documents,
        indexed = report.indexed_documents,
        skipped = report.skipped.len(),
        num_terms = index.num_terms(),
        elapsed_ms = report.elapsed_ms as u64,
        "index build complete"
    );
    Ok(BuildOutput { index, report })
}
