use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docrank_core::build::build_from_config;
use docrank_core::config::{DEFAULT_INDEX_PATH, DEFAULT_TOP_K};
use docrank_core::{IndexConfig, IndexError, IndexFormat, IndexStats, Normalizer, SearchResults, Searcher, Tokenizer};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docrank-indexer")]
#[command(about = "Build and query a TF-IDF inverted index over a local HTML corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct CorpusArgs {
    /// Directory holding the raw documents
    #[arg(long, env = "DOCRANK_CORPUS", default_value = ".")]
    corpus: PathBuf,
    /// Manifest JSON mapping document IDs to URLs [default: <corpus>/bookkeeping.json]
    #[arg(long, env = "DOCRANK_MANIFEST")]
    manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct IndexArgs {
    /// Index file path
    #[arg(long, env = "DOCRANK_INDEX", default_value = DEFAULT_INDEX_PATH)]
    index: PathBuf,
    /// Index encoding: json or bincode
    #[arg(long, env = "DOCRANK_FORMAT", default_value_t = IndexFormat::Json)]
    format: IndexFormat,
    /// Term normalizer: lemma or stem. Must match the one the index was built with
    #[arg(long, env = "DOCRANK_NORMALIZER", default_value_t = Normalizer::Lemma)]
    normalizer: Normalizer,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from the corpus and write it to disk
    Build {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        index: IndexArgs,
        /// Worker threads for tokenization [default: all cores]
        #[arg(long, env = "DOCRANK_THREADS")]
        threads: Option<usize>,
    },
    /// Query an existing index; reads queries from stdin when none is given
    Query {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        index: IndexArgs,
        /// Number of results to print
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
        /// Free-text query
        query: Option<String>,
    },
    /// Build the index if it does not exist yet, then answer queries from stdin
    Run {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long, env = "DOCRANK_THREADS")]
        threads: Option<usize>,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
    },
    /// Print document, term and size statistics of an existing index
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, index, threads } => build(&config(corpus, index, threads, DEFAULT_TOP_K)),
        Commands::Query { corpus, index, top, query } => serve_queries(&config(corpus, index, None, top), query),
        Commands::Run { corpus, index, threads, top } => run(&config(corpus, index, threads, top)),
        Commands::Stats { index } => stats(&config(CorpusArgs { corpus: ".".into(), manifest: None }, index, None, DEFAULT_TOP_K)),
    }
}

fn config(corpus: CorpusArgs, index: IndexArgs, threads: Option<usize>, top_k: usize) -> IndexConfig {
    IndexConfig {
        corpus_dir: corpus.corpus,
        manifest: corpus.manifest,
        index_path: index.index,
        format: index.format,
        normalizer: index.normalizer,
        threads,
        top_k,
    }
}

fn build(cfg: &IndexConfig) -> Result<()> {
    let out = build_from_config(cfg).with_context(|| format!("building index from {}", cfg.corpus_dir.display()))?;
    let r = &out.report;
    println!(
        "indexed {} of {} documents ({} empty, {} skipped), {} terms in {} ms -> {}",
        r.indexed_documents,
        r.total_documents,
        r.empty_documents,
        r.skipped.len(),
        out.index.num_terms(),
        r.elapsed_ms,
        cfg.index_path.display()
    );
    Ok(())
}

/// Build only when no index is on disk. The index is always reloaded from disk before querying.
fn run(cfg: &IndexConfig) -> Result<()> {
    let store = cfg.store();
    if !store.exists() {
        tracing::info!(path = %store.path().display(), "no index found, building");
        build_from_config(cfg).map_err(|e| IndexError::unavailable(store.path(), e))?;
    }
    serve_queries(cfg, None)
}

fn serve_queries(cfg: &IndexConfig, one_shot: Option<String>) -> Result<()> {
    let searcher = Searcher::from_config(cfg).with_context(|| format!("opening index {}", cfg.index_path.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(q) = one_shot {
        print_results(&mut out, &searcher.search(&q, cfg.top_k), searcher.stats())?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "What are you looking for? ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        let q = line.trim();
        if q.is_empty() {
            continue;
        }
        print_results(&mut out, &searcher.search(q, cfg.top_k), searcher.stats())?;
    }
    Ok(())
}

fn stats(cfg: &IndexConfig) -> Result<()> {
    let searcher = Searcher::open(&cfg.store(), Tokenizer::for_normalizer(cfg.normalizer), None)
        .with_context(|| format!("opening index {}", cfg.index_path.display()))?;
    let stdout = io::stdout();
    print_stats(&mut stdout.lock(), searcher.stats())?;
    Ok(())
}

fn print_results<W: Write>(out: &mut W, res: &SearchResults, stats: IndexStats) -> io::Result<()> {
    for hit in &res.hits {
        writeln!(out, "{}: {}", hit.doc_id, hit.location.as_deref().unwrap_or("-"))?;
    }
    print_stats(out, stats)?;
    writeln!(out, "Matching documents: {}", res.total_hits)
}

fn print_stats<W: Write>(out: &mut W, stats: IndexStats) -> io::Result<()> {
    writeln!(out, "Unique docId in index: {}", stats.unique_documents)?;
    writeln!(out, "Unique words in index: {}", stats.unique_terms)?;
    writeln!(out, "Total size in KB: {:.2}", stats.size_kb())
}
