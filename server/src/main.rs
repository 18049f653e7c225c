use anyhow::Result;
use axum::Router;
use clap::Parser;
use docrank_core::config::{DEFAULT_INDEX_PATH, DEFAULT_TOP_K};
use docrank_core::{IndexConfig, IndexFormat, Normalizer};
use docrank_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index file path
    #[arg(long, env = "DOCRANK_INDEX", default_value = DEFAULT_INDEX_PATH)]
    index: PathBuf,
    /// Index encoding: json or bincode
    #[arg(long, env = "DOCRANK_FORMAT", default_value_t = IndexFormat::Json)]
    format: IndexFormat,
    /// Term normalizer the index was built with
    #[arg(long, env = "DOCRANK_NORMALIZER", default_value_t = Normalizer::Lemma)]
    normalizer: Normalizer,
    /// Manifest JSON used to attach URLs to results
    #[arg(long, env = "DOCRANK_MANIFEST")]
    manifest: Option<PathBuf>,
    /// Default number of results per query
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = IndexConfig {
        manifest: args.manifest,
        index_path: args.index,
        format: args.format,
        normalizer: args.normalizer,
        top_k: args.top,
        ..Default::default()
    };
    let app: Router = build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
