use anyhow::Result;
use clap::Parser;
use mechanic_rag::db::Db;
use mechanic_rag::embeddings::build_embedder;
use mechanic_rag::ingest::{build_graph_index, build_vector_index, VectorBuild};
use mechanic_rag::Config;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "build-index")]
#[command(about = "Build the manual vector index and the knowledge graph")]
struct Args {
    /// Clear existing chunks and re-embed the whole manual
    #[arg(short, long)]
    reset: bool,

    /// Only rebuild the knowledge graph
    #[arg(long, conflicts_with = "vectors_only")]
    graph_only: bool,

    /// Only rebuild the vector index
    #[arg(long)]
    vectors_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.index.log_level),
    )
    .init();

    log::info!("Starting index build");
    log::info!("Database path: {}", config.db_path().display());
    log::info!("Graph path: {}", config.graph_path().display());

    let start = Instant::now();

    if !args.graph_only {
        let embedder = build_embedder(&config.embeddings)?;
        log::info!(
            "Embedder configured: model={}, batch_size={}",
            embedder.model_name(),
            config.embeddings.batch_size
        );

        let outcome = build_vector_index(
            &Db::new(config.db_path()),
            embedder.as_ref(),
            &config.index.manual_path,
            &config.ingest,
            config.embeddings.batch_size,
            args.reset,
        )
        .await?;
        match outcome {
            VectorBuild::Built(n) => log::info!("Stored {} chunks", n),
            VectorBuild::Skipped(n) => log::info!("Kept existing {} chunks", n),
        }
    }

    if !args.vectors_only {
        build_graph_index(&config.index.relationships_path, config.graph_path())?;
    }

    log::info!("Index build complete in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
