use anyhow::{Context, Result};
use clap::Parser;
use mechanic_rag::embeddings::build_embedder;
use mechanic_rag::generation::{build_diagnosis_prompt, build_generator};
use mechanic_rag::{ingest, Config, HybridRetriever};

#[derive(Parser, Debug)]
#[command(name = "mechanic")]
#[command(version)]
#[command(about = "Vehicle diagnostics assistant: owner's manual + knowledge graph retrieval")]
struct Args {
    /// The diagnostic question (e.g. "ABS light is on")
    query: Option<String>,

    /// Force a rebuild of the vector index and knowledge graph
    #[arg(long)]
    rebuild: bool,
}

const RULE: &str = "========================================";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.index.log_level),
    )
    .init();

    let embedder = build_embedder(&config.embeddings)?;

    if args.rebuild || !config.indices_exist() {
        log::info!("Building indices...");
        ingest::build_indices(&config, embedder.as_ref(), true)
            .await
            .with_context(|| {
                format!(
                    "Failed to build indices; ensure {} and {} exist",
                    config.index.manual_path.display(),
                    config.index.relationships_path.display()
                )
            })?;
    }

    let Some(query) = args.query else {
        println!("\nWelcome to the mechanic diagnostics CLI");
        println!("Usage: mechanic \"<your query>\"");
        println!("Example: mechanic \"Why is the ABS light on?\"");
        return Ok(());
    };

    let retriever = HybridRetriever::open(&config, embedder)
        .await
        .context("Retrieval failed")?;
    let context = retriever.retrieve(&query).await.context("Retrieval failed")?;

    println!("\n{}", RULE);
    println!("CONTEXT RETRIEVED");
    println!("{}", RULE);
    println!("{}", context);
    println!("{}\n", RULE);

    let generator = build_generator(&config.generation)?;
    log::info!("Consulting {} generator", generator.backend());
    let response = generator
        .generate(&build_diagnosis_prompt(&context, &query))
        .await;

    println!(">> DIAGNOSIS REPORT:");
    println!("{}", response);

    Ok(())
}
