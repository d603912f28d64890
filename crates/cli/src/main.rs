mod reader;

use anyhow::{Context, Result};
use cache::{FragmentCache, JsonFileCache, MemoryCache};
use clap::Parser;
use extract::{LlmExtractor, OllamaClient};
use pipeline::{Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::sync::Arc;
use store::{GraphStore, MemoryGraphStore, Neo4jGraphStore};
use tracing::{info, warn};

/// Extract a knowledge graph from text documents and merge it into Neo4j.
#[derive(Parser)]
#[command(name = "kgx", version)]
struct Args {
    /// A .txt/.md file, or a directory of them
    input: PathBuf,

    /// Directory for cached extractions
    #[arg(long, default_value = "data/fragment_cache")]
    cache_dir: PathBuf,

    /// Skip the cache entirely and re-extract
    #[arg(long)]
    no_cache: bool,

    /// Merge into an in-memory store instead of Neo4j
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let ollama_url =
        std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    let ollama_model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".to_string());
    let client = OllamaClient::new(ollama_url, ollama_model);
    info!(model = client.model(), "using extraction model");

    let neo4j = if args.dry_run { None } else { Some(connect_neo4j().await?) };
    let store: Arc<dyn GraphStore> = match &neo4j {
        Some(graph) => graph.clone(),
        None => {
            warn!("dry run: merging into an in-memory store");
            Arc::new(MemoryGraphStore::new())
        }
    };

    let config = PipelineConfig {
        cache_enabled: !args.no_cache,
        ..PipelineConfig::default()
    };
    // Under --no-cache the cache is never touched, so don't build one on disk.
    let fragment_cache: Arc<dyn FragmentCache> = if args.no_cache {
        Arc::new(MemoryCache::new())
    } else {
        Arc::new(JsonFileCache::new(&args.cache_dir))
    };
    let pipeline = Pipeline::new(
        fragment_cache,
        Arc::new(LlmExtractor::new(client)),
        store,
        &config,
    );

    let documents = reader::collect_documents(&args.input).await?;
    anyhow::ensure!(
        !documents.is_empty(),
        "no .txt or .md documents found under {}",
        args.input.display()
    );

    let mut failures = 0usize;
    for (path, text) in &documents {
        let cache_key = path.to_string_lossy();
        match pipeline.run(text, &cache_key).await {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                failures += 1;
                warn!(document = %path.display(), error = %e, "document failed");
            }
        }
    }

    if let Some(graph) = &neo4j {
        let stats = graph.stats().await?;
        info!(
            nodes = stats.node_count,
            relationships = stats.relationship_count,
            "graph store totals"
        );
    }

    anyhow::ensure!(
        failures == 0,
        "{failures} of {} documents failed",
        documents.len()
    );
    Ok(())
}

async fn connect_neo4j() -> Result<Arc<Neo4jGraphStore>> {
    let uri = std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string());
    let user = std::env::var("NEO4J_USERNAME").unwrap_or_else(|_| "neo4j".to_string());
    let password = std::env::var("NEO4J_PASSWORD").context("NEO4J_PASSWORD is not set")?;

    let store = Neo4jGraphStore::connect(&uri, &user, &password)
        .await
        .with_context(|| format!("connecting to Neo4j at {uri}"))?;
    store.init_schema().await?;
    Ok(Arc::new(store))
}
