use chrono::Utc;
use clap::{Parser, Subcommand};
use legal_chunk_core::{
    chunk_text, ingest_folder_chunks_best_effort, ChunkIndex, CharacterNgramEmbedder, Embedder,
    LawConfig, LawEntry, LegalChunk, LegalRetriever, MemoryIndex, QdrantStore, SplitterOptions,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "legal-chunk", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "legal_docs")]
    qdrant_collection: String,

    /// JSON file mapping source file names to {"name", "tentang"}.
    /// Defaults to the built-in regulation table.
    #[arg(long, env = "LAW_CONFIG")]
    law_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Clean and segment a single text file, printing chunks as JSON lines.
    Chunk {
        #[arg(long)]
        file: PathBuf,
        /// Law name; looked up in the law table when omitted.
        #[arg(long, requires = "subject")]
        name: Option<String>,
        /// What the law is about.
        #[arg(long, requires = "name")]
        subject: Option<String>,
    },
    /// Ingest every registered text file in a folder into Qdrant.
    Ingest {
        #[arg(long)]
        folder: PathBuf,
    },
    /// Fetch the chunks filed under one article number.
    Clause {
        #[arg(long)]
        article: u32,
        /// Ingest this folder into an in-memory index instead of querying Qdrant.
        #[arg(long)]
        memory: Option<PathBuf>,
    },
    /// Semantic search over all chunks.
    Search {
        #[arg(long)]
        query: String,
        /// Ingest this folder into an in-memory index instead of querying Qdrant.
        #[arg(long)]
        memory: Option<PathBuf>,
    },
}

/// Runs the best-effort batch and logs the outcome of every document.
fn ingest_logged(folder: &Path, laws: &LawConfig) -> anyhow::Result<Vec<LegalChunk>> {
    let report = ingest_folder_chunks_best_effort(folder, laws, SplitterOptions::default())?;

    for processed in &report.processed {
        info!(
            path = %processed.path.display(),
            law = %processed.source_name,
            checksum = %processed.fingerprint.checksum,
            chunk_count = processed.chunk_count,
            "processed document"
        );
    }
    for skipped in &report.skipped_files {
        warn!(path = %skipped.path.display(), "skipped document not in law table");
    }
    for failed in &report.failed_files {
        error!(path = %failed.path.display(), reason = %failed.reason, "failed document");
    }

    Ok(report.chunks)
}

async fn memory_index(
    folder: &Path,
    laws: &LawConfig,
    embedder: &CharacterNgramEmbedder,
) -> anyhow::Result<MemoryIndex> {
    let chunks = ingest_logged(folder, laws)?;
    let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
    let index = MemoryIndex::new();
    index
        .index_chunks(&chunks, &embedder.embed_batch(&texts))
        .await?;
    info!(folder = %folder.display(), chunk_count = index.len(), "built in-memory index");
    Ok(index)
}

fn load_laws(path: Option<&Path>) -> anyhow::Result<LawConfig> {
    match path {
        Some(path) => Ok(LawConfig::from_json_file(path)?),
        None => Ok(LawConfig::builtin()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let embedder = CharacterNgramEmbedder::default();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "legal-chunk boot"
    );

    match cli.command {
        Command::Chunk {
            file,
            name,
            subject,
        } => {
            let law = match (name, subject) {
                (Some(name), Some(tentang)) => LawEntry { name, tentang },
                _ => {
                    let laws = load_laws(cli.law_config.as_deref())?;
                    let file_name = file
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or_default();
                    laws.lookup(file_name).cloned().ok_or_else(|| {
                        anyhow::anyhow!("{file_name} is not registered in the law table")
                    })?
                }
            };

            let raw_text = std::fs::read_to_string(&file)?;
            let chunks = chunk_text(&raw_text, &law, SplitterOptions::default())?;
            info!(file = %file.display(), chunk_count = chunks.len(), "segmented document");

            for chunk in chunks {
                println!("{}", serde_json::to_string(&chunk)?);
            }
        }
        Command::Ingest { folder } => {
            let laws = load_laws(cli.law_config.as_deref())?;
            let chunks = ingest_logged(&folder, &laws)?;
            if chunks.is_empty() {
                println!("0 chunks ingested (no registered documents produced chunks)");
                return Ok(());
            }

            info!(folder = %folder.display(), chunk_count = chunks.len(), "indexing chunks");

            let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
            let embeddings = embedder.embed_batch(&texts);

            let store = QdrantStore::new(
                &cli.qdrant_url,
                &cli.qdrant_collection,
                embedder.dimensions(),
            )?;
            store.ensure_collection().await?;
            store.index_chunks(&chunks, &embeddings).await?;

            println!(
                "{} chunks ingested at {}",
                chunks.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Clause { article, memory } => {
            info!(article, "filtering by article number");
            let text = match memory {
                Some(folder) => {
                    let laws = load_laws(cli.law_config.as_deref())?;
                    let index = memory_index(&folder, &laws, &embedder).await?;
                    LegalRetriever::with_embedder(index, embedder)
                        .search_specific_clause(article)
                        .await?
                }
                None => {
                    let store = QdrantStore::new(
                        &cli.qdrant_url,
                        &cli.qdrant_collection,
                        embedder.dimensions(),
                    )?;
                    LegalRetriever::with_embedder(store, embedder)
                        .search_specific_clause(article)
                        .await?
                }
            };
            println!("{text}");
        }
        Command::Search { query, memory } => {
            info!(query = %query, "semantic search");
            let text = match memory {
                Some(folder) => {
                    let laws = load_laws(cli.law_config.as_deref())?;
                    let index = memory_index(&folder, &laws, &embedder).await?;
                    LegalRetriever::with_embedder(index, embedder)
                        .search_legal_concept(&query)
                        .await?
                }
                None => {
                    let store = QdrantStore::new(
                        &cli.qdrant_url,
                        &cli.qdrant_collection,
                        embedder.dimensions(),
                    )?;
                    LegalRetriever::with_embedder(store, embedder)
                        .search_legal_concept(&query)
                        .await?
                }
            };
            println!("{text}");
        }
    }

    Ok(())
}
