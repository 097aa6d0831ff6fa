//! # docrag CLI
//!
//! Command-line interface for the docrag retrieval backend.
//!
//! docrag indexes uploaded documents into a tenant-scoped vector index and
//! answers queries with the most relevant text chunks, ready to be handed to
//! a downstream generation step.
//!
//! ## Commands
//!
//! - `docrag add <TENANT> <FILE>` - extract, chunk, embed, and index a file
//! - `docrag query <SCOPE> <QUERY>` - retrieve the top matching chunks
//! - `docrag docs <TENANT>` - list a tenant's documents
//! - `docrag status` - show index statistics
//! - `docrag config show|init` - inspect configuration
//!
//! ## Examples
//!
//! ```bash
//! docrag add acme-corp ./handbook.pdf
//! docrag query acme-corp "what is the vacation policy" --limit 3
//! docrag query acme-corp "expense reports" --format json
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use docrag_chunker::WindowChunker;
use docrag_core::{
    Document, DocumentCatalog, DocumentFormat, Embedder, VectorIndex,
};
use docrag_embed::{
    EmbedderPool, EmbeddingBackend, HashEmbedder, RemoteConfig, RemoteEmbedder,
};
use docrag_extract::{ExtractorRegistry, NoopOcr};
use docrag_index::IngestService;
use docrag_query::RetrievalService;
use docrag_store::LanceIndex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod catalog;
mod config;

use catalog::FileCatalog;
use config::{data_dir, Config};

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Multi-tenant document embedding and retrieval backend")]
#[command(version)]
struct Cli {
    /// Path to config file (default: built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a file for a tenant
    Add {
        /// Owning tenant identifier
        tenant: String,

        /// File to index
        file: PathBuf,

        /// Retrieval scope key (defaults to the tenant id)
        #[arg(long)]
        scope: Option<String>,
    },

    /// Query the index within a scope
    Query {
        /// Scope key to search under
        scope: String,

        /// Query text
        query: String,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List a tenant's documents
    Docs {
        /// Tenant identifier
        tenant: String,
    },

    /// Show index status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print a sample configuration file
    Init,
}

#[derive(Serialize)]
struct AddOutput {
    document_id: Uuid,
    filename: String,
    chunk_count: u32,
}

#[derive(Serialize)]
struct QueryHit {
    text: String,
    score: f32,
}

#[derive(Serialize)]
struct StatusOutput {
    total_records: u64,
    backend: String,
    dimension: usize,
}

struct Services {
    ingest: IngestService,
    retrieval: RetrievalService,
    index: Arc<dyn VectorIndex>,
    catalog: FileCatalog,
}

fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedding.backend {
        EmbeddingBackend::Local => Ok(Arc::new(HashEmbedder::new())),
        EmbeddingBackend::Remote => {
            let api_key = std::env::var(&config.embedding.api_key_env).unwrap_or_default();
            let remote = RemoteEmbedder::new(RemoteConfig {
                api_key,
                base_url: config.embedding.base_url.clone(),
                model: config.embedding.model.clone(),
                timeout: Duration::from_secs(config.embedding.timeout_secs),
            })?;
            Ok(Arc::new(remote))
        }
    }
}

async fn build_services(config: &Config) -> Result<Services> {
    let data = data_dir().context("could not determine data directory")?;

    let embedder = build_embedder(config)?;
    let dimension = embedder.dimension();
    let pool = Arc::new(EmbedderPool::new(embedder, config.embedding.max_concurrent));

    let db_path = config
        .index
        .db_path
        .clone()
        .unwrap_or_else(|| data.join("index.lance"));
    let index: Arc<dyn VectorIndex> = Arc::new(LanceIndex::new(db_path, dimension));
    index.ensure_namespace().await?;

    let extractors = Arc::new(ExtractorRegistry::with_defaults(Arc::new(NoopOcr)));
    let chunker = Arc::new(WindowChunker::new(config.chunking.max_chars)?);

    let ingest = IngestService::new(
        extractors,
        chunker,
        Arc::clone(&pool),
        Arc::clone(&index),
    )?;
    let retrieval = RetrievalService::new(pool, Arc::clone(&index));
    let catalog = FileCatalog::new(data.join("catalog.json"));

    Ok(Services {
        ingest,
        retrieval,
        index,
        catalog,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Add {
            tenant,
            file,
            scope,
        } => {
            let services = build_services(&config).await?;
            let scope_key = scope.unwrap_or_else(|| tenant.clone());

            let outcome = services
                .ingest
                .index_file(&tenant, &scope_key, &file, None)
                .await?;

            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let size_bytes = tokio::fs::metadata(&file).await.map(|m| m.len()).unwrap_or(0);

            let document = Document {
                id: outcome.document_id,
                tenant_id: tenant.clone(),
                filename: filename.clone(),
                format: DocumentFormat::from_path(&file).unwrap_or(DocumentFormat::Text),
                size_bytes,
                uploaded_at: Utc::now(),
            };
            services.catalog.save_document(&document).await?;

            info!(
                document_id = %outcome.document_id,
                chunk_count = outcome.chunk_count,
                "indexed"
            );

            let output = AddOutput {
                document_id: outcome.document_id,
                filename,
                chunk_count: outcome.chunk_count,
            };
            match cli.format {
                OutputFormat::Json => print_json(&output)?,
                OutputFormat::Text => {
                    println!(
                        "Indexed {} ({} chunks) as document {}",
                        output.filename, output.chunk_count, output.document_id
                    );
                }
            }
        }

        Commands::Query {
            scope,
            query,
            limit,
        } => {
            let services = build_services(&config).await?;
            let top_k = limit
                .unwrap_or(config.query.default_top_k)
                .min(config.query.max_top_k);

            let hits = services.retrieval.retrieve_scored(&scope, &query, top_k).await?;

            match cli.format {
                OutputFormat::Json => {
                    let output: Vec<QueryHit> = hits
                        .into_iter()
                        .map(|h| QueryHit {
                            text: h.text,
                            score: h.score,
                        })
                        .collect();
                    print_json(&output)?;
                }
                OutputFormat::Text => {
                    if hits.is_empty() {
                        println!("No relevant context found.");
                    } else {
                        for (i, hit) in hits.iter().enumerate() {
                            println!("{}. [{:.4}] {}", i + 1, hit.score, hit.text);
                        }
                    }
                }
            }
        }

        Commands::Docs { tenant } => {
            let services = build_services(&config).await?;
            let documents = services.catalog.list_documents(&tenant).await?;

            match cli.format {
                OutputFormat::Json => print_json(&documents)?,
                OutputFormat::Text => {
                    if documents.is_empty() {
                        println!("No documents for tenant {tenant}.");
                    } else {
                        for doc in documents {
                            println!(
                                "{}  {}  {}  {} bytes",
                                doc.id, doc.filename, doc.format, doc.size_bytes
                            );
                        }
                    }
                }
            }
        }

        Commands::Status => {
            let services = build_services(&config).await?;
            let stats = services.index.stats().await?;

            let output = StatusOutput {
                total_records: stats.total_records,
                backend: format!("{:?}", config.embedding.backend).to_lowercase(),
                dimension: services.index.dimension(),
            };
            match cli.format {
                OutputFormat::Json => print_json(&output)?,
                OutputFormat::Text => {
                    println!("records:   {}", output.total_records);
                    println!("backend:   {}", output.backend);
                    println!("dimension: {}", output.dimension);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config.to_toml()?);
            }
            ConfigAction::Init => {
                println!("{}", Config::default().to_toml()?);
            }
        },
    }

    Ok(())
}
