use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

use docuchat::config::{
    PipelineConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_TOKENS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_K,
};
use docuchat::database::{QdrantConfig, QdrantIndex};
use docuchat::document::load_documents;
use docuchat::gemini::{GeminiClient, GeminiConfig};
use docuchat::generation::Generator;
use docuchat::huggingface::{HuggingFaceClient, HuggingFaceConfig};
use docuchat::index::{MemoryIndex, VectorIndex};
use docuchat::rag::{format_answer, RagEngine};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GeneratorKind {
    /// Gemini generateContent API
    Gemini,
    /// Hugging Face inference router (chat completions)
    Huggingface,
}

/// Ask questions about PDF and text documents, answered with cited passages
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Documents to index (PDF or plain text)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Chunk size in characters
    #[arg(long, env = "RAG_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "RAG_CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    overlap: usize,

    /// Passages retrieved per question
    #[arg(long, env = "RAG_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Token budget for each generated answer
    #[arg(long, env = "RAG_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Timeout for every outbound HTTP request, in seconds
    #[arg(long, env = "RAG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Backend used to generate answers
    #[arg(long, env = "RAG_GENERATOR", value_enum, default_value_t = GeneratorKind::Gemini)]
    generator: GeneratorKind,

    /// Qdrant collection key (defaults to the first file name)
    #[arg(long)]
    collection: Option<String>,

    /// Rebuild the Qdrant collection even if it already exists
    #[arg(long)]
    reindex: bool,

    /// Answer a single question and exit instead of starting the prompt loop
    #[arg(long, short)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = PipelineConfig {
        chunk_size: args.chunk_size,
        overlap: args.overlap,
        top_k: args.top_k,
        max_tokens: args.max_tokens,
        request_timeout: Duration::from_secs(args.timeout_secs),
    };
    config.validate()?;

    let gemini_config = GeminiConfig::from_env()?;
    let embedder = GeminiClient::new(gemini_config, config.request_timeout)
        .context("Failed to initialize Gemini client")?;

    match QdrantConfig::from_env() {
        Some(qdrant_config) => {
            let (collection, derived_from_many) =
                collection_key(args.collection.as_deref(), &args.files)?;
            if derived_from_many {
                warn!(
                    "Collection named after {} only; pass --collection or --reindex \
                     when the other {} files change",
                    collection,
                    args.files.len() - 1
                );
            }
            let qdrant = QdrantIndex::new(qdrant_config, &collection)
                .context("Failed to initialize Qdrant client")?;

            let mut exists = qdrant.collection_exists().await?;
            if exists && args.reindex {
                qdrant.delete_collection().await?;
                exists = false;
            }
            if exists {
                info!("Using existing collection: {}", qdrant.collection_name());
            }

            with_generator(&args, &config, embedder, qdrant, !exists).await
        }
        None => {
            info!("QDRANT_URL not set, using an in-memory index");
            if args.collection.is_some() || args.reindex {
                warn!("--collection and --reindex only apply to Qdrant");
            }
            with_generator(&args, &config, embedder, MemoryIndex::new(), true).await
        }
    }
}

async fn with_generator<V: VectorIndex>(
    args: &Args,
    config: &PipelineConfig,
    embedder: GeminiClient,
    index: V,
    build: bool,
) -> Result<()> {
    match args.generator {
        GeneratorKind::Gemini => {
            let generator = embedder.clone();
            run(args, config, RagEngine::new(embedder, index, generator), build).await
        }
        GeneratorKind::Huggingface => {
            let hf_config = HuggingFaceConfig::from_env()?;
            let generator = HuggingFaceClient::new(hf_config, config.request_timeout)
                .context("Failed to initialize Hugging Face client")?;
            info!("Generating answers with {}", generator.model());
            run(args, config, RagEngine::new(embedder, index, generator), build).await
        }
    }
}

async fn run<V: VectorIndex, G: Generator>(
    args: &Args,
    config: &PipelineConfig,
    engine: RagEngine<GeminiClient, V, G>,
    build: bool,
) -> Result<()> {
    if build {
        let corpus = load_documents(&args.files);
        info!(
            "Extracted text from {} of {} documents",
            corpus.document_ids.len(),
            args.files.len()
        );

        engine
            .build_index(&corpus.content, config.chunk_size, config.overlap)
            .await
            .context("Failed to build index")?;
    }

    match &args.question {
        Some(question) => {
            let result = engine
                .answer(question, config.top_k, config.max_tokens)
                .await?;
            println!("{}", format_answer(&result));
        }
        None => {
            engine
                .run_query_loop(config.top_k, config.max_tokens)
                .await
                .context("Error in query loop")?;
        }
    }

    Ok(())
}

/// Collection key and whether it was derived from only one of several files
fn collection_key(explicit: Option<&str>, files: &[PathBuf]) -> Result<(String, bool)> {
    match explicit {
        Some(collection) => Ok((collection.to_string(), false)),
        None => Ok((first_file_name(files)?, files.len() > 1)),
    }
}

fn first_file_name(files: &[PathBuf]) -> Result<String> {
    files
        .first()
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .context("Invalid file name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_key() {
        let one = vec![PathBuf::from("docs/report.pdf")];
        let many = vec![PathBuf::from("docs/report.pdf"), PathBuf::from("notes.txt")];

        assert_eq!(
            collection_key(None, &one).unwrap(),
            ("report.pdf".to_string(), false)
        );
        assert_eq!(
            collection_key(None, &many).unwrap(),
            ("report.pdf".to_string(), true)
        );
        assert_eq!(
            collection_key(Some("handbook"), &many).unwrap(),
            ("handbook".to_string(), false)
        );
        assert!(collection_key(None, &[]).is_err());
    }
}
