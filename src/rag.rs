use crate::chunking::split_into_chunks;
use crate::embeddings::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::index::{ChunkMetadata, IndexedChunk, VectorIndex};
use crate::prompt::assemble;
use crate::retrieval::Retriever;
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use uuid::Uuid;

/// Answer to a single question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub answer: String,
    /// "Chunk N" labels of the passages the prompt was built from, in
    /// retrieval order. Empty when nothing relevant was found.
    pub citations: Vec<String>,
}

/// RAG (Retrieval-Augmented Generation) engine
///
/// Owns the three collaborators for one session; nothing is shared globally.
pub struct RagEngine<E, V, G> {
    embedder: E,
    index: V,
    generator: G,
}

impl<E, V, G> RagEngine<E, V, G>
where
    E: EmbeddingProvider,
    V: VectorIndex,
    G: Generator,
{
    /// Create a new RAG engine
    pub fn new(embedder: E, index: V, generator: G) -> Self {
        RagEngine {
            embedder,
            index,
            generator,
        }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    /// Chunk `text`, embed every chunk and register them in the index.
    ///
    /// Returns the number of chunks indexed. Must not run concurrently with
    /// queries against the same index.
    pub async fn build_index(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<usize> {
        let chunks = split_into_chunks(text, chunk_size, overlap)?;
        if chunks.is_empty() {
            return Err(RagError::EmptyInput(
                "no text to index in the supplied documents".to_string(),
            ));
        }
        info!("Split into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::service(
                "embedder",
                format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                ),
            ));
        }

        let indexed: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexedChunk {
                id: Uuid::new_v4().to_string(),
                text: chunk.text,
                metadata: ChunkMetadata {
                    chunk_index: chunk.index,
                },
                vector,
            })
            .collect();

        let count = indexed.len();
        self.index.upsert(indexed).await?;
        info!("Indexed {} chunks", count);

        Ok(count)
    }

    /// Answer `question` from the top `top_k` indexed passages.
    ///
    /// When the index has nothing relevant the generator is asked directly
    /// and the result carries no citations. Any collaborator failure aborts
    /// the call.
    pub async fn answer(&self, question: &str, top_k: usize, max_tokens: u32) -> Result<AnswerResult> {
        if question.trim().is_empty() {
            return Err(RagError::Configuration("question is empty".to_string()));
        }
        if top_k == 0 || max_tokens == 0 {
            return Err(RagError::Configuration(
                "top_k and max_tokens must be at least 1".to_string(),
            ));
        }

        let retriever = Retriever::new(&self.embedder, &self.index);
        let hits = retriever.retrieve(question, top_k).await?;

        let assembled = assemble(question, &hits);
        if assembled.is_ungrounded() {
            info!("No relevant passages found, answering without context");
        } else {
            debug!("Prompt cites {:?}", assembled.citations);
        }

        let answer = self
            .generator
            .complete(&assembled.prompt, max_tokens)
            .await?;

        Ok(AnswerResult {
            answer,
            citations: assembled.citations,
        })
    }

    /// Run the interactive question loop on stdin/stdout
    pub async fn run_query_loop(&self, top_k: usize, max_tokens: u32) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.query_loop(stdin.lock(), &mut stdout, top_k, max_tokens)
            .await
    }

    /// Read questions from `input` until `exit` or end of input.
    ///
    /// A failed question is reported and the loop keeps going, so the
    /// index built for this session stays usable.
    pub async fn query_loop<R: BufRead, W: Write>(
        &self,
        mut input: R,
        output: &mut W,
        top_k: usize,
        max_tokens: u32,
    ) -> anyhow::Result<()> {
        writeln!(output, "Ready to answer questions. Type 'exit' to quit.")?;

        let mut buffer = String::new();

        loop {
            write!(output, "\nYour question: ")?;
            output.flush()?;

            buffer.clear();
            if input.read_line(&mut buffer)? == 0 {
                break;
            }

            let question = buffer.trim();
            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") {
                writeln!(output, "Goodbye!")?;
                break;
            }

            match self.answer(question, top_k, max_tokens).await {
                Ok(result) => writeln!(output, "\n{}", format_answer(&result))?,
                Err(e) => {
                    error!("{:#}", e);
                    writeln!(output, "\nCould not answer that question: {}", e)?;
                }
            }
        }

        Ok(())
    }
}

/// Render an answer followed by its sources
pub fn format_answer(result: &AnswerResult) -> String {
    if result.citations.is_empty() {
        return result.answer.clone();
    }

    format!(
        "{}\n\nSources:\n{}",
        result.answer,
        result.citations.join("\n")
    )
}
