pub mod chunking;
pub mod config;
pub mod database;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod huggingface;
pub mod index;
pub mod prompt;
pub mod rag;
pub mod retrieval;

#[cfg(test)]
mod testing;
