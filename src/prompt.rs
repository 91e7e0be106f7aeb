use crate::index::RetrievalHit;

/// Longest passage, in characters, copied into a prompt
pub const MAX_PASSAGE_CHARS: usize = 800;
pub const TRUNCATION_MARKER: &str = "...";

/// A prompt ready for the generator plus the citations it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub prompt: String,
    /// One label per hit, in hit order. Empty for the fallback prompt.
    pub citations: Vec<String>,
}

impl AssembledPrompt {
    /// True when no passages backed this prompt
    pub fn is_ungrounded(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Build the generation prompt for `question` from retrieved `hits`.
///
/// Without hits this yields a short direct-answer prompt and no citations;
/// answers produced from it are ungrounded. Scores are only echoed, so the
/// result does not depend on the index's distance convention.
pub fn assemble(question: &str, hits: &[RetrievalHit]) -> AssembledPrompt {
    if hits.is_empty() {
        return AssembledPrompt {
            prompt: format!("No relevant documents found. Answer concisely: {}", question),
            citations: Vec::new(),
        };
    }

    let mut passages = Vec::with_capacity(hits.len());
    let mut citations = Vec::with_capacity(hits.len());

    for (rank, hit) in hits.iter().enumerate() {
        // Rank stands in when the index returned no metadata
        let display_index = hit.metadata.map_or(rank, |m| m.chunk_index);

        passages.push(format!(
            "[{}] (score:{:.4})\n{}",
            display_index,
            hit.score,
            truncate_passage(&hit.text)
        ));
        citations.push(format!("Chunk {}", display_index));
    }

    let prompt = format!(
        "You are a helpful assistant. Use the following passages from documents to answer the question.\n\
         If the answer is not contained in the passages, say you don't know. \
         Cite chunk indices in your answer if applicable.\n\
         \n\
         Passages:\n\
         {}\n\
         \n\
         Question: {}\n\
         \n\
         Answer concisely and cite chunk indices where applicable:",
        passages.join("\n\n"),
        question
    );

    AssembledPrompt { prompt, citations }
}

/// Cut `text` to [`MAX_PASSAGE_CHARS`] characters, marking the cut
pub fn truncate_passage(text: &str) -> String {
    match text.char_indices().nth(MAX_PASSAGE_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
