use crate::config::validate_chunking;
use crate::error::Result;

/// A contiguous slice of document text produced by the splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of this chunk in the sequence
    pub index: usize,
    /// Chunk text, trimmed and never empty
    pub text: String,
}

/// Split text into overlapping windows of `chunk_size` characters.
///
/// The window starts at offset 0 and advances by `chunk_size - overlap`
/// until its start reaches the end of the text. Each window is trimmed and
/// windows that are empty after trimming are dropped. Lengths are counted in
/// characters, not bytes.
pub fn split_into_chunks(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    validate_chunking(chunk_size, overlap)?;

    let normalized = text.replace("\r\n", "\n");
    let chars: Vec<char> = normalized.chars().collect();
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();

        if !trimmed.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                text: trimmed.to_string(),
            });
        }

        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    fn sample_text(len: usize) -> String {
        "abcdefghijklmnopqrstuvwxyz"
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = split_into_chunks("", 800, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_invalid_overlap_is_rejected() {
        assert!(matches!(
            split_into_chunks("some text", 100, 100),
            Err(RagError::Configuration(_))
        ));
        assert!(matches!(
            split_into_chunks("some text", 100, 250),
            Err(RagError::Configuration(_))
        ));
        assert!(split_into_chunks("some text", 0, 0).is_err());
    }

    #[test]
    fn test_two_thousand_characters() {
        let text = sample_text(2000);
        let chunks = split_into_chunks(&text, 800, 200).unwrap();

        let lengths: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        assert_eq!(lengths, vec![800, 800, 800, 200]);

        for pair in chunks.windows(2) {
            let previous: Vec<char> = pair[0].text.chars().collect();
            let tail: String = previous[previous.len() - 200..].iter().collect();
            assert!(pair[1].text.starts_with(&tail));
        }

        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_chunks_never_exceed_chunk_size() {
        let text = sample_text(5321);
        for (size, overlap) in [(100, 0), (100, 99), (333, 50), (1000, 10)] {
            let chunks = split_into_chunks(&text, size, overlap).unwrap();
            let step = size - overlap;
            assert_eq!(chunks.len(), (text.len() + step - 1) / step);
            assert!(chunks.iter().all(|c| c.text.chars().count() <= size));
        }
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split_into_chunks("  hello world \n", 800, 200).unwrap();
        assert_eq!(
            chunks,
            vec![Chunk {
                index: 0,
                text: "hello world".to_string()
            }]
        );
    }

    #[test]
    fn test_whitespace_windows_are_dropped() {
        let text = format!("{}{}", sample_text(10), " ".repeat(30));
        let chunks = split_into_chunks(&text, 10, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, sample_text(10));
    }

    #[test]
    fn test_line_endings_are_normalized() {
        let chunks = split_into_chunks("one\r\ntwo\r\nthree", 800, 200).unwrap();
        assert_eq!(chunks[0].text, "one\ntwo\nthree");
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "héllo wörld ünïcödé".repeat(10);
        let chunks = split_into_chunks(&text, 15, 5).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 15));
    }
}
