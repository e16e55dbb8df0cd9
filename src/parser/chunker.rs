//! Section-aware word-window chunker.
//!
//! Splits each section of a [`ParsedDocument`] (or the whole text when no
//! sections were found) into overlapping windows of whitespace-delimited
//! words. Chunk indices run continuously across the sections of one document.
//!
//! Character offsets are approximate: they are measured against the words
//! re-joined with single spaces, not against the original whitespace.

use serde::Serialize;

use super::ParsedDocument;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChunk {
    /// Owning document (its content hash).
    pub document_id: String,
    pub chunk_index: usize,
    pub content: String,
    pub section: Option<String>,
    pub start_char: usize,
    pub end_char: usize,
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticChunker {
    /// Target words per chunk.
    pub chunk_size: usize,
    /// Words shared between consecutive chunks. Must be smaller than `chunk_size`.
    pub chunk_overlap: usize,
    /// A trailing remainder shorter than this is merged into the previous chunk.
    pub min_chunk_size: usize,
}

impl Default for SemanticChunker {
    fn default() -> Self {
        Self::new(
            DEFAULT_CHUNK_SIZE,
            DEFAULT_CHUNK_OVERLAP,
            DEFAULT_MIN_CHUNK_SIZE,
        )
    }
}

impl SemanticChunker {
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size,
        }
    }

    /// Chunk every section of `doc` in order, or the full text when it has no sections.
    pub fn chunk_document(&self, doc: &ParsedDocument) -> Vec<DocumentChunk> {
        if doc.sections.is_empty() {
            return self.chunk_text(&doc.content, &doc.content_hash, None, 0);
        }

        let mut chunks = Vec::new();
        for section in &doc.sections {
            let next_index = chunks.len();
            chunks.extend(self.chunk_text(
                &section.text,
                &doc.content_hash,
                Some(&section.name),
                next_index,
            ));
        }
        chunks
    }

    /// Split one text unit into overlapping word windows.
    ///
    /// Indices start at `first_index`; empty or whitespace-only text yields no chunks.
    pub fn chunk_text(
        &self,
        text: &str,
        document_id: &str,
        section: Option<&str>,
        first_index: usize,
    ) -> Vec<DocumentChunk> {
        debug_assert!(
            self.chunk_overlap < self.chunk_size,
            "chunk_overlap must be smaller than chunk_size"
        );

        let words: Vec<&str> = text.split_whitespace().collect();
        let total = words.len();
        if total == 0 {
            return Vec::new();
        }

        // joined_len[k] == chars in words[..k] joined by single spaces
        let mut joined_len = Vec::with_capacity(total + 1);
        joined_len.push(0);
        let mut acc = 0;
        for (i, word) in words.iter().enumerate() {
            acc += word.chars().count() + usize::from(i > 0);
            joined_len.push(acc);
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let mut end = (start + self.chunk_size).min(total);
            if total - end < self.min_chunk_size {
                end = total;
            }

            let content = words[start..end].join(" ");
            let start_char = joined_len[start];
            let end_char = start_char + content.chars().count();

            chunks.push(DocumentChunk {
                document_id: document_id.to_string(),
                chunk_index: first_index + chunks.len(),
                content,
                section: section.map(str::to_string),
                start_char,
                end_char,
                word_count: end - start,
            });

            if end >= total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::Section;
    use chrono::Utc;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn sizes(chunks: &[DocumentChunk]) -> Vec<usize> {
        chunks.iter().map(|c| c.word_count).collect()
    }

    fn doc_with_sections(sections: Vec<Section>, content: &str) -> ParsedDocument {
        ParsedDocument {
            ticker: "CAT".to_string(),
            filing_type: "10-K".to_string(),
            filing_date: Utc::now(),
            content: content.to_string(),
            sections,
            source_path: "mem".to_string(),
            content_hash: "hash".to_string(),
            word_count: content.split_whitespace().count(),
        }
    }

    #[test]
    fn test_empty_text() {
        let chunker = SemanticChunker::default();
        assert!(chunker.chunk_text("", "d", None, 0).is_empty());
        assert!(chunker.chunk_text(" \n\t ", "d", None, 0).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = SemanticChunker::default().chunk_text("Hello,   world!\n", "d", None, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello, world!");
        assert_eq!(chunks[0].start_char, 0);
        assert_eq!(chunks[0].end_char, 13);
        assert_eq!(chunks[0].word_count, 2);
    }

    #[test]
    fn test_without_overlap_tail_kept() {
        // 2,500 words: the final 500 words clear the minimum, so no merge.
        let chunker = SemanticChunker::new(1000, 0, 200);
        let chunks = chunker.chunk_text(&numbered_words(2500), "d", Some("item_1"), 0);
        assert_eq!(sizes(&chunks), vec![1000, 1000, 500]);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_without_overlap_tiny_tail_merged() {
        // 2,150 words: the 150-word tail is under the minimum and is absorbed.
        let chunker = SemanticChunker::new(1000, 0, 200);
        let chunks = chunker.chunk_text(&numbered_words(2150), "d", None, 0);
        assert_eq!(sizes(&chunks), vec![1000, 1150]);
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_default_overlap_windows() {
        let chunker = SemanticChunker::default();

        let chunks = chunker.chunk_text(&numbered_words(2500), "d", None, 0);
        assert_eq!(sizes(&chunks), vec![1000, 1000, 700]);
        assert!(chunks[1].content.starts_with("w900 "));
        assert!(chunks[2].content.starts_with("w1800 "));

        // Remaining 250 after the second window clears the minimum; 350-word tail follows.
        let chunks = chunker.chunk_text(&numbered_words(2150), "d", None, 0);
        assert_eq!(sizes(&chunks), vec![1000, 1000, 350]);

        // Remaining 150 after the first window is merged.
        let chunks = chunker.chunk_text(&numbered_words(1150), "d", None, 0);
        assert_eq!(sizes(&chunks), vec![1150]);
    }

    #[test]
    fn test_approximate_offsets() {
        let chunker = SemanticChunker::new(3, 1, 1);
        let chunks = chunker.chunk_text("aa  bbb\nc dddd e", "d", None, 0);
        assert_eq!(sizes(&chunks), vec![3, 3]);
        assert_eq!(chunks[0].content, "aa bbb c");
        assert_eq!((chunks[0].start_char, chunks[0].end_char), (0, 8));
        // "aa bbb" re-joined is 6 chars long
        assert_eq!(chunks[1].content, "c dddd e");
        assert_eq!((chunks[1].start_char, chunks[1].end_char), (6, 14));
    }

    #[test]
    fn test_windows_cover_every_word() {
        let chunker = SemanticChunker::new(50, 10, 20);
        let text = numbered_words(437);
        let chunks = chunker.chunk_text(&text, "d", None, 0);

        let mut rebuilt: Vec<&str> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let words: Vec<&str> = chunk.content.split_whitespace().collect();
            assert_eq!(chunk.word_count, words.len());
            assert!(chunk.end_char > chunk.start_char);
            let skip = if i == 0 { 0 } else { chunker.chunk_overlap };
            rebuilt.extend(&words[skip..]);
        }
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt, original);

        for pair in chunks.windows(2) {
            assert!(pair[1].start_char > pair[0].start_char);
            assert_eq!(pair[1].chunk_index, pair[0].chunk_index + 1);
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.word_count >= chunker.min_chunk_size);
            assert!(chunk.word_count <= chunker.chunk_size);
        }
    }

    #[test]
    fn test_indices_continue_across_sections() {
        let doc = doc_with_sections(
            vec![
                Section {
                    name: "item_1".to_string(),
                    text: numbered_words(2500),
                },
                Section {
                    name: "item_7".to_string(),
                    text: numbered_words(300),
                },
            ],
            "unused",
        );
        let chunks = SemanticChunker::default().chunk_document(&doc);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(chunks[2].section.as_deref(), Some("item_1"));
        assert_eq!(chunks[3].section.as_deref(), Some("item_7"));
        assert_eq!(chunks[3].start_char, 0);
        assert!(chunks.iter().all(|c| c.document_id == "hash"));
    }

    #[test]
    fn test_falls_back_to_full_text() {
        let doc = doc_with_sections(Vec::new(), &numbered_words(10));
        let chunks = SemanticChunker::default().chunk_document(&doc);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].section.is_none());
        assert_eq!(chunks[0].word_count, 10);
    }

    #[test]
    fn test_deterministic() {
        let chunker = SemanticChunker::new(40, 5, 10);
        let text = numbered_words(333);
        assert_eq!(
            chunker.chunk_text(&text, "d", None, 0),
            chunker.chunk_text(&text, "d", None, 0)
        );
    }
}
