/// Filing parsing: text extraction, section extraction and chunking.
pub mod chunker;
pub mod extract;
pub mod metadata;
pub mod sections;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use self::sections::{Section, SectionExtractor};

/// Errors that can occur while turning a filing into text.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// A filing reduced to plain text plus the sections found in it.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub ticker: String,
    pub filing_type: String,
    pub filing_date: DateTime<Utc>,
    pub content: String,
    pub sections: Vec<Section>,
    pub source_path: String,
    /// SHA-256 of `content`, hex encoded. Used for deduplication.
    pub content_hash: String,
    pub word_count: usize,
}

impl ParsedDocument {
    /// Text of the named section, if it was found.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.text.as_str())
    }
}

pub struct DocumentParser {
    sections: SectionExtractor,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(SectionExtractor::default())
    }
}

impl DocumentParser {
    pub fn new(sections: SectionExtractor) -> Self {
        Self { sections }
    }

    /// Parse a downloaded filing. Only an unreadable or unsupported file is an error.
    pub fn parse_filing(&self, path: &Path, ticker: &str) -> Result<ParsedDocument, ParseError> {
        let content = extract::extract_file(path)?;
        let meta = metadata::filing_metadata(path, Utc::now());

        Ok(self.parse_text(
            ticker,
            &meta.filing_type,
            meta.filing_date,
            content,
            &path.display().to_string(),
        ))
    }

    /// Build a [`ParsedDocument`] from already-extracted text.
    pub fn parse_text(
        &self,
        ticker: &str,
        filing_type: &str,
        filing_date: DateTime<Utc>,
        content: String,
        source_path: &str,
    ) -> ParsedDocument {
        let sections = self.sections.extract(&content);

        let doc = ParsedDocument {
            ticker: ticker.to_string(),
            filing_type: filing_type.to_string(),
            filing_date,
            content_hash: content_hash(&content),
            word_count: content.split_whitespace().count(),
            sections,
            source_path: source_path.to_string(),
            content,
        };

        if doc.sections.is_empty() {
            tracing::debug!(ticker, filing_type, "no known sections found");
        } else {
            for name in self.sections.section_names() {
                if doc.section(name).is_none() {
                    tracing::debug!(ticker, filing_type, section = name, "section not found");
                }
            }
        }

        doc
    }
}

/// Hex-encoded SHA-256 of `text`.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::fs;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("same text");
        assert_eq!(a, content_hash("same text"));
        assert_ne!(a, content_hash("other text"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_parse_filing_from_download_layout() {
        let dir = tempfile::tempdir().unwrap();
        let filing_dir = dir.path().join("CAT/10-K/0000018230-24-000008");
        fs::create_dir_all(&filing_dir).unwrap();
        let path = filing_dir.join("primary-document.html");
        let body = format!(
            "<html><body><p>ITEM 1. BUSINESS</p><p>{}</p><p>ITEM 1A. RISK FACTORS</p><p>{}</p></body></html>",
            "We make machines. ".repeat(20),
            "Demand is cyclical. ".repeat(20)
        );
        fs::write(&path, body).unwrap();

        let doc = DocumentParser::default().parse_filing(&path, "CAT").unwrap();
        assert_eq!(doc.ticker, "CAT");
        assert_eq!(doc.filing_type, "10-K");
        assert_eq!(doc.filing_date.year(), 2024);
        assert_eq!(doc.word_count, doc.content.split_whitespace().count());
        assert_eq!(doc.content_hash, content_hash(&doc.content));
        assert!(doc.section("item_1").unwrap().contains("We make machines."));
        assert!(!doc.section("item_1").unwrap().contains("RISK FACTORS"));
        assert!(doc.section("item_1a").unwrap().contains("cyclical"));
        assert!(doc.section("item_7").is_none());
    }

    #[test]
    fn test_parse_filing_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{}").unwrap();
        let err = DocumentParser::default()
            .parse_filing(&path, "CAT")
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFileType(_)));
    }
}
