use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Maximum number of characters kept per extracted section.
pub const MAX_SECTION_CHARS: usize = 50_000;

/// Characters skipped past a heading before looking for the next item marker,
/// so the heading itself is never mistaken for the end of its own section.
pub const NEXT_ITEM_LOOKAHEAD: usize = 100;

/// Heading patterns for the 10-K items we keep, in extraction order.
pub const TEN_K_SECTIONS: &[(&str, &str)] = &[
    ("item_1", r"ITEM\s*1[.\s]*BUSINESS"),
    ("item_1a", r"ITEM\s*1A[.\s]*RISK\s*FACTORS"),
    ("item_7", r"ITEM\s*7[.\s]*MANAGEMENT"),
    ("item_7a", r"ITEM\s*7A[.\s]*QUANTITATIVE"),
];

/// Generic "numbered item" marker that terminates a section.
pub const NEXT_ITEM_PATTERN: &str = r"ITEM\s*\d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub text: String,
}

/// Locates named filing sections by heading pattern.
///
/// Matching is case-insensitive. A section runs from its heading to the next
/// item marker found at least [`NEXT_ITEM_LOOKAHEAD`] characters later, or to
/// the end of the document, and is truncated to [`MAX_SECTION_CHARS`].
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    patterns: Vec<(String, Regex)>,
    next_item: Regex,
    lookahead: usize,
    max_chars: usize,
}

impl SectionExtractor {
    /// Build an extractor from a `(section name, heading regex)` table.
    pub fn new(table: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let patterns = table
            .iter()
            .map(|(name, pattern)| Ok((name.to_string(), case_insensitive(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            patterns,
            next_item: case_insensitive(NEXT_ITEM_PATTERN)?,
            lookahead: NEXT_ITEM_LOOKAHEAD,
            max_chars: MAX_SECTION_CHARS,
        })
    }

    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Names of the sections this extractor looks for, in order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(name, _)| name.as_str())
    }

    /// Extract every section whose heading is present. Missing sections are skipped.
    pub fn extract(&self, content: &str) -> Vec<Section> {
        let mut sections = Vec::new();

        for (name, pattern) in &self.patterns {
            let Some(heading) = pattern.find(content) else {
                continue;
            };
            let start = heading.start();

            let search_from = advance_chars(content, start, self.lookahead);
            let end = self
                .next_item
                .find(&content[search_from..])
                .map(|m| search_from + m.start())
                .unwrap_or(content.len());

            sections.push(Section {
                name: name.clone(),
                text: truncate_chars(&content[start..end], self.max_chars).to_string(),
            });
        }

        sections
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new(TEN_K_SECTIONS).expect("built-in 10-K section patterns are valid")
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Byte offset `count` characters after `from`, clamped to the end of `text`.
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map(|(offset, _)| from + offset)
        .unwrap_or(text.len())
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
