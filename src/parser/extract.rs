//! Plain-text extraction for downloaded filings.
//!
//! `.pdf` files are read page by page with `lopdf`; `.htm`, `.html` and
//! `.txt` files are either SEC SGML submissions (`<DOCUMENT>`/`<TYPE>`
//! envelopes around HTML) or plain HTML, both reduced to visible text with
//! `scraper`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use scraper::node::Node;

use super::ParseError;

/// Elements whose text never reaches the output of a regular HTML filing.
const HTML_SKIP: &[&str] = &["script", "style", "ix:hidden", "ix:nonfraction"];

/// Elements dropped from the `<TEXT>` body of an SGML submission; tables are
/// mostly layout and numbers.
const SGML_SKIP: &[&str] = &[
    "script",
    "style",
    "ix:hidden",
    "ix:nonfraction",
    "ix:nonnumeric",
    "table",
];

/// `<TYPE>` values of SGML documents that are not the main filing.
const SGML_NON_MAIN_TYPES: &[&str] = &["EX-", "GRAPHIC", "XML", "ZIP", "EXCEL"];

/// Extract plain text from a filing, dispatching on its extension.
pub fn extract_file(path: &Path) -> Result<String, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => extract_pdf(path),
        "htm" | "html" | "txt" => {
            let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(extract_markup(&String::from_utf8_lossy(&bytes)))
        }
        _ => Err(ParseError::UnsupportedFileType(format!(".{ext}"))),
    }
}

/// Whether `extract_file` knows how to read this path.
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_lowercase().as_str(), "pdf" | "htm" | "html" | "txt"))
}

/// Concatenate the text of every page, separated by blank lines.
pub fn extract_pdf(path: &Path) -> Result<String, ParseError> {
    let doc = lopdf::Document::load(path).map_err(|e| ParseError::Pdf(e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text),
            Ok(_) => {}
            Err(e) => tracing::debug!("skipping unreadable PDF page {page_number}: {e}"),
        }
    }

    Ok(pages.join("\n\n"))
}

/// Text of an SGML submission or a regular HTML document.
pub fn extract_markup(raw: &str) -> String {
    if raw.contains("<DOCUMENT>") && raw.contains("<TYPE>") {
        return extract_sgml(raw);
    }

    let html = Html::parse_document(raw);
    visible_lines(&html, HTML_SKIP).join("\n")
}

/// Keep the main documents of an SEC full-submission file, skipping exhibits.
pub fn extract_sgml(raw: &str) -> String {
    static DOCUMENT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<DOCUMENT>(.*?)</DOCUMENT>").unwrap());
    static TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<TYPE>(.*?)\n").unwrap());
    static TEXT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<TEXT>(.*?)</TEXT>").unwrap());

    let mut documents = Vec::new();

    for caps in DOCUMENT.captures_iter(raw) {
        let body = &caps[1];

        let Some(doc_type) = TYPE.captures(body).map(|t| t[1].trim().to_string()) else {
            continue;
        };
        if SGML_NON_MAIN_TYPES.iter().any(|skip| doc_type.contains(skip)) {
            continue;
        }

        let Some(text) = TEXT.captures(body) else {
            continue;
        };

        let html = Html::parse_fragment(&text[1]);
        let text = visible_lines(&html, SGML_SKIP).join("\n");
        documents.push(clean_sec_text(&text));
    }

    documents.join("\n\n")
}

/// Text of a web page as a single whitespace-collapsed line.
pub fn page_text(raw_html: &str, skip: &[&str]) -> String {
    let html = Html::parse_document(raw_html);
    visible_lines(&html, skip)
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed, non-empty lines of every text node not nested in a skipped element.
fn visible_lines(html: &Html, skip: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();

    for node in html.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| skip.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        lines.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    lines
}

/// Strip cover-page banners, separators, page numbers and blank runs.
pub fn clean_sec_text(text: &str) -> String {
    static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
    static BANNER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)UNITED STATES\s+SECURITIES AND EXCHANGE COMMISSION.*?FORM \d+-[KQ]")
            .unwrap()
    });
    static SEPARATORS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*{3,}|-{3,}|_{3,}|={3,}").unwrap());
    static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\d+\n").unwrap());
    static TOC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Table of Contents").unwrap());
    static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| SPACES.replace_all(line, " ").into_owned())
        .collect();
    let text = lines.join("\n");

    let text = BANNER.replace_all(&text, "");
    let text = SEPARATORS.replace_all(&text, "");
    let text = PAGE_NUMBER.replace_all(&text, "\n");
    let text = TOC.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");

    text.trim().to_string()
}
