use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::signals::CompanySignalSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub ticker: String,
    pub name: String,
    pub sector: String,
}

/// Processing state of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Parsed,
    Chunked,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Parsed => "parsed",
            DocumentStatus::Chunked => "chunked",
        }
    }
}

/// Outcome of [`Db::insert_document`](super::Db::insert_document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    New,
    /// A document with the same content hash was already stored.
    Existing,
}

/// One row of the signal report: a summary joined with its company name.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub company_name: Option<String>,
    pub summary: CompanySignalSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceStats {
    pub companies: usize,
    pub documents: usize,
    pub chunks: usize,
    pub signals: usize,
    pub documents_by_filing_type: BTreeMap<String, usize>,
    pub signals_by_category: BTreeMap<String, usize>,
}
