//! # Evidence Collector
//!
//! Batch tool that turns local regulatory filings into section-aware text
//! chunks and turns external observations (job postings, patents, detected
//! technologies, leadership pages) into scored AI-readiness signals per
//! company, stored in SQLite and reported as Markdown and CSV.
//!
//! ## Architecture
//!
//! - **[`config`]**: JSON configuration, API keys and the target-company table
//! - **[`parser`]**: text extraction, section detection and semantic chunking
//! - **[`signals`]**: the four category scorers and the composite
//! - **[`sources`]**: data provider fetchers behind the `ObservationSource` trait
//! - **[`db`]**: SQLite persistence for documents, chunks, signals and summaries
//! - **[`collect`]**: per-company batch orchestration
//! - **[`report`]**: Markdown and CSV rendering of company summaries

pub mod collect;
pub mod config;
pub mod db;
pub mod parser;
pub mod report;
pub mod signals;
pub mod sources;
