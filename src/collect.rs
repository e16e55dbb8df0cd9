//! Batch collection: local filings into chunks, external observations into signals.
use crate::config::{Config, TargetCompany};
use crate::db::Db;
use crate::db::models::{CompanyRecord, Inserted};
use crate::parser::chunker::{DocumentChunk, SemanticChunker};
use crate::parser::{DocumentParser, ParsedDocument, extract};
use crate::signals::{
    DigitalPresenceScorer, ExternalSignal, HiringScorer, InnovationScorer, LeadershipScorer,
};
use crate::sources::{self, ObservationSource, Observations};
use anyhow::{Context, Result};
use chrono::Utc;
use ignore::WalkBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub companies: usize,
    /// Filings found on disk.
    pub documents: usize,
    /// Filings parsed and stored (or already stored) this run.
    pub processed_documents: usize,
    /// Chunks written this run.
    pub chunks: usize,
    pub signals: usize,
    pub errors: usize,
}

#[derive(Debug, Default)]
struct DocumentOutcome {
    found: usize,
    processed: usize,
    chunks: usize,
    errors: usize,
}

/// Supported filing files below `dir`, in path order. A missing directory has none.
pub fn local_filings(dir: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(dir).standard_filters(false).build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
        .map(|e| e.into_path())
        .filter(|p| extract::is_supported(p))
        .collect();

    files.sort();
    files
}

pub struct Collector {
    pub db: Arc<TokioMutex<Db>>,
    source: Arc<dyn ObservationSource>,
    parser: Arc<DocumentParser>,
    chunker: SemanticChunker,
    hiring: HiringScorer,
    innovation: InnovationScorer,
    digital: DigitalPresenceScorer,
    leadership: LeadershipScorer,
    download_dir: PathBuf,
}

impl Collector {
    pub fn new(
        config: &Config,
        db: Arc<TokioMutex<Db>>,
        source: Arc<dyn ObservationSource>,
    ) -> Self {
        Self {
            db,
            source,
            parser: Arc::new(DocumentParser::default()),
            chunker: SemanticChunker::new(
                config.chunk_size,
                config.chunk_overlap,
                config.min_chunk_size,
            ),
            hiring: HiringScorer::default(),
            innovation: InnovationScorer::new(config.patent_years),
            digital: DigitalPresenceScorer::default(),
            leadership: LeadershipScorer::new(config.leadership_min_text_length),
            download_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Runs collection for every company. A failing company is logged and
    /// counted; it never stops the batch.
    pub async fn collect(
        &self,
        companies: &[TargetCompany],
        signals_only: bool,
    ) -> CollectionStats {
        let mut stats = CollectionStats::default();

        for company in companies {
            info!(
                ticker = %company.ticker,
                name = %company.name,
                sector = %company.sector,
                "processing company"
            );

            let record = {
                let db = self.db.lock().await;
                db.get_or_create_company(company)
            };
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(ticker = %company.ticker, "failed to register company: {e}");
                    stats.errors += 1;
                    continue;
                }
            };

            if !signals_only {
                let outcome = self.collect_documents(&record).await;
                stats.documents += outcome.found;
                stats.processed_documents += outcome.processed;
                stats.chunks += outcome.chunks;
                stats.errors += outcome.errors;
            }

            match self.collect_signals(company, record.id).await {
                Ok(count) => stats.signals += count,
                Err(e) => {
                    warn!(ticker = %company.ticker, "signal collection failed: {e:#}");
                    stats.errors += 1;
                }
            }

            stats.companies += 1;
        }

        info!(
            companies = stats.companies,
            documents = stats.documents,
            chunks = stats.chunks,
            signals = stats.signals,
            errors = stats.errors,
            "collection complete"
        );
        stats
    }

    /// Parses and chunks every local filing of one company, one blocking task per file.
    async fn collect_documents(&self, company: &CompanyRecord) -> DocumentOutcome {
        let dir = self.download_dir.join(&company.ticker);
        let filings = local_filings(&dir);
        let mut outcome = DocumentOutcome {
            found: filings.len(),
            ..Default::default()
        };

        if filings.is_empty() {
            warn!(ticker = %company.ticker, dir = %dir.display(), "no local filings");
            return outcome;
        }

        let mut tasks = JoinSet::new();
        for path in filings {
            let parser = Arc::clone(&self.parser);
            let chunker = self.chunker;
            let ticker = company.ticker.clone();
            tasks.spawn_blocking(move || {
                let parsed = parser.parse_filing(&path, &ticker).map(|doc| {
                    let chunks = chunker.chunk_document(&doc);
                    (doc, chunks)
                });
                (path, parsed)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (path, parsed) = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!(ticker = %company.ticker, "parse task failed: {e}");
                    outcome.errors += 1;
                    continue;
                }
            };

            let (doc, chunks) = match parsed {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(
                        ticker = %company.ticker,
                        path = %path.display(),
                        "failed to process document: {e}"
                    );
                    outcome.errors += 1;
                    continue;
                }
            };

            match self.store_document(company.id, &doc, &chunks).await {
                Ok(written) => {
                    outcome.processed += 1;
                    outcome.chunks += written;
                    info!(
                        ticker = %company.ticker,
                        filing_type = %doc.filing_type,
                        sections = doc.sections.len(),
                        chunks = chunks.len(),
                        "processed document"
                    );
                }
                Err(e) => {
                    warn!(
                        ticker = %company.ticker,
                        path = %path.display(),
                        "failed to store document: {e:#}"
                    );
                    outcome.errors += 1;
                }
            }
        }

        outcome
    }

    async fn store_document(
        &self,
        company_id: Uuid,
        doc: &ParsedDocument,
        chunks: &[DocumentChunk],
    ) -> Result<usize> {
        let mut db = self.db.lock().await;
        if db.insert_document(company_id, doc)? == Inserted::Existing {
            debug!(hash = %doc.content_hash, "document already stored");
        }
        let written = db
            .insert_chunks(&doc.content_hash, chunks)
            .context("Failed to insert chunks")?;
        Ok(written)
    }

    /// Scores whatever each provider returned. A provider with no data is
    /// skipped rather than scored as zero; leadership yields one signal per
    /// usable page.
    pub fn score_observations(
        &self,
        company_id: Uuid,
        observations: &Observations,
    ) -> Vec<ExternalSignal> {
        if observations.is_empty() {
            debug!(%company_id, "no observations from any provider");
            return Vec::new();
        }

        let as_of = Utc::now();
        let mut signals = Vec::new();

        if observations.postings.is_empty() {
            debug!(%company_id, "no job postings");
        } else {
            signals.push(self.hiring.score(company_id, &observations.postings, as_of));
        }

        if observations.technologies.is_empty() {
            debug!(%company_id, "no technology stack");
        } else {
            signals.push(self.digital.score(company_id, &observations.technologies, as_of));
        }

        if observations.patents.is_empty() {
            debug!(%company_id, "no patents");
        } else {
            signals.push(self.innovation.score(company_id, &observations.patents, as_of));
        }

        signals.extend(self.leadership.score(
            company_id,
            observations.website.as_ref(),
            observations.linkedin.as_ref(),
            as_of,
        ));

        signals
    }

    /// Fetches, scores and stores signals for one company, then refreshes its
    /// summary if anything was stored. Returns the number of new signals.
    async fn collect_signals(&self, company: &TargetCompany, company_id: Uuid) -> Result<usize> {
        let source = Arc::clone(&self.source);
        let target = company.clone();
        let observations =
            tokio::task::spawn_blocking(move || sources::observe(source.as_ref(), &target))
                .await
                .context("Observation task failed")?;

        let signals = self.score_observations(company_id, &observations);

        let mut db = self.db.lock().await;
        let mut stored = 0;
        for signal in &signals {
            if db.insert_signal(signal).context("Failed to insert signal")? {
                stored += 1;
            }
        }

        if stored > 0 {
            let summary = db
                .update_signal_summary(company_id)
                .context("Failed to update signal summary")?;
            info!(
                ticker = %company.ticker,
                signals = stored,
                composite = summary.composite_score(),
                "signal summary updated"
            );
        } else {
            debug!(ticker = %company.ticker, "no signals collected");
        }

        Ok(stored)
    }
}
