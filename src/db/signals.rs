use super::{Db, models::*, parse_column, uuid_column};
use crate::signals::{
    CategoryScores, CompanySignalSummary, ExternalSignal, Metadata, SignalCategory,
};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Result, Row, params};
use uuid::Uuid;

const SUMMARY_COLUMNS: &str = r#"
    s.company_id, s.ticker, s.technology_hiring_score, s.innovation_activity_score,
    s.digital_presence_score, s.leadership_signals_score, s.signal_count, s.last_updated
"#;

fn summary_from_row(row: &Row<'_>) -> Result<CompanySignalSummary> {
    Ok(CompanySignalSummary {
        company_id: uuid_column(row, 0)?,
        ticker: row.get(1)?,
        scores: CategoryScores {
            technology_hiring: row.get(2)?,
            innovation_activity: row.get(3)?,
            digital_presence: row.get(4)?,
            leadership_signals: row.get(5)?,
        },
        signal_count: row.get(6)?,
        last_updated: row.get(7)?,
    })
}

impl Db {
    /// Stores a signal unless one with the same id already exists.
    pub fn insert_signal(&self, signal: &ExternalSignal) -> Result<bool> {
        let metadata = serde_json::to_string(&signal.metadata)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let rows = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO external_signals (
                id, company_id, category, source, signal_date,
                raw_value, normalized_score, confidence, metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                signal.id.to_string(),
                signal.company_id.to_string(),
                signal.category.as_str(),
                signal.source.as_str(),
                signal.signal_date,
                signal.raw_value,
                signal.normalized_score,
                signal.confidence,
                metadata
            ],
        )?;

        Ok(rows > 0)
    }

    /// All stored signals of a company, oldest first.
    pub fn signals_for_company(&self, company_id: Uuid) -> Result<Vec<ExternalSignal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, company_id, category, source, signal_date,
                   raw_value, normalized_score, confidence, metadata
            FROM external_signals
            WHERE company_id = ?
            ORDER BY signal_date, rowid
            "#,
        )?;

        let rows = stmt.query_map(params![company_id.to_string()], |row| {
            let metadata: String = row.get(8)?;
            let metadata: Metadata = serde_json::from_str(&metadata).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e))
            })?;

            Ok(ExternalSignal {
                id: uuid_column(row, 0)?,
                company_id: uuid_column(row, 1)?,
                category: parse_column(row, 2)?,
                source: parse_column(row, 3)?,
                signal_date: row.get(4)?,
                raw_value: row.get(5)?,
                normalized_score: row.get(6)?,
                confidence: row.get(7)?,
                metadata,
            })
        })?;

        rows.collect()
    }

    /// Recomputes and replaces the company's summary from all of its stored signals.
    ///
    /// Reading the signals and writing the summary happen in one transaction,
    /// so the four category scores and the composite are never seen half-updated.
    pub fn update_signal_summary(&mut self, company_id: Uuid) -> Result<CompanySignalSummary> {
        let tx = self.conn.transaction()?;
        let id = company_id.to_string();

        let ticker: String = tx.query_row(
            "SELECT ticker FROM companies WHERE id = ?",
            params![id],
            |row| row.get(0),
        )?;

        let scored: Vec<(SignalCategory, f64)> = {
            let mut stmt = tx.prepare(
                "SELECT category, normalized_score FROM external_signals WHERE company_id = ?",
            )?;
            let rows = stmt.query_map(params![id], |row| {
                Ok((parse_column::<SignalCategory>(row, 0)?, row.get::<_, f64>(1)?))
            })?;
            rows.collect::<Result<_>>()?
        };

        let summary = CompanySignalSummary {
            company_id,
            ticker,
            scores: CategoryScores::from_signals(scored.iter().copied()),
            signal_count: scored.len(),
            last_updated: Utc::now(),
        };

        tx.execute(
            r#"
            INSERT INTO company_signal_summaries (
                company_id, ticker, technology_hiring_score, innovation_activity_score,
                digital_presence_score, leadership_signals_score, composite_score,
                signal_count, last_updated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(company_id) DO UPDATE SET
                ticker = excluded.ticker,
                technology_hiring_score = excluded.technology_hiring_score,
                innovation_activity_score = excluded.innovation_activity_score,
                digital_presence_score = excluded.digital_presence_score,
                leadership_signals_score = excluded.leadership_signals_score,
                composite_score = excluded.composite_score,
                signal_count = excluded.signal_count,
                last_updated = excluded.last_updated
            "#,
            params![
                id,
                summary.ticker,
                summary.scores.technology_hiring,
                summary.scores.innovation_activity,
                summary.scores.digital_presence,
                summary.scores.leadership_signals,
                summary.composite_score(),
                summary.signal_count,
                summary.last_updated
            ],
        )?;

        tx.commit()?;
        Ok(summary)
    }

    pub fn get_summary(&self, company_id: Uuid) -> Result<Option<CompanySignalSummary>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {SUMMARY_COLUMNS} FROM company_signal_summaries s WHERE s.company_id = ?"
                ),
                params![company_id.to_string()],
                summary_from_row,
            )
            .optional()
    }

    /// Every summary with its company name, ordered by ticker.
    pub fn list_summary_rows(&self) -> Result<Vec<SummaryRow>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}, c.name
            FROM company_signal_summaries s
            LEFT JOIN companies c ON c.id = s.company_id
            ORDER BY s.ticker
            "#
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(SummaryRow {
                summary: summary_from_row(row)?,
                company_name: row.get(8)?,
            })
        })?;

        rows.collect()
    }

    /// Totals across the whole database.
    pub fn evidence_stats(&self) -> Result<EvidenceStats> {
        let count = |sql: &str| -> Result<usize> { self.conn.query_row(sql, [], |row| row.get(0)) };

        let mut stats = EvidenceStats {
            companies: count("SELECT count(*) FROM companies")?,
            documents: count("SELECT count(*) FROM documents")?,
            chunks: count("SELECT count(*) FROM document_chunks")?,
            signals: count("SELECT count(*) FROM external_signals")?,
            ..Default::default()
        };

        let mut stmt = self
            .conn
            .prepare("SELECT filing_type, count(*) FROM documents GROUP BY filing_type")?;
        for row in stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))? {
            let (filing_type, n): (String, usize) = row?;
            stats.documents_by_filing_type.insert(filing_type, n);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT category, count(*) FROM external_signals GROUP BY category")?;
        for row in stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))? {
            let (category, n): (String, usize) = row?;
            stats.signals_by_category.insert(category, n);
        }

        Ok(stats)
    }
}
