use super::{Db, models::*, uuid_column};
use crate::config::TargetCompany;
use crate::parser::ParsedDocument;
use crate::parser::chunker::DocumentChunk;
use chrono::Utc;
use rusqlite::{OptionalExtension, Result, params};
use uuid::Uuid;

impl Db {
    /// Returns the stored company for `company.ticker`, creating it on first sight.
    /// Name and sector are refreshed from the configuration; the id never changes.
    pub fn get_or_create_company(&self, company: &TargetCompany) -> Result<CompanyRecord> {
        let id = self.conn.query_row(
            r#"
            INSERT INTO companies (id, ticker, name, sector)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                name = excluded.name,
                sector = excluded.sector
            RETURNING id
            "#,
            params![
                Uuid::new_v4().to_string(),
                company.ticker,
                company.name,
                company.sector
            ],
            |row| uuid_column(row, 0),
        )?;

        Ok(CompanyRecord {
            id,
            ticker: company.ticker.clone(),
            name: company.name.clone(),
            sector: company.sector.clone(),
        })
    }

    pub fn company_by_ticker(&self, ticker: &str) -> Result<Option<CompanyRecord>> {
        self.conn
            .query_row(
                "SELECT id, ticker, name, sector FROM companies WHERE ticker = ?",
                params![ticker],
                |row| {
                    Ok(CompanyRecord {
                        id: uuid_column(row, 0)?,
                        ticker: row.get(1)?,
                        name: row.get(2)?,
                        sector: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    /// Stores a parsed document keyed by its content hash.
    ///
    /// A document whose hash is already stored is left untouched.
    pub fn insert_document(&self, company_id: Uuid, doc: &ParsedDocument) -> Result<Inserted> {
        let rows = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO documents (
                content_hash, company_id, ticker, filing_type, filing_date,
                local_path, word_count, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                doc.content_hash,
                company_id.to_string(),
                doc.ticker,
                doc.filing_type,
                doc.filing_date,
                doc.source_path,
                doc.word_count,
                DocumentStatus::Parsed.as_str()
            ],
        )?;

        Ok(if rows > 0 {
            Inserted::New
        } else {
            Inserted::Existing
        })
    }

    /// Inserts the chunks of a document and marks it chunked.
    ///
    /// Returns the number of chunks written; zero when the document already
    /// had chunks, so re-running a collection never duplicates them.
    pub fn insert_chunks(&mut self, document_id: &str, chunks: &[DocumentChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;

        let existing: usize = tx.query_row(
            "SELECT count(*) FROM document_chunks WHERE document_id = ?",
            params![document_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(0);
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO document_chunks (
                    document_id, chunk_index, content, section,
                    start_char, end_char, word_count
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for chunk in chunks {
                stmt.execute(params![
                    document_id,
                    chunk.chunk_index,
                    chunk.content,
                    chunk.section,
                    chunk.start_char,
                    chunk.end_char,
                    chunk.word_count
                ])?;
            }
        }

        tx.execute(
            "UPDATE documents SET chunk_count = ?, status = ?, processed_at = ? WHERE content_hash = ?",
            params![
                chunks.len(),
                DocumentStatus::Chunked.as_str(),
                Utc::now(),
                document_id
            ],
        )?;

        tx.commit()?;
        Ok(chunks.len())
    }

    /// Chunks of a document in index order.
    pub fn chunks_for_document(&self, document_id: &str) -> Result<Vec<DocumentChunk>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT document_id, chunk_index, content, section, start_char, end_char, word_count
            FROM document_chunks
            WHERE document_id = ?
            ORDER BY chunk_index
            "#,
        )?;

        let rows = stmt.query_map(params![document_id], |row| {
            Ok(DocumentChunk {
                document_id: row.get(0)?,
                chunk_index: row.get(1)?,
                content: row.get(2)?,
                section: row.get(3)?,
                start_char: row.get(4)?,
                end_char: row.get(5)?,
                word_count: row.get(6)?,
            })
        })?;

        rows.collect()
    }

    pub fn document_status(&self, document_id: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT status FROM documents WHERE content_hash = ?",
                params![document_id],
                |row| row.get(0),
            )
            .optional()
    }
}
