//! Evidence database module using SQLite
use rusqlite::types::Type;
use rusqlite::{Connection, Result, Row};
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub mod documents;
pub mod models;
pub mod signals;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY,
    ticker TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    sector TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS documents (
    content_hash TEXT PRIMARY KEY,
    company_id TEXT NOT NULL,
    ticker TEXT NOT NULL,
    filing_type TEXT NOT NULL,
    filing_date DATETIME NOT NULL,
    local_path TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    chunk_count INTEGER,
    status TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    processed_at DATETIME,
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_documents_company ON documents(company_id);

CREATE TABLE IF NOT EXISTS document_chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    section TEXT,
    start_char INTEGER NOT NULL,
    end_char INTEGER NOT NULL,
    word_count INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(document_id, chunk_index),
    FOREIGN KEY (document_id) REFERENCES documents(content_hash) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS external_signals (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL,
    category TEXT NOT NULL,
    source TEXT NOT NULL,
    signal_date DATETIME NOT NULL,
    raw_value TEXT NOT NULL,
    normalized_score REAL NOT NULL,
    confidence REAL NOT NULL,
    metadata TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_signals_company ON external_signals(company_id);

CREATE TABLE IF NOT EXISTS company_signal_summaries (
    company_id TEXT PRIMARY KEY,
    ticker TEXT NOT NULL,
    technology_hiring_score REAL NOT NULL,
    innovation_activity_score REAL NOT NULL,
    digital_presence_score REAL NOT NULL,
    leadership_signals_score REAL NOT NULL,
    composite_score REAL NOT NULL,
    signal_count INTEGER NOT NULL,
    last_updated DATETIME NOT NULL,
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);
"#;

/// A wrapper around a SQLite connection initialized with the evidence schema.
pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    /// Open a database connection at the given path and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Initializing database: {}", path.display());

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database connection (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }
}

/// Read a TEXT column through `FromStr`, reporting parse failures as conversion errors.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn uuid_column(row: &Row<'_>, idx: usize) -> Result<Uuid> {
    parse_column(row, idx)
}
