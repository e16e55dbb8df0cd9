/// Signal report rendering.
///
/// Turns stored company summaries into a Markdown report and a CSV export,
/// one row per company, ordered by ticker. The headline composite excludes
/// leadership, whose data is the least complete.
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::SummaryRow;

pub const MARKDOWN_FILE: &str = "external_signals_report.md";
pub const CSV_FILE: &str = "external_signals_report.csv";

/// Placeholder for a company without a stored name.
const MISSING_NAME: &str = "—";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub ticker: String,
    pub company_name: String,
    pub technology_hiring: f64,
    pub innovation_activity: f64,
    pub digital_presence: f64,
    pub leadership_signals: f64,
    pub composite: f64,
    pub composite_without_leadership: f64,
    pub signal_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl From<&SummaryRow> for ReportRow {
    fn from(row: &SummaryRow) -> Self {
        let summary = &row.summary;
        Self {
            ticker: summary.ticker.clone(),
            company_name: row
                .company_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| MISSING_NAME.to_string()),
            technology_hiring: summary.scores.technology_hiring,
            innovation_activity: summary.scores.innovation_activity,
            digital_presence: summary.scores.digital_presence,
            leadership_signals: summary.scores.leadership_signals,
            composite: summary.composite_score(),
            composite_without_leadership: summary.composite_without_leadership(),
            signal_count: summary.signal_count,
            last_updated: summary.last_updated,
        }
    }
}

/// Report rows sorted by ticker.
pub fn build_rows(rows: &[SummaryRow]) -> Vec<ReportRow> {
    let mut out: Vec<ReportRow> = rows.iter().map(ReportRow::from).collect();
    out.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    out
}

pub fn render_markdown(rows: &[ReportRow], generated: DateTime<Utc>) -> String {
    let mut md = String::new();
    md.push_str("# External Signals Report\n\n");
    let _ = writeln!(md, "Generated: {}\n", generated.format("%Y-%m-%d %H:%M UTC"));
    md.push_str(
        "The headline composite uses only **Technology Hiring**, **Innovation Activity** and \
         **Digital Presence**, re-weighted to 0.375 / 0.3125 / 0.3125. \
         The full composite adds **Leadership** at 0.20.\n\n",
    );

    md.push_str(
        "| Ticker | Company | Tech Hiring | Innovation | Digital | Leadership | Composite (excl. Leadership) | Composite | Signals | Last Updated |\n",
    );
    md.push_str(
        "|--------|---------|-------------|------------|---------|------------|------------------------------|-----------|---------|--------------|\n",
    );

    for row in rows {
        let _ = writeln!(
            md,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {} | {} |",
            row.ticker,
            row.company_name.replace('|', "\\|"),
            row.technology_hiring,
            row.innovation_activity,
            row.digital_presence,
            row.leadership_signals,
            row.composite_without_leadership,
            row.composite,
            row.signal_count,
            row.last_updated.format("%Y-%m-%d %H:%M"),
        );
    }

    md
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    ticker: &'a str,
    company_name: &'a str,
    technology_hiring_score: String,
    innovation_activity_score: String,
    digital_presence_score: String,
    composite_without_leadership: String,
    signal_count: usize,
}

pub fn render_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for row in rows {
        writer.serialize(CsvRecord {
            ticker: &row.ticker,
            company_name: &row.company_name,
            technology_hiring_score: format!("{:.1}", row.technology_hiring),
            innovation_activity_score: format!("{:.1}", row.innovation_activity),
            digital_presence_score: format!("{:.1}", row.digital_presence),
            composite_without_leadership: format!("{:.1}", row.composite_without_leadership),
            signal_count: row.signal_count,
        })?;
    }

    if rows.is_empty() {
        writer.write_record([
            "ticker",
            "company_name",
            "technology_hiring_score",
            "innovation_activity_score",
            "digital_presence_score",
            "composite_without_leadership",
            "signal_count",
        ])?;
    }

    let bytes = writer.into_inner().context("failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write both report files into `dir`, creating it if needed.
pub fn write_reports(dir: &Path, rows: &[ReportRow]) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let md_path = dir.join(MARKDOWN_FILE);
    fs::write(&md_path, render_markdown(rows, Utc::now()))
        .with_context(|| format!("failed to write {}", md_path.display()))?;

    let csv_path = dir.join(CSV_FILE);
    fs::write(&csv_path, render_csv(rows)?)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    tracing::info!(rows = rows.len(), dir = %dir.display(), "reports written");
    Ok((md_path, csv_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{CategoryScores, CompanySignalSummary};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn summary_row(ticker: &str, name: Option<&str>, hiring: f64, leadership: f64) -> SummaryRow {
        SummaryRow {
            company_name: name.map(str::to_string),
            summary: CompanySignalSummary {
                company_id: Uuid::new_v4(),
                ticker: ticker.to_string(),
                scores: CategoryScores {
                    technology_hiring: hiring,
                    innovation_activity: 30.0,
                    digital_presence: 20.0,
                    leadership_signals: leadership,
                },
                signal_count: 3,
                last_updated: Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 0).unwrap(),
            },
        }
    }

    #[test]
    fn test_rows_sorted_and_named() {
        let rows = build_rows(&[
            summary_row("WMT", Some("Walmart Inc."), 52.0, 40.0),
            summary_row("CAT", None, 10.0, 0.0),
        ]);
        assert_eq!(rows[0].ticker, "CAT");
        assert_eq!(rows[0].company_name, "—");
        assert!((rows[1].composite - 36.1).abs() < 1e-9);
        assert!((rows[1].composite_without_leadership - 35.125).abs() < 1e-9);
    }

    #[test]
    fn test_render_markdown() {
        let rows = build_rows(&[summary_row("WMT", Some("Walmart Inc."), 52.0, 40.0)]);
        let generated = Utc.with_ymd_and_hms(2026, 2, 3, 12, 0, 0).unwrap();
        let md = render_markdown(&rows, generated);

        assert!(md.starts_with("# External Signals Report\n"));
        assert!(md.contains("Generated: 2026-02-03 12:00 UTC"));
        assert!(md.contains(
            "| WMT | Walmart Inc. | 52.0 | 30.0 | 20.0 | 40.0 | 35.1 | 36.1 | 3 | 2026-02-03 04:05 |"
        ));
    }

    #[test]
    fn test_render_csv() {
        let rows = build_rows(&[
            summary_row("WMT", Some("Walmart, Inc."), 52.0, 40.0),
            summary_row("CAT", None, 10.0, 0.0),
        ]);
        let csv = render_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "ticker,company_name,technology_hiring_score,innovation_activity_score,digital_presence_score,composite_without_leadership,signal_count"
        );
        assert_eq!(lines[1], "CAT,—,10.0,30.0,20.0,19.4,3");
        assert_eq!(lines[2], "WMT,\"Walmart, Inc.\",52.0,30.0,20.0,35.1,3");
    }

    #[test]
    fn test_render_csv_empty_has_header() {
        let csv = render_csv(&[]).unwrap();
        assert!(csv.starts_with("ticker,company_name,"));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let rows = build_rows(&[summary_row("GS", Some("Goldman Sachs"), 5.0, 5.0)]);

        let (md, csv) = write_reports(&out, &rows).unwrap();
        assert!(fs::read_to_string(md).unwrap().contains("| GS | Goldman Sachs |"));
        assert!(fs::read_to_string(csv).unwrap().contains("GS,Goldman Sachs,5.0,"));
    }
}
