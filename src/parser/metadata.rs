use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;

/// Filing type and approximate filing date inferred from a download path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingMetadata {
    pub filing_type: String,
    pub filing_date: DateTime<Utc>,
}

/// Infer metadata from `.../<ticker>/<filing_type>/<accession>/<file>`.
///
/// The year comes from the two-digit `-YY-` group of the accession number
/// (e.g. `0000018230-23-000012`); the date is January 1st of that year.
/// Falls back to `"UNKNOWN"` and `now` when the path does not carry them.
pub fn filing_metadata(path: &Path, now: DateTime<Utc>) -> FilingMetadata {
    static ACCESSION_YEAR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-(\d{2})-").unwrap());

    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let filing_type = if parts.len() > 2 {
        parts[parts.len() - 3].clone()
    } else {
        "UNKNOWN".to_string()
    };

    let accession = if parts.len() > 1 {
        parts[parts.len() - 2].as_str()
    } else {
        ""
    };

    let filing_date = ACCESSION_YEAR
        .captures(accession)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .and_then(|yy| Utc.with_ymd_and_hms(pivot_year(yy), 1, 1, 0, 0, 0).single())
        .unwrap_or(now);

    FilingMetadata {
        filing_type,
        filing_date,
    }
}

/// Two-digit year to four digits: `00..=49` → 2000s, `50..=99` → 1900s.
#[must_use]
pub fn pivot_year(yy: i32) -> i32 {
    if yy < 50 { 2000 + yy } else { 1900 + yy }
}
