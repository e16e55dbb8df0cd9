/// Configuration module for the evidence collector.
///
/// Handles loading, validating, and providing default configuration values,
/// including the fixed table of target companies for the case study.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::parser::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};
use crate::signals::innovation::DEFAULT_WINDOW_YEARS;
use crate::signals::leadership::MIN_TEXT_LENGTH;

// ── Default value functions ──────────────────────────────────────────

fn default_db_path() -> String {
    "./evidence.db".to_string()
}

fn default_download_dir() -> String {
    "./data/raw/sec".to_string()
}

fn default_report_dir() -> String {
    "./reports".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

fn default_min_chunk_size() -> usize {
    DEFAULT_MIN_CHUNK_SIZE
}

fn default_patent_years() -> u32 {
    DEFAULT_WINDOW_YEARS
}

fn default_leadership_min_text_length() -> usize {
    MIN_TEXT_LENGTH
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_companies() -> Vec<TargetCompany> {
    [
        ("CAT", "Caterpillar Inc.", "Manufacturing", "caterpillar.com"),
        ("DE", "Deere & Company", "Manufacturing", "deere.com"),
        ("UNH", "UnitedHealth Group", "Healthcare", "unitedhealthgroup.com"),
        ("HCA", "HCA Healthcare", "Healthcare", "hcahealthcare.com"),
        ("ADP", "Automatic Data Processing", "Services", "adp.com"),
        ("PAYX", "Paychex Inc.", "Services", "paychex.com"),
        ("WMT", "Walmart Inc.", "Retail", "walmart.com"),
        ("TGT", "Target Corporation", "Retail", "target.com"),
        ("JPM", "JPMorgan Chase", "Financial", "jpmorganchase.com"),
        ("GS", "Goldman Sachs", "Financial", "goldmansachs.com"),
    ]
    .into_iter()
    .map(|(ticker, name, sector, domain)| TargetCompany {
        ticker: ticker.to_string(),
        name: name.to_string(),
        sector: sector.to_string(),
        domain: domain.to_string(),
    })
    .collect()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root of the filing downloads, laid out as `<ticker>/<filing_type>/<accession>/<file>`.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    #[serde(default = "default_patent_years")]
    pub patent_years: u32,

    #[serde(default = "default_leadership_min_text_length")]
    pub leadership_min_text_length: usize,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub api_keys: ApiKeys,

    #[serde(default = "default_companies")]
    pub companies: Vec<TargetCompany>,
}

/// Credentials for the external data providers. A missing key disables the provider.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtwith: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TargetCompany {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    #[serde(default)]
    pub domain: String,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            download_dir: default_download_dir(),
            report_dir: default_report_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_chunk_size: default_min_chunk_size(),
            patent_years: default_patent_years(),
            leadership_min_text_length: default_leadership_min_text_length(),
            http_timeout_secs: default_http_timeout_secs(),
            api_keys: ApiKeys::default(),
            companies: default_companies(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and optionally
    /// generates a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let mut cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");

        if cfg.companies.is_empty() {
            cfg.companies = default_companies();
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Override API keys from the process environment.
    ///
    /// Non-empty `SERPAPI_KEY`, `BUILTWITH_API_KEY`, `LENS_API_KEY` and
    /// `LINKEDIN_API_KEY` take precedence over the file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let pick = |name: &str, current: &mut Option<String>| {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *current = Some(value.trim().to_string());
            }
        };
        pick("SERPAPI_KEY", &mut self.api_keys.serpapi);
        pick("BUILTWITH_API_KEY", &mut self.api_keys.builtwith);
        pick("LENS_API_KEY", &mut self.api_keys.lens);
        pick("LINKEDIN_API_KEY", &mut self.api_keys.linkedin);
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            self.chunk_overlap < self.chunk_size,
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            self.chunk_overlap,
            self.chunk_size
        );
        anyhow::ensure!(self.min_chunk_size > 0, "min_chunk_size must be positive");
        anyhow::ensure!(self.patent_years > 0, "patent_years must be positive");
        anyhow::ensure!(
            !self.companies.is_empty(),
            "at least one target company must be configured"
        );
        Ok(())
    }

    /// Look up a configured company by ticker (case-insensitive).
    #[must_use]
    pub fn company(&self, ticker: &str) -> Option<&TargetCompany> {
        self.companies
            .iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(ticker))
    }

    /// Resolve a `--companies` argument: `"all"` or a comma-separated ticker list.
    ///
    /// Unknown tickers are dropped with a warning.
    #[must_use]
    pub fn select_companies(&self, selection: &str) -> Vec<TargetCompany> {
        if selection.trim().eq_ignore_ascii_case("all") {
            return self.companies.clone();
        }

        selection
            .split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .filter_map(|ticker| match self.company(&ticker) {
                Some(c) => Some(c.clone()),
                None => {
                    warn!(ticker = %ticker, "unknown ticker, skipping");
                    None
                }
            })
            .collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.min_chunk_size, 200);
        assert_eq!(config.patent_years, 5);
        assert_eq!(config.leadership_min_text_length, 80);
        assert_eq!(config.companies.len(), 10);
        assert!(config.api_keys.lens.is_none());
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"chunk_size": 500, "db_path": "./test.db"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.db_path, "./test.db");
        // Other fields should have defaults
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.companies.len(), 10);
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_overlap_not_smaller_than_chunk() {
        let mut config = Config::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_chunk_size() {
        let mut config = Config::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_companies() {
        let mut config = Config::default();
        config.companies.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_keys() {
        let mut config = Config::default();
        config.api_keys.lens = Some("from-file".to_string());
        config.apply_env_with(|name| match name {
            "LENS_API_KEY" => Some(" from-env ".to_string()),
            "SERPAPI_KEY" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_keys.lens.as_deref(), Some("from-env"));
        assert!(config.api_keys.serpapi.is_none());
    }

    #[test]
    fn test_select_companies() {
        let config = Config::default();
        assert_eq!(config.select_companies("all").len(), 10);

        let picked = config.select_companies("cat, de ,XYZ");
        let tickers: Vec<&str> = picked.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["CAT", "DE"]);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.chunk_size, 1000);
        // Templates are only generated for the default path
        assert!(!path.exists());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chunk_size, config.chunk_size);
        assert_eq!(parsed.db_path, config.db_path);
        assert_eq!(parsed.companies, config.companies);
    }
}
