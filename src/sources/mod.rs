/// External observation providers.
///
/// Each provider turns a [`TargetCompany`] into raw observations for one
/// scorer. Failures never reach the scorers: [`observe`] logs them and
/// substitutes an empty result, so "provider unavailable" and "no data"
/// score identically.
pub mod jobs;
pub mod leadership;
pub mod mock;
pub mod patents;
pub mod techstack;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::config::{ApiKeys, Config, TargetCompany};
use crate::signals::{JobPosting, PageText, Patent, TechnologyDetection};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; research)";

/// Errors raised by an observation provider.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no API key configured for {0}")]
    MissingKey(&'static str),

    #[error("no domain configured for {0}")]
    MissingDomain(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(redact_secrets(&e.to_string()))
    }
}

/// Mask credential query parameters (`token=`, `api_key=`, `KEY=`) in a message.
pub fn redact_secrets(message: &str) -> String {
    static SECRET_PARAM: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)\b(token|api_key|key)=[^\s&'"]+"#).unwrap()
    });
    SECRET_PARAM.replace_all(message, "$1=***").into_owned()
}

/// A non-empty, trimmed API key.
pub(crate) fn require_key<'a>(
    key: Option<&'a String>,
    provider: &'static str,
) -> Result<&'a str, FetchError> {
    key.map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .ok_or(FetchError::MissingKey(provider))
}

/// Something that can observe a company from the outside.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// blocking worker threads behind `Arc`.
pub trait ObservationSource: Send + Sync {
    fn job_postings(&self, company: &TargetCompany) -> Result<Vec<JobPosting>, FetchError>;

    fn patents(&self, company: &TargetCompany) -> Result<Vec<Patent>, FetchError>;

    fn technologies(&self, company: &TargetCompany) -> Result<Vec<TechnologyDetection>, FetchError>;

    fn website_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError>;

    fn linkedin_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError>;
}

/// Everything the scorers need for one company.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    pub postings: Vec<JobPosting>,
    pub patents: Vec<Patent>,
    pub technologies: Vec<TechnologyDetection>,
    pub website: Option<PageText>,
    pub linkedin: Option<PageText>,
}

impl Observations {
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
            && self.patents.is_empty()
            && self.technologies.is_empty()
            && self.website.is_none()
            && self.linkedin.is_none()
    }
}

fn or_empty<T: Default>(provider: &str, ticker: &str, result: Result<T, FetchError>) -> T {
    match result {
        Ok(value) => value,
        Err(FetchError::MissingKey(_) | FetchError::MissingDomain(_)) => {
            tracing::debug!(provider, ticker, "provider skipped: not configured");
            T::default()
        }
        Err(e) => {
            tracing::warn!(provider, ticker, "provider failed: {e}");
            T::default()
        }
    }
}

/// Query every provider, replacing failures with empty observations.
pub fn observe(source: &dyn ObservationSource, company: &TargetCompany) -> Observations {
    let ticker = company.ticker.as_str();
    Observations {
        postings: or_empty("jobs", ticker, source.job_postings(company)),
        patents: or_empty("patents", ticker, source.patents(company)),
        technologies: or_empty("techstack", ticker, source.technologies(company)),
        website: or_empty("website", ticker, source.website_text(company)),
        linkedin: or_empty("linkedin", ticker, source.linkedin_text(company)),
    }
}

/// The live providers, sharing one blocking HTTP client.
pub struct HttpSources {
    pub(crate) client: reqwest::blocking::Client,
    pub(crate) keys: ApiKeys,
    /// Pause after each BuiltWith call; the free tier allows one request per second.
    pub(crate) builtwith_delay: Duration,
    /// Shortest leadership page accepted, shared with the leadership scorer.
    pub(crate) min_text_length: usize,
}

impl HttpSources {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            keys: config.api_keys.clone(),
            builtwith_delay: Duration::from_secs(1),
            min_text_length: config.leadership_min_text_length,
        })
    }

    /// Providers that have credentials configured, for the startup log line.
    pub fn configured(&self) -> Vec<&'static str> {
        let keys = [
            ("serpapi", &self.keys.serpapi),
            ("builtwith", &self.keys.builtwith),
            ("lens", &self.keys.lens),
            ("linkedin", &self.keys.linkedin),
        ];
        keys.into_iter()
            .filter(|(_, key)| key.as_deref().is_some_and(|k| !k.trim().is_empty()))
            .map(|(name, _)| name)
            .collect()
    }
}

impl ObservationSource for HttpSources {
    fn job_postings(&self, company: &TargetCompany) -> Result<Vec<JobPosting>, FetchError> {
        let key = require_key(self.keys.serpapi.as_ref(), "serpapi")?;
        jobs::fetch_postings(&self.client, key, &company.name)
    }

    fn patents(&self, company: &TargetCompany) -> Result<Vec<Patent>, FetchError> {
        let key = require_key(self.keys.lens.as_ref(), "lens")?;
        patents::fetch_patents(&self.client, key, &company.name)
    }

    fn technologies(
        &self,
        company: &TargetCompany,
    ) -> Result<Vec<TechnologyDetection>, FetchError> {
        let key = require_key(self.keys.builtwith.as_ref(), "builtwith")?;
        let technologies = techstack::fetch_tech_stack(&self.client, key, &company.domain)?;
        std::thread::sleep(self.builtwith_delay);
        Ok(technologies)
    }

    fn website_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError> {
        leadership::fetch_company_website(&self.client, &company.domain, self.min_text_length)
    }

    fn linkedin_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError> {
        let key = require_key(self.keys.linkedin.as_ref(), "linkedin")?;
        leadership::fetch_linkedin(&self.client, key, &company.name)
    }
}
