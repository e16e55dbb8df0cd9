/// In-memory observation source for testing.
///
/// Serves canned observations per ticker, or fails every call, so the
/// collection pipeline can run without network access.
use std::collections::HashMap;

use super::{FetchError, ObservationSource, Observations};
use crate::config::TargetCompany;
use crate::signals::{JobPosting, PageText, Patent, TechnologyDetection};

#[derive(Debug, Default)]
pub struct FixtureSource {
    by_ticker: HashMap<String, Observations>,
    failing: bool,
}

impl FixtureSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails with a provider error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            by_ticker: HashMap::new(),
            failing: true,
        }
    }

    #[must_use]
    pub fn with(mut self, ticker: &str, observations: Observations) -> Self {
        self.by_ticker.insert(ticker.to_string(), observations);
        self
    }

    fn lookup(&self, company: &TargetCompany) -> Result<Observations, FetchError> {
        if self.failing {
            return Err(FetchError::Provider(format!(
                "fixture failure for {}",
                company.ticker
            )));
        }
        Ok(self
            .by_ticker
            .get(&company.ticker)
            .cloned()
            .unwrap_or_default())
    }
}

impl ObservationSource for FixtureSource {
    fn job_postings(&self, company: &TargetCompany) -> Result<Vec<JobPosting>, FetchError> {
        Ok(self.lookup(company)?.postings)
    }

    fn patents(&self, company: &TargetCompany) -> Result<Vec<Patent>, FetchError> {
        Ok(self.lookup(company)?.patents)
    }

    fn technologies(
        &self,
        company: &TargetCompany,
    ) -> Result<Vec<TechnologyDetection>, FetchError> {
        Ok(self.lookup(company)?.technologies)
    }

    fn website_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError> {
        Ok(self.lookup(company)?.website)
    }

    fn linkedin_text(&self, company: &TargetCompany) -> Result<Option<PageText>, FetchError> {
        Ok(self.lookup(company)?.linkedin)
    }
}
