//! Leadership-commitment scorer over page text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::model::{ExternalSignal, SignalCategory, SignalSource};
use super::{object, round1};

/// Pages with less text than this (in characters) are treated as missing.
pub const MIN_TEXT_LENGTH: usize = 80;

const MAX_RAW_VALUE_CHARS: usize = 500;

pub const LEADERSHIP_KEYWORDS: &[&str] = &[
    "executive",
    "ceo",
    "chief",
    "cfo",
    "cto",
    "board",
    "leadership",
    "management",
    "officer",
    "president",
    "director",
    "governance",
];

pub const COMMITMENT_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "digital",
    "technology",
    "transformation",
    "innovation",
    "data",
    "automation",
    "machine learning",
    "cloud",
];

/// Text gathered from one source, with the URL it came from when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub text: String,
    pub url: Option<String>,
}

impl PageText {
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeadershipScorer {
    pub min_text_length: usize,
    pub leadership_keywords: &'static [&'static str],
    pub commitment_keywords: &'static [&'static str],
}

impl Default for LeadershipScorer {
    fn default() -> Self {
        Self::new(MIN_TEXT_LENGTH)
    }
}

/// Distinct keywords of `keywords` that occur anywhere in `lower`.
fn hits(lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| lower.contains(*kw)).count()
}

impl LeadershipScorer {
    pub fn new(min_text_length: usize) -> Self {
        Self {
            min_text_length,
            leadership_keywords: LEADERSHIP_KEYWORDS,
            commitment_keywords: COMMITMENT_KEYWORDS,
        }
    }

    /// Replace the leadership and commitment keyword tables.
    #[must_use]
    pub fn with_keywords(
        mut self,
        leadership_keywords: &'static [&'static str],
        commitment_keywords: &'static [&'static str],
    ) -> Self {
        self.leadership_keywords = leadership_keywords;
        self.commitment_keywords = commitment_keywords;
        self
    }

    fn usable<'a>(&self, page: Option<&'a PageText>) -> Option<&'a PageText> {
        page.filter(|p| p.text.trim().chars().count() >= self.min_text_length)
    }

    /// One signal per usable source; both missing yields an empty list.
    pub fn score(
        &self,
        company_id: Uuid,
        website: Option<&PageText>,
        linkedin: Option<&PageText>,
        as_of: DateTime<Utc>,
    ) -> Vec<ExternalSignal> {
        let sources = [
            (website, SignalSource::CompanyWebsite, 0.75),
            (linkedin, SignalSource::Linkedin, 0.80),
        ];

        sources
            .into_iter()
            .filter_map(|(page, source, confidence)| {
                self.usable(page)
                    .map(|page| self.score_page(company_id, page, source, confidence, as_of))
            })
            .collect()
    }

    fn score_page(
        &self,
        company_id: Uuid,
        page: &PageText,
        source: SignalSource,
        confidence: f64,
        as_of: DateTime<Utc>,
    ) -> ExternalSignal {
        let lower = page.text.to_lowercase();
        let leadership = hits(&lower, self.leadership_keywords);
        let commitment = hits(&lower, self.commitment_keywords);

        let score = (leadership as f64 * 8.0).min(50.0) + (commitment as f64 * 8.0).min(50.0);

        tracing::debug!(
            %company_id,
            %source,
            leadership,
            commitment,
            score,
            "scored leadership"
        );

        let raw_value =
            format!("leadership_mentions={leadership}, commitment_mentions={commitment}");

        let mut metadata = object(json!({
            "leadership_keyword_count": leadership,
            "commitment_keyword_count": commitment,
            "text_length": page.text.chars().count(),
        }));
        if let Some(url) = &page.url {
            metadata.insert("url".to_string(), json!(url));
        }

        ExternalSignal {
            id: Uuid::new_v4(),
            company_id,
            category: SignalCategory::LeadershipSignals,
            source,
            signal_date: as_of,
            raw_value: raw_value.chars().take(MAX_RAW_VALUE_CHARS).collect(),
            normalized_score: round1(score),
            confidence,
            metadata,
        }
    }
}
