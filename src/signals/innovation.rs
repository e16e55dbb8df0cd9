//! Innovation-activity scorer over a patent portfolio.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::model::{ExternalSignal, SignalCategory, SignalSource};
use super::{object, round1};

pub const DEFAULT_WINDOW_YEARS: u32 = 5;

pub const AI_PATENT_KEYWORDS: &[&str] = &[
    "machine learning",
    "neural network",
    "deep learning",
    "artificial intelligence",
    "natural language processing",
    "computer vision",
    "reinforcement learning",
    "predictive model",
    "classification algorithm",
];

/// `(category, any of these substrings)`; a patent can match several.
pub const AI_PATENT_CATEGORIES: &[(&str, &[&str])] = &[
    ("deep_learning", &["neural network", "deep learning"]),
    ("nlp", &["natural language"]),
    ("computer_vision", &["computer vision", "image"]),
    ("predictive_analytics", &["predictive"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patent {
    pub patent_number: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub filing_date: DateTime<Utc>,
    pub grant_date: Option<DateTime<Utc>>,
    pub inventors: Vec<String>,
    pub assignee: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatentClass {
    pub is_ai_related: bool,
    pub ai_categories: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct InnovationScorer {
    pub window_years: u32,
    pub ai_keywords: &'static [&'static str],
    pub categories: &'static [(&'static str, &'static [&'static str])],
}

impl Default for InnovationScorer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_YEARS)
    }
}

impl InnovationScorer {
    pub fn new(window_years: u32) -> Self {
        Self {
            window_years,
            ai_keywords: AI_PATENT_KEYWORDS,
            categories: AI_PATENT_CATEGORIES,
        }
    }

    /// Replace the keyword and category tables.
    #[must_use]
    pub fn with_tables(
        mut self,
        ai_keywords: &'static [&'static str],
        categories: &'static [(&'static str, &'static [&'static str])],
    ) -> Self {
        self.ai_keywords = ai_keywords;
        self.categories = categories;
        self
    }

    /// A patent with any category tag counts as AI-related even without a keyword hit.
    pub fn classify(&self, patent: &Patent) -> PatentClass {
        let text = format!("{} {}", patent.title, patent.abstract_text).to_lowercase();

        let ai_categories: Vec<&'static str> = self
            .categories
            .iter()
            .filter(|(_, needles)| needles.iter().any(|n| text.contains(n)))
            .map(|(category, _)| *category)
            .collect();

        PatentClass {
            is_ai_related: !ai_categories.is_empty()
                || self.ai_keywords.iter().any(|kw| text.contains(kw)),
            ai_categories,
        }
    }

    /// Score patents filed within the trailing window ending at `as_of`.
    pub fn score(
        &self,
        company_id: Uuid,
        patents: &[Patent],
        as_of: DateTime<Utc>,
    ) -> ExternalSignal {
        let cutoff = as_of - Duration::days(i64::from(self.window_years) * 365);
        let last_year = as_of - Duration::days(365);

        let mut ai_patents = 0_usize;
        let mut recent_ai = 0_usize;
        let mut categories = BTreeSet::new();

        for patent in patents.iter().filter(|p| p.filing_date > cutoff) {
            let class = self.classify(patent);
            if !class.is_ai_related {
                continue;
            }
            ai_patents += 1;
            if patent.filing_date > last_year {
                recent_ai += 1;
            }
            categories.extend(class.ai_categories);
        }

        let score = (ai_patents as f64 * 5.0).min(50.0)
            + (recent_ai as f64 * 2.0).min(20.0)
            + (categories.len() as f64 * 10.0).min(30.0);

        tracing::debug!(%company_id, ai_patents, recent_ai, score, "scored innovation");

        ExternalSignal {
            id: Uuid::new_v4(),
            company_id,
            category: SignalCategory::InnovationActivity,
            source: SignalSource::Lens,
            signal_date: as_of,
            raw_value: format!("{ai_patents} AI patents in {} years", self.window_years),
            normalized_score: round1(score),
            confidence: 0.90,
            metadata: object(json!({
                "total_patents": patents.len(),
                "ai_patents": ai_patents,
                "recent_ai_patents": recent_ai,
                "ai_categories": categories,
                "window_years": self.window_years,
            })),
        }
    }
}
