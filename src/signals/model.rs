use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::composite;

/// Free-form audit metadata attached to every signal.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    TechnologyHiring,
    InnovationActivity,
    DigitalPresence,
    LeadershipSignals,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 4] = [
        SignalCategory::TechnologyHiring,
        SignalCategory::InnovationActivity,
        SignalCategory::DigitalPresence,
        SignalCategory::LeadershipSignals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::TechnologyHiring => "technology_hiring",
            SignalCategory::InnovationActivity => "innovation_activity",
            SignalCategory::DigitalPresence => "digital_presence",
            SignalCategory::LeadershipSignals => "leadership_signals",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "signal category",
                value: s.to_string(),
            })
    }
}

/// Data provider a signal was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Linkedin,
    Indeed,
    Glassdoor,
    Uspto,
    Lens,
    Builtwith,
    PressRelease,
    CompanyWebsite,
}

impl SignalSource {
    const ALL: [SignalSource; 8] = [
        SignalSource::Linkedin,
        SignalSource::Indeed,
        SignalSource::Glassdoor,
        SignalSource::Uspto,
        SignalSource::Lens,
        SignalSource::Builtwith,
        SignalSource::PressRelease,
        SignalSource::CompanyWebsite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Linkedin => "linkedin",
            SignalSource::Indeed => "indeed",
            SignalSource::Glassdoor => "glassdoor",
            SignalSource::Uspto => "uspto",
            SignalSource::Lens => "lens",
            SignalSource::Builtwith => "builtwith",
            SignalSource::PressRelease => "press_release",
            SignalSource::CompanyWebsite => "company_website",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalSource::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "signal source",
                value: s.to_string(),
            })
    }
}

/// One scored observation for a company. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSignal {
    pub id: Uuid,
    pub company_id: Uuid,
    pub category: SignalCategory,
    pub source: SignalSource,
    pub signal_date: DateTime<Utc>,
    pub raw_value: String,
    /// In `[0, 100]`.
    pub normalized_score: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub metadata: Metadata,
}

/// One averaged score per category, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub technology_hiring: f64,
    pub innovation_activity: f64,
    pub digital_presence: f64,
    pub leadership_signals: f64,
}

impl CategoryScores {
    #[must_use]
    pub fn get(&self, category: SignalCategory) -> f64 {
        match category {
            SignalCategory::TechnologyHiring => self.technology_hiring,
            SignalCategory::InnovationActivity => self.innovation_activity,
            SignalCategory::DigitalPresence => self.digital_presence,
            SignalCategory::LeadershipSignals => self.leadership_signals,
        }
    }

    pub fn set(&mut self, category: SignalCategory, score: f64) {
        match category {
            SignalCategory::TechnologyHiring => self.technology_hiring = score,
            SignalCategory::InnovationActivity => self.innovation_activity = score,
            SignalCategory::DigitalPresence => self.digital_presence = score,
            SignalCategory::LeadershipSignals => self.leadership_signals = score,
        }
    }

    /// Average the scores of each category; a category with no signals scores 0.
    pub fn from_signals<I>(signals: I) -> Self
    where
        I: IntoIterator<Item = (SignalCategory, f64)>,
    {
        let mut sums = [0.0_f64; 4];
        let mut counts = [0_usize; 4];

        for (category, score) in signals {
            let slot = category as usize;
            sums[slot] += score;
            counts[slot] += 1;
        }

        let mut scores = Self::default();
        for category in SignalCategory::ALL {
            let slot = category as usize;
            if counts[slot] > 0 {
                scores.set(category, sums[slot] / counts[slot] as f64);
            }
        }
        scores
    }
}

/// The single summary row per company, replaced on every collection run.
///
/// The composite is always derived from the category scores; there is no
/// field to set it independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySignalSummary {
    pub company_id: Uuid,
    pub ticker: String,
    pub scores: CategoryScores,
    pub signal_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl CompanySignalSummary {
    #[must_use]
    pub fn composite_score(&self) -> f64 {
        composite::composite_score(&self.scores)
    }

    #[must_use]
    pub fn composite_without_leadership(&self) -> f64 {
        composite::composite_without_leadership(&self.scores)
    }
}

impl Serialize for CompanySignalSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CompanySignalSummary", 9)?;
        state.serialize_field("company_id", &self.company_id)?;
        state.serialize_field("ticker", &self.ticker)?;
        state.serialize_field("technology_hiring_score", &self.scores.technology_hiring)?;
        state.serialize_field("innovation_activity_score", &self.scores.innovation_activity)?;
        state.serialize_field("digital_presence_score", &self.scores.digital_presence)?;
        state.serialize_field("leadership_signals_score", &self.scores.leadership_signals)?;
        state.serialize_field("composite_score", &self.composite_score())?;
        state.serialize_field("signal_count", &self.signal_count)?;
        state.serialize_field("last_updated", &self.last_updated)?;
        state.end()
    }
}
