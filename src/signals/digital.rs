//! Digital-presence scorer over a detected technology stack.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::model::{ExternalSignal, SignalCategory, SignalSource};
use super::{object, round1};

/// Technology name fragment to AI category, checked in order; first match wins.
pub const AI_TECHNOLOGIES: &[(&str, &str)] = &[
    ("aws sagemaker", "cloud_ml"),
    ("azure ml", "cloud_ml"),
    ("google vertex", "cloud_ml"),
    ("databricks", "data_platform"),
    ("tensorflow", "ml_framework"),
    ("pytorch", "ml_framework"),
    ("scikit-learn", "ml_framework"),
    ("snowflake", "data_platform"),
    ("spark", "data_platform"),
    ("openai", "ai_api"),
    ("anthropic", "ai_api"),
    ("huggingface", "ai_api"),
];

/// Category given to technologies outside the lookup table.
pub const OTHER_CATEGORY: &str = "other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyDetection {
    pub name: String,
    pub category: String,
    pub is_ai_related: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DigitalPresenceScorer {
    /// `(name fragment, category)` pairs, checked in order.
    pub technologies: &'static [(&'static str, &'static str)],
}

impl Default for DigitalPresenceScorer {
    fn default() -> Self {
        Self::new(AI_TECHNOLOGIES)
    }
}

impl DigitalPresenceScorer {
    pub fn new(technologies: &'static [(&'static str, &'static str)]) -> Self {
        Self { technologies }
    }

    /// AI category of a technology name, if it matches the lookup table.
    pub fn classify(&self, name: &str) -> Option<&'static str> {
        let name = name.to_lowercase();
        self.technologies
            .iter()
            .find(|(fragment, _)| name.contains(fragment))
            .map(|(_, category)| *category)
    }

    /// Build a detection for `name`, classified against the lookup table.
    pub fn detect(&self, name: &str, confidence: f64) -> TechnologyDetection {
        let category = self.classify(name);
        TechnologyDetection {
            name: name.to_lowercase(),
            category: category.unwrap_or(OTHER_CATEGORY).to_string(),
            is_ai_related: category.is_some(),
            confidence,
        }
    }

    pub fn score(
        &self,
        company_id: Uuid,
        technologies: &[TechnologyDetection],
        as_of: DateTime<Utc>,
    ) -> ExternalSignal {
        let ai_techs: Vec<&TechnologyDetection> =
            technologies.iter().filter(|t| t.is_ai_related).collect();
        let categories: BTreeSet<&str> =
            ai_techs.iter().map(|t| t.category.as_str()).collect();

        let score = (ai_techs.len() as f64 * 10.0).min(50.0)
            + (categories.len() as f64 * 12.5).min(50.0);

        tracing::debug!(
            %company_id,
            ai_techs = ai_techs.len(),
            score,
            "scored digital presence"
        );

        ExternalSignal {
            id: Uuid::new_v4(),
            company_id,
            category: SignalCategory::DigitalPresence,
            source: SignalSource::Builtwith,
            signal_date: as_of,
            raw_value: format!("{} AI technologies detected", ai_techs.len()),
            normalized_score: round1(score),
            confidence: 0.85,
            metadata: object(json!({
                "ai_technologies": ai_techs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                "categories": categories,
                "total_technologies": technologies.len(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_first_match_wins() {
        let scorer = DigitalPresenceScorer::default();
        assert_eq!(
            scorer.classify("Databricks Lakehouse"),
            Some("data_platform")
        );
        assert_eq!(scorer.classify("AWS SageMaker"), Some("cloud_ml"));
        assert_eq!(scorer.classify("Apache Spark"), Some("data_platform"));
        assert_eq!(scorer.classify("jQuery"), None);
    }

    #[test]
    fn test_detect() {
        let detection = DigitalPresenceScorer::default().detect("PyTorch", 0.8);
        assert_eq!(detection.name, "pytorch");
        assert_eq!(detection.category, "ml_framework");
        assert!(detection.is_ai_related);

        let detection = DigitalPresenceScorer::default().detect("Google Analytics", 0.7);
        assert_eq!(detection.category, OTHER_CATEGORY);
        assert!(!detection.is_ai_related);
    }

    #[test]
    fn test_score() {
        let scorer = DigitalPresenceScorer::default();
        let techs: Vec<TechnologyDetection> = ["tensorflow", "snowflake", "spark", "nginx"]
            .iter()
            .map(|name| scorer.detect(name, 0.8))
            .collect();
        let signal = scorer.score(Uuid::new_v4(), &techs, Utc::now());

        // 3 AI techs (30) + {ml_framework, data_platform} (25)
        assert_eq!(signal.normalized_score, 55.0);
        assert_eq!(signal.confidence, 0.85);
        assert_eq!(signal.raw_value, "3 AI technologies detected");
        assert_eq!(signal.metadata["total_technologies"], 4);
        assert_eq!(
            signal.metadata["categories"],
            json!(["data_platform", "ml_framework"])
        );
    }

    #[test]
    fn test_score_caps_and_empty() {
        let scorer = DigitalPresenceScorer::default();
        let techs: Vec<TechnologyDetection> = AI_TECHNOLOGIES
            .iter()
            .map(|(name, _)| scorer.detect(name, 0.8))
            .collect();
        let signal = scorer.score(Uuid::new_v4(), &techs, Utc::now());
        assert_eq!(signal.normalized_score, 100.0);

        let signal = scorer.score(Uuid::new_v4(), &[], Utc::now());
        assert_eq!(signal.normalized_score, 0.0);
        assert_eq!(signal.raw_value, "0 AI technologies detected");
    }

    #[test]
    fn test_custom_table() {
        let scorer = DigitalPresenceScorer::new(&[("kafka", "streaming"), ("tensorflow", "ml")]);
        assert_eq!(scorer.classify("Apache Kafka"), Some("streaming"));
        assert_eq!(scorer.classify("Databricks"), None);

        let techs = vec![
            scorer.detect("Apache Kafka", 0.8),
            scorer.detect("TensorFlow", 0.8),
            scorer.detect("Snowflake", 0.7),
        ];
        assert_eq!(techs[2].category, OTHER_CATEGORY);

        // 2 AI techs (20) + {ml, streaming} (25)
        let signal = scorer.score(Uuid::new_v4(), &techs, Utc::now());
        assert_eq!(signal.normalized_score, 45.0);
        assert_eq!(signal.metadata["categories"], json!(["ml", "streaming"]));
    }
}
