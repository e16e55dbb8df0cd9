//! Technology-hiring scorer over job postings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::model::{ExternalSignal, SignalCategory, SignalSource};
use super::{object, round1, round3};

/// A posting is AI-related when its title or description mentions any of these.
pub const AI_KEYWORDS: &[&str] = &[
    "machine learning",
    "ml engineer",
    "data scientist",
    "artificial intelligence",
    "deep learning",
    "nlp",
    "computer vision",
    "mlops",
    "ai engineer",
    "pytorch",
    "tensorflow",
    "llm",
    "large language model",
];

pub const AI_SKILLS: &[&str] = &[
    "python",
    "pytorch",
    "tensorflow",
    "scikit-learn",
    "spark",
    "hadoop",
    "kubernetes",
    "docker",
    "aws sagemaker",
    "azure ml",
    "gcp vertex",
    "huggingface",
    "langchain",
    "openai",
];

/// A posting is a tech job when its title mentions any of these.
pub const TECH_ROLE_KEYWORDS: &[&str] = &[
    "engineer",
    "developer",
    "programmer",
    "software",
    "data",
    "analyst",
    "scientist",
    "technical",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub posted_at: Option<String>,
    pub url: Option<String>,
}

/// What [`HiringScorer::classify`] found in one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingClass {
    pub is_ai_related: bool,
    pub ai_skills: Vec<&'static str>,
}

/// Scores postings against three keyword tables, all matched on lowercase text.
#[derive(Debug, Clone, Copy)]
pub struct HiringScorer {
    pub ai_keywords: &'static [&'static str],
    pub ai_skills: &'static [&'static str],
    /// Matched against the title only.
    pub tech_roles: &'static [&'static str],
}

impl Default for HiringScorer {
    fn default() -> Self {
        Self::new(AI_KEYWORDS, AI_SKILLS, TECH_ROLE_KEYWORDS)
    }
}

impl HiringScorer {
    pub fn new(
        ai_keywords: &'static [&'static str],
        ai_skills: &'static [&'static str],
        tech_roles: &'static [&'static str],
    ) -> Self {
        Self {
            ai_keywords,
            ai_skills,
            tech_roles,
        }
    }

    pub fn classify(&self, posting: &JobPosting) -> PostingClass {
        let text = format!("{} {}", posting.title, posting.description).to_lowercase();
        PostingClass {
            is_ai_related: self.ai_keywords.iter().any(|kw| text.contains(kw)),
            ai_skills: self
                .ai_skills
                .iter()
                .copied()
                .filter(|skill| text.contains(skill))
                .collect(),
        }
    }

    pub fn is_tech_job(&self, posting: &JobPosting) -> bool {
        let title = posting.title.to_lowercase();
        self.tech_roles.iter().any(|kw| title.contains(kw))
    }

    /// Score a company's postings.
    ///
    /// `ai_jobs` counts every AI-related posting, tech title or not, so the
    /// ratio can exceed 1; its sub-score is capped at 60 regardless.
    pub fn score(
        &self,
        company_id: Uuid,
        postings: &[JobPosting],
        as_of: DateTime<Utc>,
    ) -> ExternalSignal {
        let mut tech_jobs = 0_usize;
        let mut ai_jobs = 0_usize;
        let mut skills = BTreeSet::new();

        for posting in postings {
            if self.is_tech_job(posting) {
                tech_jobs += 1;
            }
            let class = self.classify(posting);
            if class.is_ai_related {
                ai_jobs += 1;
            }
            skills.extend(class.ai_skills);
        }

        let ai_ratio = if tech_jobs > 0 {
            ai_jobs as f64 / tech_jobs as f64
        } else {
            0.0
        };

        let score = (ai_ratio * 60.0).min(60.0)
            + (skills.len() as f64 / 10.0).min(1.0) * 20.0
            + (ai_jobs as f64 / 5.0).min(1.0) * 20.0;

        tracing::debug!(%company_id, tech_jobs, ai_jobs, score, "scored hiring");

        ExternalSignal {
            id: Uuid::new_v4(),
            company_id,
            category: SignalCategory::TechnologyHiring,
            source: SignalSource::Indeed,
            signal_date: as_of,
            raw_value: format!("{ai_jobs}/{tech_jobs} AI jobs"),
            normalized_score: round1(score),
            confidence: (0.5 + tech_jobs as f64 / 100.0).min(0.95),
            metadata: object(json!({
                "total_tech_jobs": tech_jobs,
                "ai_jobs": ai_jobs,
                "ai_ratio": round3(ai_ratio),
                "skills_found": skills,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, description: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        let scorer = HiringScorer::default();
        let class = scorer.classify(&posting(
            "Senior ML Engineer",
            "Ship models with PyTorch and Docker on Kubernetes.",
        ));
        assert!(class.is_ai_related);
        assert_eq!(class.ai_skills, vec!["pytorch", "kubernetes", "docker"]);

        let class = scorer.classify(&posting("Accountant", "Quarterly close."));
        assert!(!class.is_ai_related);
        assert!(class.ai_skills.is_empty());
    }

    #[test]
    fn test_tech_job_uses_title_only() {
        let scorer = HiringScorer::default();
        assert!(scorer.is_tech_job(&posting("Data Analyst", "")));
        assert!(!scorer.is_tech_job(&posting(
            "Store Manager",
            "software engineer wanted"
        )));
    }

    #[test]
    fn test_score_example() {
        // 10 tech postings: 4 AI-related, 6 distinct skills across them.
        let mut postings = vec![
            posting("Machine Learning Engineer", "python pytorch"),
            posting("Data Scientist", "tensorflow spark"),
            posting("NLP Engineer", "docker"),
            posting("Computer Vision Developer", "kubernetes"),
        ];
        for i in 0..6 {
            postings.push(posting(
                &format!("Software Engineer {i}"),
                "Build web services.",
            ));
        }

        let company = Uuid::new_v4();
        let as_of = Utc::now();
        let signal = HiringScorer::default().score(company, &postings, as_of);

        assert_eq!(signal.normalized_score, 52.0);
        assert!((signal.confidence - 0.6).abs() < 1e-9);
        assert_eq!(signal.raw_value, "4/10 AI jobs");
        assert_eq!(signal.category, SignalCategory::TechnologyHiring);
        assert_eq!(signal.source, SignalSource::Indeed);
        assert_eq!(signal.company_id, company);
        assert_eq!(signal.signal_date, as_of);
        assert_eq!(signal.metadata["ai_ratio"], 0.4);
        assert_eq!(signal.metadata["total_tech_jobs"], 10);
        assert_eq!(signal.metadata["skills_found"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_no_postings_scores_zero() {
        let signal = HiringScorer::default().score(Uuid::new_v4(), &[], Utc::now());
        assert_eq!(signal.normalized_score, 0.0);
        assert_eq!(signal.confidence, 0.5);
        assert_eq!(signal.raw_value, "0/0 AI jobs");
        assert_eq!(signal.metadata["ai_ratio"], 0.0);
    }

    #[test]
    fn test_many_postings_capped() {
        let description = AI_KEYWORDS.join(" ") + " " + &AI_SKILLS.join(" ");
        let postings: Vec<JobPosting> = (0..10_000)
            .map(|_| posting("AI Engineer", &description))
            .collect();
        let signal = HiringScorer::default().score(Uuid::new_v4(), &postings, Utc::now());
        assert_eq!(signal.normalized_score, 100.0);
        assert_eq!(signal.confidence, 0.95);
    }

    #[test]
    fn test_ai_postings_without_tech_titles() {
        let postings = vec![posting("Product Manager", "machine learning roadmap")];
        let signal = HiringScorer::default().score(Uuid::new_v4(), &postings, Utc::now());
        // ratio is 0 without tech jobs; the volume bonus still counts the AI posting
        assert_eq!(signal.normalized_score, 4.0);
    }

    #[test]
    fn test_custom_tables() {
        let scorer = HiringScorer::new(&["forecasting"], &["sql", "excel"], &["planner"]);
        let postings = vec![
            posting("Demand Planner", "Forecasting with SQL and Excel."),
            posting("Machine Learning Engineer", "python pytorch"),
        ];

        assert!(scorer.classify(&postings[0]).is_ai_related);
        assert!(!scorer.classify(&postings[1]).is_ai_related);
        assert!(!scorer.is_tech_job(&postings[1]));

        // 1 of 1 tech jobs (60) + 2 skills (4) + 1 AI job (4)
        let signal = scorer.score(Uuid::new_v4(), &postings, Utc::now());
        assert_eq!(signal.normalized_score, 68.0);
        assert_eq!(signal.metadata["skills_found"], json!(["excel", "sql"]));
    }
}
