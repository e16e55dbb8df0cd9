/// Signal scoring: one scorer per category plus the weighted composite.
///
/// Every scorer is a pure function of its observations and an `as_of`
/// timestamp. Scores are sums of independently capped sub-scores, so they
/// stay within `[0, 100]` without clamping.
pub mod composite;
pub mod digital;
pub mod hiring;
pub mod innovation;
pub mod leadership;
pub mod model;

pub use self::composite::{composite_score, composite_without_leadership};
pub use self::digital::{DigitalPresenceScorer, TechnologyDetection};
pub use self::hiring::{HiringScorer, JobPosting};
pub use self::innovation::{InnovationScorer, Patent};
pub use self::leadership::{LeadershipScorer, PageText};
pub use self::model::{
    CategoryScores, CompanySignalSummary, ExternalSignal, Metadata, SignalCategory, SignalSource,
};

/// Round to one decimal place, the precision scores are reported at.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Unwrap a `json!({...})` literal into signal metadata.
pub(crate) fn object(value: serde_json::Value) -> Metadata {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Metadata::new(),
    }
}
