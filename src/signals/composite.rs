//! Weighted composite over the four category scores.

use super::model::{CategoryScores, SignalCategory};

pub const TECHNOLOGY_HIRING_WEIGHT: f64 = 0.30;
pub const INNOVATION_ACTIVITY_WEIGHT: f64 = 0.25;
pub const DIGITAL_PRESENCE_WEIGHT: f64 = 0.25;
pub const LEADERSHIP_SIGNALS_WEIGHT: f64 = 0.20;

#[must_use]
pub fn weight(category: SignalCategory) -> f64 {
    match category {
        SignalCategory::TechnologyHiring => TECHNOLOGY_HIRING_WEIGHT,
        SignalCategory::InnovationActivity => INNOVATION_ACTIVITY_WEIGHT,
        SignalCategory::DigitalPresence => DIGITAL_PRESENCE_WEIGHT,
        SignalCategory::LeadershipSignals => LEADERSHIP_SIGNALS_WEIGHT,
    }
}

/// Weighted sum of all four categories. Stays in `[0, 100]` because the weights sum to 1.
#[must_use]
pub fn composite_score(scores: &CategoryScores) -> f64 {
    SignalCategory::ALL
        .iter()
        .map(|&c| weight(c) * scores.get(c))
        .sum()
}

/// Composite over hiring, innovation and digital presence, re-normalised to `[0, 100]`.
///
/// Used by reports when leadership data is unavailable.
#[must_use]
pub fn composite_without_leadership(scores: &CategoryScores) -> f64 {
    let total_weight =
        TECHNOLOGY_HIRING_WEIGHT + INNOVATION_ACTIVITY_WEIGHT + DIGITAL_PRESENCE_WEIGHT;
    let weighted = TECHNOLOGY_HIRING_WEIGHT * scores.technology_hiring
        + INNOVATION_ACTIVITY_WEIGHT * scores.innovation_activity
        + DIGITAL_PRESENCE_WEIGHT * scores.digital_presence;
    weighted / total_weight
}
