//! Technology stack lookups against the BuiltWith free API.

use std::collections::HashSet;

use serde_json::Value;

use super::FetchError;
use crate::signals::digital::OTHER_CATEGORY;
use crate::signals::{DigitalPresenceScorer, TechnologyDetection};

const BUILTWITH_URL: &str = "https://api.builtwith.com/free1/api.json";

const GROUP_CONFIDENCE: f64 = 0.8;
const CATEGORY_CONFIDENCE: f64 = 0.7;

/// Bare host of a configured domain: no scheme, no path, lowercase.
pub fn lookup_host(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(&domain);
    domain.split('/').next().unwrap_or_default().to_string()
}

pub fn fetch_tech_stack(
    client: &reqwest::blocking::Client,
    api_key: &str,
    domain: &str,
) -> Result<Vec<TechnologyDetection>, FetchError> {
    let host = lookup_host(domain);
    if host.is_empty() {
        return Err(FetchError::MissingDomain(domain.to_string()));
    }

    let response = client
        .get(BUILTWITH_URL)
        .query(&[("KEY", api_key), ("LOOKUP", host.as_str())])
        .send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body: Value = response.json()?;
    let technologies = parse_tech_stack(&body)?;
    tracing::info!(domain = %host, count = technologies.len(), "fetched technology stack");
    Ok(technologies)
}

/// Field lookup tolerant of the API's inconsistent key casing.
fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value
        .get(name)
        .or_else(|| value.get(name.to_lowercase()))
        .filter(|v| !v.is_null())
}

fn name_of(value: &Value) -> String {
    field(value, "Name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

/// One detection per technology group, plus one per category within a group.
/// Names are lowercased and deduplicated across both levels.
fn parse_tech_stack(body: &Value) -> Result<Vec<TechnologyDetection>, FetchError> {
    if let Some(first) = field(body, "Errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = field(first, "Message")
            .or_else(|| field(first, "Code"))
            .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
            .unwrap_or_else(|| first.to_string());
        return Err(FetchError::Provider(message));
    }

    let mut results = field(body, "free1")
        .or_else(|| field(body, "Results"))
        .unwrap_or(body);
    if let Some(first) = results.as_array().and_then(|a| a.first()) {
        results = first;
    }

    let scorer = DigitalPresenceScorer::default();
    let mut seen = HashSet::new();
    let mut technologies = Vec::new();

    let groups = field(results, "Groups")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for group in groups {
        let group_name = name_of(group);
        if group_name.is_empty() || !seen.insert(group_name.clone()) {
            continue;
        }
        technologies.push(scorer.detect(&group_name, GROUP_CONFIDENCE));

        let categories = field(group, "Categories")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for category in categories {
            let category_name = name_of(category);
            if category_name.is_empty() || !seen.insert(category_name.clone()) {
                continue;
            }
            // Sub-categories carry the AI flag but not a lookup category.
            let mut detection = scorer.detect(&category_name, CATEGORY_CONFIDENCE);
            detection.category = OTHER_CATEGORY.to_string();
            technologies.push(detection);
        }
    }

    Ok(technologies)
}
