//! Patent search against the Lens.org patent API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::FetchError;
use crate::signals::Patent;

const LENS_URL: &str = "https://api.lens.org/patent/search";

/// Largest page the Lens API returns.
const PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<LensPatent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LensPatent {
    lens_id: Option<String>,
    doc_number: Option<String>,
    date_published: Option<String>,
    biblio: Biblio,
    #[serde(rename = "abstract")]
    abstract_text: Vec<Text>,
    legal_status: LegalStatus,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Biblio {
    invention_title: Vec<Text>,
    application_reference: Option<DateRef>,
    priority_claims: Option<PriorityClaims>,
    parties: Parties,
}

#[derive(Deserialize)]
struct Text {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct DateRef {
    date: Option<String>,
}

#[derive(Deserialize)]
struct PriorityClaims {
    earliest_claim: Option<DateRef>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Parties {
    applicants: Vec<Party>,
    owners_all: Vec<Party>,
    inventors: Vec<Party>,
}

#[derive(Deserialize)]
struct Party {
    extracted_name: Option<Name>,
}

#[derive(Deserialize)]
struct Name {
    value: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LegalStatus {
    grant_date: Option<String>,
}

impl Party {
    fn name(&self) -> Option<&str> {
        self.extracted_name
            .as_ref()
            .and_then(|n| n.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

pub fn fetch_patents(
    client: &reqwest::blocking::Client,
    token: &str,
    company_name: &str,
) -> Result<Vec<Patent>, FetchError> {
    let payload = json!({
        "query": {
            "bool": {
                "should": [
                    {"match": {"applicant.name": company_name}},
                    {"match": {"owner_all.name": company_name}},
                ]
            }
        },
        "size": PAGE_SIZE,
        "include": ["lens_id", "doc_number", "date_published", "biblio", "abstract", "legal_status"],
    });

    let response = client
        .post(LENS_URL)
        .query(&[("token", token)])
        .json(&payload)
        .send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body: SearchResponse = response.json()?;
    let patents: Vec<Patent> = body
        .data
        .into_iter()
        .map(|p| to_patent(p, Utc::now()))
        .collect();

    tracing::info!(company = company_name, count = patents.len(), "fetched patents");
    Ok(patents)
}

/// RFC 3339 timestamps or bare `YYYY-MM-DD` dates (taken as midnight UTC).
fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Filing date prefers the application date, then the earliest priority
/// claim, then the publication date, and finally `now`.
fn to_patent(p: LensPatent, now: DateTime<Utc>) -> Patent {
    let biblio = &p.biblio;

    let filing = biblio
        .application_reference
        .as_ref()
        .and_then(|r| r.date.as_deref())
        .or_else(|| {
            biblio
                .priority_claims
                .as_ref()
                .and_then(|c| c.earliest_claim.as_ref())
                .and_then(|r| r.date.as_deref())
        })
        .or(p.date_published.as_deref());

    let assignee = biblio
        .parties
        .applicants
        .first()
        .and_then(Party::name)
        .or_else(|| biblio.parties.owners_all.first().and_then(Party::name))
        .unwrap_or_default()
        .to_string();

    Patent {
        patent_number: p.doc_number.clone().or(p.lens_id.clone()).unwrap_or_default(),
        title: biblio
            .invention_title
            .first()
            .map(|t| t.text.clone())
            .unwrap_or_default(),
        abstract_text: p
            .abstract_text
            .first()
            .map(|t| t.text.clone())
            .unwrap_or_default(),
        filing_date: parse_date(filing).unwrap_or(now),
        grant_date: parse_date(p.legal_status.grant_date.as_deref()),
        inventors: biblio
            .parties
            .inventors
            .iter()
            .filter_map(Party::name)
            .map(str::to_string)
            .collect(),
        assignee,
    }
}
