//! Job postings from the SerpApi Google Jobs engine.

use serde::Deserialize;

use super::FetchError;
use crate::signals::JobPosting;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

#[derive(Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs_results: Vec<JobResult>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct JobResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    detected_extensions: Option<DetectedExtensions>,
    share_link: Option<String>,
}

#[derive(Deserialize)]
struct DetectedExtensions {
    posted_at: Option<String>,
}

pub fn fetch_postings(
    client: &reqwest::blocking::Client,
    api_key: &str,
    company_name: &str,
) -> Result<Vec<JobPosting>, FetchError> {
    let query = format!("{company_name} jobs");
    let response = client
        .get(SERPAPI_URL)
        .query(&[
            ("engine", "google_jobs"),
            ("q", query.as_str()),
            ("api_key", api_key),
        ])
        .send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let postings = parse_postings(response.json()?)?;
    tracing::info!(company = company_name, count = postings.len(), "fetched job postings");
    Ok(postings)
}

fn parse_postings(body: JobsResponse) -> Result<Vec<JobPosting>, FetchError> {
    if let Some(error) = body.error {
        // SerpApi reports an empty search as an error
        if error.contains("hasn't returned any results") {
            return Ok(Vec::new());
        }
        return Err(FetchError::Provider(error));
    }

    Ok(body
        .jobs_results
        .into_iter()
        .map(|job| JobPosting {
            title: job.title,
            company: job.company_name,
            location: job.location,
            description: job.description,
            posted_at: job.detected_extensions.and_then(|d| d.posted_at),
            url: job.share_link,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postings() {
        let body: JobsResponse = serde_json::from_str(
            r#"{
                "jobs_results": [
                    {
                        "title": "Data Scientist",
                        "company_name": "Deere & Company",
                        "location": "Moline, IL",
                        "description": "Build machine learning models.",
                        "detected_extensions": {"posted_at": "3 days ago"},
                        "share_link": "https://example.com/job/1"
                    },
                    {"title": "Welder"}
                ]
            }"#,
        )
        .unwrap();

        let postings = parse_postings(body).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].company, "Deere & Company");
        assert_eq!(postings[0].posted_at.as_deref(), Some("3 days ago"));
        assert_eq!(postings[1].title, "Welder");
        assert!(postings[1].description.is_empty());
        assert!(postings[1].url.is_none());
    }

    #[test]
    fn test_parse_postings_errors() {
        let empty: JobsResponse = serde_json::from_str(
            r#"{"error": "Google hasn't returned any results for this query."}"#,
        )
        .unwrap();
        assert!(parse_postings(empty).unwrap().is_empty());

        let bad: JobsResponse = serde_json::from_str(r#"{"error": "Invalid API key."}"#).unwrap();
        assert!(matches!(parse_postings(bad), Err(FetchError::Provider(_))));
    }
}
