//! Leadership page text from company websites, plus the LinkedIn hook.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};

use super::FetchError;
use crate::parser::extract::page_text;
use crate::signals::PageText;

/// Paths tried in order before falling back to the home page.
pub const LEADERSHIP_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/about_us",
    "/about/corporate",
    "/leadership",
    "/leadership-team",
    "/our-team",
    "/executive-team",
    "/company",
    "/our-company",
    "/who-we-are",
    "/about/leadership",
];

/// Page chrome that never carries leadership content.
const PAGE_SKIP: &[&str] = &["script", "style", "noscript", "nav", "footer", "header"];

/// Every URL to try for `domain`, home page last. Empty when no domain is set.
pub fn candidate_urls(domain: &str) -> Vec<String> {
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        return Vec::new();
    }

    let base = if domain.starts_with("http") {
        domain.trim_end_matches('/').to_string()
    } else {
        format!("https://{domain}")
    };

    LEADERSHIP_PATHS
        .iter()
        .map(|path| format!("{base}{path}"))
        .chain(std::iter::once(base.clone()))
        .collect()
}

/// Visible text of a page, or `None` when it has fewer than `min_chars`
/// characters, the same cut the leadership scorer applies.
pub fn usable_text(html: &str, min_chars: usize) -> Option<String> {
    let text = page_text(html, PAGE_SKIP);
    (text.trim().chars().count() >= min_chars).then_some(text)
}

/// The first candidate page with at least `min_chars` of visible text.
///
/// Individual request failures only move on to the next path; `Ok(None)`
/// means every path was tried.
pub fn fetch_company_website(
    client: &reqwest::blocking::Client,
    domain: &str,
    min_chars: usize,
) -> Result<Option<PageText>, FetchError> {
    let urls = candidate_urls(domain);
    if urls.is_empty() {
        return Err(FetchError::MissingDomain(domain.to_string()));
    }

    let mut last_status = None;
    for url in urls {
        let response = match client
            .get(&url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%url, "leadership page request failed: {e}");
                continue;
            }
        };

        last_status = Some(response.status().as_u16());
        if !response.status().is_success() {
            continue;
        }

        let Ok(body) = response.text() else {
            continue;
        };
        if let Some(text) = usable_text(&body, min_chars) {
            tracing::info!(%url, length = text.len(), "fetched leadership page");
            return Ok(Some(PageText::new(text, Some(url))));
        }
    }

    tracing::info!(domain, ?last_status, "no usable leadership page");
    Ok(None)
}

/// LinkedIn company data. No LinkedIn data API is integrated, so a configured
/// key still yields nothing.
pub fn fetch_linkedin(
    _client: &reqwest::blocking::Client,
    _api_key: &str,
    company_name: &str,
) -> Result<Option<PageText>, FetchError> {
    tracing::debug!(company = company_name, "LinkedIn provider not integrated");
    Ok(None)
}
