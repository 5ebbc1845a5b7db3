use tracing::warn;

use super::client::SerpError;
use super::types::{RawOrganicResult, SearchResponse, SearchResult};

/// Validates a search response into typed results. An absent
/// `organic_results` key means no results; an entry missing a required
/// field fails the whole extraction.
pub(super) fn extract_organic_results(
    response: SearchResponse,
) -> Result<Vec<SearchResult>, SerpError> {
    let Some(raw) = response.organic_results else {
        if let Some(message) = &response.error {
            warn!(%message, "search API returned no organic results");
        }
        return Ok(Vec::new());
    };

    raw.into_iter().map(validate).collect()
}

fn validate(raw: RawOrganicResult) -> Result<SearchResult, SerpError> {
    Ok(SearchResult {
        title: raw.title.ok_or(SerpError::MissingField("title"))?,
        snippet: raw.snippet.ok_or(SerpError::MissingField("snippet"))?,
        link: raw.link.ok_or(SerpError::MissingField("link"))?,
    })
}
