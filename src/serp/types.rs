use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub organic_results: Option<Vec<RawOrganicResult>>,
    pub error: Option<String>,
}

/// An organic entry exactly as the API returns it; every field may be absent.
#[derive(Debug, Deserialize)]
pub struct RawOrganicResult {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
}

/// A validated organic search result. All fields are required once an entry
/// passes the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}
