//! Web search via the SerpApi Google engine: typed client, raw response
//! types, and validation of organic results.

mod client;
mod organic;
mod types;

pub use client::{SearchProvider, SerpClient, SerpError};
pub use types::SearchResult;
