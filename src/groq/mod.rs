//! Chat completions via the Groq OpenAI-compatible endpoint.

mod client;
mod types;

pub use client::{CompletionClient, GenerationConfig, GroqClient, GroqError};
