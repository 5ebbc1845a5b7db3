//! Prompt routing: decides whether a question is passed through, translated,
//! answered in the mixed Thanglish register, or augmented with web search
//! results before it reaches the completion API.

use tracing::{debug, warn};

use crate::lang::Classification;
use crate::serp::{SearchProvider, SearchResult, SerpError};
use crate::translate::{TranslateError, Translator};

/// Final prompt for the completion client, plus the search results it embeds
/// and any non-fatal warning raised while composing.
#[derive(Debug)]
pub struct ComposedPrompt {
    pub prompt: String,
    pub search_results: Vec<SearchResult>,
    pub warning: Option<String>,
}

/// Applies the routing policy:
///
/// - Mixed: instruction prompt in the mixed register, search always skipped.
/// - NonEnglish: translate first, then route the translated text.
/// - English (or translated) with search: top-5 results embedded in the
///   augmented template, empty digest included when nothing came back.
/// - English (or translated) without search: the text passes through as-is.
///
/// Translation failure falls back to the original text with a warning;
/// search failure fails the compose.
pub async fn compose(
    translator: &impl Translator,
    search: &impl SearchProvider,
    text: &str,
    classification: &Classification,
    search_enabled: bool,
) -> Result<ComposedPrompt, SerpError> {
    if *classification == Classification::Mixed {
        debug!("mixed-register prompt, search skipped");
        return Ok(ComposedPrompt {
            prompt: mixed_register_prompt(text),
            search_results: Vec::new(),
            warning: None,
        });
    }

    let (text, warning) = match classification {
        Classification::NonEnglish(code) => match translator.translate(text).await {
            Ok(translated) => {
                debug!(from = %code, "question translated to English");
                (translated, None)
            }
            Err(e) => {
                warn!(error = %e, from = %code, "translation failed, using original text");
                (text.to_string(), Some(translation_warning(&e)))
            }
        },
        _ => (text.to_string(), None),
    };

    if !search_enabled {
        return Ok(ComposedPrompt {
            prompt: text,
            search_results: Vec::new(),
            warning,
        });
    }

    let search_results = search.search(&text).await?;
    debug!(results = search_results.len(), "prompt augmented with search");
    Ok(ComposedPrompt {
        prompt: augmented_prompt(&text, &search_results),
        search_results,
        warning,
    })
}

/// The raw text is embedded untranslated so the model sees the register.
fn mixed_register_prompt(text: &str) -> String {
    format!(
        "The user wrote in Thanglish, an informal mix of Tamil and English. \
         Reply in the same mixed register, keeping the casual tone.\n\n\
         User message: {text}"
    )
}

fn augmented_prompt(question: &str, results: &[SearchResult]) -> String {
    format!(
        "Based on the following web search results and your knowledge, \
         please answer the question: '{question}'\n\n\
         Web search results:\n{}\n\nYour response:",
        format_search_results(results)
    )
}

/// Three lines per result, blocks separated by a blank line, collaborator
/// order preserved.
fn format_search_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("Title: {}\nSnippet: {}\nLink: {}\n", r.title, r.snippet, r.link))
        .collect::<Vec<_>>()
        .join("\n")
}

fn translation_warning(e: &TranslateError) -> String {
    format!("Translation failed ({e}); answering from the original text.")
}
