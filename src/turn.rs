//! One question/response cycle: classify, compose, complete, record.

use tracing::{info, warn};

use crate::compose::compose;
use crate::groq::CompletionClient;
use crate::lang::{self, Classification};
use crate::serp::{SearchProvider, SearchResult, SerpError};
use crate::session::ChatSession;
use crate::translate::{Detector, Translator};

/// What the surface renders after a completed turn.
#[derive(Debug)]
pub struct TurnOutcome {
    pub classification: Classification,
    pub response: String,
    pub search_results: Vec<SearchResult>,
    pub warning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("{0}")]
    Search(#[from] SerpError),
}

/// Runs the sequential pipeline for one submission. A search failure aborts
/// the turn and leaves the session untouched; a completion failure is
/// recorded with the error text as the visible response. Detection failures
/// downgrade to a warning and the text proceeds as English.
pub async fn run_turn(
    detector: &impl Detector,
    translator: &impl Translator,
    search: &impl SearchProvider,
    completion: &impl CompletionClient,
    session: &mut ChatSession,
    question: &str,
    search_enabled: bool,
) -> Result<TurnOutcome, TurnError> {
    if question.trim().is_empty() {
        return Err(TurnError::EmptyQuestion);
    }

    let (classification, detect_warning) = match lang::classify(detector, question).await {
        Ok(classification) => (classification, None),
        Err(e) => {
            warn!(error = %e, "language detection failed, treating input as English");
            (
                Classification::English,
                Some(format!(
                    "Language detection failed ({e}); treating the input as English."
                )),
            )
        }
    };
    info!(?classification, search_enabled, "turn started");

    let composed = compose(translator, search, question, &classification, search_enabled).await?;
    let warning = detect_warning.or(composed.warning);

    let response = match completion.complete(&composed.prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "completion failed, recording error text as response");
            format!("Error: {e}")
        }
    };

    session.record(question, response.clone(), composed.search_results.clone());
    info!(turns = session.len(), "turn recorded");

    Ok(TurnOutcome {
        classification,
        response,
        search_results: composed.search_results,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::groq::GroqError;
    use crate::translate::{DetectError, TranslateError};

    struct MockDetector {
        code: Result<&'static str, ()>,
    }

    impl Detector for MockDetector {
        async fn detect(&self, _text: &str) -> Result<String, DetectError> {
            self.code
                .map(String::from)
                .map_err(|_| DetectError::MissingCode)
        }
    }

    struct MockTranslator(&'static str);

    impl Translator for MockTranslator {
        async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
            Ok(self.0.to_string())
        }
    }

    struct MockSearch {
        result: Result<Vec<SearchResult>, ()>,
    }

    impl SearchProvider for MockSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SerpError> {
            self.result.clone().map_err(|_| SerpError::RateLimited)
        }
    }

    struct MockCompletion {
        result: Result<&'static str, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockCompletion {
        fn replying(text: &'static str) -> Self {
            Self {
                result: Ok(text),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn captured_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionClient for MockCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, GroqError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.result
                .map(String::from)
                .map_err(|_| GroqError::EmptyResponse)
        }
    }

    fn english_detector() -> MockDetector {
        MockDetector { code: Ok("en") }
    }

    #[tokio::test]
    async fn plain_english_question_reaches_completion_unchanged() {
        let completion = MockCompletion::replying("Paris.");
        let mut session = ChatSession::new();

        let outcome = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch { result: Ok(vec![]) },
            &completion,
            &mut session,
            "What is the capital of France?",
            false,
        )
        .await
        .unwrap();

        assert_eq!(
            completion.captured_prompts(),
            vec!["What is the capital of France?"]
        );
        assert_eq!(outcome.response, "Paris.");
        assert_eq!(session.len(), 1);
        assert!(session.turns()[0].search_results.is_empty());
    }

    #[tokio::test]
    async fn completion_failure_is_recorded_as_the_response() {
        let completion = MockCompletion::failing();
        let mut session = ChatSession::new();

        let outcome = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch { result: Ok(vec![]) },
            &completion,
            &mut session,
            "a question",
            false,
        )
        .await
        .unwrap();

        assert!(outcome.response.starts_with("Error:"));
        assert_eq!(session.len(), 1);
        assert_eq!(session.turns()[0].response, outcome.response);
    }

    #[tokio::test]
    async fn search_failure_aborts_and_records_nothing() {
        let completion = MockCompletion::replying("never used");
        let mut session = ChatSession::new();

        let err = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch { result: Err(()) },
            &completion,
            &mut session,
            "a question",
            true,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TurnError::Search(_)));
        assert!(session.is_empty());
        assert!(completion.captured_prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_question_is_rejected_before_any_call() {
        let completion = MockCompletion::replying("never used");
        let mut session = ChatSession::new();

        let err = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch { result: Ok(vec![]) },
            &completion,
            &mut session,
            "   ",
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TurnError::EmptyQuestion));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn detection_failure_warns_and_proceeds_as_english() {
        let completion = MockCompletion::replying("answer");
        let mut session = ChatSession::new();

        let outcome = run_turn(
            &MockDetector { code: Err(()) },
            &MockTranslator("unused"),
            &MockSearch { result: Ok(vec![]) },
            &completion,
            &mut session,
            "hello there",
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome.classification, Classification::English);
        assert!(outcome.warning.is_some());
        assert_eq!(completion.captured_prompts(), vec!["hello there"]);
        assert_eq!(session.len(), 1);
    }

    #[tokio::test]
    async fn mixed_question_records_no_search_results_even_with_search_on() {
        let completion = MockCompletion::replying("semma answer bro");
        let mut session = ChatSession::new();

        let outcome = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch {
                result: Ok(vec![SearchResult {
                    title: "T".into(),
                    snippet: "S".into(),
                    link: "L".into(),
                }]),
            },
            &completion,
            &mut session,
            "வணக்கம், how are you?",
            true,
        )
        .await
        .unwrap();

        assert_eq!(outcome.classification, Classification::Mixed);
        assert!(outcome.search_results.is_empty());
        assert!(session.turns()[0].search_results.is_empty());
        let prompts = completion.captured_prompts();
        assert!(prompts[0].contains("வணக்கம், how are you?"));
    }

    #[tokio::test]
    async fn search_results_are_recorded_with_the_turn() {
        let completion = MockCompletion::replying("answer");
        let mut session = ChatSession::new();

        let outcome = run_turn(
            &english_detector(),
            &MockTranslator("unused"),
            &MockSearch {
                result: Ok(vec![SearchResult {
                    title: "AI news".into(),
                    snippet: "Something happened.".into(),
                    link: "https://news.example".into(),
                }]),
            },
            &completion,
            &mut session,
            "Latest news on AI",
            true,
        )
        .await
        .unwrap();

        assert_eq!(outcome.search_results.len(), 1);
        assert_eq!(session.turns()[0].search_results.len(), 1);
        assert_eq!(session.turns()[0].search_results[0].title, "AI news");
    }
}
