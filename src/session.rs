use crate::serp::SearchResult;

/// One question/response cycle, immutable once recorded.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub question: String,
    pub response: String,
    pub search_results: Vec<SearchResult>,
}

/// Append-only in-memory chat log. Insertion order is chronological order;
/// the log lives for the duration of the interactive session.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one turn. A turn whose search was disabled must be recorded
    /// with an empty `search_results`.
    pub fn record(
        &mut self,
        question: impl Into<String>,
        response: impl Into<String>,
        search_results: Vec<SearchResult>,
    ) {
        self.turns.push(ChatTurn {
            question: question.into(),
            response: response.into(),
            search_results,
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_call_order() {
        let mut session = ChatSession::new();
        session.record("first", "answer one", vec![]);
        session.record("second", "answer two", vec![]);

        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].question, "first");
        assert_eq!(session.turns()[1].question, "second");
    }

    #[test]
    fn record_increases_len_by_exactly_one() {
        let mut session = ChatSession::new();
        for i in 0..5 {
            assert_eq!(session.len(), i);
            session.record(format!("q{i}"), format!("a{i}"), vec![]);
            assert_eq!(session.len(), i + 1);
        }
    }

    #[test]
    fn new_session_is_empty() {
        let session = ChatSession::new();
        assert!(session.is_empty());
        assert!(session.turns().is_empty());
    }

    #[test]
    fn recorded_results_stay_with_their_turn() {
        let mut session = ChatSession::new();
        session.record("no search", "answer", vec![]);
        session.record(
            "with search",
            "answer",
            vec![SearchResult {
                title: "Title".into(),
                snippet: "Snippet".into(),
                link: "https://example.com".into(),
            }],
        );

        assert!(session.turns()[0].search_results.is_empty());
        assert_eq!(session.turns()[1].search_results.len(), 1);
    }
}
