//! Language classification: the Thanglish co-occurrence test plus
//! detector-backed classification of everything else.

use crate::translate::{DetectError, Detector};

/// Language category of a submitted question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    English,
    /// Detected ISO code, e.g. "ta" or "fr".
    NonEnglish(String),
    /// Tamil script and ASCII letters in the same text ("Thanglish").
    Mixed,
}

/// Thanglish test: at least one character in the Tamil Unicode block
/// (U+0B80–U+0BFF) and at least one ASCII letter. A co-occurrence check,
/// not a language model.
pub fn is_thanglish(text: &str) -> bool {
    let has_tamil = text.chars().any(is_tamil);
    let has_ascii_letter = text.chars().any(|c| c.is_ascii_alphabetic());
    has_tamil && has_ascii_letter
}

fn is_tamil(c: char) -> bool {
    matches!(c, '\u{0B80}'..='\u{0BFF}')
}

/// Classifies `text`. Mixed is decided locally; everything else asks the
/// detection collaborator. Blank input fails instead of silently defaulting.
pub async fn classify(
    detector: &impl Detector,
    text: &str,
) -> Result<Classification, DetectError> {
    if text.trim().is_empty() {
        return Err(DetectError::EmptyInput);
    }

    if is_thanglish(text) {
        return Ok(Classification::Mixed);
    }

    let code = detector.detect(text).await?;
    if code == "en" {
        Ok(Classification::English)
    } else {
        Ok(Classification::NonEnglish(code))
    }
}
