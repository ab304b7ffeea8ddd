//! Generation results and outbound message chunking.

use serde::{Deserialize, Serialize};

/// Outcome of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The response was generated successfully.
    Success,
    /// An error occurred during generation.
    Error,
    /// The response was flagged by the moderation system.
    ModerationFlagged,
}

/// Container for one generation result.
///
/// Provider failures never carry the underlying error across this boundary;
/// callers see a uniform `Error` status with no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseResult {
    /// The outcome status.
    pub status: ResponseStatus,
    /// The generated text, or `None` if generation failed.
    pub text: Option<String>,
}

impl ResponseResult {
    /// A successful result carrying the generated text.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            text: Some(text.into()),
        }
    }

    /// A failed result with no text.
    #[must_use]
    pub fn error() -> Self {
        Self {
            status: ResponseStatus::Error,
            text: None,
        }
    }
}

/// Split a long message into ordered chunks of at most `max_chars`
/// characters each.
///
/// Chunking counts Unicode scalar values, so a chunk never splits a
/// character. Concatenating the chunks reproduces the input exactly. An
/// empty input yields no chunks.
#[must_use]
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "max_chars must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
