//! AI content generation: quizzes, discovery cards, discovery details and
//! course layouts.
//!
//! Every generator follows the same pipeline: build a prompt embedding the
//! target schema → call the LLM → extract the first JSON object → parse into a
//! lenient raw shape → backfill and validate. Any failure along the way is
//! logged and replaced with a hand-authored fallback payload; callers always
//! get content.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json_object, LlmBackend, LlmError};

pub mod course_layout;
pub mod discovery;
pub mod fallback;
pub mod handlers;
pub mod prompts;
pub mod quiz;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("no JSON object in model output")]
    NoJsonObject,

    #[error("model output is not valid JSON for this payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model output had no usable {0}")]
    Empty(&'static str),
}

/// A generated payload and whether it came from the fallback content.
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub payload: T,
    pub fallback: bool,
}

/// Runs the generation pipeline, degrading to `fallback()` on any failure.
///
/// `R` is the lenient shape the model output is parsed into; `finish` turns it
/// into the final payload and rejects output with nothing usable.
pub async fn generate_or_fallback<R, T, F, B>(
    llm: &dyn LlmBackend,
    kind: &'static str,
    prompt: &str,
    finish: F,
    fallback: B,
) -> Generated<T>
where
    R: DeserializeOwned,
    F: FnOnce(R) -> Result<T, GenerationError>,
    B: FnOnce() -> T,
{
    match try_generate(llm, prompt, finish).await {
        Ok(payload) => {
            info!(kind, "AI generation succeeded");
            Generated {
                payload,
                fallback: false,
            }
        }
        Err(e) => {
            warn!(kind, error = %e, "AI generation failed, serving fallback content");
            Generated {
                payload: fallback(),
                fallback: true,
            }
        }
    }
}

async fn try_generate<R, T, F>(llm: &dyn LlmBackend, prompt: &str, finish: F) -> Result<T, GenerationError>
where
    R: DeserializeOwned,
    F: FnOnce(R) -> Result<T, GenerationError>,
{
    let text = llm.complete(prompt, JSON_ONLY_SYSTEM).await?;
    let json = extract_json_object(&text).ok_or(GenerationError::NoJsonObject)?;
    let raw: R = serde_json::from_str(json)?;
    finish(raw)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Points awarded for a question of this difficulty when the model omits them.
    pub fn default_points(self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 15,
        }
    }

    /// Accepts model spellings such as "Easy", "intermediate" or "difficult".
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "easy" | "beginner" | "simple" => Some(Difficulty::Easy),
            "medium" | "moderate" | "intermediate" => Some(Difficulty::Medium),
            "hard" | "difficult" | "advanced" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Trims `value` and returns it when non-empty.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::llm_client::{LlmBackend, LlmError};

    /// Returns a fixed reply, or an API error when constructed with `failing()`.
    pub struct ScriptedLlm {
        reply: Option<String>,
        pub calls: AtomicUsize,
    }

    impl ScriptedLlm {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedLlm {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(LlmError::Api {
                status: 503,
                message: "upstream unavailable".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedLlm;
    use super::*;

    #[derive(Deserialize)]
    struct RawGreeting {
        greeting: Option<String>,
    }

    fn finish(raw: RawGreeting) -> Result<String, GenerationError> {
        non_blank(raw.greeting).ok_or(GenerationError::Empty("greeting"))
    }

    #[tokio::test]
    async fn success_is_not_marked_fallback() {
        let llm = ScriptedLlm::replying("Sure! {\"greeting\": \"hello\"}");
        let out = generate_or_fallback(&llm, "greeting", "p", finish, || "canned".to_string()).await;
        assert!(!out.fallback);
        assert_eq!(out.payload, "hello");
    }

    #[tokio::test]
    async fn upstream_error_serves_fallback() {
        let llm = ScriptedLlm::failing();
        let out = generate_or_fallback(&llm, "greeting", "p", finish, || "canned".to_string()).await;
        assert!(out.fallback);
        assert_eq!(out.payload, "canned");
    }

    #[tokio::test]
    async fn unusable_output_serves_fallback() {
        for reply in ["no json here", "{\"greeting\": 42}", "{\"greeting\": \"  \"}"] {
            let llm = ScriptedLlm::replying(reply);
            let out =
                generate_or_fallback(&llm, "greeting", "p", finish, || "canned".to_string()).await;
            assert!(out.fallback, "reply {reply:?} should fall back");
        }
    }

    #[test]
    fn difficulty_parsing_is_lenient() {
        assert_eq!(Difficulty::parse_lenient(" Intermediate "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse_lenient("DIFFICULT"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse_lenient("spicy"), None);
        assert_eq!(Difficulty::Hard.default_points(), 15);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
