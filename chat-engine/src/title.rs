//! Title generation from accumulated conversation keywords.
//!
//! Opportunistic: runs only while the current title is still a placeholder.
//! Never fails the surrounding turn; every failure path falls back to a
//! deterministic title.

use std::sync::Arc;

use llm_client::{ChatMessage, LlmClient};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::parser::strip_reasoning;
use crate::prompts::TITLE_SYSTEM_PROMPT;

/// Titles considered "not yet generated" (compared case-insensitively).
pub const PLACEHOLDER_TITLES: &[&str] = &["chat session", "untitled", "new chat after timeout"];

/// Default title when a conversation has no keywords to work from.
pub const DEFAULT_TITLE: &str = "Chat Session";

/// Accepted word-count bounds for a generated title. The model is asked for
/// 5-10 words; the looser bound tolerates slight overshoot.
pub const TITLE_WORDS_MIN: usize = 2;
pub const TITLE_WORDS_MAX: usize = 15;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<TITLE>(.*?)</TITLE>").expect("valid title pattern"));

/// Outcome of validating the model's title output. Explicit variants so the
/// fallback path is visible at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleCheck {
    Valid(String),
    /// Tag present but word count outside [TITLE_WORDS_MIN, TITLE_WORDS_MAX].
    OutOfBounds(usize),
    /// No `<TITLE>` tag in the output.
    Missing,
}

/// Pulls the `<TITLE>` tag content out of cleaned model output and validates
/// its word count.
pub fn extract_title(cleaned: &str) -> TitleCheck {
    match TITLE_RE.captures(cleaned) {
        Some(caps) => {
            let title = caps[1].trim().to_string();
            let words = title.split_whitespace().count();
            if (TITLE_WORDS_MIN..=TITLE_WORDS_MAX).contains(&words) {
                TitleCheck::Valid(title)
            } else {
                TitleCheck::OutOfBounds(words)
            }
        }
        None => TitleCheck::Missing,
    }
}

/// True when the stored title is still one of the placeholder values.
pub fn is_placeholder(title: &str) -> bool {
    let lowered = title.trim().to_lowercase();
    PLACEHOLDER_TITLES.contains(&lowered.as_str())
}

/// Generates short human-readable titles from keyword sets.
#[derive(Clone)]
pub struct TitleGenerator {
    llm: Arc<dyn LlmClient>,
}

impl TitleGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Produces a title from the keyword set. Infallible: collaborator errors
    /// and invalid output fall back to the keyword list (or the default when
    /// there are no keywords).
    pub async fn generate(&self, keywords: &[String]) -> String {
        if keywords.is_empty() {
            return DEFAULT_TITLE.to_string();
        }
        let keyword_text = keywords.join(", ");

        let messages = vec![
            ChatMessage::system(TITLE_SYSTEM_PROMPT),
            ChatMessage::user(format!("Keywords: {}", keyword_text)),
        ];

        match self.llm.complete(messages).await {
            Ok(raw) => {
                let cleaned = strip_reasoning(&raw);
                match extract_title(&cleaned) {
                    TitleCheck::Valid(title) => title,
                    TitleCheck::OutOfBounds(words) => {
                        warn!(words, "Generated title word count out of bounds");
                        keyword_text
                    }
                    TitleCheck::Missing => {
                        warn!("No <TITLE> tag in title output");
                        keyword_text
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "Title generation failed");
                format!("{}: {}", DEFAULT_TITLE, keyword_text)
            }
        }
    }
}
