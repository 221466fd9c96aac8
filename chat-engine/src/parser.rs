//! Response parsing. Pure functions over raw assistant text.
//!
//! The reasoning block is always discarded first, whatever it contains. The
//! remaining text either carries `<PRODUCT>` markers (structured reply) or
//! not (plain reply); the outcome is an explicit variant, never an error.

use botify_core::ProductPayload;
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on structured entries surfaced from a single reply. Extra
/// markers are truncated, never an error.
pub const MAX_PRODUCTS: usize = 3;

static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid reasoning-block pattern"));

static PRODUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<PRODUCT>\s*-\s*(.*?)\s*-\s*(.*?)(?:\r?\n|$)").expect("valid product pattern")
});

/// Result of parsing one assistant reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// No structured entries; the cleaned text is the reply.
    Plain(String),
    /// One or more structured entries. `text` is the full cleaned reply,
    /// persisted verbatim for history even though only `products` goes out
    /// on the channel.
    Products {
        text: String,
        products: Vec<ProductPayload>,
    },
}

impl ParsedReply {
    /// The text persisted as the assistant message for this reply.
    pub fn stored_text(&self) -> &str {
        match self {
            ParsedReply::Plain(text) => text,
            ParsedReply::Products { text, .. } => text,
        }
    }
}

/// Removes every `<think>…</think>` block (multi-line included) and trims.
pub fn strip_reasoning(raw: &str) -> String {
    THINK_RE.replace_all(raw, "").trim().to_string()
}

/// Extracts up to [`MAX_PRODUCTS`] `(name, description)` pairs from cleaned
/// text, trimming both fields.
pub fn extract_products(text: &str) -> Vec<ProductPayload> {
    PRODUCT_RE
        .captures_iter(text)
        .take(MAX_PRODUCTS)
        .map(|caps| ProductPayload {
            name: caps[1].trim().to_string(),
            description: caps[2].trim().to_string(),
        })
        .collect()
}

/// Full parse: strip the reasoning block, then classify the reply.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let text = strip_reasoning(raw);
    let products = extract_products(&text);
    if products.is_empty() {
        ParsedReply::Plain(text)
    } else {
        ParsedReply::Products { text, products }
    }
}
