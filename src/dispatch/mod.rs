// SPDX-License-Identifier: MIT
//! Request dispatch — turns a context payload into one inference request and
//! resolves it to a scrubbed suggestion string.
//!
//! The dispatcher issues exactly one outbound request per logical trigger and
//! never cancels in flight; staleness is the engine's problem (generation
//! counter). Envelope handling is lenient by design: a strict parse of the
//! structured response shape is attempted first, and on parse failure the raw
//! body is used verbatim rather than surfacing an error.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::context::{split_at_cursor, ContextPayload};

/// What kind of answer is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Inline code completion at the cursor.
    Complete,
    /// Prose description of the current file.
    Describe,
    /// Prose summary of a per-file symbol listing.
    SummarizeProject,
}

/// A resolved dispatch. `Empty` is a distinguished no-op outcome, not an
/// error; callers treat it as "no suggestion".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Text(String),
    Empty,
}

/// Dispatch failure. Malformed envelopes never surface here; they degrade
/// to the raw body instead.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Endpoint unreachable, connection refused, non-success status, or a
    /// failed body read.
    #[error("transport: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transport(e.to_string())
    }
}

/// Transport to the inference endpoint. Takes a finished prompt, returns the
/// raw response body.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DispatchError>;
}

// How much surrounding code goes into a completion prompt. Conservative
// limits keep the payload well within any local model's context window.
const MAX_PREFIX_CHARS: usize = 4000;
const MAX_SUFFIX_CHARS: usize = 2000;

/// Builds mode-specific prompts, sends them through the transport, and scrubs
/// the response. Stateless apart from the transport handle.
pub struct Dispatcher {
    transport: std::sync::Arc<dyn ModelTransport>,
}

impl Dispatcher {
    pub fn new(transport: std::sync::Arc<dyn ModelTransport>) -> Self {
        Self { transport }
    }

    /// Issue one request for the given payload and mode.
    pub async fn dispatch(&self, payload: &ContextPayload, mode: Mode) -> Result<Outcome, DispatchError> {
        let prompt = build_prompt(payload, mode);
        debug!(?mode, prompt_len = prompt.len(), "dispatching inference request");
        let body = self.transport.generate(&prompt).await?;
        let text = scrub(&unwrap_envelope(&body));
        if text.is_empty() {
            debug!(?mode, "dispatch resolved empty");
            Ok(Outcome::Empty)
        } else {
            debug!(?mode, text_len = text.len(), "dispatch resolved");
            Ok(Outcome::Text(text))
        }
    }
}

/// Build the natural-language directive plus serialized context for a mode.
fn build_prompt(payload: &ContextPayload, mode: Mode) -> String {
    match mode {
        Mode::Complete => {
            let (prefix, suffix) = split_at_cursor(payload);
            let prefix = tail_chars(&prefix, MAX_PREFIX_CHARS);
            let suffix = head_chars(&suffix, MAX_SUFFIX_CHARS);
            format!(
                "You are a code completion engine. Continue the code at the cursor, \
                 between the prefix and the suffix. Return ONLY the inserted text — \
                 no markdown fences, no explanation, no numbering.\n\
                 Language: {}\n\n\
                 <fim_prefix>{prefix}<fim_suffix>{suffix}<fim_middle>",
                payload.language_tag
            )
        }
        Mode::Describe => format!(
            "Describe what the following {} file does, in a few short paragraphs \
             of plain prose. No markdown fences.\n\n{}",
            payload.language_tag, payload.text
        ),
        Mode::SummarizeProject => format!(
            "The following is a listing of files in a software project with the \
             symbols each file declares. Summarize what the project does and how \
             it is organized, in plain prose. No markdown fences.\n\n{}",
            payload.text
        ),
    }
}

/// Ollama-style generate envelope. Only the result-text field matters.
#[derive(Deserialize)]
struct GenerateEnvelope {
    response: String,
}

/// Strict parse first, raw-text fallback on any parse failure.
fn unwrap_envelope(body: &str) -> String {
    match serde_json::from_str::<GenerateEnvelope>(body) {
        Ok(envelope) => envelope.response,
        Err(_) => body.to_string(),
    }
}

static ORDINAL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    // A leading enumerated-list marker such as "1. " or "2) " the model
    // sometimes prepends despite instructions. The trailing whitespace is
    // required so numeric literals like "1.5" survive.
    Regex::new(r"^\d+[.)]\s+").unwrap()
});

/// Trim whitespace, a leading list ordinal, and stray code-fence delimiters.
fn scrub(raw: &str) -> String {
    let text = strip_fences(raw.trim());
    let text = ORDINAL_PREFIX.replace(text.trim(), "");
    text.trim().to_string()
}

/// Strip a surrounding markdown code fence, if present. Responses without
/// fences pass through untouched; interior fences are left alone.
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("rust", "python", ...) on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    if let Some(end) = body.rfind("\n```") {
        &body[..end]
    } else {
        body.strip_suffix("```").unwrap_or(body)
    }
}

/// Last `max` characters of `s`, on a char boundary.
fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - max)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &s[start..]
}

/// First `max` characters of `s`, on a char boundary.
fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
