//! Fragment extraction from frame payloads.
//!
//! Upstream framing is not contractually guaranteed: a frame may be an
//! OpenAI-style chunk, a flat `{"text": ...}` object, or bare text. JSON is
//! tried first and anything that fails to parse is passed through verbatim.

use serde_json::Value;

use super::frame::Frame;
use super::respace::TokenBoundaries;

/// Candidate delta locations, checked in order. First present non-null wins.
const DELTA_POINTERS: &[&str] = &[
    "/choices/0/delta/content",
    "/choices/0/delta/text",
    "/text",
    "/content",
];

/// Candidates that hold exact model tokens rather than arbitrary text.
const TOKEN_POINTER_COUNT: usize = 2;

/// Where a fragment's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentSource {
    /// `choices[0].delta.*` of an OpenAI-style chunk: an exact model token
    Delta,
    /// Another field of a parsed JSON payload, or the payload itself
    Structured,
    /// The frame text itself (payload was not JSON)
    Plain,
}

impl FragmentSource {
    /// Whether the fragment carries its own word boundaries.
    pub fn boundaries(self) -> TokenBoundaries {
        match self {
            FragmentSource::Delta => TokenBoundaries::Explicit,
            FragmentSource::Structured | FragmentSource::Plain => TokenBoundaries::Inferred,
        }
    }
}

/// Text extracted from a single frame, before spacing correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub source: FragmentSource,
}

impl Fragment {
    /// Create a fragment from plain text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: FragmentSource::Plain,
        }
    }

    /// Create a fragment from a structured payload field.
    pub fn structured(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: FragmentSource::Structured,
        }
    }
}

/// Pick the delta text out of a parsed payload.
///
/// Textual values are used as-is; anything else is serialized back to JSON.
/// A payload with none of the known fields is serialized whole, except a bare
/// JSON string, which yields its content.
pub fn extract_delta(payload: &Value) -> String {
    fragment_from_payload(payload).text
}

/// Turn a parsed payload into a fragment, remembering which field won.
pub fn fragment_from_payload(payload: &Value) -> Fragment {
    let found = DELTA_POINTERS
        .iter()
        .enumerate()
        .filter_map(|(idx, pointer)| payload.pointer(pointer).map(|value| (idx, value)))
        .find(|(_, value)| !value.is_null());

    let (source, value) = match found {
        Some((idx, value)) if idx < TOKEN_POINTER_COUNT => (FragmentSource::Delta, value),
        Some((_, value)) => (FragmentSource::Structured, value),
        None => (FragmentSource::Structured, payload),
    };

    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Fragment { text, source }
}

/// Turn a frame into a fragment, falling back to verbatim text on bad JSON.
pub fn extract_fragment(frame: &Frame) -> Fragment {
    match serde_json::from_str::<Value>(&frame.text) {
        Ok(payload) => fragment_from_payload(&payload),
        Err(e) => {
            tracing::trace!(
                error = %e,
                had_data_prefix = frame.had_data_prefix,
                "frame is not JSON, using raw text"
            );
            Fragment::plain(frame.text.clone())
        }
    }
}
