//! PureSkin analysis engine client.
//!
//! The engine is an external HTTP collaborator performing OCR, ingredient
//! scoring, and similarity search; this module is the only place that
//! talks to it. Everything transport-level — the fixed request timeout,
//! connection failures, upstream status codes — is normalized here into
//! [`EngineError`], so the rest of the gateway never inspects a raw
//! `reqwest` error.

mod client;
pub mod types;

pub use client::EngineClient;

use thiserror::Error;

/// Normalized engine failure taxonomy.
///
/// Identical across every engine operation; callers map these onto HTTP
/// responses without looking at transport detail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not be reached (connection refused, DNS failure).
    #[error("analysis engine unreachable: {0}")]
    Unavailable(String),

    /// The request exceeded the fixed 30-second deadline. The underlying
    /// connection is torn down by the client when this fires; no retry is
    /// attempted.
    #[error("analysis engine timed out")]
    Timeout,

    /// The engine reported temporary overload (429 or 503).
    #[error("analysis engine is busy")]
    Busy,

    /// The engine rejected the request data (other 4xx). The message is
    /// the engine's own `detail` text, passed through verbatim for user
    /// display.
    #[error("{message}")]
    Rejected {
        /// Upstream status code.
        status: u16,
        /// Upstream-provided message.
        message: String,
    },

    /// The engine failed internally (5xx other than 503).
    #[error("analysis engine failure (status {status})")]
    Failed {
        /// Upstream status code.
        status: u16,
    },

    /// The engine answered with a body we could not decode.
    #[error("failed to decode engine response: {0}")]
    Parse(String),

    /// Transport failure other than connect/timeout (e.g., connection
    /// reset mid-body).
    #[error("engine transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Unavailable(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Classify a non-success upstream status into the failure taxonomy.
///
/// `body` is the raw response text; for rejections the engine's `detail`
/// field is extracted from it and surfaced verbatim.
pub(crate) fn classify_status(status: u16, body: &str) -> EngineError {
    match status {
        429 | 503 => EngineError::Busy,
        400..=499 => EngineError::Rejected {
            status,
            message: extract_detail(body)
                .unwrap_or_else(|| "the analysis engine rejected the request".to_owned()),
        },
        _ => EngineError::Failed { status },
    }
}

/// Extract the human-readable `detail` message from an engine error body.
///
/// The engine emits FastAPI-style bodies: either `{"detail": "text"}` or,
/// for validation errors, `{"detail": [{"msg": "...", ...}, ...]}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
