//! Optional asynchronous AI cleanup of finalized utterances.
//!
//! After an utterance commits locally, the session worker may send it to an
//! [`AiCleaner`] for light polishing (punctuation, fillers).  The cleaner is
//! strictly best-effort: it runs under a bounded timeout, its failure falls
//! back to the locally formatted text, and a result arriving after a session
//! reset is discarded by the epoch check in the worker.  Speech is never lost
//! to an external-call failure.

pub mod api;
pub mod fallback;

pub use api::ApiCleaner;
pub use fallback::FallbackCleaner;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CleanError
// ---------------------------------------------------------------------------

/// Errors that can occur during AI cleanup.
#[derive(Debug, Error)]
pub enum CleanError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("cleanup request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse cleanup response: {0}")]
    Parse(String),

    /// The endpoint returned a response with no usable text content.
    #[error("cleaner returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for CleanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CleanError::Timeout
        } else {
            CleanError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AiCleaner trait
// ---------------------------------------------------------------------------

/// Async trait for best-effort text cleanup.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn AiCleaner>`).
#[async_trait]
pub trait AiCleaner: Send + Sync {
    /// Clean `text` and return the polished version.
    async fn clean(&self, text: &str) -> Result<String, CleanError>;
}
