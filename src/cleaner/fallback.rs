//! [`FallbackCleaner`] — wraps any [`AiCleaner`] and returns the input on
//! error.
//!
//! When the underlying call fails for any reason (`Request`, `Timeout`,
//! `Parse`, `EmptyResponse`) the wrapper silently returns the original text
//! instead of propagating the error, which keeps dictation flowing even when
//! the endpoint is down.

use async_trait::async_trait;

use crate::cleaner::{AiCleaner, CleanError};

/// A transparent wrapper around any [`AiCleaner`] that never returns an
/// error — on failure it yields `text` unchanged.
pub struct FallbackCleaner<C: AiCleaner> {
    inner: C,
}

impl<C: AiCleaner> FallbackCleaner<C> {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Return a reference to the wrapped cleaner.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: AiCleaner> AiCleaner for FallbackCleaner<C> {
    /// Attempt cleanup; return `text` unchanged if any error occurs.
    ///
    /// This implementation never returns `Err(_)`.
    async fn clean(&self, text: &str) -> Result<String, CleanError> {
        match self.inner.clean(text).await {
            Ok(cleaned) => Ok(cleaned),
            Err(e) => {
                log::warn!("cleanup failed ({e}) — keeping locally formatted text");
                Ok(text.to_owned())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
