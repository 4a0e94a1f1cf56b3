//! Reconciliation session — the stateful orchestrator.
//!
//! [`ReconciliationSession`] consumes [`TranscriptionFragment`]s and returns
//! ordered [`SinkOperation`]s; it never touches a sink, a callback or any
//! platform surface itself, which keeps it trivially unit-testable.  One
//! session is constructed per active recording and owned by its caller —
//! there is no shared global instance.
//!
//! # State machine
//!
//! ```text
//! Idle ──interim──▶ Streaming ⇄ (interim revisions)
//!      ──final───▶ Committed ──interim──▶ Streaming ──final──▶ Committed …
//! any state ──reset──▶ Idle   (buffers cleared, epoch bumped)
//! ```
//!
//! Between resets, finalized text only ever grows.  Pending text is always
//! exactly what the sink shows beyond the finalized text.

pub mod fragment;
pub mod worker;

pub use fragment::TranscriptionFragment;
pub use worker::{SessionCommand, SessionWorker};

use crate::casing::apply_case;
use crate::config::AppConfig;
use crate::overlap::{remove_overlap, FragmentHistory};
use crate::repetition::{clean_repeated_text, has_repeated_phrases};
use crate::shortcuts::ShortcutTable;
use crate::sink::SinkOperation;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Coarse phase of a session, derived from its buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing emitted since construction or the last reset.
    Idle,
    /// At least one utterance committed; no interim text pending.
    Committed,
    /// Interim text is on screen, subject to replacement.
    Streaming,
}

impl SessionPhase {
    /// A short human-readable label suitable for status display.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Committed => "Committed",
            SessionPhase::Streaming => "Streaming",
        }
    }
}

// ---------------------------------------------------------------------------
// ReconciliationSession
// ---------------------------------------------------------------------------

/// Stateful reconciler for one dictation session.
///
/// ```rust
/// use transcript_reconcile::config::AppConfig;
/// use transcript_reconcile::session::{ReconciliationSession, TranscriptionFragment};
///
/// let mut session = ReconciliationSession::new(AppConfig::default());
/// session.handle_fragment(&TranscriptionFragment::interim("he", 0));
/// session.handle_fragment(&TranscriptionFragment::interim("hello", 1));
/// session.handle_fragment(&TranscriptionFragment::finalized("hello world", 2));
/// assert_eq!(session.finalized_text(), "Hello world ");
/// ```
pub struct ReconciliationSession {
    finalized: String,
    pending: String,
    history: FragmentHistory,
    epoch: u64,
    last_committed: Option<String>,
    config: AppConfig,
    shortcuts: ShortcutTable,
}

impl ReconciliationSession {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create a session with no shortcut expansions.
    pub fn new(config: AppConfig) -> Self {
        Self::with_shortcuts(config, ShortcutTable::default())
    }

    /// Create a session that expands `shortcuts` in every final fragment.
    pub fn with_shortcuts(config: AppConfig, shortcuts: ShortcutTable) -> Self {
        let history = FragmentHistory::new(config.overlap.history_size);
        Self {
            finalized: String::new(),
            pending: String::new(),
            history,
            epoch: 0,
            last_committed: None,
            config,
            shortcuts,
        }
    }

    // -----------------------------------------------------------------------
    // Fragment handling
    // -----------------------------------------------------------------------

    /// Process one fragment and return the sink operations it produces.
    ///
    /// Whitespace-only fragments are ignored: no operations, no state change.
    pub fn handle_fragment(&mut self, fragment: &TranscriptionFragment) -> Vec<SinkOperation> {
        let text = fragment.text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        log::debug!(
            "session: fragment #{} ({}) {:?}",
            fragment.sequence,
            if fragment.is_final { "final" } else { "interim" },
            text
        );

        if fragment.is_final {
            self.handle_final(text)
        } else {
            self.handle_interim(text)
        }
    }

    /// Commit a final fragment.
    fn handle_final(&mut self, text: &str) -> Vec<SinkOperation> {
        let visible = self.visible_text();

        let ops = if has_repeated_phrases(&visible, &self.config.repetition) {
            // The content already on screen loops or stutters: repair it and
            // commit the new fragment in one full overwrite, keeping whatever
            // preceded the problem.
            let repaired = clean_repeated_text(&visible, &self.config.repetition);
            let formatted = self.format_final(text, &repaired);
            let full = if repaired.trim().is_empty() {
                format!("{formatted} ")
            } else {
                format!("{} {formatted} ", repaired.trim_end())
            };
            self.finalized = full.clone();
            self.last_committed = Some(formatted);
            vec![SinkOperation::ResetAndInsert(full)]
        } else {
            let formatted = self.format_final(text, &self.finalized);
            let committed = format!("{formatted} ");
            let op = if self.pending.is_empty() {
                SinkOperation::Insert(committed.clone())
            } else {
                SinkOperation::Replace {
                    old: self.pending.clone(),
                    new: committed.clone(),
                }
            };
            self.finalized.push_str(&committed);
            self.last_committed = Some(formatted);
            vec![op]
        };

        self.pending.clear();
        // Fresh overlap-tracking window for the next utterance.
        self.history.clear();
        ops
    }

    /// Casing + shortcut expansion for a final fragment against `prior` text.
    fn format_final(&self, text: &str, prior: &str) -> String {
        self.shortcuts.expand(&apply_case(text, prior))
    }

    /// Fold an interim revision into the pending text.
    fn handle_interim(&mut self, text: &str) -> Vec<SinkOperation> {
        let delta = remove_overlap(text, &mut self.history, &self.config.overlap);
        if delta.is_empty() {
            return Vec::new();
        }

        if self.pending.is_empty() {
            self.pending = delta.clone();
            vec![SinkOperation::Insert(delta)]
        } else {
            let old = self.pending.clone();
            self.pending.push_str(&delta);
            vec![SinkOperation::Replace {
                old,
                new: self.pending.clone(),
            }]
        }
    }

    // -----------------------------------------------------------------------
    // Async cleanup hook
    // -----------------------------------------------------------------------

    /// Patch an already-committed utterance with its AI-cleaned form.
    ///
    /// Callers must have verified the epoch first (see
    /// [`SessionWorker`](worker::SessionWorker)).  When `original` is no
    /// longer present in the finalized text — a repetition repair may have
    /// rewritten it — the cleanup is dropped rather than misapplied.
    pub fn apply_cleanup(&mut self, original: &str, cleaned: &str) -> Vec<SinkOperation> {
        if original == cleaned {
            return Vec::new();
        }
        match self.finalized.rfind(original) {
            Some(idx) => {
                self.finalized
                    .replace_range(idx..idx + original.len(), cleaned);
                vec![SinkOperation::Replace {
                    old: original.to_owned(),
                    new: cleaned.to_owned(),
                }]
            }
            None => {
                log::debug!("session: cleanup target no longer present, dropping");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Clear all buffers and start a new epoch.
    ///
    /// Always safe to call, immediately observable; in-flight async cleanups
    /// tagged with the old epoch will be discarded on completion.
    pub fn reset(&mut self) {
        self.finalized.clear();
        self.pending.clear();
        self.history.clear();
        self.last_committed = None;
        self.epoch += 1;
        log::debug!("session: reset, epoch {}", self.epoch);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Text permanently committed in this epoch.
    pub fn finalized_text(&self) -> &str {
        &self.finalized
    }

    /// The not-yet-final suffix currently shown by the sink.
    pub fn pending_text(&self) -> &str {
        &self.pending
    }

    /// Everything the sink currently shows: finalized + pending.
    pub fn visible_text(&self) -> String {
        format!("{}{}", self.finalized, self.pending)
    }

    /// The most recently committed (formatted) utterance, if any.
    pub fn last_committed(&self) -> Option<&str> {
        self.last_committed.as_deref()
    }

    /// Generation counter; bumped by every [`reset`](Self::reset).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current phase, derived from the buffers.
    pub fn phase(&self) -> SessionPhase {
        if !self.pending.is_empty() {
            SessionPhase::Streaming
        } else if !self.finalized.is_empty() {
            SessionPhase::Committed
        } else {
            SessionPhase::Idle
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
