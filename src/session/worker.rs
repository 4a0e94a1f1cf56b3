//! Session worker — serialized fragment processing with async cleanup.
//!
//! A [`ReconciliationSession`] is not thread-safe; the worker gives it the
//! required single-threaded discipline: commands arrive over a
//! `tokio::sync::mpsc` channel and are processed strictly in arrival order,
//! one at a time, with every resulting operation applied to the owned
//! [`TextSink`].
//!
//! # Epoch-tagged cleanup
//!
//! After a final fragment commits, the committed utterance may be handed to
//! an [`AiCleaner`] on a spawned task.  The task is tagged with the session
//! epoch at submission; when its result comes back, the worker discards it if
//! the epoch has moved on (a reset happened in between).  The race is
//! resolved by design, not by locking:
//!
//! ```text
//! Fragment(final) ──▶ commit locally ──▶ spawn clean(text) @ epoch N
//! Reset           ──▶ epoch = N+1
//! clean done      ──▶ tagged N ≠ N+1 → dropped
//! ```
//!
//! Cleanup runs under `tokio::time::timeout`; a timeout or error simply
//! leaves the locally formatted text in place.  A reset never waits for
//! in-flight cleanup work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::cleaner::AiCleaner;
use crate::session::{ReconciliationSession, TranscriptionFragment};
use crate::sink::{self, TextSink};

// ---------------------------------------------------------------------------
// SessionCommand
// ---------------------------------------------------------------------------

/// Commands accepted by a [`SessionWorker`], processed FIFO.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Reconcile one fragment.
    Fragment(TranscriptionFragment),
    /// Clear session state and start a new epoch.
    ///
    /// The sink is left untouched: text already delivered stays wherever it
    /// was typed; the session simply stops tracking it.
    Reset,
}

/// Completion report from a spawned cleanup task.
struct CleanupDone {
    epoch: u64,
    original: String,
    cleaned: String,
}

// ---------------------------------------------------------------------------
// SessionWorker
// ---------------------------------------------------------------------------

/// Owns one session and one sink; drives both from a command channel.
///
/// ```rust,no_run
/// use tokio::sync::mpsc;
/// use transcript_reconcile::config::AppConfig;
/// use transcript_reconcile::session::{SessionCommand, SessionWorker, ReconciliationSession};
/// use transcript_reconcile::sink::BufferSink;
///
/// # async fn example() {
/// let session = ReconciliationSession::new(AppConfig::default());
/// let worker = SessionWorker::new(session, BufferSink::new());
/// let (tx, rx) = mpsc::channel::<SessionCommand>(64);
/// let handle = tokio::spawn(worker.run(rx));
/// // … feed tx from the speech-engine adapter …
/// # drop(tx);
/// # let _ = handle.await;
/// # }
/// ```
pub struct SessionWorker<S: TextSink> {
    session: ReconciliationSession,
    sink: S,
    cleaner: Option<Arc<dyn AiCleaner>>,
    cleanup_timeout: Duration,
}

impl<S: TextSink> SessionWorker<S> {
    /// Create a worker with no AI cleanup.
    pub fn new(session: ReconciliationSession, sink: S) -> Self {
        Self {
            session,
            sink,
            cleaner: None,
            cleanup_timeout: Duration::from_secs(5),
        }
    }

    /// Enable AI cleanup of committed utterances, bounded by `timeout`.
    pub fn with_cleaner(mut self, cleaner: Arc<dyn AiCleaner>, timeout: Duration) -> Self {
        self.cleaner = Some(cleaner);
        self.cleanup_timeout = timeout;
        self
    }

    /// The owned sink (primarily for inspection after [`run`](Self::run)).
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The owned session.
    pub fn session(&self) -> &ReconciliationSession {
        &self.session
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Process commands until the channel closes, then drain outstanding
    /// cleanup completions and return the worker for inspection.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionCommand>) -> Self {
        let (done_tx, mut done_rx) = mpsc::channel::<CleanupDone>(8);

        loop {
            tokio::select! {
                // Command processing has priority over cleanup completions so
                // a Reset queued before a completion is observed before it.
                biased;

                cmd = rx.recv() => match cmd {
                    Some(SessionCommand::Fragment(frag)) => {
                        self.handle_fragment(frag, &done_tx);
                    }
                    Some(SessionCommand::Reset) => {
                        self.session.reset();
                    }
                    None => break,
                },
                Some(done) = done_rx.recv() => self.handle_cleanup_done(done),
            }
        }

        log::info!("worker: command channel closed, shutting down");

        // Outstanding cleanup tasks hold clones of done_tx; once they finish
        // (bounded by the cleanup timeout) the channel closes and the drain
        // ends.  Stale results are still dropped by the epoch check.
        drop(done_tx);
        while let Some(done) = done_rx.recv().await {
            self.handle_cleanup_done(done);
        }

        self
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn handle_fragment(&mut self, frag: TranscriptionFragment, done_tx: &mpsc::Sender<CleanupDone>) {
        let is_final = frag.is_final;
        let ops = self.session.handle_fragment(&frag);
        if ops.is_empty() {
            return;
        }
        sink::apply_all(&mut self.sink, &ops);

        if is_final {
            self.spawn_cleanup(done_tx);
        }
    }

    /// Submit the just-committed utterance for AI cleanup, tagged with the
    /// current epoch.
    fn spawn_cleanup(&self, done_tx: &mpsc::Sender<CleanupDone>) {
        let Some(cleaner) = &self.cleaner else {
            return;
        };
        let Some(original) = self.session.last_committed() else {
            return;
        };

        let original = original.to_owned();
        let epoch = self.session.epoch();
        let cleaner = Arc::clone(cleaner);
        let timeout = self.cleanup_timeout;
        let tx = done_tx.clone();

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, cleaner.clean(&original)).await {
                Ok(Ok(cleaned)) => {
                    let _ = tx
                        .send(CleanupDone {
                            epoch,
                            original,
                            cleaned,
                        })
                        .await;
                }
                Ok(Err(e)) => log::warn!("worker: cleanup failed, keeping local text: {e}"),
                Err(_) => log::warn!("worker: cleanup timed out, keeping local text"),
            }
        });
    }

    fn handle_cleanup_done(&mut self, done: CleanupDone) {
        if done.epoch != self.session.epoch() {
            log::debug!(
                "worker: dropping stale cleanup (epoch {} != {})",
                done.epoch,
                self.session.epoch()
            );
            return;
        }
        let ops = self.session.apply_cleanup(&done.original, &done.cleaned);
        sink::apply_all(&mut self.sink, &ops);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::CleanError;
    use crate::config::AppConfig;
    use crate::sink::BufferSink;
    use async_trait::async_trait;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Cleans by appending a period after a short delay.
    ///
    /// The delay guarantees that commands already queued (e.g. a Reset) are
    /// processed before the completion lands.
    struct SlowPunctuator {
        delay: Duration,
    }

    #[async_trait]
    impl AiCleaner for SlowPunctuator {
        async fn clean(&self, text: &str) -> Result<String, CleanError> {
            tokio::time::sleep(self.delay).await;
            Ok(format!("{text}."))
        }
    }

    /// Always fails.
    struct BrokenCleaner;

    #[async_trait]
    impl AiCleaner for BrokenCleaner {
        async fn clean(&self, _text: &str) -> Result<String, CleanError> {
            Err(CleanError::Request("connection refused".into()))
        }
    }

    /// Never completes within any reasonable timeout.
    struct StalledCleaner;

    #[async_trait]
    impl AiCleaner for StalledCleaner {
        async fn clean(&self, text: &str) -> Result<String, CleanError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(text.to_owned())
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn worker() -> SessionWorker<BufferSink> {
        SessionWorker::new(
            ReconciliationSession::new(AppConfig::default()),
            BufferSink::new(),
        )
    }

    async fn run_commands(
        worker: SessionWorker<BufferSink>,
        commands: Vec<SessionCommand>,
    ) -> SessionWorker<BufferSink> {
        let (tx, rx) = mpsc::channel(commands.len().max(1));
        for cmd in commands {
            tx.send(cmd).await.unwrap();
        }
        drop(tx);
        worker.run(rx).await
    }

    fn interim(text: &str, seq: u64) -> SessionCommand {
        SessionCommand::Fragment(TranscriptionFragment::interim(text, seq))
    }

    fn finalized(text: &str, seq: u64) -> SessionCommand {
        SessionCommand::Fragment(TranscriptionFragment::finalized(text, seq))
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fragments_are_processed_in_arrival_order() {
        let w = run_commands(
            worker(),
            vec![
                interim("he", 0),
                interim("hell", 1),
                interim("hello", 2),
                finalized("hello world", 3),
            ],
        )
        .await;

        assert_eq!(w.sink().current_value(), "Hello world ");
        assert_eq!(w.session().finalized_text(), "Hello world ");
    }

    #[tokio::test]
    async fn empty_fragments_produce_nothing() {
        let w = run_commands(worker(), vec![interim("   ", 0), finalized("", 1)]).await;
        assert_eq!(w.sink().current_value(), "");
    }

    #[tokio::test]
    async fn reset_clears_session_but_not_sink() {
        let w = run_commands(
            worker(),
            vec![finalized("hello", 0), SessionCommand::Reset],
        )
        .await;

        assert_eq!(w.session().finalized_text(), "");
        assert_eq!(w.session().epoch(), 1);
        // Delivered text stays in the target.
        assert_eq!(w.sink().current_value(), "Hello ");
    }

    #[tokio::test]
    async fn cleanup_result_is_applied_when_epoch_matches() {
        let cleaner = Arc::new(SlowPunctuator {
            delay: Duration::from_millis(10),
        });
        let w = worker().with_cleaner(cleaner, Duration::from_secs(1));

        let w = run_commands(w, vec![finalized("hello world", 0)]).await;

        assert_eq!(w.session().finalized_text(), "Hello world. ");
        assert_eq!(w.sink().current_value(), "Hello world. ");
    }

    #[tokio::test]
    async fn stale_cleanup_after_reset_is_discarded() {
        let cleaner = Arc::new(SlowPunctuator {
            delay: Duration::from_millis(50),
        });
        let w = worker().with_cleaner(cleaner, Duration::from_secs(1));

        // The Reset is queued behind the final fragment and processed long
        // before the 50 ms cleanup completes.
        let w = run_commands(
            w,
            vec![finalized("hello world", 0), SessionCommand::Reset],
        )
        .await;

        // The stale completion must not resurrect text into the new epoch.
        assert_eq!(w.session().finalized_text(), "");
        assert_eq!(w.session().epoch(), 1);
        assert_eq!(w.sink().current_value(), "Hello world ");
    }

    #[tokio::test]
    async fn cleaner_failure_keeps_local_text() {
        let w = worker().with_cleaner(Arc::new(BrokenCleaner), Duration::from_secs(1));
        let w = run_commands(w, vec![finalized("hello world", 0)]).await;

        assert_eq!(w.session().finalized_text(), "Hello world ");
        assert_eq!(w.sink().current_value(), "Hello world ");
    }

    #[tokio::test]
    async fn cleaner_timeout_keeps_local_text() {
        let w = worker().with_cleaner(Arc::new(StalledCleaner), Duration::from_millis(20));
        let w = run_commands(w, vec![finalized("hello world", 0)]).await;

        assert_eq!(w.session().finalized_text(), "Hello world ");
        assert_eq!(w.sink().current_value(), "Hello world ");
    }

    #[tokio::test]
    async fn dictation_continues_across_cleanups() {
        let cleaner = Arc::new(SlowPunctuator {
            delay: Duration::from_millis(5),
        });
        let w = worker().with_cleaner(cleaner, Duration::from_secs(1));

        let w = run_commands(
            w,
            vec![finalized("first part", 0), finalized("second part", 1)],
        )
        .await;

        let finalized_text = w.session().finalized_text();
        assert!(finalized_text.contains("First part"));
        assert!(finalized_text.contains("second part"));
        // Both utterances got their cleanup period.
        assert_eq!(finalized_text.matches('.').count(), 2);
    }
}
