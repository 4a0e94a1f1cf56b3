//! Interactive driver — reconcile a fragment stream typed on stdin.
//!
//! Useful for eyeballing reconciliation behaviour without a speech engine.
//! One command per line:
//!
//! * `~text`  — interim fragment
//! * `text`   — final fragment
//! * `!reset` — reset the session (new epoch)
//!
//! After every fragment the sink's full content is printed, prefixed with
//! the session phase.  With `cleaner.enabled = true` in `settings.toml`,
//! each committed utterance is additionally sent through the AI cleaner
//! (bounded by its configured timeout) before the next prompt.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use transcript_reconcile::cleaner::{AiCleaner, ApiCleaner, FallbackCleaner};
use transcript_reconcile::config::AppConfig;
use transcript_reconcile::session::{ReconciliationSession, TranscriptionFragment};
use transcript_reconcile::shortcuts::ShortcutTable;
use transcript_reconcile::sink::{apply_all, BufferSink, TextSink};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::load()?;
    let shortcuts = ShortcutTable::load_or_default();
    log::info!("loaded {} shortcut(s)", shortcuts.len());

    // FallbackCleaner makes the call infallible; the timeout below bounds it.
    let cleaner: Option<Arc<dyn AiCleaner>> = if config.cleaner.enabled {
        Some(Arc::new(FallbackCleaner::new(ApiCleaner::from_config(
            &config.cleaner,
        ))))
    } else {
        None
    };
    let cleanup_timeout = Duration::from_secs(config.cleaner.timeout_secs);

    let mut session = ReconciliationSession::with_shortcuts(config, shortcuts);
    let mut sink = BufferSink::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sequence = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();

        if line == "!reset" {
            session.reset();
            println!("-- reset (epoch {}) --", session.epoch());
            continue;
        }

        let fragment = match line.strip_prefix('~') {
            Some(rest) => TranscriptionFragment::interim(rest, sequence),
            None => TranscriptionFragment::finalized(line, sequence),
        };
        sequence += 1;

        let is_final = fragment.is_final;
        let ops = session.handle_fragment(&fragment);
        apply_all(&mut sink, &ops);

        // This driver is strictly sequential, so the cleanup can simply be
        // awaited inline; the concurrent embedding goes through
        // `session::SessionWorker` instead.
        if is_final {
            if let (Some(cleaner), Some(original)) =
                (&cleaner, session.last_committed().map(str::to_owned))
            {
                if let Ok(Ok(cleaned)) =
                    tokio::time::timeout(cleanup_timeout, cleaner.clean(&original)).await
                {
                    let ops = session.apply_cleanup(&original, &cleaned);
                    apply_all(&mut sink, &ops);
                }
            }
        }

        println!("[{}] {}", session.phase().label(), sink.current_value());
    }

    Ok(())
}
