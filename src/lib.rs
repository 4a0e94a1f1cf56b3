//! Streaming transcription reconciliation core.
//!
//! Turns the unstable fragment stream of a speech recognizer — interim
//! hypotheses that shrink, grow and rewrite themselves, followed by one
//! final fragment per utterance — into a single coherent, monotonically
//! growing block of text: no duplicated words, no stutter artifacts,
//! consistent capitalization across fragment boundaries.
//!
//! The core is platform-free.  Fragments come in through
//! [`session::ReconciliationSession::handle_fragment`]; ordered
//! [`sink::SinkOperation`]s come out.  Hotkeys, audio capture, recognizer
//! invocation and text injection live outside, behind the narrow
//! [`sink::TextSink`] and [`cleaner::AiCleaner`] seams.

/// Sentence-boundary-aware leading-character casing.
pub mod casing;
/// Optional asynchronous AI cleanup with fallback.
pub mod cleaner;
/// Tuning thresholds, paths and TOML persistence.
pub mod config;
/// Interim-fragment overlap resolution.
pub mod overlap;
/// Stutter/loop detection and repair.
pub mod repetition;
/// The stateful reconciliation orchestrator and its worker.
pub mod session;
/// User-defined shortcut expansions.
pub mod shortcuts;
/// Normalized edit-distance similarity.
pub mod similarity;
/// Sink operations and the text-sink seam.
pub mod sink;
