//! Tuning settings, defaults and TOML persistence.
//!
//! Every heuristic constant in the reconciliation core (similarity cutoffs,
//! history depth, phrase-window sizes) lives here as a named, overridable
//! field rather than a literal buried in algorithm code.  All structs
//! implement `Serialize`, `Deserialize`, `Default` and `Clone` so they can be
//! round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// OverlapConfig
// ---------------------------------------------------------------------------

/// Settings for interim-fragment overlap resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapConfig {
    /// Number of recently cleaned fragments kept for overlap comparison.
    /// Oldest entries are evicted FIFO once this depth is exceeded.
    pub history_size: usize,
    /// Smallest suffix/prefix overlap window (in characters) worth stripping.
    pub min_window: usize,
    /// Similarity above which a new interim fragment is treated as a
    /// duplicate of a recent one and dropped entirely.
    pub duplicate_threshold: f64,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            min_window: 3,
            duplicate_threshold: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// RepetitionConfig
// ---------------------------------------------------------------------------

/// Settings for stutter/loop detection and repair on finalized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionConfig {
    /// Similarity above which the two halves of a text (split at the
    /// character midpoint) count as a repetition.
    pub half_split_threshold: f64,
    /// Similarity above which two adjacent sentences count as a repetition.
    pub sentence_pair_threshold: f64,
    /// Similarity above which two non-overlapping word windows count as a
    /// repeated phrase.
    pub phrase_window_threshold: f64,
    /// During cleanup, a sentence is kept only if its similarity to every
    /// already-kept sentence stays at or below this value.
    pub sentence_keep_threshold: f64,
    /// During cleanup, consecutive words above this similarity collapse to a
    /// single occurrence.
    pub word_collapse_threshold: f64,
    /// Sentences at or below this many characters are ignored by the
    /// adjacent-sentence check (too short to compare meaningfully).
    pub min_sentence_chars: usize,
    /// Smallest phrase window (in words) scanned for repeats.
    pub phrase_len_min: usize,
    /// Largest phrase window (in words) scanned for repeats.
    pub phrase_len_max: usize,
    /// How many consecutive occurrences of one word count as a stutter.
    pub word_repeat_count: usize,
    /// Minimum word length (in characters) participating in the
    /// consecutive-repeat check; shorter words ("a", "I") are exempt.
    pub min_word_chars: usize,
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        Self {
            half_split_threshold: 0.8,
            sentence_pair_threshold: 0.8,
            phrase_window_threshold: 0.9,
            sentence_keep_threshold: 0.7,
            word_collapse_threshold: 0.9,
            min_sentence_chars: 10,
            phrase_len_min: 3,
            phrase_len_max: 6,
            word_repeat_count: 3,
            min_word_chars: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// CleanerConfig
// ---------------------------------------------------------------------------

/// Settings for the optional asynchronous AI cleaner.
///
/// Works with any OpenAI-compatible `/v1/chat/completions` endpoint —
/// Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM.  Disabled by
/// default: the core is fully functional without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Whether finalized utterances are sent to the cleaner at all.
    pub enabled: bool,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a cleanup response; past this the locally
    /// formatted text stays on screen unchanged.
    pub timeout_secs: u64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.2,
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use transcript_reconcile::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interim-fragment overlap resolution settings.
    pub overlap: OverlapConfig,
    /// Stutter detection/repair settings.
    pub repetition: RepetitionConfig,
    /// Optional AI cleaner settings.
    pub cleaner: CleanerConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify default values match the documented heuristics.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.overlap.history_size, 5);
        assert_eq!(cfg.overlap.min_window, 3);
        assert!((cfg.overlap.duplicate_threshold - 0.9).abs() < f64::EPSILON);

        assert!((cfg.repetition.half_split_threshold - 0.8).abs() < f64::EPSILON);
        assert!((cfg.repetition.sentence_pair_threshold - 0.8).abs() < f64::EPSILON);
        assert!((cfg.repetition.phrase_window_threshold - 0.9).abs() < f64::EPSILON);
        assert!((cfg.repetition.sentence_keep_threshold - 0.7).abs() < f64::EPSILON);
        assert!((cfg.repetition.word_collapse_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(cfg.repetition.min_sentence_chars, 10);
        assert_eq!(cfg.repetition.phrase_len_min, 3);
        assert_eq!(cfg.repetition.phrase_len_max, 6);
        assert_eq!(cfg.repetition.word_repeat_count, 3);

        assert!(!cfg.cleaner.enabled);
        assert_eq!(cfg.cleaner.base_url, "http://localhost:11434");
        assert!(cfg.cleaner.api_key.is_none());
        assert_eq!(cfg.cleaner.timeout_secs, 5);
    }

    /// Verify that a default `AppConfig` survives a TOML round trip.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.overlap.history_size, loaded.overlap.history_size);
        assert_eq!(original.overlap.min_window, loaded.overlap.min_window);
        assert_eq!(
            original.repetition.phrase_len_max,
            loaded.repetition.phrase_len_max
        );
        assert_eq!(original.cleaner.enabled, loaded.cleaner.enabled);
        assert_eq!(original.cleaner.model, loaded.cleaner.model);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.overlap.history_size, 5);
        assert!(!config.cleaner.enabled);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.overlap.history_size = 8;
        cfg.repetition.phrase_window_threshold = 0.95;
        cfg.cleaner.enabled = true;
        cfg.cleaner.api_key = Some("sk-test".into());
        cfg.cleaner.timeout_secs = 12;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.overlap.history_size, 8);
        assert!((loaded.repetition.phrase_window_threshold - 0.95).abs() < f64::EPSILON);
        assert!(loaded.cleaner.enabled);
        assert_eq!(loaded.cleaner.api_key, Some("sk-test".into()));
        assert_eq!(loaded.cleaner.timeout_secs, 12);
    }
}
