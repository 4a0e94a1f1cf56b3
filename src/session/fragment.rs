//! Transcription fragments as delivered by a speech engine.

/// One hypothesis emitted by the speech engine.
///
/// Interim fragments are unstable — the recognizer may shrink, grow or
/// completely rewrite them between calls.  Exactly one final fragment closes
/// each utterance.  Fragments are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionFragment {
    /// UTF-8 text of the hypothesis.
    pub text: String,
    /// `true` for the recognizer's committed output of a completed utterance.
    pub is_final: bool,
    /// Monotonic arrival counter assigned by the engine adapter.
    pub sequence: u64,
}

impl TranscriptionFragment {
    /// An unstable streaming hypothesis.
    pub fn interim(text: impl Into<String>, sequence: u64) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            sequence,
        }
    }

    /// The committed output for a completed utterance.
    pub fn finalized(text: impl Into<String>, sequence: u64) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_finality() {
        assert!(!TranscriptionFragment::interim("he", 0).is_final);
        assert!(TranscriptionFragment::finalized("hello", 1).is_final);
    }
}
