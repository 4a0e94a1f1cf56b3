//! Stutter and loop-artifact detection on finalized text.
//!
//! Recognizers occasionally emit the same phrase twice, loop a sentence, or
//! stutter a word ("go go go to the store").  Before an utterance commits,
//! the session runs [`has_repeated_phrases`] over the visible content; on a
//! hit it swaps in a repaired full replacement built by
//! [`clean_repeated_text`] (or the gentler [`repair_repetition`]).
//!
//! Hard invariant: cleanup never turns non-empty input into empty output —
//! when aggressive deduplication would remove everything, the first original
//! sentence survives.  Losing cleanliness is acceptable, losing the user's
//! words is not.

use crate::config::RepetitionConfig;
use crate::similarity::similarity;

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Returns `true` when `text` shows any repetition artifact:
///
/// a. its two character-midpoint halves are near-identical;
/// b. two adjacent sentences (each longer than `min_sentence_chars`) are
///    near-identical;
/// c. two non-overlapping word windows of length `phrase_len_min` ..
///    `min(phrase_len_max, word_count / 2)` are near-identical;
/// d. a word of at least `min_word_chars` characters repeats
///    `word_repeat_count`+ times consecutively (case-insensitive).
pub fn has_repeated_phrases(text: &str, cfg: &RepetitionConfig) -> bool {
    if has_half_split_repeat(text, cfg) {
        log::debug!("repetition: half-split repeat detected");
        return true;
    }
    if has_adjacent_sentence_repeat(text, cfg) {
        log::debug!("repetition: adjacent-sentence repeat detected");
        return true;
    }
    if has_phrase_window_repeat(text, cfg) {
        log::debug!("repetition: repeated phrase window detected");
        return true;
    }
    if has_word_stutter(text, cfg) {
        log::debug!("repetition: consecutive word stutter detected");
        return true;
    }
    false
}

fn has_half_split_repeat(text: &str, cfg: &RepetitionConfig) -> bool {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return false;
    }
    let mid = chars.len() / 2;
    let first: String = chars[..mid].iter().collect();
    let second: String = chars[mid..].iter().collect();
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() {
        return false;
    }
    similarity(first, second) > cfg.half_split_threshold
}

fn has_adjacent_sentence_repeat(text: &str, cfg: &RepetitionConfig) -> bool {
    let sentences = split_sentences(text);
    sentences.windows(2).any(|pair| {
        pair[0].chars().count() > cfg.min_sentence_chars
            && pair[1].chars().count() > cfg.min_sentence_chars
            && similarity(pair[0], pair[1]) > cfg.sentence_pair_threshold
    })
}

fn has_phrase_window_repeat(text: &str, cfg: &RepetitionConfig) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    let max_len = cfg.phrase_len_max.min(words.len() / 2);

    for len in cfg.phrase_len_min..=max_len {
        for i in 0..=words.len().saturating_sub(len) {
            let a = words[i..i + len].join(" ");
            // Only windows that do not overlap window `i`.
            for j in (i + len)..=words.len().saturating_sub(len) {
                let b = words[j..j + len].join(" ");
                if similarity(&a, &b) > cfg.phrase_window_threshold {
                    return true;
                }
            }
        }
    }
    false
}

fn has_word_stutter(text: &str, cfg: &RepetitionConfig) -> bool {
    let mut run = 1usize;
    let mut prev: Option<String> = None;

    for word in text.split_whitespace() {
        let lowered = word.to_lowercase();
        if lowered.chars().count() < cfg.min_word_chars {
            prev = None;
            run = 1;
            continue;
        }
        if prev.as_deref() == Some(lowered.as_str()) {
            run += 1;
            if run >= cfg.word_repeat_count {
                return true;
            }
        } else {
            run = 1;
        }
        prev = Some(lowered);
    }
    false
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// Aggressively deduplicate `text`.
///
/// Sentences are kept greedily: a sentence survives only when its similarity
/// to every already-kept sentence stays at or below `sentence_keep_threshold`.
/// Within each kept sentence, consecutive near-duplicate words collapse to a
/// single occurrence.  If everything would be removed, the first original
/// sentence is returned instead — non-empty input never yields empty output.
pub fn clean_repeated_text(text: &str, cfg: &RepetitionConfig) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return text.to_owned();
    }

    let mut kept: Vec<&str> = Vec::new();
    for s in &sentences {
        if kept
            .iter()
            .all(|k| similarity(k, s) <= cfg.sentence_keep_threshold)
        {
            kept.push(s);
        }
    }

    let cleaned: Vec<String> = kept
        .iter()
        .map(|s| collapse_consecutive_words(s, cfg))
        .filter(|s| !s.is_empty())
        .collect();

    if cleaned.is_empty() {
        return format!("{}.", sentences[0]);
    }

    let mut out = cleaned.join(". ");
    out.push('.');
    out
}

/// Gentle repair for a problematic repetition pattern.
///
/// Prefers returning the first sentence longer than `min_sentence_chars`
/// verbatim (with a trailing period) over running the aggressive cleaner —
/// the first sentence is almost always the intended speech, and dropping the
/// looped tail loses less meaning than rewriting everything.
pub fn repair_repetition(text: &str, cfg: &RepetitionConfig) -> String {
    for s in split_sentences(text) {
        if s.chars().count() > cfg.min_sentence_chars {
            return format!("{s}.");
        }
    }
    clean_repeated_text(text, cfg)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `.`-terminated sentences, trimmed, empties dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapse runs of consecutive near-duplicate words to one occurrence.
fn collapse_consecutive_words(sentence: &str, cfg: &RepetitionConfig) -> String {
    let mut out: Vec<&str> = Vec::new();
    for word in sentence.split_whitespace() {
        let duplicate = out.last().is_some_and(|last| {
            similarity(&last.to_lowercase(), &word.to_lowercase()) > cfg.word_collapse_threshold
        });
        if !duplicate {
            out.push(word);
        }
    }
    out.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
