//! Interim-fragment overlap resolution.
//!
//! Streaming recognizers re-emit overlapping hypotheses: `"he"`, `"hell"`,
//! `"hello"` are three revisions of one word, and naive concatenation would
//! show `"hehellhello"`.  [`remove_overlap`] compares a new interim fragment
//! against a short [`FragmentHistory`] of recently emitted fragments and
//! returns only the *delta* — the characters not already on screen.  The
//! session appends that delta to its pending text, so the three revisions
//! above reconcile to exactly `"hello"`.
//!
//! The history is a bounded FIFO window (default depth 5); a fresh window is
//! started for every utterance, so overlap never leaks across final
//! fragments.

use std::collections::VecDeque;

use crate::config::OverlapConfig;
use crate::similarity::similarity;

// ---------------------------------------------------------------------------
// FragmentHistory
// ---------------------------------------------------------------------------

/// Bounded FIFO window of recently cleaned interim fragments.
///
/// Oldest entries are evicted once `capacity` is exceeded.  Only
/// [`remove_overlap`] reads it; the session clears it when an utterance
/// finalizes.
#[derive(Debug, Clone)]
pub struct FragmentHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl FragmentHistory {
    /// Create a history bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a cleaned fragment, evicting the oldest entry past capacity.
    pub fn push(&mut self, fragment: String) {
        self.entries.push_back(fragment);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop all entries (new utterance started).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries most-recent-first, the order overlap resolution walks them.
    pub fn recent_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the window is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// remove_overlap
// ---------------------------------------------------------------------------

/// Strip everything from `fragment` that recent history already covers.
///
/// Walks `history` most-recent-first; against each entry, in order:
///
/// 1. exact match → the whole fragment is a duplicate, return `""`;
/// 2. similarity above `duplicate_threshold` → duplicate, return `""`;
/// 3. entry contains the fragment → duplicate, return `""`;
/// 4. fragment contains the entry → strip that substring, continue with the
///    shrunk fragment;
/// 5. otherwise look for the largest suffix-of-entry / prefix-of-fragment
///    character overlap of at least `min_window` and strip it from the
///    fragment front.
///
/// A non-empty result is pushed onto `history` before being returned.  The
/// returned string is the display delta; whitespace-only results collapse to
/// `""` and are not recorded.
pub fn remove_overlap(
    fragment: &str,
    history: &mut FragmentHistory,
    cfg: &OverlapConfig,
) -> String {
    let mut frag = fragment.to_owned();

    for entry in history.recent_first() {
        if frag.is_empty() {
            break;
        }

        // 1. Exact duplicate.
        if entry == frag {
            return String::new();
        }

        // 2. Near duplicate.
        if similarity(entry, &frag) > cfg.duplicate_threshold {
            log::debug!("overlap: fragment near-duplicates history entry, dropping");
            return String::new();
        }

        // 3. Fragment already fully contained in a recent entry.
        if entry.contains(frag.as_str()) {
            return String::new();
        }

        // 4. Recent entry embedded in the fragment — strip it out.
        if frag.contains(entry) {
            frag = frag.replacen(entry, "", 1);
            continue;
        }

        // 5. Suffix/prefix character overlap, largest window first.
        let e: Vec<char> = entry.chars().collect();
        let f: Vec<char> = frag.chars().collect();
        let max_k = e.len().min(f.len());
        if max_k == 0 {
            continue;
        }
        let min_k = cfg.min_window.min(max_k);
        for k in (min_k..=max_k).rev() {
            if e[e.len() - k..] == f[..k] {
                frag = f[k..].iter().collect();
                break;
            }
        }
    }

    if frag.trim().is_empty() {
        return String::new();
    }

    history.push(frag.clone());
    frag
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
