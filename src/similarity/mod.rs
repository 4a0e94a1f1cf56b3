//! Normalized edit-distance similarity scorer.
//!
//! Every fuzzy comparison in this crate — interim-fragment deduplication,
//! stutter detection, sentence-level repetition cleanup — goes through
//! [`similarity`], so the tuning thresholds in
//! [`config`](crate::config) all share one scale.
//!
//! # Character counting
//!
//! Lengths and edit operations are counted in **Unicode scalar values**
//! (`char`), never bytes.  `"né"` and `"ne"` are two characters apart by
//! byte length but one edit apart by scalar values, and the latter is what
//! the score reflects.  This convention is used consistently across the
//! whole crate (overlap windows, midpoint splits, leading-character casing).

// ---------------------------------------------------------------------------
// similarity
// ---------------------------------------------------------------------------

/// Normalized similarity between two strings in `[0.0, 1.0]`.
///
/// * Both empty → `1.0`.
/// * Exactly one empty → `0.0`.
/// * Otherwise `1 - levenshtein(a, b) / max(chars(a), chars(b))`.
///
/// Case-sensitive; callers that want case-insensitive scoring lowercase
/// their inputs first.
///
/// # Example
/// ```rust
/// use transcript_reconcile::similarity::similarity;
///
/// assert_eq!(similarity("hello", "hello"), 1.0);
/// assert!(similarity("hello", "hallo") > 0.7);
/// assert_eq!(similarity("", "x"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);

    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

// ---------------------------------------------------------------------------
// levenshtein
// ---------------------------------------------------------------------------

/// Classic Levenshtein edit distance over Unicode scalar values.
///
/// Two-row dynamic programming: O(|a|·|b|) time, O(min(|a|, |b|)) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Keep the DP row as short as possible.
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost) // substitute
                .min(prev[j + 1] + 1) // delete
                .min(curr[j] + 1); // insert
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- levenshtein ---

    #[test]
    fn distance_identical_is_zero() {
        assert_eq!(levenshtein("kitten", "kitten"), 0);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn distance_classic_example() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn distance_empty_vs_nonempty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(levenshtein("flaw", "lawn"), levenshtein("lawn", "flaw"));
    }

    #[test]
    fn distance_counts_scalar_values_not_bytes() {
        // "é" is 2 bytes but 1 scalar value — one substitution, not two.
        assert_eq!(levenshtein("ne", "né"), 1);
        // Emoji are 4 bytes each but single scalar values.
        assert_eq!(levenshtein("a🎤b", "a🎧b"), 1);
    }

    // ---- similarity ---

    #[test]
    fn similarity_identical_is_one() {
        assert_eq!(similarity("hello world", "hello world"), 1.0);
    }

    #[test]
    fn similarity_both_empty_is_one() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn similarity_one_empty_is_zero() {
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("x", ""), 0.0);
    }

    #[test]
    fn similarity_is_bounded() {
        let cases = [
            ("abc", "xyz"),
            ("a", "abcdefgh"),
            ("the quick brown fox", "the quick brown fix"),
        ];
        for (a, b) in cases {
            let s = similarity(a, b);
            assert!((0.0..=1.0).contains(&s), "similarity({a:?},{b:?}) = {s}");
        }
    }

    #[test]
    fn similarity_known_values() {
        // lev("hell","hello") = 1, max_len = 5 → 0.8
        assert!((similarity("hell", "hello") - 0.8).abs() < 1e-9);
        // lev("he","hell") = 2, max_len = 4 → 0.5
        assert!((similarity("he", "hell") - 0.5).abs() < 1e-9);
        // Completely disjoint same-length strings → 0.0
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn similarity_is_case_sensitive() {
        assert!(similarity("Hello", "hello") < 1.0);
    }

    #[test]
    fn similarity_non_ascii_uses_scalar_lengths() {
        // One scalar-value edit across five scalar values → 0.8, even though
        // the byte lengths differ wildly.
        assert!((similarity("สวัสดี", "สวัสด") - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
    }
}
