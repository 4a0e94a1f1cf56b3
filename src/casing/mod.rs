//! Sentence-boundary-aware leading-character casing.
//!
//! Recognizers capitalize each fragment independently, which reads badly once
//! fragments are stitched together ("hello world. And Then" / "hello And").
//! [`apply_case`] fixes exactly one character — the fragment's first — based
//! on how the prior finalized text ends.  The rest of the fragment is never
//! touched.

// First words that stay capitalized mid-sentence.
const PRONOUN_WHITELIST: [&str; 5] = ["I", "I'll", "I'd", "I'm", "I've"];

/// Adjust the leading character of `fragment` to fit after `prior_finalized`.
///
/// * Capitalize when the trimmed prior text is empty or ends in `.`, `!`
///   or `?`.
/// * Leave the fragment alone when its first word is a capitalized first
///   person pronoun (`I`, `I'll`, `I'd`, `I'm`, `I've`).
/// * Otherwise lower the first character — but only when it is currently
///   uppercase; an already-lowercase lead is returned unchanged.
///
/// # Example
/// ```rust
/// use transcript_reconcile::casing::apply_case;
///
/// assert_eq!(apply_case("hello world", "Done."), "Hello world");
/// assert_eq!(apply_case("World is big", "hello"), "world is big");
/// assert_eq!(apply_case("I'll go", "hello"), "I'll go");
/// ```
pub fn apply_case(fragment: &str, prior_finalized: &str) -> String {
    let mut chars = fragment.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();

    let first_word = fragment.split(' ').next().unwrap_or(fragment);
    if PRONOUN_WHITELIST.contains(&first_word) {
        return fragment.to_owned();
    }

    let trimmed_prior = prior_finalized.trim_end();
    let should_capitalize =
        trimmed_prior.is_empty() || trimmed_prior.ends_with(['.', '!', '?']);

    if should_capitalize {
        let mut out: String = first.to_uppercase().collect();
        out.push_str(rest);
        out
    } else if first.is_uppercase() {
        let mut out: String = first.to_lowercase().collect();
        out.push_str(rest);
        out
    } else {
        fragment.to_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
