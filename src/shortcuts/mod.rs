//! User-defined shortcut expansions for dictated text.
//!
//! [`ShortcutTable`] holds an ordered list of `(shortcut, expansion)` pairs
//! applied as **case-insensitive literal substring** replacements over the
//! final formatted text just before it is emitted — no regex, no escaping,
//! no word-boundary logic.  Entries apply in table order, so earlier entries
//! can feed later ones.
//!
//! Tables persist as JSON in the platform config directory:
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\transcript-reconcile\shortcuts.json` |
//! | macOS    | `~/Library/Application Support/transcript-reconcile/shortcuts.json` |
//! | Linux    | `~/.config/transcript-reconcile/shortcuts.json` |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// ShortcutEntry
// ---------------------------------------------------------------------------

/// A single user-defined expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutEntry {
    /// The spoken/typed form to look for (matched case-insensitively).
    pub shortcut: String,
    /// The text it expands into.
    pub expansion: String,
}

// ---------------------------------------------------------------------------
// ShortcutTable
// ---------------------------------------------------------------------------

/// Ordered shortcut-expansion table with optional JSON persistence.
///
/// Tables created through [`load_or_default`](ShortcutTable::load_or_default)
/// or [`load_from`](ShortcutTable::load_from) write back to disk after every
/// mutation; [`from_entries`](ShortcutTable::from_entries) builds a purely
/// in-memory table for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    entries: Vec<ShortcutEntry>,
    path: Option<PathBuf>,
}

impl ShortcutTable {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Load the table from the platform config directory, or return an empty
    /// table when the file does not exist yet.
    pub fn load_or_default() -> Self {
        Self::load_from(AppPaths::new().shortcuts_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: PathBuf) -> Self {
        let entries = if path.exists() {
            let data = std::fs::read_to_string(&path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            entries,
            path: Some(path),
        }
    }

    /// Build an in-memory table that never touches disk.
    pub fn from_entries<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(shortcut, expansion)| ShortcutEntry {
                shortcut: shortcut.into(),
                expansion: expansion.into(),
            })
            .collect();
        Self {
            entries,
            path: None,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append or update an entry, then persist when the table is file-backed.
    ///
    /// A shortcut that already exists (case-insensitive) keeps its position
    /// and gets the new expansion; new shortcuts go to the end of the table.
    pub fn add(&mut self, shortcut: String, expansion: String) {
        let lowered = shortcut.to_lowercase();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.shortcut.to_lowercase() == lowered)
        {
            entry.expansion = expansion;
        } else {
            self.entries.push(ShortcutEntry {
                shortcut,
                expansion,
            });
        }
        self.save();
    }

    /// Remove an entry by shortcut (case-insensitive); persists on change.
    pub fn remove(&mut self, shortcut: &str) -> bool {
        let lowered = shortcut.to_lowercase();
        let before = self.entries.len();
        self.entries
            .retain(|e| e.shortcut.to_lowercase() != lowered);
        let removed = self.entries.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    /// Apply every entry, in table order, to `text`.
    pub fn expand(&self, text: &str) -> String {
        let mut out = text.to_owned();
        for entry in &self.entries {
            out = replace_all_ci(&out, &entry.shortcut, &entry.expansion);
        }
        out
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[ShortcutEntry] {
        &self.entries
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("shortcuts: failed to persist table: {e}");
                }
            }
            Err(e) => log::warn!("shortcuts: failed to serialize table: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// replace_all_ci
// ---------------------------------------------------------------------------

/// Replace every case-insensitive occurrence of `pattern` in `text`.
///
/// Matching is character-wise (`char::to_lowercase` per character), which
/// stays correct for multi-byte text where byte offsets of a lowercased copy
/// would drift from the original.
fn replace_all_ci(text: &str, pattern: &str, replacement: &str) -> String {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    if p.is_empty() || t.len() < p.len() {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < t.len() {
        let matches = i + p.len() <= t.len()
            && (0..p.len()).all(|k| t[i + k].to_lowercase().eq(p[k].to_lowercase()));
        if matches {
            out.push_str(replacement);
            i += p.len();
        } else {
            out.push(t[i]);
            i += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn expands_case_insensitively() {
        let table = ShortcutTable::from_entries([("PM", "product manager")]);
        assert_eq!(table.expand("I am a PM"), "I am a product manager");
        assert_eq!(table.expand("I am a pm"), "I am a product manager");
        assert_eq!(table.expand("I am a Pm"), "I am a product manager");
    }

    #[test]
    fn matches_are_literal_substrings() {
        // No word-boundary logic: the shortcut fires inside longer words too.
        let table = ShortcutTable::from_entries([("cat", "feline")]);
        assert_eq!(table.expand("concatenate"), "confelineenate");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let table = ShortcutTable::from_entries([("c++", "C plus plus")]);
        assert_eq!(table.expand("I write c++ daily"), "I write C plus plus daily");
    }

    #[test]
    fn entries_apply_in_table_order() {
        let table = ShortcutTable::from_entries([("brb", "be right back"), ("back", "BACK")]);
        assert_eq!(table.expand("brb"), "be right BACK");
    }

    #[test]
    fn replaces_every_occurrence() {
        let table = ShortcutTable::from_entries([("asap", "as soon as possible")]);
        assert_eq!(
            table.expand("asap means ASAP"),
            "as soon as possible means as soon as possible"
        );
    }

    #[test]
    fn empty_table_is_identity() {
        let table = ShortcutTable::default();
        assert_eq!(table.expand("unchanged text"), "unchanged text");
    }

    #[test]
    fn multibyte_text_around_matches_survives() {
        let table = ShortcutTable::from_entries([("ty", "thank you")]);
        assert_eq!(table.expand("สวัสดี ty ครับ"), "สวัสดี thank you ครับ");
    }

    #[test]
    fn add_updates_existing_entry_in_place() {
        let mut table = ShortcutTable::from_entries([("pm", "product manager")]);
        table.add("PM".into(), "prime minister".into());
        assert_eq!(table.len(), 1);
        assert_eq!(table.expand("the pm"), "the prime minister");
    }

    #[test]
    fn remove_deletes_case_insensitively() {
        let mut table = ShortcutTable::from_entries([("pm", "product manager")]);
        assert!(table.remove("PM"));
        assert!(table.is_empty());
        assert!(!table.remove("PM"));
    }

    #[test]
    fn round_trips_through_json_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("shortcuts.json");

        let mut table = ShortcutTable::load_from(path.clone());
        table.add("omw".into(), "on my way".into());
        table.add("brb".into(), "be right back".into());

        let reloaded = ShortcutTable::load_from(path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.expand("omw, brb"), "on my way, be right back");
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        let table = ShortcutTable::load_from(dir.path().join("absent.json"));
        assert!(table.is_empty());
    }
}
