//! Text sink seam — where reconciled text leaves the core.
//!
//! The core never touches UI controls, accessibility trees or clipboards; it
//! only produces ordered [`SinkOperation`]s.  Platform adapters implement
//! [`TextSink`] and decide what "insert at the cursor" means for them.
//! [`BufferSink`] is the in-memory implementation used by tests and the CLI
//! driver.
//!
//! Sink operations are deliberately infallible: a `Replace` whose `old` text
//! cannot be found degrades to an insert of `new`, so the user's words always
//! land somewhere visible.

// ---------------------------------------------------------------------------
// SinkOperation
// ---------------------------------------------------------------------------

/// One ordered edit emitted by the reconciliation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOperation {
    /// Append `text` at the logical cursor.
    Insert(String),
    /// Substitute the most recent occurrence of `old` with `new`; when `old`
    /// is not present, fall back to inserting `new`.
    Replace { old: String, new: String },
    /// Overwrite the entire visible content.  Used only for repetition
    /// repair.
    ResetAndInsert(String),
}

// ---------------------------------------------------------------------------
// TextSink
// ---------------------------------------------------------------------------

/// Capability interface for anything that can display reconciled text.
pub trait TextSink {
    /// Append `text` at the logical cursor.
    fn insert(&mut self, text: &str);

    /// Substitute the most recent occurrence of `old` with `new`.
    ///
    /// Implementations must fall back to `insert(new)` when `old` is not
    /// found — a stale replace target is a degrade-and-continue case, never
    /// an error.
    fn replace(&mut self, old: &str, new: &str);

    /// Overwrite the entire visible content with `text`.
    fn reset_and_insert(&mut self, text: &str);

    /// The full visible content as the sink currently shows it.
    fn current_value(&self) -> String;
}

/// Apply one operation to a sink.
pub fn apply(sink: &mut dyn TextSink, op: &SinkOperation) {
    match op {
        SinkOperation::Insert(text) => sink.insert(text),
        SinkOperation::Replace { old, new } => sink.replace(old, new),
        SinkOperation::ResetAndInsert(text) => sink.reset_and_insert(text),
    }
}

/// Apply a batch of operations in order.
pub fn apply_all(sink: &mut dyn TextSink, ops: &[SinkOperation]) {
    for op in ops {
        apply(sink, op);
    }
}

// ---------------------------------------------------------------------------
// BufferSink
// ---------------------------------------------------------------------------

/// In-memory [`TextSink`] backed by a single `String`.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    content: String,
}

impl BufferSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextSink for BufferSink {
    fn insert(&mut self, text: &str) {
        self.content.push_str(text);
    }

    fn replace(&mut self, old: &str, new: &str) {
        match self.content.rfind(old) {
            Some(idx) => {
                self.content.replace_range(idx..idx + old.len(), new);
            }
            None => {
                log::debug!("sink: replace target not found, falling back to insert");
                self.insert(new);
            }
        }
    }

    fn reset_and_insert(&mut self, text: &str) {
        self.content.clear();
        self.content.push_str(text);
    }

    fn current_value(&self) -> String {
        self.content.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_appends() {
        let mut sink = BufferSink::new();
        sink.insert("hello");
        sink.insert(" world");
        assert_eq!(sink.current_value(), "hello world");
    }

    #[test]
    fn replace_targets_most_recent_occurrence() {
        let mut sink = BufferSink::new();
        sink.insert("say hi and hi again: hi");
        sink.replace("hi", "hello");
        assert_eq!(sink.current_value(), "say hi and hi again: hello");
    }

    #[test]
    fn replace_miss_falls_back_to_insert() {
        let mut sink = BufferSink::new();
        sink.insert("hello ");
        sink.replace("absent", "world");
        assert_eq!(sink.current_value(), "hello world");
    }

    #[test]
    fn reset_and_insert_overwrites_everything() {
        let mut sink = BufferSink::new();
        sink.insert("old content");
        sink.reset_and_insert("fresh");
        assert_eq!(sink.current_value(), "fresh");
    }

    #[test]
    fn apply_all_runs_in_order() {
        let mut sink = BufferSink::new();
        let ops = vec![
            SinkOperation::Insert("he".into()),
            SinkOperation::Replace {
                old: "he".into(),
                new: "hello".into(),
            },
            SinkOperation::Insert(" world".into()),
        ];
        apply_all(&mut sink, &ops);
        assert_eq!(sink.current_value(), "hello world");
    }

    #[test]
    fn replace_handles_multibyte_content() {
        let mut sink = BufferSink::new();
        sink.insert("สวัสดี ครับ");
        sink.replace("ครับ", "ค่ะ");
        assert_eq!(sink.current_value(), "สวัสดี ค่ะ");
    }
}
