//! Linear undo/redo history over text snapshots.
//!
//! UI-agnostic: shared by every client front-end. Pushing after an undo
//! discards the redo branch for good; there is no history tree.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStack {
    snapshots: Vec<String>,
    current_index: usize,
}

impl HistoryStack {
    /// Starts with a single empty snapshot.
    pub fn new() -> Self {
        Self::with_initial(String::new())
    }

    pub fn with_initial(text: impl Into<String>) -> Self {
        Self {
            snapshots: vec![text.into()],
            current_index: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.current_index]
    }

    /// Drops everything after the cursor, appends `text`, and moves the
    /// cursor onto it.
    pub fn push(&mut self, text: impl Into<String>) {
        self.snapshots.truncate(self.current_index + 1);
        self.snapshots.push(text.into());
        self.current_index = self.snapshots.len() - 1;
    }

    /// Steps back one snapshot. No-op at the first snapshot.
    pub fn undo(&mut self) -> &str {
        if self.can_undo() {
            self.current_index -= 1;
        }
        self.current()
    }

    /// Steps forward one snapshot. No-op at the last snapshot.
    pub fn redo(&mut self) -> &str {
        if self.can_redo() {
            self.current_index += 1;
        }
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.snapshots.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
