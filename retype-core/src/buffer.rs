//! Line-indexed text buffer mutated by the replay engine.
//!
//! Index 0 is line 1. Every positional operation clamps instead of failing:
//! an insert past the end appends, a write past the end appends, and a
//! removal past the end does nothing.

/// Ordered file lines, owned exclusively by the replay engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// The buffer joined with `\n`, as handed to a plain text display.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Converts a 1-based target into an insertion index, clamped to `len`.
    ///
    /// `None` (no target) appends.
    pub fn insertion_index(&self, target_line: Option<usize>) -> usize {
        match target_line {
            Some(line) => line.saturating_sub(1).min(self.lines.len()),
            None => self.lines.len(),
        }
    }

    /// Converts a 1-based target into the index of an existing line.
    ///
    /// `None` resolves to the last line. Returns `None` when no such line exists.
    pub fn existing_index(&self, target_line: Option<usize>) -> Option<usize> {
        let index = match target_line {
            Some(line) => line.saturating_sub(1),
            None => self.lines.len().checked_sub(1)?,
        };
        (index < self.lines.len()).then_some(index)
    }

    /// Inserts `text` at `index` (clamped) and returns where it landed.
    pub fn insert(&mut self, index: usize, text: impl Into<String>) -> usize {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text.into());
        index
    }

    /// Overwrites the line at `index`, or appends when `index` is past the end.
    ///
    /// Returns the index actually written.
    pub fn write_or_append(&mut self, index: usize, text: impl Into<String>) -> usize {
        match self.lines.get_mut(index) {
            Some(line) => {
                *line = text.into();
                index
            }
            None => {
                self.lines.push(text.into());
                self.lines.len() - 1
            }
        }
    }

    /// Appends a character to the line at `index`. No-op when out of range.
    pub fn push_char(&mut self, index: usize, ch: char) {
        if let Some(line) = self.lines.get_mut(index) {
            line.push(ch);
        }
    }

    /// Replaces the line at `index` if it exists. Returns whether it did.
    pub fn set(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                *line = text.into();
                true
            }
            None => false,
        }
    }

    /// Deletes the line at `index` if it exists.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }
}
