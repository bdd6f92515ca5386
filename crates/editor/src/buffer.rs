//! Text Buffer
//! 
//! Rope-backed content of the active file with a selection and an
//! undo/redo history of replacements.

use ropey::Rope;
use std::ops::Range;

use crate::commands::Edit;
use crate::selection::Selection;

/// A recorded replacement, enough to revert or replay it
#[derive(Debug, Clone)]
struct EditRecord {
    position: usize,
    old_text: String,
    new_text: String,
    selection_before: Selection,
}

impl EditRecord {
    fn inserted_range(&self) -> Range<usize> {
        self.position..self.position + self.new_text.chars().count()
    }

    fn removed_range(&self) -> Range<usize> {
        self.position..self.position + self.old_text.chars().count()
    }
}

/// Text position (line, column), both zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Editable text of one file
pub struct TextBuffer {
    rope: Rope,
    selection: Selection,
    dirty: bool,
    undo_stack: Vec<EditRecord>,
    redo_stack: Vec<EditRecord>,
    max_undo_history: usize,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_str("")
    }

    /// Create a buffer from a string, caret at the start
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
            dirty: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_history: 1000,
        }
    }

    /// Get the full text content
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total char count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Whether an edit happened since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamped to the text
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.char_count());
    }

    /// Text covered by the selection
    pub fn selected_text(&self) -> String {
        self.rope.slice(self.selection.range()).to_string()
    }

    /// Line and column of a char offset
    pub fn char_to_position(&self, char_idx: usize) -> Position {
        let char_idx = char_idx.min(self.char_count());
        let line = self.rope.char_to_line(char_idx);
        Position::new(line, char_idx - self.rope.line_to_char(line))
    }

    /// Line and column of the caret
    pub fn caret_position(&self) -> Position {
        self.char_to_position(self.selection.head)
    }

    /// Apply an edit, record it for undo and put the caret after it
    pub fn apply(&mut self, edit: &Edit) {
        let len = self.char_count();
        let start = edit.range.start.min(len);
        let end = edit.range.end.clamp(start, len);

        let record = EditRecord {
            position: start,
            old_text: self.rope.slice(start..end).to_string(),
            new_text: edit.text.clone(),
            selection_before: self.selection,
        };

        self.rope.remove(start..end);
        self.rope.insert(start, &edit.text);
        self.selection = Selection::caret(record.inserted_range().end);
        self.dirty = true;

        self.undo_stack.push(record);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_undo_history {
            self.undo_stack.remove(0);
        }
    }

    /// Replace the whole content, e.g. after an external change
    pub fn replace_all(&mut self, text: &str) {
        let len = self.char_count();
        self.apply(&Edit { range: 0..len, text: text.to_string() });
    }

    /// Undo the last edit
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };
        let range = record.inserted_range();
        self.rope.remove(range.start..range.end.min(self.char_count()));
        self.rope.insert(record.position, &record.old_text);
        self.selection = record.selection_before.clamped(self.char_count());
        self.dirty = true;
        self.redo_stack.push(record);
        true
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };
        let range = record.removed_range();
        self.rope.remove(range.start..range.end.min(self.char_count()));
        self.rope.insert(record.position, &record.new_text);
        self.selection = Selection::caret(record.inserted_range().end);
        self.dirty = true;
        self.undo_stack.push(record);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(at: usize, text: &str) -> Edit {
        Edit { range: at..at, text: text.to_string() }
    }

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::from_str("Hello, World!");
        assert_eq!(buffer.text(), "Hello, World!");
        assert_eq!(buffer.char_count(), 13);
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_apply_moves_caret() {
        let mut buffer = TextBuffer::from_str("Hello, World!");
        buffer.apply(&insert(7, "Beautiful "));
        assert_eq!(buffer.text(), "Hello, Beautiful World!");
        assert_eq!(buffer.selection(), Selection::caret(17));
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_undo_redo() {
        let mut buffer = TextBuffer::from_str("Hello");
        buffer.set_selection(Selection::caret(5));
        buffer.apply(&insert(5, " World"));
        assert_eq!(buffer.text(), "Hello World");

        assert!(buffer.undo());
        assert_eq!(buffer.text(), "Hello");
        assert_eq!(buffer.selection(), Selection::caret(5));

        assert!(buffer.redo());
        assert_eq!(buffer.text(), "Hello World");
        assert!(!buffer.redo());
    }

    #[test]
    fn test_undo_replacement_with_multibyte_text() {
        let mut buffer = TextBuffer::from_str("añb");
        buffer.apply(&Edit { range: 1..2, text: "ñññ".into() });
        assert_eq!(buffer.text(), "añññb");
        buffer.undo();
        assert_eq!(buffer.text(), "añb");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buffer = TextBuffer::new();
        buffer.apply(&insert(0, "a"));
        buffer.undo();
        assert!(buffer.can_redo());
        buffer.apply(&insert(0, "b"));
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_caret_position() {
        let mut buffer = TextBuffer::from_str("one\ntwo\nthree");
        buffer.set_selection(Selection::caret(6));
        assert_eq!(buffer.caret_position(), Position::new(1, 2));
        buffer.set_selection(Selection::caret(100));
        assert_eq!(buffer.caret_position(), Position::new(2, 5));
    }
}
