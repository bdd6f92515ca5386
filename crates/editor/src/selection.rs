//! Selection Management
//! 
//! Caret and selection offsets inside the active file, counted in chars.

use std::ops::Range;

/// A text selection; `anchor == head` is a plain caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    /// Where the caret is
    pub head: usize,
}

/// Transient cursor state of the editor
pub type EditorCursorState = Selection;

impl Selection {
    /// Create a new selection
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create an empty selection at an offset
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Lower offset
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper offset
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Normalized range (start always before end)
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Keep both ends inside a text of `len` chars
    pub fn clamped(&self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
