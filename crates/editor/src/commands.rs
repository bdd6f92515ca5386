//! Editor Commands
//! 
//! Keystroke interpretation: Tab inserts the indent unit, Enter inserts a
//! newline with auto-indent, and plain editing keys go through the buffer
//! so they can be undone.

use std::ops::Range;
use nexus_core::files::Language;
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::selection::Selection;

/// Default indent unit
pub const INDENT_UNIT: &str = "  ";

/// Line endings that open a new indentation level
const BLOCK_OPENERS: [char; 4] = ['{', '(', '[', ':'];

/// A single replacement of a char range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Replaced range, in chars
    pub range: Range<usize>,
    /// Inserted text
    pub text: String,
}

impl Edit {
    /// Caret position right after the inserted text
    pub fn caret(&self) -> usize {
        self.range.start + self.text.chars().count()
    }

    /// Apply to a string, returning the new content and caret
    pub fn apply(&self, content: &str) -> (String, usize) {
        let start = byte_offset(content, self.range.start);
        let end = byte_offset(content, self.range.end);
        let mut out = String::with_capacity(content.len() + self.text.len());
        out.push_str(&content[..start]);
        out.push_str(&self.text);
        out.push_str(&content[end..]);
        (out, self.caret())
    }
}

/// Byte index of a char offset, clamped to the end of the text
fn byte_offset(content: &str, char_idx: usize) -> usize {
    content
        .char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(content.len())
}

/// Normalize and clamp a raw selection against the content
fn selection_range(start: usize, end: usize, content: &str) -> Range<usize> {
    let len = content.chars().count();
    Selection::new(start, end).clamped(len).range()
}

/// Tab and auto-indent rules
#[derive(Debug, Clone)]
pub struct Indenter {
    unit: String,
}

impl Indenter {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Tab: the selected range becomes one indent unit
    pub fn tab(&self, range: Range<usize>) -> Edit {
        Edit { range, text: self.unit.clone() }
    }

    /// Enter: newline plus the indentation the next line should get
    pub fn enter(&self, range: Range<usize>, content: &str, language: Language) -> Edit {
        let before = &content[..byte_offset(content, range.start)];
        let line = before.rsplit('\n').next().unwrap_or("");
        let indent = self.next_indent(line, language);
        Edit { range, text: format!("\n{}", indent) }
    }

    /// Indentation for the line after `line` (the text left of the caret)
    pub fn next_indent(&self, line: &str, language: Language) -> String {
        let mut indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        if opens_block(line.trim(), language) {
            indent.push_str(&self.unit);
        }
        indent
    }
}

impl Default for Indenter {
    fn default() -> Self {
        Self::new(INDENT_UNIT)
    }
}

/// Heuristic only; brackets inside strings or comments count too
fn opens_block(trimmed: &str, language: Language) -> bool {
    if trimmed.ends_with(BLOCK_OPENERS) {
        return true;
    }
    language.is_markup()
        && trimmed.ends_with('>')
        && !trimmed.ends_with("/>")
        && !trimmed.starts_with("</")
}

/// Replace the selection with the indent unit
pub fn handle_tab(selection_start: usize, selection_end: usize, content: &str) -> (String, usize) {
    let range = selection_range(selection_start, selection_end, content);
    Indenter::default().tab(range).apply(content)
}

/// Replace the selection with a newline and the computed indentation
pub fn handle_enter(
    selection_start: usize,
    selection_end: usize,
    content: &str,
    language: Language,
) -> (String, usize) {
    let range = selection_range(selection_start, selection_end, content);
    Indenter::default().enter(range, content, language).apply(content)
}

/// Keys the editor interprets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Tab,
    Enter,
    Char(char),
    Paste(String),
    Backspace,
    Delete,
    Undo,
    Redo,
    SelectAll,
    /// Anything else (arrows, modifiers); left to the host
    Other,
}

/// Whether the host must suppress its own handling of the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed; the native action (e.g. focus change on Tab) must not run
    Handled,
    /// Not interpreted
    Ignored,
}

/// Command executor
pub struct CommandExecutor {
    indenter: Indenter,
}

impl CommandExecutor {
    pub fn new(indenter: Indenter) -> Self {
        Self { indenter }
    }

    pub fn indenter(&self) -> &Indenter {
        &self.indenter
    }

    /// Execute a key on a buffer
    pub fn execute(&mut self, key: KeyEvent, buffer: &mut TextBuffer, language: Language) -> KeyOutcome {
        let range = buffer.selection().range();
        match key {
            KeyEvent::Tab => {
                buffer.apply(&self.indenter.tab(range));
            }
            KeyEvent::Enter => {
                let edit = self.indenter.enter(range, &buffer.text(), language);
                buffer.apply(&edit);
            }
            KeyEvent::Char(c) => {
                buffer.apply(&Edit { range, text: c.to_string() });
            }
            KeyEvent::Paste(text) => {
                buffer.apply(&Edit { range, text });
            }
            KeyEvent::Backspace => {
                if !range.is_empty() {
                    buffer.apply(&Edit { range, text: String::new() });
                } else if range.start > 0 {
                    buffer.apply(&Edit { range: range.start - 1..range.start, text: String::new() });
                }
            }
            KeyEvent::Delete => {
                if !range.is_empty() {
                    buffer.apply(&Edit { range, text: String::new() });
                } else if range.start < buffer.char_count() {
                    buffer.apply(&Edit { range: range.start..range.start + 1, text: String::new() });
                }
            }
            KeyEvent::Undo => {
                if !buffer.undo() {
                    debug!("Nothing to undo");
                }
            }
            KeyEvent::Redo => {
                if !buffer.redo() {
                    debug!("Nothing to redo");
                }
            }
            KeyEvent::SelectAll => {
                let len = buffer.char_count();
                buffer.set_selection(Selection::new(0, len));
            }
            KeyEvent::Other => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(Indenter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_inserts_unit_at_caret() {
        let content = "abcdef";
        for p in 0..=content.len() {
            let (out, caret) = handle_tab(p, p, content);
            assert_eq!(out, format!("{}  {}", &content[..p], &content[p..]));
            assert_eq!(caret, p + 2);
        }
    }

    #[test]
    fn test_tab_replaces_selection() {
        let (out, caret) = handle_tab(1, 4, "abcdef");
        assert_eq!(out, "a  ef");
        assert_eq!(caret, 3);
    }

    #[test]
    fn test_enter_keeps_indent() {
        let content = "    x = 1";
        let (out, caret) = handle_enter(9, 9, content, Language::Python);
        assert_eq!(out, "    x = 1\n    ");
        assert_eq!(caret, 14);
    }

    #[test]
    fn test_enter_after_openers() {
        for opener in ["{", "(", "[", ":"] {
            let content = format!("  head{}", opener);
            let len = content.chars().count();
            let (out, caret) = handle_enter(len, len, &content, Language::C);
            assert_eq!(out, format!("{}\n    ", content));
            assert_eq!(caret, len + 5);
        }
    }

    #[test]
    fn test_enter_uses_text_left_of_caret() {
        // Caret sits right after the brace; the rest of the line moves down
        let content = "if (x) {}";
        let (out, caret) = handle_enter(8, 8, content, Language::JavaScript);
        assert_eq!(out, "if (x) {\n  }");
        assert_eq!(caret, 11);
    }

    #[test]
    fn test_enter_html_tags() {
        let indent = |line: &str, lang| Indenter::default().next_indent(line, lang);
        assert_eq!(indent("<div>", Language::Html), "  ");
        assert_eq!(indent("  <br/>", Language::Html), "  ");
        assert_eq!(indent("</div>", Language::Html), "");
        assert_eq!(indent("<App>", Language::React), "  ");
        // Not a markup language: '>' is just a character
        assert_eq!(indent("<div>", Language::JavaScript), "");
    }

    #[test]
    fn test_colon_over_indents_everywhere() {
        assert_eq!(Indenter::default().next_indent("case 1:", Language::C), "  ");
    }

    #[test]
    fn test_enter_on_multibyte_content() {
        let content = "é {";
        let (out, caret) = handle_enter(3, 3, content, Language::C);
        assert_eq!(out, "é {\n  ");
        assert_eq!(caret, 6);
    }

    #[test]
    fn test_out_of_range_offsets_clamped() {
        let (out, caret) = handle_tab(50, 99, "ab");
        assert_eq!(out, "ab  ");
        assert_eq!(caret, 4);
    }

    #[test]
    fn test_executor_keys() {
        let mut buffer = TextBuffer::from_str("fn main() {");
        buffer.set_selection(Selection::caret(11));
        let mut executor = CommandExecutor::default();

        assert_eq!(executor.execute(KeyEvent::Enter, &mut buffer, Language::C), KeyOutcome::Handled);
        assert_eq!(executor.execute(KeyEvent::Char('x'), &mut buffer, Language::C), KeyOutcome::Handled);
        assert_eq!(buffer.text(), "fn main() {\n  x");

        executor.execute(KeyEvent::Backspace, &mut buffer, Language::C);
        assert_eq!(buffer.text(), "fn main() {\n  ");

        executor.execute(KeyEvent::Undo, &mut buffer, Language::C);
        assert_eq!(buffer.text(), "fn main() {\n  x");

        assert_eq!(executor.execute(KeyEvent::Tab, &mut buffer, Language::C), KeyOutcome::Handled);
        assert_eq!(executor.execute(KeyEvent::Other, &mut buffer, Language::C), KeyOutcome::Ignored);
    }

    #[test]
    fn test_select_all_then_type() {
        let mut buffer = TextBuffer::from_str("old");
        let mut executor = CommandExecutor::default();
        executor.execute(KeyEvent::SelectAll, &mut buffer, Language::Python);
        executor.execute(KeyEvent::Paste("new".into()), &mut buffer, Language::Python);
        assert_eq!(buffer.text(), "new");
        assert_eq!(buffer.selection(), Selection::caret(3));
    }
}
