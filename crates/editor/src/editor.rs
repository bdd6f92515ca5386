//! Editor View
//! 
//! One open file: its buffer, the key handler and the overlay state.

use std::sync::Arc;

use nexus_core::config::EditorConfig;
use nexus_core::files::{FileId, Language, SourceFile};
use tracing::debug;

use crate::buffer::{Position, TextBuffer};
use crate::commands::{CommandExecutor, Indenter, KeyEvent, KeyOutcome};
use crate::overlay::{gutter_lines, LayerPair, ScrollOffset};
use crate::selection::Selection;
use crate::syntax::{default_highlighter, render_with, Highlight, TreeSitterHighlighter};

/// What the host draws for the current state
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub markup: String,
    pub gutter: Option<Vec<usize>>,
    pub scroll: ScrollOffset,
}

/// Editing surface bound to one file
pub struct Editor {
    file_id: FileId,
    language: Language,
    buffer: TextBuffer,
    executor: CommandExecutor,
    layers: LayerPair,
    highlighter: Arc<dyn Highlight>,
    show_line_numbers: bool,
}

impl Editor {
    /// Open a file with the shared highlighter
    pub fn open(file: &SourceFile, config: &EditorConfig) -> Self {
        Self::with_highlighter(file, config, Arc::new(SharedHighlighter))
    }

    pub fn with_highlighter(file: &SourceFile, config: &EditorConfig, highlighter: Arc<dyn Highlight>) -> Self {
        debug!("Opening editor for {} ({})", file.name, file.language);
        Self {
            file_id: file.id.clone(),
            language: file.language,
            buffer: TextBuffer::from_str(&file.content),
            executor: CommandExecutor::new(Indenter::new(config.indent_unit.clone())),
            layers: LayerPair::new(),
            highlighter,
            show_line_numbers: config.show_line_numbers,
        }
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn content(&self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn select(&mut self, selection: Selection) {
        self.buffer.set_selection(selection);
    }

    pub fn caret_position(&self) -> Position {
        self.buffer.caret_position()
    }

    /// Handle a key; returns whether the content changed and the outcome
    pub fn handle_key(&mut self, key: KeyEvent) -> (KeyOutcome, bool) {
        let before = self.buffer.text();
        let outcome = self.executor.execute(key, &mut self.buffer, self.language);
        let changed = outcome == KeyOutcome::Handled && self.buffer.text() != before;
        (outcome, changed)
    }

    /// Content was replaced from outside (e.g. file switch or reload)
    pub fn reload(&mut self, content: &str) {
        if content != self.buffer.text() {
            self.buffer.replace_all(content);
        }
        self.buffer.mark_clean();
    }

    /// Mirror the input layer scroll onto the overlay
    pub fn sync_scroll(&mut self, scroll_top: f64, scroll_left: f64) -> ScrollOffset {
        self.layers.sync_scroll(scroll_top, scroll_left)
    }

    pub fn render(&self) -> RenderedView {
        let content = self.buffer.text();
        RenderedView {
            markup: render_with(self.highlighter.as_ref(), &content, self.language),
            gutter: self.show_line_numbers.then(|| gutter_lines(&content)),
            scroll: self.layers.overlay(),
        }
    }
}

/// Delegates to the process-wide tree-sitter highlighter
struct SharedHighlighter;

impl Highlight for SharedHighlighter {
    fn highlight(&self, text: &str, grammar_id: &str) -> String {
        let highlighter: &TreeSitterHighlighter = default_highlighter();
        highlighter.highlight(text, grammar_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::PlainHighlighter;

    fn editor(content: &str, language: Language) -> Editor {
        let file = SourceFile::with_content("main", language, content);
        Editor::with_highlighter(&file, &EditorConfig::default(), Arc::new(PlainHighlighter))
    }

    #[test]
    fn test_typing_and_rendering() {
        let mut editor = editor("if x:", Language::Python);
        editor.select(Selection::caret(5));
        let (outcome, changed) = editor.handle_key(KeyEvent::Enter);
        assert_eq!(outcome, KeyOutcome::Handled);
        assert!(changed);
        assert_eq!(editor.content(), "if x:\n  ");

        let view = editor.render();
        assert_eq!(view.markup, "if x:\n  ");
        assert_eq!(view.gutter, Some(vec![1, 2]));
    }

    #[test]
    fn test_ignored_key_changes_nothing() {
        let mut editor = editor("abc", Language::C);
        assert_eq!(editor.handle_key(KeyEvent::Other), (KeyOutcome::Ignored, false));
        assert_eq!(editor.handle_key(KeyEvent::Undo), (KeyOutcome::Handled, false));
    }

    #[test]
    fn test_scroll_reflected_in_view() {
        let mut editor = editor("a\nb\n", Language::Html);
        editor.sync_scroll(40.0, 2.0);
        let view = editor.render();
        assert_eq!(view.scroll, ScrollOffset::new(40.0, 2.0));
        assert!(view.markup.ends_with("<br />"));
    }

    #[test]
    fn test_reload_keeps_history_usable() {
        let mut editor = editor("one", Language::JavaScript);
        editor.reload("two");
        assert_eq!(editor.content(), "two");
        assert!(!editor.buffer().is_dirty());
    }
}
