//! Code Nexus Editor
//! 
//! Editing core for the code view:
//! - Rope-based text buffer with undo/redo
//! - Tab and auto-indent keystroke handling
//! - Tree-sitter highlighting rendered for the overlay layer
//! - Scroll synchronization between input and overlay

pub mod buffer;
pub mod commands;
pub mod editor;
pub mod overlay;
pub mod selection;
pub mod syntax;

pub use buffer::TextBuffer;
pub use commands::{handle_enter, handle_tab, CommandExecutor, Edit, KeyEvent, KeyOutcome, INDENT_UNIT};
pub use editor::{Editor, RenderedView};
pub use overlay::{gutter_lines, LayerPair, ScrollOffset};
pub use selection::{EditorCursorState, Selection};
pub use syntax::{render_highlighted, Highlight, PlainHighlighter, TreeSitterHighlighter};
