//! Code Nexus - mobile-first code editor core
//! 
//! Editing and offline execution for small multi-file projects.
//! 
//! ## Features
//! 
//! - **Editor**: tab and auto-indent keystrokes, undo/redo, highlighted overlay
//! - **Offline runs**: HTML previews with spliced assets, a console harness
//!   for JavaScript, canned transcripts for compiled languages
//! - **Offline debugger**: per-language lint report
//! - **Online mode**: run/debug/improve and persona chat through a hosted model
//! - **Export**: single files or the whole project as ZIP
//! 
//! ## Architecture
//! 
//! - `nexus-core`: state, configuration, persistence and assistant prompts
//! - `nexus-editor`: keystroke handling and syntax highlighting
//! - `nexus-simulator`: offline run simulation and linting

#![warn(clippy::all)]

pub mod commands;
pub mod export;
pub mod project;
pub mod session;

// Re-export main components for library usage
pub use nexus_core as core;
pub use nexus_editor as editor;
pub use nexus_simulator as simulator;

pub use session::Session;

/// Prelude module for convenient imports
pub mod prelude {
    pub use nexus_core::{AppConfig, FileCollection, Language, Orchestrator, SourceFile};
    pub use nexus_editor::{Editor, KeyEvent, KeyOutcome};
    pub use nexus_simulator::{lint_file, run_active_file, SimulationResult};
    pub use crate::project::ProjectManager;
    pub use crate::session::Session;
}
