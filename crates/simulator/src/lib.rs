//! Code Nexus Offline Simulator
//!
//! Produces a plausible "execution" of the active file without any real
//! compiler or interpreter:
//! - HTML: the document with the project's stylesheets and scripts spliced in
//! - JavaScript: the script inside a console-capturing harness
//! - everything else: a canned compiler transcript
//!
//! plus a lightweight per-language linter used by the offline debugger.

pub mod config;
pub mod harness;
pub mod lint;
pub mod preview;
pub mod runner;
pub mod transcript;

pub use config::SimulatorConfig;
pub use harness::{captured_log, wrap_script, LogBuffer};
pub use lint::{debug_report, lint_file};
pub use runner::{RunState, RunTicket, SimulationRunner, Simulator};

use nexus_core::files::{FileId, SourceFile};
use serde::{Deserialize, Serialize};

/// Sandbox flags for the frame that shows markup results
pub const PREVIEW_SANDBOX: &str = "allow-scripts";

/// Output of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SimulationResult {
    /// Document for a sandboxed preview frame
    Markup { html: String },
    /// Plain console transcript
    Text { content: String },
}

impl SimulationResult {
    pub fn markup(html: impl Into<String>) -> Self {
        SimulationResult::Markup { html: html.into() }
    }

    pub fn text(content: impl Into<String>) -> Self {
        SimulationResult::Text { content: content.into() }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, SimulationResult::Markup { .. })
    }

    /// Markup or text, whichever this is
    pub fn body(&self) -> &str {
        match self {
            SimulationResult::Markup { html } => html,
            SimulationResult::Text { content } => content,
        }
    }
}

/// Run the active file with default settings
pub fn run_active_file(files: &[SourceFile], active_id: &FileId) -> Option<SimulationResult> {
    Simulator::default().simulate(files, active_id)
}
