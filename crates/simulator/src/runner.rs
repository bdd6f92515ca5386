//! Simulation Runner
//!
//! Drives one run or debug invocation at a time through
//! `Idle -> Running -> Succeeded | Failed`.

use nexus_core::files::{FileId, Language, SourceFile};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::SimulatorConfig;
use crate::harness::wrap_script;
use crate::lint::debug_report;
use crate::preview::assemble_document;
use crate::transcript::compiler_transcript;
use crate::SimulationResult;

/// Pure simulation engine
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Simulate running the active file; None when it is not in `files`
    pub fn simulate(&self, files: &[SourceFile], active_id: &FileId) -> Option<SimulationResult> {
        let Some(file) = files.iter().find(|f| &f.id == active_id) else {
            debug!("No file {} to run", active_id);
            return None;
        };

        let result = match file.language {
            Language::Html => SimulationResult::markup(assemble_document(file, files)),
            Language::JavaScript => SimulationResult::markup(wrap_script(&file.content)),
            _ => SimulationResult::text(compiler_transcript(&self.config.compiler_banner, file)),
        };
        Some(result)
    }
}

/// Runner state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded(SimulationResult),
    Failed(String),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Exclusive right to finish the current invocation
pub struct RunTicket<'a> {
    state: &'a Mutex<RunState>,
    finished: bool,
}

impl RunTicket<'_> {
    /// Record the outcome and leave Running
    pub fn finish(mut self, outcome: Result<SimulationResult, String>) {
        *self.state.lock() = match outcome {
            Ok(result) => RunState::Succeeded(result),
            Err(message) => RunState::Failed(message),
        };
        self.finished = true;
    }
}

impl Drop for RunTicket<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock() = RunState::Idle;
        }
    }
}

/// Runs simulations, one at a time
pub struct SimulationRunner {
    simulator: Simulator,
    state: Mutex<RunState>,
}

impl SimulationRunner {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            simulator: Simulator::new(config),
            state: Mutex::new(RunState::Idle),
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn state(&self) -> RunState {
        self.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_running()
    }

    /// Enter Running, or None if an invocation is already in flight
    pub fn begin(&self) -> Option<RunTicket<'_>> {
        let mut state = self.state.lock();
        if state.is_running() {
            debug!("Simulation already running");
            return None;
        }
        *state = RunState::Running;
        Some(RunTicket { state: &self.state, finished: false })
    }

    /// Offline run of the active file
    pub fn run(&self, files: &[SourceFile], active_id: &FileId) -> Option<SimulationResult> {
        let ticket = self.begin()?;
        let result = self.simulator.simulate(files, active_id)?;
        info!("Simulated run of {}", active_id);
        ticket.finish(Ok(result.clone()));
        Some(result)
    }

    /// Offline debug report, delivered after the configured delay
    pub async fn debug(&self, files: &[SourceFile], active_id: &FileId) -> Option<SimulationResult> {
        let file = files.iter().find(|f| &f.id == active_id)?;
        let ticket = self.begin()?;

        tokio::time::sleep(self.simulator.config.debug_delay).await;

        let result = SimulationResult::text(debug_report(file));
        info!("Offline debug report ready for {}", file.name);
        ticket.finish(Ok(result.clone()));
        Some(result)
    }

    /// Console closed; drop the last result
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if !state.is_running() {
            *state = RunState::Idle;
        }
    }
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn files() -> Vec<SourceFile> {
        vec![
            SourceFile::with_content("main.py", Language::Python, "def f()\n    pass"),
            SourceFile::with_content("app.js", Language::JavaScript, "console.log('hi')"),
        ]
    }

    fn quick_runner() -> SimulationRunner {
        SimulationRunner::new(SimulatorConfig::default().with_debug_delay(Duration::from_millis(20)))
    }

    #[test]
    fn test_run_transitions() {
        let runner = SimulationRunner::default();
        let files = files();
        assert_eq!(runner.state(), RunState::Idle);

        let result = runner.run(&files, &files[0].id).unwrap();
        assert!(!result.is_markup());
        assert_eq!(runner.state(), RunState::Succeeded(result));

        runner.reset();
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[test]
    fn test_unknown_file_is_noop() {
        let runner = SimulationRunner::default();
        assert_eq!(runner.run(&files(), &FileId::from("missing")), None);
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[test]
    fn test_run_while_running_is_noop() {
        let runner = SimulationRunner::default();
        let files = files();
        let ticket = runner.begin().unwrap();
        assert!(runner.run(&files, &files[1].id).is_none());
        assert!(runner.begin().is_none());
        ticket.finish(Err("backend unavailable".into()));
        assert_eq!(runner.state(), RunState::Failed("backend unavailable".into()));
        assert!(runner.run(&files, &files[1].id).is_some());
    }

    #[test]
    fn test_dropped_ticket_returns_to_idle() {
        let runner = SimulationRunner::default();
        drop(runner.begin());
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_debug_waits_and_reports() {
        let runner = quick_runner();
        let files = files();
        let started = std::time::Instant::now();
        let result = runner.debug(&files, &files[0].id).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(result.body().starts_with("[OFFLINE DEBUGGER]\nFile: main.py\nLanguage: Python"));
        assert!(result.body().contains("Line 1: invalid syntax"));
    }

    #[tokio::test]
    async fn test_second_debug_rejected_while_first_in_flight() {
        let runner = quick_runner();
        let files = files();
        let (first, second) = tokio::join!(
            runner.debug(&files, &files[0].id),
            runner.debug(&files, &files[0].id)
        );
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(!runner.is_running());
    }

    #[test]
    fn test_debug_on_plain_executor() {
        let runner = SimulationRunner::new(SimulatorConfig::default().with_debug_delay(Duration::ZERO));
        let files = files();
        let result = tokio_test::block_on(runner.debug(&files, &files[1].id)).unwrap();
        assert!(result.body().ends_with("✅ No obvious syntax errors detected."));
    }
}
