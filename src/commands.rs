//! CLI commands for Code Nexus
//! 
//! Command-line access to the simulator, linter and highlighter for
//! automation and scripting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use nexus_core::config::AppConfig;
use nexus_core::files::{FileCollection, Language, SourceFile};
use nexus_core::{JsonFileStore, Orchestrator};
use nexus_simulator::{lint_file, SimulationResult, SimulationRunner, SimulatorConfig};
use tracing::info;

use crate::export::{export_archive, export_file, PROJECT_ARCHIVE_NAME};
use crate::project::ProjectManager;
use crate::session::Session;

/// Read a single source file, detecting its language unless given
fn read_source(path: &Path, language: Option<Language>) -> Result<SourceFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file path: {:?}", path))?;
    let language = match language {
        Some(language) => language,
        None => Language::from_file_name(name)
            .with_context(|| format!("Cannot detect the language of {}; pass --language", name))?,
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    Ok(SourceFile::with_content(name, language, content))
}

/// Load a project and optionally switch to a named file
fn load_project(project_path: &Path, file: Option<&str>) -> Result<FileCollection> {
    let mut files = ProjectManager::new().load(project_path)?;
    if let Some(name) = file {
        let id = files
            .find_by_name(name)
            .map(|f| f.id.clone())
            .with_context(|| format!("No file named {} in {:?}", name, project_path))?;
        files.set_active(&id)?;
    }
    Ok(files)
}

/// Run command options
pub struct RunCommand {
    pub project_path: PathBuf,
    pub file: Option<String>,
}

impl RunCommand {
    /// Simulate running the project's active file
    pub fn execute(&self, config: &AppConfig) -> Result<SimulationResult> {
        let files = load_project(&self.project_path, self.file.as_deref())?;
        info!("Running {}", files.active().name);

        let runner = SimulationRunner::new(SimulatorConfig::from(&config.simulation));
        runner
            .run(files.files(), files.active_id())
            .context("Simulation did not start")
    }
}

/// Lint command options
pub struct LintCommand {
    pub path: PathBuf,
    pub language: Option<Language>,
}

impl LintCommand {
    /// Lint a single file
    pub fn execute(&self) -> Result<String> {
        let file = read_source(&self.path, self.language)?;
        Ok(lint_file(&file.content, file.language))
    }
}

/// Debug command options
pub struct DebugCommand {
    pub path: PathBuf,
    pub language: Option<Language>,
}

impl DebugCommand {
    /// Offline debugger report for a single file
    pub async fn execute(&self, config: &AppConfig) -> Result<String> {
        let file = read_source(&self.path, self.language)?;
        let runner = SimulationRunner::new(SimulatorConfig::from(&config.simulation));
        let files = [file];
        let result = runner
            .debug(&files, &files[0].id)
            .await
            .context("Debugger did not start")?;
        Ok(result.body().to_string())
    }
}

/// Highlight command options
pub struct HighlightCommand {
    pub path: PathBuf,
    pub language: Option<Language>,
}

impl HighlightCommand {
    /// Overlay markup for a single file
    pub fn execute(&self) -> Result<String> {
        let file = read_source(&self.path, self.language)?;
        Ok(nexus_editor::render_highlighted(&file.content, file.language))
    }
}

/// Export command options
pub struct ExportCommand {
    pub project_path: PathBuf,
    pub output: PathBuf,
    /// Export only this file instead of a ZIP of the project
    pub file: Option<String>,
}

impl ExportCommand {
    /// Export a file or the whole project
    pub fn execute(&self) -> Result<PathBuf> {
        let files = load_project(&self.project_path, self.file.as_deref())?;
        let path = if self.file.is_some() {
            export_file(files.active(), &self.output)?
        } else {
            export_archive(files.files(), &self.output.join(PROJECT_ARCHIVE_NAME))?
        };
        info!("Exported to {:?}", path);
        Ok(path)
    }
}

/// New project command options
pub struct NewCommand {
    pub parent: PathBuf,
    pub name: String,
    pub language: Language,
}

impl NewCommand {
    /// Create a project with a starter file
    pub fn execute(&self) -> Result<PathBuf> {
        ProjectManager::new().create(&self.parent, &self.name, self.language)
    }
}

/// Open the persisted editor workspace at the configured snapshot path
pub async fn open_workspace(config: &AppConfig) -> Result<Arc<Orchestrator>> {
    let path = config
        .snapshot_path()
        .context("Cannot determine the snapshot location; set storage.snapshot_path")?;
    info!("Opening workspace snapshot {:?}", path);
    let orchestrator = Orchestrator::new(config.clone(), Arc::new(JsonFileStore::new(path)));
    orchestrator.initialize().await?;
    Ok(Arc::new(orchestrator))
}

/// Persisted workspace command
pub struct WorkspaceCommand {
    pub action: WorkspaceAction,
}

pub enum WorkspaceAction {
    List,
    Add { path: PathBuf, language: Option<Language> },
    Switch { name: String },
    Run,
    SetKey { key: String },
}

impl WorkspaceCommand {
    /// Apply the action to the saved workspace; every change is written back
    pub async fn execute(&self, config: &AppConfig) -> Result<String> {
        let orchestrator = open_workspace(config).await?;

        match &self.action {
            WorkspaceAction::List => {
                let lines: Vec<String> = orchestrator.with_workspace(|ws| {
                    ws.files
                        .files()
                        .iter()
                        .map(|f| {
                            let marker = if &f.id == ws.files.active_id() { '*' } else { ' ' };
                            format!("{} {} ({})", marker, f.name, f.language)
                        })
                        .collect()
                });
                Ok(lines.join("\n"))
            }
            WorkspaceAction::Add { path, language } => {
                let file = read_source(path, *language)?;
                let id = orchestrator.create_file(&file.name, file.language).await?;
                orchestrator.update_file(&id, file.content).await?;
                Ok(format!("Added {}", file.name))
            }
            WorkspaceAction::Switch { name } => {
                let id = orchestrator
                    .with_workspace(|ws| ws.files.find_by_name(name).map(|f| f.id.clone()))
                    .with_context(|| format!("No file named {} in the workspace", name))?;
                orchestrator.switch_file(&id).await?;
                Ok(format!("Active file: {}", name))
            }
            WorkspaceAction::Run => {
                let session = Session::new(orchestrator);
                let result = session.run().await.context("Simulation did not start")?;
                Ok(result.body().to_string())
            }
            WorkspaceAction::SetKey { key } => {
                orchestrator.set_api_key(key.as_str()).await?;
                Ok("API key saved".to_string())
            }
        }
    }
}
