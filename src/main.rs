//! Code Nexus - command-line entry point
//! 
//! Initializes logging and configuration, then runs one command
//! against a project directory or a single file.

use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use code_nexus::commands::{
    DebugCommand, ExportCommand, HighlightCommand, LintCommand, NewCommand, RunCommand,
    WorkspaceAction, WorkspaceCommand,
};
use code_nexus::core::{config::AppConfig, Language, APP_NAME, VERSION};
use code_nexus::simulator::PREVIEW_SANDBOX;

#[derive(Parser)]
#[command(name = "code-nexus", version, about = "Code editor core with offline run simulation")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate running the active file of a project
    Run {
        #[arg(default_value = ".")]
        project: PathBuf,
        /// File to run instead of the remembered active file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Lint a single file
    Lint {
        path: PathBuf,
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Offline debugger report for a single file
    Debug {
        path: PathBuf,
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Print overlay markup for a single file
    Highlight {
        path: PathBuf,
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Export a project as ZIP, or one of its files
    Export {
        #[arg(default_value = ".")]
        project: PathBuf,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Create a project with a starter file
    New {
        name: String,
        #[arg(short, long, default_value = "Python")]
        language: Language,
        #[arg(long, default_value = ".")]
        parent: PathBuf,
    },
    /// Work with the saved editor workspace
    Workspace {
        #[command(subcommand)]
        action: WorkspaceCli,
    },
}

#[derive(Subcommand)]
enum WorkspaceCli {
    /// List files; the active one is marked with *
    List,
    /// Copy a file from disk into the workspace and make it active
    Add {
        path: PathBuf,
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Make a file active
    Switch { name: String },
    /// Run the active file
    Run,
    /// Save the API key used in online mode
    SetKey { key: String },
}

impl From<WorkspaceCli> for WorkspaceAction {
    fn from(action: WorkspaceCli) -> Self {
        match action {
            WorkspaceCli::List => WorkspaceAction::List,
            WorkspaceCli::Add { path, language } => WorkspaceAction::Add { path, language },
            WorkspaceCli::Switch { name } => WorkspaceAction::Switch { name },
            WorkspaceCli::Run => WorkspaceAction::Run,
            WorkspaceCli::SetKey { key } => WorkspaceAction::SetKey { key },
        }
    }
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "warn" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{} starting...", APP_NAME, VERSION);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };

    let Some(command) = cli.command else {
        println!("{} v{}", APP_NAME, VERSION);
        println!("Commands: run, lint, debug, highlight, export, new, workspace (see --help)");
        return Ok(());
    };

    match command {
        Command::Run { project, file } => {
            let result = RunCommand { project_path: project, file }.execute(&config)?;
            if result.is_markup() {
                eprintln!("(markup preview; render in a frame with sandbox=\"{}\")", PREVIEW_SANDBOX);
            }
            println!("{}", result.body());
        }
        Command::Lint { path, language } => {
            println!("{}", LintCommand { path, language }.execute()?);
        }
        Command::Debug { path, language } => {
            println!("{}", DebugCommand { path, language }.execute(&config).await?);
        }
        Command::Highlight { path, language } => {
            println!("{}", HighlightCommand { path, language }.execute()?);
        }
        Command::Export { project, output, file } => {
            let path = ExportCommand { project_path: project, output, file }.execute()?;
            println!("{}", path.display());
        }
        Command::New { name, language, parent } => {
            let path = NewCommand { parent, name, language }.execute()?;
            println!("Created {}", path.display());
        }
        Command::Workspace { action } => {
            let output = WorkspaceCommand { action: action.into() }.execute(&config).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
