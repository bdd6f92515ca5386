//! Code Nexus Core - state and shared types
//! 
//! This crate holds the editor's explicit application state (the file
//! collection, online mode, chat history), its configuration, the
//! snapshot persistence seam and the prompt templates for the hosted
//! assistant.

pub mod orchestrator;
pub mod config;
pub mod files;
pub mod events;
pub mod error;
pub mod workspace;
pub mod store;
pub mod assist;

pub use orchestrator::{AppState, Orchestrator};
pub use config::AppConfig;
pub use files::{FileCollection, FileId, Language, SourceFile};
pub use events::{Event, EventBus};
pub use error::{NexusError, Result};
pub use workspace::Workspace;
pub use store::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use assist::{AssistBackend, BotPersona, ChatMessage};

/// Code Nexus version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Code Nexus";
