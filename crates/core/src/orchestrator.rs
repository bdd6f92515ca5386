//! Application Orchestrator
//! 
//! Central coordinator for the editor, managing:
//! - Application lifecycle
//! - The workspace state and its action handlers
//! - Snapshot persistence after every file change
//! - Event emission

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{info, debug};

use crate::{
    assist::{BotPersona, ChatMessage},
    config::AppConfig,
    events::{Event, EventBus},
    files::{FileId, Language, SourceFile},
    store::{Snapshot, SnapshotStore},
    workspace::Workspace,
    error::Result,
};

/// Application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial startup
    Initializing,
    /// Ready for user interaction
    Ready,
    /// Shutting down
    ShuttingDown,
}

/// Main orchestrator for the editor
pub struct Orchestrator {
    /// Current application state
    state: Arc<RwLock<AppState>>,
    /// Application configuration
    config: Arc<RwLock<AppConfig>>,
    /// Event bus for inter-component communication
    event_bus: Arc<EventBus>,
    /// Files, mode and chat state
    workspace: Arc<RwLock<Workspace>>,
    /// Where snapshots go
    store: Arc<dyn SnapshotStore>,
}

impl Orchestrator {
    /// Create a new orchestrator instance
    pub fn new(config: AppConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::Initializing)),
            config: Arc::new(RwLock::new(config)),
            event_bus: Arc::new(EventBus::new()),
            workspace: Arc::new(RwLock::new(Workspace::default())),
            store,
        }
    }

    /// Load the persisted snapshot and become ready
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing Code Nexus orchestrator...");

        let snapshot = self.store.load().await?;
        let workspace = Workspace::from_snapshot(snapshot, &self.config.read());
        *self.workspace.write() = workspace;

        self.set_state(AppState::Ready);
        info!("Orchestrator initialized successfully");
        Ok(())
    }

    /// Get current application state
    pub fn state(&self) -> AppState {
        self.state.read().clone()
    }

    /// Set application state
    pub fn set_state(&self, state: AppState) {
        let mut current = self.state.write();
        debug!("State transition: {:?} -> {:?}", *current, state);
        *current = state.clone();
        
        // Emit state change event
        let _ = self.event_bus.emit(Event::StateChanged(state));
    }

    /// Get the event bus for subscribing to events
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Get current configuration
    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Update configuration
    pub fn update_config<F>(&self, updater: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write();
        updater(&mut config);
        let _ = self.event_bus.emit(Event::ConfigChanged);
    }

    /// Read the workspace without cloning it
    pub fn with_workspace<R>(&self, reader: impl FnOnce(&Workspace) -> R) -> R {
        reader(&self.workspace.read())
    }

    /// Clone of the current workspace
    pub fn workspace(&self) -> Workspace {
        self.workspace.read().clone()
    }

    /// Clone of the active file
    pub fn active_file(&self) -> SourceFile {
        self.workspace.read().active_file().clone()
    }

    /// Create a file and make it active
    pub async fn create_file(&self, name: &str, language: Language) -> Result<FileId> {
        let (id, snapshot) = {
            let mut ws = self.workspace.write();
            let id = ws.files.create(name, language)?.id.clone();
            (id, ws.snapshot())
        };
        self.event_bus.emit(Event::FileCreated(id.clone()));
        self.event_bus.emit(Event::ActiveFileChanged(id.clone()));
        self.persist(snapshot).await?;
        Ok(id)
    }

    /// Replace a file's content (one keystroke's worth of edit)
    pub async fn update_file(&self, id: &FileId, content: impl Into<String>) -> Result<()> {
        let snapshot = {
            let mut ws = self.workspace.write();
            ws.files.update_content(id, content)?;
            ws.snapshot()
        };
        self.event_bus.emit(Event::FileModified(id.clone()));
        self.persist(snapshot).await
    }

    /// Delete a file; rejected when it is the last one
    pub async fn delete_file(&self, id: &FileId) -> Result<()> {
        let (active, snapshot) = {
            let mut ws = self.workspace.write();
            ws.files.delete(id)?;
            (ws.files.active_id().clone(), ws.snapshot())
        };
        self.event_bus.emit(Event::FileDeleted(id.clone()));
        self.event_bus.emit(Event::ActiveFileChanged(active));
        self.persist(snapshot).await
    }

    /// Rename a file
    pub async fn rename_file(&self, id: &FileId, new_name: &str) -> Result<()> {
        let (name, snapshot) = {
            let mut ws = self.workspace.write();
            ws.files.rename(id, new_name)?;
            let name = ws.files.get(id).map(|f| f.name.clone()).unwrap_or_default();
            (name, ws.snapshot())
        };
        self.event_bus.emit(Event::FileRenamed { id: id.clone(), name });
        self.persist(snapshot).await
    }

    /// Change a file's language
    pub async fn change_language(&self, id: &FileId, language: Language) -> Result<()> {
        let snapshot = {
            let mut ws = self.workspace.write();
            ws.files.change_language(id, language)?;
            ws.snapshot()
        };
        self.event_bus.emit(Event::LanguageChanged { id: id.clone(), language });
        self.persist(snapshot).await
    }

    /// Switch the active file
    pub async fn switch_file(&self, id: &FileId) -> Result<()> {
        let snapshot = {
            let mut ws = self.workspace.write();
            ws.files.set_active(id)?;
            ws.snapshot()
        };
        self.event_bus.emit(Event::ActiveFileChanged(id.clone()));
        self.persist(snapshot).await
    }

    /// Toggle online mode
    pub fn set_online_mode(&self, online: bool) {
        self.workspace.write().online = online;
        info!("Online mode {}", if online { "enabled" } else { "disabled" });
        self.event_bus.emit(Event::OnlineModeChanged(online));
    }

    pub fn is_online(&self) -> bool {
        self.workspace.read().online
    }

    /// Store the API key entered in settings and persist it
    pub async fn set_api_key(&self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        let snapshot = {
            let mut workspace = self.workspace.write();
            workspace.api_key = if key.trim().is_empty() { None } else { Some(key) };
            workspace.snapshot()
        };
        self.persist(snapshot).await
    }

    /// Key used for backend calls, if any
    pub fn api_key(&self) -> Option<String> {
        let config = self.config.read();
        self.workspace.read().effective_api_key(&config)
    }

    /// Append a message to a persona's conversation
    pub fn push_chat(&self, persona: BotPersona, message: ChatMessage) {
        self.workspace.write().chats.push(persona, message);
        self.event_bus.emit(Event::ChatUpdated(persona));
    }

    pub fn chat_messages(&self, persona: BotPersona) -> Vec<ChatMessage> {
        self.workspace.read().chats.messages(persona).to_vec()
    }

    pub fn clear_chat(&self, persona: BotPersona) {
        self.workspace.write().chats.clear(persona);
        self.event_bus.emit(Event::ChatUpdated(persona));
    }

    /// Shutdown the orchestrator
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down orchestrator...");
        self.set_state(AppState::ShuttingDown);

        let snapshot = self.workspace.read().snapshot();
        self.persist(snapshot).await?;

        let _ = self.event_bus.emit(Event::Shutdown);
        info!("Orchestrator shutdown complete");
        Ok(())
    }

    async fn persist(&self, snapshot: Snapshot) -> Result<()> {
        self.store.save(&snapshot).await?;
        self.event_bus.emit(Event::SnapshotSaved);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NexusError;
    use crate::store::{JsonFileStore, MemoryStore};

    async fn ready(store: Arc<MemoryStore>) -> Orchestrator {
        let orchestrator = Orchestrator::new(AppConfig::default(), store);
        orchestrator.initialize().await.unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_orchestrator_lifecycle() {
        let orchestrator = Orchestrator::new(AppConfig::default(), Arc::new(MemoryStore::new()));
        assert_eq!(orchestrator.state(), AppState::Initializing);

        orchestrator.initialize().await.unwrap();
        assert_eq!(orchestrator.state(), AppState::Ready);
        assert_eq!(orchestrator.active_file().name, "main.py");
    }

    #[tokio::test]
    async fn test_every_change_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = ready(Arc::clone(&store)).await;

        let id = orchestrator.create_file("app.js", Language::JavaScript).await.unwrap();
        orchestrator.update_file(&id, "console.log(1)").await.unwrap();
        assert_eq!(store.save_count(), 2);

        let saved = store.current().unwrap();
        assert_eq!(saved.active_file_id, Some(id));
        assert_eq!(saved.files[1].content, "console.log(1)");
    }

    #[tokio::test]
    async fn test_restores_from_store() {
        let store = Arc::new(MemoryStore::new());
        {
            let first = ready(Arc::clone(&store)).await;
            first.create_file("style.css", Language::Css).await.unwrap();
        }
        let second = ready(store).await;
        assert_eq!(second.active_file().name, "style.css");
        assert_eq!(second.workspace().files.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_last_file_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = ready(Arc::clone(&store)).await;
        let id = orchestrator.active_file().id;

        let err = orchestrator.delete_file(&id).await.unwrap_err();
        assert!(matches!(err, NexusError::LastFile));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let orchestrator = ready(Arc::new(MemoryStore::new())).await;
        let events = orchestrator.event_bus().subscribe();

        let id = orchestrator.create_file("page.html", Language::Html).await.unwrap();
        let received = events.drain();
        assert!(received.contains(&Event::FileCreated(id.clone())));
        assert!(received.contains(&Event::ActiveFileChanged(id)));
        assert!(received.contains(&Event::SnapshotSaved));
    }

    #[tokio::test]
    async fn test_chat_and_online_mode() {
        let orchestrator = ready(Arc::new(MemoryStore::new())).await;
        assert!(!orchestrator.is_online());
        orchestrator.set_online_mode(true);
        assert!(orchestrator.is_online());

        orchestrator.push_chat(BotPersona::Teacher, ChatMessage::user("what is a pointer?"));
        assert_eq!(orchestrator.chat_messages(BotPersona::Teacher).len(), 1);
        orchestrator.clear_chat(BotPersona::Teacher);
        assert!(orchestrator.chat_messages(BotPersona::Teacher).is_empty());

        orchestrator.set_api_key("   ").await.unwrap();
        orchestrator.update_config(|c| c.ai.api_key = Some("cfg-key".into()));
        assert_eq!(orchestrator.api_key().as_deref(), Some("cfg-key"));
    }

    #[tokio::test]
    async fn test_api_key_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");

        let first = Orchestrator::new(AppConfig::default(), Arc::new(JsonFileStore::new(&path)));
        first.initialize().await.unwrap();
        first.set_api_key("k-restart").await.unwrap();
        drop(first);

        let second = Orchestrator::new(AppConfig::default(), Arc::new(JsonFileStore::new(&path)));
        second.initialize().await.unwrap();
        assert_eq!(second.api_key().as_deref(), Some("k-restart"));
        assert_eq!(second.workspace().api_key.as_deref(), Some("k-restart"));
    }
}
