//! Workspace State
//! 
//! The explicit application state: file set, active file, online mode,
//! API key and chat history. Built once at startup from a snapshot and
//! mutated only through the orchestrator's action handlers.

use tracing::info;

use crate::assist::ChatHistory;
use crate::config::AppConfig;
use crate::files::{FileCollection, SourceFile};
use crate::store::Snapshot;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "NEXUS_API_KEY";

/// Editor workspace state
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    /// Files being edited
    pub files: FileCollection,
    /// Route run/debug/chat through the hosted model
    pub online: bool,
    /// Key entered in settings
    pub api_key: Option<String>,
    /// Conversations with the assistant personas
    pub chats: ChatHistory,
}

impl Workspace {
    /// Build the workspace from a persisted snapshot
    pub fn from_snapshot(snapshot: Option<Snapshot>, config: &AppConfig) -> Self {
        let (files, api_key) = match snapshot {
            Some(mut snapshot) => {
                let api_key = snapshot.api_key.take();
                (snapshot.into_collection(), api_key)
            }
            None => (FileCollection::default(), None),
        };
        info!("Workspace ready with {} file(s)", files.len());
        Self {
            files,
            online: config.ai.online_by_default,
            api_key,
            chats: ChatHistory::default(),
        }
    }

    pub fn active_file(&self) -> &SourceFile {
        self.files.active()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            api_key: self.api_key.clone(),
            ..Snapshot::from(&self.files)
        }
    }

    /// Settings key, then configured key, then the environment
    pub fn effective_api_key(&self, config: &AppConfig) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| config.ai.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::Language;

    #[test]
    fn test_from_snapshot() {
        let mut files = FileCollection::default();
        files.create("index.html", Language::Html).unwrap();
        let workspace = Workspace::from_snapshot(Some(Snapshot::from(&files)), &AppConfig::default());
        assert_eq!(workspace.active_file().name, "index.html");
        assert!(!workspace.online);
    }

    #[test]
    fn test_settings_key_wins() {
        let mut config = AppConfig::default();
        config.ai.api_key = Some("from-config".into());
        let mut workspace = Workspace::from_snapshot(None, &config);
        assert_eq!(workspace.effective_api_key(&config).as_deref(), Some("from-config"));

        workspace.api_key = Some("from-settings".into());
        assert_eq!(workspace.effective_api_key(&config).as_deref(), Some("from-settings"));
    }

    #[test]
    fn test_settings_key_survives_snapshot() {
        let mut workspace = Workspace::from_snapshot(None, &AppConfig::default());
        workspace.api_key = Some("saved-key".into());

        let snapshot = workspace.snapshot();
        assert_eq!(snapshot.api_key.as_deref(), Some("saved-key"));

        let restored = Workspace::from_snapshot(Some(snapshot), &AppConfig::default());
        assert_eq!(restored.api_key.as_deref(), Some("saved-key"));
        assert_eq!(restored.active_file().name, "main.py");
    }
}
