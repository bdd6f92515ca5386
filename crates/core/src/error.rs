//! Error types for Code Nexus
//! 
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for Code Nexus
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("A file named '{0}' already exists")]
    DuplicateFileName(String),

    #[error("The last remaining file cannot be deleted")]
    LastFile,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Assistant error: {0}")]
    Assist(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Code Nexus operations
pub type Result<T> = std::result::Result<T, NexusError>;

impl NexusError {
    /// Whether the user can fix this by editing their input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            NexusError::InvalidFileName(_)
                | NexusError::DuplicateFileName(_)
                | NexusError::LastFile
                | NexusError::MissingApiKey
                | NexusError::InvalidInput(_)
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NexusError::Io(e) => format!("File operation failed: {}", e),
            NexusError::InvalidFileName(_) => {
                "Allowed characters: letters, digits, '.', '-', '_'".to_string()
            }
            NexusError::DuplicateFileName(_) => "A file with this name already exists.".to_string(),
            NexusError::LastFile => "You must keep at least one file.".to_string(),
            NexusError::MissingApiKey => {
                "Error: missing API key. Add one in Settings.".to_string()
            }
            NexusError::Assist(msg) => format!("AI connection error or quota exceeded: {}", msg),
            NexusError::NotFound(msg) => format!("Not found: {}", msg),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        assert!(NexusError::LastFile.is_user_error());
        assert!(!NexusError::Internal("boom".into()).is_user_error());
        assert_eq!(NexusError::LastFile.user_message(), "You must keep at least one file.");
    }
}
