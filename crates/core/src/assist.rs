//! AI Assistant
//! 
//! Personas, chat history and prompt templating for the hosted model.
//! The model itself is reached through the [`AssistBackend`] trait; this
//! crate ships no client for it.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AIConfig;
use crate::error::Result;
use crate::files::{FileCollection, FileId, Language};

/// Chat personas bound to the active file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotPersona {
    Coder,
    Teacher,
    Companion,
}

impl BotPersona {
    pub const ALL: [BotPersona; 3] = [BotPersona::Coder, BotPersona::Teacher, BotPersona::Companion];

    pub fn display_name(&self) -> &'static str {
        match self {
            BotPersona::Coder => "Nexus Architect",
            BotPersona::Teacher => "Nexus Mentor",
            BotPersona::Companion => "Nexus Spark",
        }
    }

    /// System instruction for this persona while editing `language`
    pub fn system_instruction(&self, language: Language) -> String {
        let base = format!(
            "You are an AI assistant built into a mobile code editing app. \
             The user is currently programming in {}.",
            language
        );
        let persona = match self {
            BotPersona::Coder => {
                "You are 'Nexus Architect', a senior software engineering expert. \
                 Help write, debug, refactor and optimize code. Be precise and technical \
                 and provide complete code solutions. Reason through complex problems \
                 before answering."
            }
            BotPersona::Teacher => {
                "You are 'Nexus Mentor', a patient programming teacher. Use web search \
                 for recent examples or up-to-date documentation when needed. Do not just \
                 write the solution: explain the why and the how, and guide the user to it."
            }
            BotPersona::Companion => {
                "You are 'Nexus Spark', enthusiastic about science, technology, robotics \
                 and the future. Use web search to discuss the latest tech news. Be curious, \
                 friendly and inspiring."
            }
        };
        format!("{} {}", base, persona)
    }

    /// Model settings for this persona
    pub fn profile(&self, config: &AIConfig) -> PersonaProfile {
        match self {
            BotPersona::Coder => PersonaProfile {
                model: config.reasoning_model.clone(),
                thinking_budget: Some(config.chat_thinking_budget),
                web_search: false,
            },
            BotPersona::Teacher | BotPersona::Companion => PersonaProfile {
                model: config.fast_model.clone(),
                thinking_budget: None,
                web_search: true,
            },
        }
    }
}

/// How a persona talks to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaProfile {
    pub model: String,
    pub thinking_budget: Option<u32>,
    pub web_search: bool,
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// A web source cited by a grounded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<GroundingSource>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, text)
    }
}

/// Per-persona conversation logs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    conversations: HashMap<BotPersona, Vec<ChatMessage>>,
}

impl ChatHistory {
    pub fn messages(&self, persona: BotPersona) -> &[ChatMessage] {
        self.conversations
            .get(&persona)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn push(&mut self, persona: BotPersona, message: ChatMessage) {
        self.conversations.entry(persona).or_default().push(message);
    }

    pub fn clear(&mut self, persona: BotPersona) {
        self.conversations.remove(&persona);
    }
}

/// Code analysis flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeAction {
    Debug,
    Improve,
}

/// A chat turn sent to the backend
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub persona: BotPersona,
    pub profile: PersonaProfile,
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
    pub prompt: String,
}

/// A single-shot generation sent to the backend
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub thinking_budget: Option<u32>,
    pub prompt: String,
}

/// Backend reply
#[derive(Debug, Clone, Default)]
pub struct AssistReply {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// The hosted generative model
#[async_trait]
pub trait AssistBackend: Send + Sync {
    async fn chat(&self, api_key: &str, request: ChatRequest) -> Result<AssistReply>;

    async fn generate(&self, api_key: &str, request: GenerateRequest) -> Result<AssistReply>;
}

/// Wrap the user's message with the active file as context
pub fn context_prompt(language: Language, code: &str, user_message: &str) -> String {
    format!(
        "[CURRENT FILE CONTEXT ({lang})]:\n```{lang}\n{code}\n```\n\n[USER MESSAGE]:\n{msg}",
        lang = language,
        code = code,
        msg = user_message
    )
}

/// Prompt for a debug or improve pass over one file
pub fn analyze_prompt(action: AnalyzeAction, language: Language, code: &str) -> String {
    let instruction = match action {
        AnalyzeAction::Debug => format!(
            "Analyze this {} code and find potential errors (syntax, logic, security). \
             If everything looks correct, say so. Otherwise list the problems and propose \
             a corrected version. Be concise.",
            language
        ),
        AnalyzeAction::Improve => format!(
            "Act as a senior expert. Refactor this {} code to make it:\n\
             1. More readable (clean code)\n\
             2. More efficient\n\
             3. More idiomatic\n\
             Briefly explain your changes.",
            language
        ),
    };
    format!("Code:\n```{}\n{}\n```\n\nInstruction: {}", language, code, instruction)
}

/// Prompt asking the model to act as compiler and runtime for the project
pub fn execution_prompt(files: &FileCollection, main: &FileId) -> Option<String> {
    let main = files.get(main)?;
    let project = files
        .iter()
        .map(|f| format!("Filename: {}\nContent:\n{}", f.name, f.content))
        .collect::<Vec<_>>()
        .join("\n---\n");
    Some(format!(
        "Act as a compiler and runtime environment for {lang}.\n\
         Here are the project files:\n{project}\n\n\
         Task:\n\
         1. Compile (simulated) the main file: {name}.\n\
         2. If there are compilation errors, print them like a terminal log.\n\
         3. Otherwise run the code and give me ONLY the console output (stdout/stderr).",
        lang = main.language,
        project = project,
        name = main.name
    ))
}
