//! Editing session
//!
//! Wires the orchestrator, the editor view of the active file and the
//! simulation runner together. Online mode routes run/debug/improve and
//! chat through an [`AssistBackend`].

use std::sync::Arc;

use nexus_core::assist::{
    analyze_prompt, context_prompt, execution_prompt, AnalyzeAction, AssistBackend, AssistReply,
    BotPersona, ChatMessage, ChatRequest, GenerateRequest,
};
use nexus_core::events::Event;
use nexus_core::files::{FileId, Language, SourceFile};
use nexus_core::{NexusError, Orchestrator, Result};
use nexus_editor::{Editor, KeyEvent, KeyOutcome, RenderedView, ScrollOffset, Selection};
use nexus_simulator::{SimulationResult, SimulationRunner, SimulatorConfig};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Header of an online debug report
pub const AI_DEBUG_HEADER: &str = "[AI DEBUG REPORT]";
/// Header of online improvement suggestions
pub const IMPROVE_HEADER: &str = "[IMPROVEMENT SUGGESTIONS]";

/// One user's editing session
pub struct Session {
    orchestrator: Arc<Orchestrator>,
    runner: SimulationRunner,
    backend: Option<Arc<dyn AssistBackend>>,
    editor: Mutex<Option<Editor>>,
    console: Mutex<Option<SimulationResult>>,
}

impl Session {
    /// Create a session over an initialized orchestrator
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let config = SimulatorConfig::from(&orchestrator.config().simulation);
        Self {
            orchestrator,
            runner: SimulationRunner::new(config),
            backend: None,
            editor: Mutex::new(None),
            console: Mutex::new(None),
        }
    }

    /// Use a hosted model for online mode
    pub fn with_backend(mut self, backend: Arc<dyn AssistBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn runner(&self) -> &SimulationRunner {
        &self.runner
    }

    /// What the console panel currently shows
    pub fn console(&self) -> Option<SimulationResult> {
        self.console.lock().clone()
    }

    /// Close the console and discard its result
    pub fn close_console(&self) {
        self.console.lock().take();
        self.runner.reset();
        self.orchestrator.event_bus().emit(Event::ConsoleClosed);
    }

    // Editor

    fn with_editor<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> R {
        let active = self.orchestrator.active_file();
        let mut slot = self.editor.lock();

        if slot.as_ref().is_some_and(|editor| editor.file_id() != &active.id) {
            *slot = None;
        }
        let editor = slot.get_or_insert_with(|| Editor::open(&active, &self.orchestrator.config().editor));
        if editor.language() != active.language {
            editor.set_language(active.language);
        }
        if editor.content() != active.content {
            editor.reload(&active.content);
        }
        f(editor)
    }

    /// Feed a key to the editor; content changes are written back to the file
    pub async fn handle_key(&self, key: KeyEvent) -> Result<KeyOutcome> {
        let (id, outcome, changed) = self.with_editor(|editor| {
            let (outcome, changed) = editor.handle_key(key);
            (editor.file_id().clone(), outcome, changed.then(|| editor.content()))
        });

        if let Some(content) = changed {
            self.orchestrator.update_file(&id, content).await?;
        }
        Ok(outcome)
    }

    pub fn select(&self, selection: Selection) {
        self.with_editor(|editor| editor.select(selection));
    }

    /// The input layer scrolled
    pub fn scroll(&self, scroll_top: f64, scroll_left: f64) -> ScrollOffset {
        self.with_editor(|editor| editor.sync_scroll(scroll_top, scroll_left))
    }

    pub fn render(&self) -> RenderedView {
        self.with_editor(|editor| editor.render())
    }

    // Run / debug / improve

    fn show(&self, result: &SimulationResult) {
        *self.console.lock() = Some(result.clone());
    }

    fn online_key(&self) -> Option<String> {
        self.orchestrator.is_online().then(|| self.orchestrator.api_key()).flatten()
    }

    /// Run the active file; None when nothing was started
    pub async fn run(&self) -> Option<SimulationResult> {
        let workspace = self.orchestrator.workspace();
        let file = workspace.active_file().clone();
        let ticket = self.runner.begin()?;
        self.orchestrator.event_bus().emit(Event::RunStarted(file.id.clone()));

        let offline = !self.orchestrator.is_online()
            || matches!(file.language, Language::Html | Language::JavaScript);

        let result = if offline {
            let result = self.runner.simulator().simulate(workspace.files.files(), &file.id)?;
            ticket.finish(Ok(result.clone()));
            result
        } else {
            let outcome = match execution_prompt(&workspace.files, &file.id) {
                Some(prompt) => {
                    let config = self.orchestrator.config();
                    let request = GenerateRequest {
                        model: config.ai.fast_model.clone(),
                        thinking_budget: None,
                        prompt,
                    };
                    self.generate(request).await.map(|reply| reply.text)
                }
                None => Err(NexusError::NotFound(file.id.to_string())),
            };
            let result = SimulationResult::text(display_outcome(&outcome, None));
            ticket.finish(outcome.map(|_| result.clone()).map_err(|e| e.user_message()));
            result
        };

        self.finish(&file, &result);
        Some(result)
    }

    /// Debug the active file: offline lint report or online analysis
    pub async fn debug(&self) -> Option<SimulationResult> {
        let workspace = self.orchestrator.workspace();
        let file = workspace.active_file().clone();

        let result = if !self.orchestrator.is_online() {
            self.runner.debug(workspace.files.files(), &file.id).await?
        } else {
            let ticket = self.runner.begin()?;
            let outcome = self.analyze(AnalyzeAction::Debug, &file).await;
            let result = SimulationResult::text(display_outcome(&outcome, Some(AI_DEBUG_HEADER)));
            ticket.finish(outcome.map(|_| result.clone()).map_err(|e| e.user_message()));
            result
        };

        self.finish(&file, &result);
        Some(result)
    }

    /// Improvement suggestions; online only and needs an API key
    pub async fn improve(&self) -> Result<Option<SimulationResult>> {
        if !self.orchestrator.is_online() {
            return Err(NexusError::InvalidInput("improve is only available in online mode".into()));
        }
        if self.online_key().is_none() {
            return Err(NexusError::MissingApiKey);
        }
        let file = self.orchestrator.active_file();
        let Some(ticket) = self.runner.begin() else {
            return Ok(None);
        };

        let outcome = self.analyze(AnalyzeAction::Improve, &file).await;
        let result = SimulationResult::text(display_outcome(&outcome, Some(IMPROVE_HEADER)));
        ticket.finish(outcome.map(|_| result.clone()).map_err(|e| e.user_message()));

        self.finish(&file, &result);
        Ok(Some(result))
    }

    fn finish(&self, file: &SourceFile, result: &SimulationResult) {
        self.show(result);
        let success = !matches!(self.runner.state(), nexus_simulator::RunState::Failed(_));
        info!("Run of {} finished (success: {})", file.name, success);
        self.orchestrator
            .event_bus()
            .emit(Event::RunCompleted { id: file.id.clone(), success });
    }

    async fn analyze(&self, action: AnalyzeAction, file: &SourceFile) -> Result<String> {
        let config = self.orchestrator.config();
        let request = GenerateRequest {
            model: config.ai.reasoning_model.clone(),
            thinking_budget: Some(config.ai.analysis_thinking_budget),
            prompt: analyze_prompt(action, file.language, &file.content),
        };
        self.generate(request).await.map(|reply| reply.text)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<AssistReply> {
        let key = self.online_key().ok_or(NexusError::MissingApiKey)?;
        let backend = self.backend()?;
        backend.generate(&key, request).await
    }

    fn backend(&self) -> Result<Arc<dyn AssistBackend>> {
        self.backend
            .clone()
            .ok_or_else(|| NexusError::Assist("no assistant backend configured".into()))
    }

    // Chat

    /// Send a message to a persona with the active file as context
    pub async fn send_chat(&self, persona: BotPersona, text: &str) -> Result<ChatMessage> {
        let key = self.orchestrator.api_key().ok_or(NexusError::MissingApiKey)?;
        let backend = self.backend()?;
        let file = self.orchestrator.active_file();
        let config = self.orchestrator.config();

        let request = ChatRequest {
            persona,
            profile: persona.profile(&config.ai),
            system_instruction: persona.system_instruction(file.language),
            history: self.orchestrator.chat_messages(persona),
            prompt: context_prompt(file.language, &file.content, text),
        };
        self.orchestrator.push_chat(persona, ChatMessage::user(text));

        let reply = match backend.chat(&key, request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat with {} failed: {}", persona.display_name(), e);
                self.orchestrator.push_chat(persona, ChatMessage::model(e.user_message()));
                return Err(e);
            }
        };

        let mut message = ChatMessage::model(reply.text);
        message.sources = reply.sources;
        self.orchestrator.push_chat(persona, message.clone());
        Ok(message)
    }

    /// Switch files; the editor follows on its next use
    pub async fn open_file(&self, id: &FileId) -> Result<()> {
        self.orchestrator.switch_file(id).await
    }
}

fn display_outcome(outcome: &Result<String>, header: Option<&str>) -> String {
    match (outcome, header) {
        (Ok(text), Some(header)) => format!("{}\n\n{}", header, text),
        (Ok(text), None) => text.clone(),
        (Err(e), _) => e.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nexus_core::assist::GroundingSource;
    use nexus_core::config::AppConfig;
    use nexus_core::store::{MemoryStore, Snapshot};
    use nexus_simulator::RunState;

    /// Echoes prompts back and records the key it saw
    struct EchoBackend {
        keys: Mutex<Vec<String>>,
    }

    impl EchoBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self { keys: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl AssistBackend for EchoBackend {
        async fn chat(&self, api_key: &str, request: ChatRequest) -> Result<AssistReply> {
            self.keys.lock().push(api_key.to_string());
            Ok(AssistReply {
                text: format!("{} heard {} earlier message(s)", request.persona.display_name(), request.history.len()),
                sources: vec![GroundingSource { uri: "https://example.org".into(), title: "Example".into() }],
            })
        }

        async fn generate(&self, api_key: &str, request: GenerateRequest) -> Result<AssistReply> {
            self.keys.lock().push(api_key.to_string());
            Ok(AssistReply { text: format!("model {}", request.model), sources: Vec::new() })
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl AssistBackend for FailingBackend {
        async fn chat(&self, _: &str, _: ChatRequest) -> Result<AssistReply> {
            Err(NexusError::Assist("quota exceeded".into()))
        }

        async fn generate(&self, _: &str, _: GenerateRequest) -> Result<AssistReply> {
            Err(NexusError::Assist("quota exceeded".into()))
        }
    }

    async fn session_with(files: Vec<SourceFile>) -> Session {
        let mut config = AppConfig::default();
        config.simulation.debug_delay_ms = 10;
        config.ai.api_key = None;
        let snapshot = Snapshot { active_file_id: Some(files[0].id.clone()), files, api_key: None };
        let orchestrator = Orchestrator::new(config, Arc::new(MemoryStore::with_snapshot(snapshot)));
        orchestrator.initialize().await.unwrap();
        Session::new(Arc::new(orchestrator))
    }

    fn python(content: &str) -> SourceFile {
        SourceFile::with_content("main.py", Language::Python, content)
    }

    #[tokio::test]
    async fn test_offline_run_shows_transcript() {
        let session = session_with(vec![python("print('hi')")]).await;
        let result = session.run().await.unwrap();
        assert!(result.body().contains("Target: Python"));
        assert_eq!(session.console(), Some(result));

        session.close_console();
        assert_eq!(session.console(), None);
        assert_eq!(session.runner().state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_run_is_noop_while_running() {
        let session = session_with(vec![python("x = 1")]).await;
        let ticket = session.runner().begin().unwrap();
        assert!(session.run().await.is_none());
        assert!(session.debug().await.is_none());
        drop(ticket);
        assert!(session.run().await.is_some());
    }

    #[tokio::test]
    async fn test_skipped_run_announces_nothing() {
        let session = session_with(vec![python("x = 1")]).await;
        let events = session.orchestrator().event_bus().subscribe();

        let ticket = session.runner().begin().unwrap();
        assert!(session.run().await.is_none());
        assert!(!events.drain().iter().any(|e| matches!(e, Event::RunStarted(_))));
        drop(ticket);

        session.run().await.unwrap();
        let received = events.drain();
        assert!(received.iter().any(|e| matches!(e, Event::RunStarted(_))));
        assert!(received.iter().any(|e| matches!(e, Event::RunCompleted { success: true, .. })));
    }

    #[tokio::test]
    async fn test_offline_debug_report() {
        let session = session_with(vec![python("def foo()\n    pass")]).await;
        let result = session.debug().await.unwrap();
        assert!(result.body().starts_with("[OFFLINE DEBUGGER]\nFile: main.py"));
        assert!(result.body().contains("Line 1: invalid syntax"));
    }

    #[tokio::test]
    async fn test_html_runs_offline_even_when_online() {
        let page = SourceFile::with_content("index.html", Language::Html, "<head></head><body></body>");
        let session = session_with(vec![page]).await.with_backend(EchoBackend::new());
        session.orchestrator().set_online_mode(true);
        let result = session.run().await.unwrap();
        assert!(result.is_markup());
    }

    #[tokio::test]
    async fn test_online_without_key_reports_missing_key() {
        let session = session_with(vec![python("x = 1")]).await.with_backend(EchoBackend::new());
        session.orchestrator().set_online_mode(true);
        if session.orchestrator().api_key().is_some() {
            // A key in the environment makes this scenario unreachable
            return;
        }
        let result = session.run().await.unwrap();
        assert_eq!(result.body(), NexusError::MissingApiKey.user_message());
        assert!(matches!(session.runner().state(), RunState::Failed(_)));
        assert!(matches!(session.improve().await, Err(NexusError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_online_debug_and_improve() {
        let backend = EchoBackend::new();
        let session = session_with(vec![python("x = 1")]).await.with_backend(backend.clone());
        session.orchestrator().set_online_mode(true);
        session.orchestrator().set_api_key("k-123").await.unwrap();

        let debug = session.debug().await.unwrap();
        assert_eq!(debug.body(), "[AI DEBUG REPORT]\n\nmodel gemini-3-pro-preview");

        let improve = session.improve().await.unwrap().unwrap();
        assert!(improve.body().starts_with("[IMPROVEMENT SUGGESTIONS]\n\n"));

        let run = session.run().await.unwrap();
        assert_eq!(run.body(), "model gemini-2.5-flash");
        assert_eq!(*backend.keys.lock(), vec!["k-123"; 3]);
    }

    #[tokio::test]
    async fn test_backend_failure_marks_run_failed() {
        let session = session_with(vec![python("x = 1")]).await.with_backend(Arc::new(FailingBackend));
        session.orchestrator().set_online_mode(true);
        session.orchestrator().set_api_key("k").await.unwrap();
        let result = session.debug().await.unwrap();
        assert!(result.body().contains("quota exceeded"));
        assert!(matches!(session.runner().state(), RunState::Failed(_)));
    }

    #[tokio::test]
    async fn test_improve_requires_online() {
        let session = session_with(vec![python("x = 1")]).await;
        assert!(matches!(session.improve().await, Err(NexusError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_keys_update_active_file() {
        let session = session_with(vec![python("if x:")]).await;
        session.select(Selection::caret(5));
        assert_eq!(session.handle_key(KeyEvent::Enter).await.unwrap(), KeyOutcome::Handled);
        assert_eq!(session.handle_key(KeyEvent::Tab).await.unwrap(), KeyOutcome::Handled);
        assert_eq!(session.orchestrator().active_file().content, "if x:\n    ");

        let view = session.render();
        assert_eq!(view.gutter, Some(vec![1, 2]));
        assert_eq!(session.scroll(12.0, 0.0), ScrollOffset::new(12.0, 0.0));
    }

    #[tokio::test]
    async fn test_editor_follows_active_file() {
        let other = SourceFile::with_content("app.js", Language::JavaScript, "let a;");
        let other_id = other.id.clone();
        let session = session_with(vec![python("x"), other]).await;
        session.select(Selection::caret(1));

        session.open_file(&other_id).await.unwrap();
        session.select(Selection::caret(6));
        session.handle_key(KeyEvent::Char('!')).await.unwrap();
        assert_eq!(session.orchestrator().active_file().content, "let a;!");
    }

    #[tokio::test]
    async fn test_chat_keeps_history() {
        let session = session_with(vec![python("x = 1")]).await.with_backend(EchoBackend::new());
        session.orchestrator().set_api_key("key").await.unwrap();

        let first = session.send_chat(BotPersona::Teacher, "hello").await.unwrap();
        assert_eq!(first.text, "Nexus Mentor heard 0 earlier message(s)");
        assert_eq!(first.sources.len(), 1);

        let second = session.send_chat(BotPersona::Teacher, "again").await.unwrap();
        assert_eq!(second.text, "Nexus Mentor heard 2 earlier message(s)");
        assert_eq!(session.orchestrator().chat_messages(BotPersona::Teacher).len(), 4);
        assert!(session.orchestrator().chat_messages(BotPersona::Coder).is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_recorded() {
        let session = session_with(vec![python("x")]).await.with_backend(Arc::new(FailingBackend));
        session.orchestrator().set_api_key("key").await.unwrap();
        assert!(session.send_chat(BotPersona::Coder, "hi").await.is_err());
        let messages = session.orchestrator().chat_messages(BotPersona::Coder);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].text.contains("quota exceeded"));
    }
}
