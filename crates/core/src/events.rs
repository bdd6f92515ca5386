//! Event System
//! 
//! Provides a pub/sub event bus for inter-component communication.

use parking_lot::RwLock;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::assist::BotPersona;
use crate::files::{FileId, Language};
use crate::orchestrator::AppState;

/// Events that can be emitted throughout the editor
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Application state changed
    StateChanged(AppState),
    /// Configuration changed
    ConfigChanged,
    /// File created
    FileCreated(FileId),
    /// File content changed
    FileModified(FileId),
    /// File renamed
    FileRenamed { id: FileId, name: String },
    /// File language changed
    LanguageChanged { id: FileId, language: Language },
    /// File deleted
    FileDeleted(FileId),
    /// Active file switched
    ActiveFileChanged(FileId),
    /// Snapshot written to the store
    SnapshotSaved,
    /// Online mode toggled
    OnlineModeChanged(bool),
    /// Run or debug started on a file
    RunStarted(FileId),
    /// Run or debug finished
    RunCompleted { id: FileId, success: bool },
    /// Console panel closed
    ConsoleClosed,
    /// Chat message appended
    ChatUpdated(BotPersona),
    /// Error occurred
    Error { message: String, details: Option<String> },
    /// Application shutdown
    Shutdown,
}

/// Subscriber handle for receiving events
#[derive(Clone)]
pub struct EventSubscription {
    receiver: Receiver<Event>,
}

impl EventSubscription {
    /// Receive the next event (blocking)
    pub fn recv(&self) -> Result<Event, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Result<Event, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything queued so far
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }
}

/// Event bus for publish/subscribe pattern
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<Event>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        EventSubscription { receiver }
    }

    /// Emit an event to all subscribers, forgetting the ones that hung up
    pub fn emit(&self, event: Event) -> usize {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        let delivered = subscribers.len();

        debug!("Event {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    /// Get the number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
