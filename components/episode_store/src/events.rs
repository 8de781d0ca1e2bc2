//! Notifications published by the store
//!
//! Every recorded mark, measure and `done` is broadcast so that several
//! observers (the host page, analytics vendors, developer tools) can follow
//! the same episodes.

use parking_lot::Mutex;
use std::fmt;

/// Something that happened to the episode store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeEvent {
    /// A mark was written
    Mark {
        /// Mark name
        name: String,
        /// Epoch milliseconds
        time: i64,
    },
    /// An episode was measured
    Measure {
        /// Episode name
        name: String,
        /// Resolved start
        start: i64,
        /// Resolved end
        end: i64,
    },
    /// The page declared its episodes complete
    Done,
}

impl fmt::Display for EpisodeEvent {
    /// Cross-window message form, e.g. `EPISODES:mark:onload:1700000000000`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeEvent::Mark { name, time } => write!(f, "EPISODES:mark:{}:{}", name, time),
            EpisodeEvent::Measure { name, start, end } => {
                write!(f, "EPISODES:measure:{}:{}:{}", name, start, end)
            }
            EpisodeEvent::Done => write!(f, "EPISODES:done"),
        }
    }
}

/// Receiver of [`EpisodeEvent`]s
pub trait EpisodeListener: Send + Sync {
    /// Called synchronously after the store has been updated
    fn on_event(&self, event: &EpisodeEvent);
}

/// Listener that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<EpisodeEvent>>,
}

impl RecordingListener {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<EpisodeEvent> {
        self.events.lock().clone()
    }

    /// Events in their message form
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.to_string()).collect()
    }

    /// Remove and return everything received so far
    pub fn take(&self) -> Vec<EpisodeEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Forget everything received
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EpisodeListener for RecordingListener {
    fn on_event(&self, event: &EpisodeEvent) {
        self.events.lock().push(event.clone());
    }
}
