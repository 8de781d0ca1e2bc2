//! Pending commands recorded before the store exists
//!
//! A page can call `mark`/`measure`/`done` before the episode engine has
//! been set up. Those calls are logged here in FIFO order and replayed once
//! the page component initialises.

use episode_types::{Clock, Reference};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of commands kept before new ones are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// One deferred API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `mark(name, time)`
    Mark {
        /// Mark name
        name: String,
        /// Mark time
        time: Option<i64>,
    },
    /// `measure(name, start, end)`
    Measure {
        /// Episode name
        name: String,
        /// Start reference
        start: Option<Reference>,
        /// End reference
        end: Option<Reference>,
    },
    /// `done()`
    Done,
}

/// Bounded FIFO of deferred commands
pub struct CommandQueue {
    pending: VecDeque<Command>,
    capacity: usize,
    dropped: usize,
    clock: Arc<dyn Clock>,
}

impl CommandQueue {
    /// Create a queue holding at most `capacity` commands
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity,
            dropped: 0,
            clock,
        }
    }

    /// Queue a mark; without a time the mark is stamped now, not at replay
    pub fn mark(&mut self, name: impl Into<String>, time: Option<i64>) -> bool {
        let time = time.filter(|t| *t != 0).unwrap_or_else(|| self.clock.now_ms());
        self.push(Command::Mark {
            name: name.into(),
            time: Some(time),
        })
    }

    /// Queue a measure; without an end the episode ends now, not at replay
    pub fn measure(
        &mut self,
        name: impl Into<String>,
        start: Option<Reference>,
        end: Option<Reference>,
    ) -> bool {
        let end = end.or_else(|| Some(Reference::AbsoluteTime(self.clock.now_ms())));
        self.push(Command::Measure {
            name: name.into(),
            start,
            end,
        })
    }

    /// Queue a `done`
    pub fn done(&mut self) -> bool {
        self.push(Command::Done)
    }

    /// Queue a command as-is; returns `false` when the queue is full
    pub fn push(&mut self, command: Command) -> bool {
        if self.pending.len() >= self.capacity {
            self.dropped += 1;
            warn!(
                "Command queue full ({} entries), dropping {:?}",
                self.capacity, command
            );
            return false;
        }

        debug!("Queued {:?}", command);
        self.pending.push_back(command);
        true
    }

    /// Take every pending command in arrival order
    pub fn drain(&mut self) -> Vec<Command> {
        self.pending.drain(..).collect()
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Maximum number of pending commands
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Commands rejected because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("pending", &self.pending)
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped)
            .finish()
    }
}
