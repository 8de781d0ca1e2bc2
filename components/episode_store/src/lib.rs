//! Episode bookkeeping
//!
//! This module provides the [`EpisodeStore`] that records marks and measures
//! for a single page view, along with its supporting pieces.
//!
//! # Features
//!
//! - **EpisodeStore**: mark/measure semantics with mark-name, absolute and
//!   "now" references
//! - **CascadeTable**: episodes implied by sentinel marks (`firstbyte`,
//!   `onload`, `done`)
//! - **CommandQueue**: bounded FIFO of calls made before initialisation
//! - **EpisodeListener**: synchronous notifications for every mark and measure

mod cascade;
mod command_queue;
mod events;
mod named_times;
mod store;

pub use cascade::{CascadeRule, CascadeTable, EpisodeSpec, FIRSTBYTE_MARK, ONLOAD_MARK};
pub use command_queue::{Command, CommandQueue, DEFAULT_QUEUE_CAPACITY};
pub use events::{EpisodeEvent, EpisodeListener, RecordingListener};
pub use named_times::NamedTimes;
pub use store::EpisodeStore;
