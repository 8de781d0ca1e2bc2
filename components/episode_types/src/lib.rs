// Shared episode vocabulary: episodes, references, clocks and errors
//
// This module is part of the Episodes page timing engine.

pub mod clock;
pub mod errors;
pub mod reference;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::EpisodeError;
pub use reference::Reference;

use serde::{Deserialize, Serialize};

/// Mark fired by the page once it considers the episode set complete
pub const DONE_MARK: &str = "done";

/// Mark holding the page's navigation start
pub const START_MARK: &str = "starttime";

/// A measured interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Epoch milliseconds at which the episode began
    pub start_epoch: i64,
    /// End minus start; negative when the end reference precedes the start
    pub duration_ms: i64,
}

impl Episode {
    /// Create an episode from its two resolved endpoints
    ///
    /// The duration saturates at the `i64` range.
    pub fn between(start_epoch: i64, end_epoch: i64) -> Self {
        Self {
            start_epoch,
            duration_ms: end_epoch.saturating_sub(start_epoch),
        }
    }

    /// Epoch milliseconds at which the episode ended
    pub fn end_epoch(&self) -> i64 {
        self.start_epoch.saturating_add(self.duration_ms)
    }
}

/// JavaScript `Math.round`: halves round toward positive infinity
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Drop the fractional part of a millisecond time
pub fn truncate_millis(value: f64) -> i64 {
    value.trunc() as i64
}
