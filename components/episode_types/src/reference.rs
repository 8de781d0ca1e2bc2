//! Start/end references for `measure`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an episode starts or ends
///
/// Resolution happens in the store: a mark name is looked up, an absolute
/// time is used as-is, `Now` reads the store's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Reference {
    /// Name of a previously recorded mark
    MarkName(String),
    /// Epoch time in milliseconds
    AbsoluteTime(i64),
    /// The moment the reference is resolved
    Now,
}

impl Reference {
    /// Build a mark-name reference
    pub fn mark(name: impl Into<String>) -> Self {
        Reference::MarkName(name.into())
    }

    /// Build an absolute-time reference
    pub fn at(epoch_ms: i64) -> Self {
        Reference::AbsoluteTime(epoch_ms)
    }
}

impl From<&str> for Reference {
    fn from(name: &str) -> Self {
        Reference::MarkName(name.to_string())
    }
}

impl From<String> for Reference {
    fn from(name: String) -> Self {
        Reference::MarkName(name)
    }
}

impl From<i64> for Reference {
    fn from(epoch_ms: i64) -> Self {
        Reference::AbsoluteTime(epoch_ms)
    }
}

impl From<f64> for Reference {
    fn from(epoch_ms: f64) -> Self {
        Reference::AbsoluteTime(crate::truncate_millis(epoch_ms))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::MarkName(name) => write!(f, "{}", name),
            Reference::AbsoluteTime(t) => write!(f, "{}", t),
            Reference::Now => write!(f, "now"),
        }
    }
}
