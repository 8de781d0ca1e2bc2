// Episode error types
// Shared by the store, the resource timing pipeline and the page component

use thiserror::Error;

/// Errors produced by episode bookkeeping and resource filtering
///
/// None of these are fatal for the host page. The page component logs them
/// and skips the offending operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpisodeError {
    /// A mark or episode name was empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A start or end reference names a mark that was never recorded
    #[error("Unresolved reference '{reference}' for episode '{episode}'")]
    UnresolvedReference {
        /// Episode being measured
        episode: String,
        /// The reference that could not be resolved
        reference: String,
    },

    /// A domain allowlist pattern did not compile
    #[error("Invalid domain pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as supplied by the caller
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

impl EpisodeError {
    /// Empty mark name
    pub fn empty_mark_name() -> Self {
        Self::InvalidArgument("mark name is empty".to_string())
    }

    /// Empty episode name
    pub fn empty_episode_name() -> Self {
        Self::InvalidArgument("episode name is empty".to_string())
    }

    /// Reference that resolved to nothing
    pub fn unresolved(episode: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            episode: episode.into(),
            reference: reference.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            EpisodeError::empty_mark_name().to_string(),
            "Invalid argument: mark name is empty"
        );
        assert_eq!(
            EpisodeError::unresolved("y", "missingMark").to_string(),
            "Unresolved reference 'missingMark' for episode 'y'"
        );

        let err = EpisodeError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid domain pattern '(': unclosed group");
    }
}
