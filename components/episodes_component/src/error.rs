//! Error types for the Episodes component

use episode_types::EpisodeError;
use thiserror::Error;

/// Errors that reach callers of the Episodes component
///
/// Failures of individual marks, measures and beacon sends are logged and
/// absorbed; only setup problems surface here.
#[derive(Error, Debug)]
pub enum EpisodesError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Episode engine error (e.g. a bad allowlist pattern)
    #[error("Episode error: {0}")]
    Episode(#[from] EpisodeError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Episodes operations
pub type Result<T> = std::result::Result<T, EpisodesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EpisodesError::InvalidConfiguration("test".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: test");

        let err: EpisodesError = EpisodeError::empty_mark_name().into();
        assert!(err.to_string().starts_with("Episode error: "));
    }

    #[test]
    fn test_every_variant_is_reachable() {
        let json = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let errors = vec![
            EpisodesError::InvalidConfiguration("queue".to_string()),
            EpisodesError::from(EpisodeError::empty_episode_name()),
            EpisodesError::from(json),
        ];

        for err in &errors {
            let prefix = match err {
                EpisodesError::InvalidConfiguration(_) => "Invalid configuration: ",
                EpisodesError::Episode(_) => "Episode error: ",
                EpisodesError::Json(_) => "JSON error: ",
            };
            assert!(err.to_string().starts_with(prefix));
        }
    }

    #[test]
    fn test_json_error_converts() {
        let err: EpisodesError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, EpisodesError::Json(_)));
    }
}
