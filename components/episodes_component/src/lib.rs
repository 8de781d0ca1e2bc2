//! Page-view orchestration for the Episodes timing engine
//!
//! This module provides the EpisodesComponent that ties the episode store,
//! resource timing aggregation, beacon encoding and timeline layout to the
//! page lifecycle (`init`, load, `done`).
//!
//! # Example
//!
//! ```
//! use episodes_component::{EpisodesComponent, EpisodesConfig, PageHost, ReadyState};
//!
//! let config = EpisodesConfig::builder()
//!     .autorun(false)
//!     .build();
//!
//! let episodes = EpisodesComponent::new(config, PageHost::default()).unwrap();
//! episodes.init(ReadyState::Loading);
//! episodes.mark("hero image", None);
//! assert!(episodes.marks().contains("hero image"));
//! ```

mod component;
mod config;
mod error;
pub mod host;

pub use component::{EpisodesComponent, ReadyState};
pub use config::{EpisodesConfig, EpisodesConfigBuilder, DEFAULT_BEACON_ENDPOINT};
pub use error::{EpisodesError, Result};
pub use host::{
    BeaconTransport, CarriedStart, CookieStartTime, NavigationTiming, NavigationTimingSource,
    PageHost, StartTimeCarrier,
};

#[cfg(test)]
mod tests {
    use super::*;
    use episode_store::{Command, RecordingListener};
    use episode_types::{ManualClock, Reference};
    use std::sync::Arc;

    fn component(config: EpisodesConfig) -> (EpisodesComponent, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let episodes = EpisodesComponent::new(config, PageHost::new(clock.clone())).unwrap();
        (episodes, clock)
    }

    #[test]
    fn test_component_new() {
        let result = EpisodesComponent::new(EpisodesConfig::default(), PageHost::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EpisodesConfig::builder().queue_capacity(0).build();
        let result = EpisodesComponent::new(config, PageHost::default());

        assert!(matches!(result, Err(EpisodesError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = EpisodesConfig::builder().allowed_domain("*.bad*.com").build();
        let result = EpisodesComponent::new(config, PageHost::default());

        assert!(matches!(result, Err(EpisodesError::Episode(_))));
    }

    #[test]
    fn test_component_config() {
        let config = EpisodesConfig::builder().version("9").build();
        let (episodes, _clock) = component(config);

        assert_eq!(episodes.config().version(), "9");
        assert!(!episodes.is_initialized());
    }

    #[test]
    fn test_rejected_calls_are_absorbed() {
        let (episodes, _clock) = component(EpisodesConfig::default());

        assert_eq!(episodes.mark("", None), None);
        assert_eq!(
            episodes.measure("y", Some(Reference::mark("missing")), None),
            None
        );
        assert!(episodes.measures().is_empty());
    }

    #[test]
    fn test_queue_before_init() {
        let config = EpisodesConfig::builder().autorun(false).build();
        let (episodes, clock) = component(config);

        assert!(episodes.enqueue(Command::Mark {
            name: "widget".to_string(),
            time: None,
        }));
        clock.advance(100);
        assert!(episodes.enqueue(Command::Measure {
            name: "widget".to_string(),
            start: None,
            end: None,
        }));
        assert_eq!(episodes.pending_commands(), 2);
        assert!(episodes.marks().is_empty());

        clock.advance(5_000);
        episodes.init(ReadyState::Loading);

        assert_eq!(episodes.pending_commands(), 0);
        assert_eq!(episodes.marks().get("widget"), Some(1_000));
        assert_eq!(episodes.measures().get("widget"), Some(100));
    }

    #[test]
    fn test_enqueue_after_init_runs_immediately() {
        let config = EpisodesConfig::builder().autorun(false).build();
        let (episodes, _clock) = component(config);
        episodes.init(ReadyState::Interactive);

        episodes.enqueue(Command::Mark {
            name: "late".to_string(),
            time: Some(42),
        });

        assert_eq!(episodes.marks().get("late"), Some(42));
        assert_eq!(episodes.pending_commands(), 0);
    }

    #[test]
    fn test_queue_overflow() {
        let config = EpisodesConfig::builder().queue_capacity(1).build();
        let (episodes, _clock) = component(config);

        assert!(episodes.enqueue(Command::Done));
        assert!(!episodes.enqueue(Command::Done));
        assert_eq!(episodes.pending_commands(), 1);
    }

    #[test]
    fn test_listeners_see_store_events() {
        let (episodes, clock) = component(EpisodesConfig::default());
        let recorder = Arc::new(RecordingListener::new());
        episodes.subscribe(recorder.clone());

        episodes.init(ReadyState::Loading);
        episodes.mark("starttime", None);
        clock.advance(10);
        episodes.on_load();

        assert_eq!(
            recorder.messages(),
            vec![
                "EPISODES:mark:starttime:1000",
                "EPISODES:mark:onload:1010",
                "EPISODES:measure:page load time:1000:1010",
                "EPISODES:mark:done:1010",
                "EPISODES:measure:total load time:1000:1010",
                "EPISODES:done",
            ]
        );
    }

    #[test]
    fn test_done_callback_may_reenter() {
        let config = EpisodesConfig::builder().autorun(false).build();
        let (episodes, _clock) = component(config);
        episodes.init(ReadyState::Loading);

        episodes.done_with(|| {
            episodes.mark("after done", Some(5));
        });

        assert!(episodes.is_done());
        assert_eq!(episodes.marks().get("after done"), Some(5));
    }

    #[test]
    fn test_init_resets_previous_page() {
        let config = EpisodesConfig::builder().autorun(false).build();
        let (episodes, _clock) = component(config);

        episodes.init(ReadyState::Loading);
        episodes.mark("a", Some(1));
        episodes.done();
        assert!(episodes.is_done());

        episodes.init(ReadyState::Loading);
        assert!(!episodes.is_done());
        assert!(episodes.marks().is_empty());
    }
}
