//! Episodes: page-lifecycle timing for web pages
//!
//! Records named marks and measured episodes during a page view, aggregates
//! resource timing from allowed domains and encodes everything into a beacon
//! query string. This crate re-exports the workspace components behind one
//! import path.
//!
//! # Example
//!
//! ```
//! use episodes::{EpisodesComponent, EpisodesConfig, ManualClock, PageHost, ReadyState, Reference};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let config = EpisodesConfig::builder().autorun(false).build();
//! let episodes = EpisodesComponent::new(config, PageHost::new(clock)).unwrap();
//!
//! episodes.init(ReadyState::Loading);
//! episodes.measure("backend", Some(Reference::at(0)), Some(Reference::at(100)));
//! episodes.measure("frontend", Some(Reference::at(100)), Some(Reference::at(300)));
//!
//! assert_eq!(
//!     episodes.send_beacon::<&str, &str>(None, &[]),
//!     "/images/beacon.gif?ets=backend:100,frontend:200&v=0.3"
//! );
//! ```

#![warn(missing_docs)]

pub use episodes_component::{
    host, BeaconTransport, CarriedStart, CookieStartTime, EpisodesComponent, EpisodesConfig,
    EpisodesConfigBuilder, EpisodesError, NavigationTiming, NavigationTimingSource, PageHost,
    ReadyState, Result, StartTimeCarrier,
};

pub use episode_types::{
    round_half_up, truncate_millis, Clock, Episode, EpisodeError, ManualClock, Reference,
    SystemClock, DONE_MARK, START_MARK,
};

pub use episode_store::{
    CascadeRule, CascadeTable, Command, CommandQueue, EpisodeEvent, EpisodeListener,
    EpisodeSpec, EpisodeStore, NamedTimes, RecordingListener,
};

pub use resource_timing::{
    extract, AggregateStat, DomainFilter, Metric, MetricKey, ResourceAggregationPipeline, ResourceSample,
    ResourceStats, ResourceTimingEntry, ResourceTimingSource, SampleSet, SlowestResource,
    StatAggregator, StaticResourceTiming,
};

pub use beacon::{beacon_url, BeaconEncoder, BEACON_VERSION};

pub use timeline::{LayoutOptions, LayoutRow, TimelineEntry, TimelineLayout};
