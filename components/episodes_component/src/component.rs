//! Main Episodes component implementation

use crate::host::PageHost;
use crate::{EpisodesConfig, Result};
use beacon::{beacon_url, BeaconEncoder};
use episode_store::{
    Command, CommandQueue, EpisodeEvent, EpisodeListener, EpisodeStore, NamedTimes,
    RecordingListener, FIRSTBYTE_MARK, ONLOAD_MARK,
};
use episode_types::{Episode, Reference, START_MARK};
use parking_lot::{MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard};
use resource_timing::{DomainFilter, ResourceAggregationPipeline, ResourceStats};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use timeline::{LayoutOptions, TimelineLayout};
use tracing::{debug, info, warn};

/// Document loading state at the time the component is initialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Still parsing
    Loading,
    /// Parsed, subresources still loading
    Interactive,
    /// The load event has already fired
    Complete,
}

/// Snapshot of everything collected for the page view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EpisodesReport<'a> {
    version: &'a str,
    done: bool,
    marks: &'a NamedTimes,
    measures: &'a NamedTimes,
    starts: &'a NamedTimes,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_stats: Option<&'a ResourceStats>,
}

/// Episode collection for a single page view
///
/// This component is responsible for:
/// - Holding calls made before initialisation and replaying them
/// - Finding the page's start time
/// - Finishing collection at load (when `autorun` is set)
/// - Aggregating resource timing and building the beacon on `done`
///
/// Failing marks and measures are logged and skipped, never returned.
///
/// # Example
///
/// ```
/// use episodes_component::{EpisodesComponent, EpisodesConfig, PageHost, ReadyState};
/// use episode_types::ManualClock;
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(1_000));
/// let episodes = EpisodesComponent::new(
///     EpisodesConfig::default(),
///     PageHost::new(clock.clone()),
/// )
/// .unwrap();
///
/// episodes.init(ReadyState::Loading);
/// episodes.mark("starttime", None);
/// clock.advance(900);
/// episodes.on_load();
///
/// assert_eq!(episodes.measures().get("page load time"), Some(900));
/// ```
pub struct EpisodesComponent {
    /// Configuration for this component
    config: EpisodesConfig,

    /// Page environment
    host: PageHost,

    /// Marks and episodes
    store: RwLock<EpisodeStore>,

    /// Calls made before `init`
    queue: Mutex<CommandQueue>,

    /// Whether `init` has run
    initialized: AtomicBool,

    /// Result of the last resource aggregation
    resource_stats: RwLock<Option<ResourceStats>>,

    pipeline: ResourceAggregationPipeline,

    encoder: BeaconEncoder,

    /// Collects store events so they are delivered after the store lock is released
    recorder: Arc<RecordingListener>,

    listeners: RwLock<Vec<Arc<dyn EpisodeListener>>>,
}

impl EpisodesComponent {
    /// Create a new EpisodesComponent
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an allowlist
    /// pattern does not compile.
    pub fn new(config: EpisodesConfig, host: PageHost) -> Result<Self> {
        debug!("Creating EpisodesComponent with config: {:?}", config);

        config.validate()?;
        let filter = DomainFilter::new(config.domain_allowlist())?;

        let recorder = Arc::new(RecordingListener::new());
        let mut store = EpisodeStore::new(host.clock());
        store.subscribe(recorder.clone());

        let queue = CommandQueue::new(config.queue_capacity(), host.clock());

        Ok(Self {
            pipeline: ResourceAggregationPipeline::new(filter),
            encoder: BeaconEncoder::new(config.version()),
            store: RwLock::new(store),
            queue: Mutex::new(queue),
            initialized: AtomicBool::new(false),
            resource_stats: RwLock::new(None),
            recorder,
            listeners: RwLock::new(Vec::new()),
            config,
            host,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &EpisodesConfig {
        &self.config
    }

    /// Whether `init` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether `done` has run since the last `init`
    pub fn is_done(&self) -> bool {
        self.store.read().is_done()
    }

    /// Number of calls waiting for `init`
    pub fn pending_commands(&self) -> usize {
        self.queue.lock().len()
    }

    /// Register a listener for marks, measures and `done`
    ///
    /// Listeners run after the component's locks are released, so they may
    /// call back into the component.
    pub fn subscribe(&self, listener: Arc<dyn EpisodeListener>) {
        self.listeners.write().push(listener);
    }

    /// Submit an API call
    ///
    /// Before `init` the call is queued (marks without a time and measures
    /// without an end are stamped now). Afterwards it runs immediately.
    /// Returns `false` if the queue was full and the call was dropped.
    pub fn enqueue(&self, command: Command) -> bool {
        if self.is_initialized() {
            self.execute(command);
            return true;
        }

        let mut queue = self.queue.lock();
        match command {
            Command::Mark { name, time } => queue.mark(name, time),
            Command::Measure { name, start, end } => queue.measure(name, start, end),
            Command::Done => queue.done(),
        }
    }

    /// Start collecting for this page view
    ///
    /// Clears previous state, marks `starttime`, replays queued calls and,
    /// if the page has already loaded, takes `firstbyte`/`onload` from
    /// navigation timing and finishes when `autorun` is set.
    pub fn init(&self, ready_state: ReadyState) {
        info!("Initializing episodes ({:?})", ready_state);

        self.store.write().reset();
        *self.resource_stats.write() = None;
        self.find_start_time();

        let pending = self.queue.lock().drain();
        self.initialized.store(true, Ordering::SeqCst);
        if !pending.is_empty() {
            debug!("Replaying {} queued commands", pending.len());
        }
        for command in pending {
            self.execute(command);
        }

        if ready_state == ReadyState::Complete {
            if let Some(timing) = self.host.navigation_timing() {
                if let Some(load_event_end) = timing.load_end() {
                    if let Some(response_start) = timing.first_byte() {
                        self.mark(FIRSTBYTE_MARK, Some(response_start));
                    }
                    self.mark(ONLOAD_MARK, Some(load_event_end));
                }
            }
            if self.config.autorun() {
                self.done();
            }
        }
    }

    /// The page's load event
    pub fn on_load(&self) {
        debug!("EpisodesComponent.on_load");
        self.mark(ONLOAD_MARK, None);

        if self.config.autorun() {
            self.done();
        }
    }

    /// Set a mark; returns the stored time, or `None` if it was rejected
    pub fn mark(&self, name: &str, time: Option<i64>) -> Option<i64> {
        let result = self.store.write().mark(name, time);
        self.dispatch_events();

        result
            .map_err(|e| warn!("Ignoring mark '{}': {}", name, e))
            .ok()
    }

    /// Measure an episode; returns it, or `None` if it was rejected
    pub fn measure(
        &self,
        name: &str,
        start: Option<Reference>,
        end: Option<Reference>,
    ) -> Option<Episode> {
        let result = self.store.write().measure(name, start, end);
        self.dispatch_events();

        result
            .map_err(|e| warn!("Ignoring measure '{}': {}", name, e))
            .ok()
    }

    /// Signal the end of episodes for this page view
    pub fn done(&self) {
        self.done_with(|| {});
    }

    /// Signal the end of episodes, then run `callback`
    ///
    /// Marks `done`, aggregates resource timing and sends the beacon as
    /// configured, announces `done` to listeners and finally calls
    /// `callback` with no locks held.
    pub fn done_with<F: FnOnce()>(&self, callback: F) {
        info!("Episodes done");

        let marked = self.store.write().mark_done();
        if let Err(e) = marked {
            warn!("Failed to mark done: {}", e);
        }
        self.dispatch_events();

        if self.config.include_resource_aggregation() {
            self.measure_resources();
        }

        if self.config.send_beacon() {
            self.send_beacon::<&str, &str>(None, &[]);
        }

        self.store.read().notify_done();
        self.dispatch_events();

        callback();
    }

    /// Mark name → epoch ms (live view)
    pub fn marks(&self) -> MappedRwLockReadGuard<'_, NamedTimes> {
        RwLockReadGuard::map(self.store.read(), |store| store.marks())
    }

    /// Episode name → duration ms (live view)
    pub fn measures(&self) -> MappedRwLockReadGuard<'_, NamedTimes> {
        RwLockReadGuard::map(self.store.read(), |store| store.measures())
    }

    /// Episode name → start epoch ms (live view)
    pub fn starts(&self) -> MappedRwLockReadGuard<'_, NamedTimes> {
        RwLockReadGuard::map(self.store.read(), |store| store.starts())
    }

    /// The last resource aggregation, if one ran
    pub fn resource_stats(&self) -> Option<ResourceStats> {
        self.resource_stats.read().clone()
    }

    /// Build the beacon and hand it to the transport
    ///
    /// Uses the configured endpoint when `url` is `None`. Returns the full
    /// beacon URL, or an empty string when no episode has been measured.
    pub fn send_beacon<K, V>(&self, url: Option<&str>, params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let endpoint = url.unwrap_or_else(|| self.config.beacon_endpoint());
        debug!("EpisodesComponent.send_beacon: {}", endpoint);

        let query = {
            let store = self.store.read();
            let stats = self.resource_stats.read();
            self.encoder
                .encode(store.measures().iter(), (*stats).as_ref(), params)
        };

        let beacon = beacon_url(endpoint, &query);
        if beacon.is_empty() {
            debug!("No episodes measured, beacon not sent");
            return beacon;
        }

        match self.host.transport() {
            Some(transport) => match transport.send(&beacon) {
                Ok(()) => info!("Beacon sent: {}", beacon),
                Err(e) => warn!("Beacon delivery failed: {:#}", e),
            },
            None => debug!("No beacon transport, beacon built only"),
        }

        beacon
    }

    /// Lay out the current episodes and marks across `width_px`
    pub fn timeline(&self, width_px: u32) -> Option<TimelineLayout> {
        TimelineLayout::from_store(&self.store.read(), LayoutOptions::with_width(width_px))
    }

    /// JSON snapshot of marks, episodes and resource statistics
    pub fn report(&self) -> Result<serde_json::Value> {
        let store = self.store.read();
        let stats = self.resource_stats.read();

        let report = EpisodesReport {
            version: self.encoder.version(),
            done: store.is_done(),
            marks: store.marks(),
            measures: store.measures(),
            starts: store.starts(),
            resource_stats: (*stats).as_ref(),
        };

        Ok(serde_json::to_value(&report)?)
    }

    fn execute(&self, command: Command) {
        if command == Command::Done {
            self.done();
            return;
        }

        let applied = self.store.write().apply(command);
        if let Err(e) = applied {
            warn!("Ignoring queued command: {}", e);
        }
        self.dispatch_events();
    }

    fn find_start_time(&self) {
        let start = self
            .host
            .navigation_timing()
            .and_then(|timing| timing.start())
            .or_else(|| {
                self.host
                    .carried_start()
                    .filter(|carried| carried.referrer_match)
                    .map(|carried| carried.start_epoch)
            });

        match start {
            Some(start) => {
                self.mark(START_MARK, Some(start));
            }
            None => debug!("No start time available"),
        }
    }

    fn measure_resources(&self) {
        let Some(source) = self.host.resource_timing() else {
            debug!("No resource timing source");
            return;
        };

        match self.pipeline.run(source) {
            Some(stats) => *self.resource_stats.write() = Some(stats),
            None => debug!("Resource timing not supported"),
        }
    }

    fn dispatch_events(&self) {
        let events: Vec<EpisodeEvent> = self.recorder.take();
        if events.is_empty() {
            return;
        }

        let listeners = self.listeners.read().clone();
        for event in &events {
            for listener in &listeners {
                listener.on_event(event);
            }
        }
    }
}

impl std::fmt::Debug for EpisodesComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodesComponent")
            .field("config", &self.config)
            .field("host", &self.host)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
