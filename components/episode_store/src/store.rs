//! EpisodeStore: marks, durations and start times for one page view

use crate::cascade::CascadeTable;
use crate::command_queue::Command;
use crate::events::{EpisodeEvent, EpisodeListener};
use crate::named_times::NamedTimes;
use episode_types::{Clock, Episode, EpisodeError, Reference, DONE_MARK};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mark/measure bookkeeping for one page view
///
/// Three independent maps are kept: marks (name → epoch ms), measures
/// (episode → duration) and starts (episode → epoch ms). A name may appear
/// both as a mark and as an episode.
///
/// # Example
///
/// ```
/// use episode_store::EpisodeStore;
/// use episode_types::{ManualClock, Reference};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(1_000));
/// let mut store = EpisodeStore::new(clock.clone());
///
/// store.mark("starttime", None).unwrap();
/// clock.advance(250);
/// store.mark("firstbyte", None).unwrap();
///
/// // "firstbyte" measures "backend" from "starttime"
/// assert_eq!(store.measures().get("backend"), Some(250));
/// ```
pub struct EpisodeStore {
    clock: Arc<dyn Clock>,
    cascades: CascadeTable,
    marks: NamedTimes,
    measures: NamedTimes,
    starts: NamedTimes,
    listeners: Vec<Arc<dyn EpisodeListener>>,
    done: bool,
}

impl EpisodeStore {
    /// Create a store with the default lifecycle cascades
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_cascades(clock, CascadeTable::default())
    }

    /// Create a store with a custom cascade table
    pub fn with_cascades(clock: Arc<dyn Clock>, cascades: CascadeTable) -> Self {
        Self {
            clock,
            cascades,
            marks: NamedTimes::new(),
            measures: NamedTimes::new(),
            starts: NamedTimes::new(),
            listeners: Vec::new(),
            done: false,
        }
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    /// The clock marks default to
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// The cascade table consulted after every mark
    pub fn cascades(&self) -> &CascadeTable {
        &self.cascades
    }

    /// Register a listener for marks, measures and `done`
    pub fn subscribe(&mut self, listener: Arc<dyn EpisodeListener>) {
        self.listeners.push(listener);
    }

    /// Forget every mark and episode; listeners and cascades are kept
    pub fn reset(&mut self) {
        debug!("EpisodeStore.reset");
        self.marks.clear();
        self.measures.clear();
        self.starts.clear();
        self.done = false;
    }

    /// Record a mark
    ///
    /// `time` defaults to now; `Some(0)` counts as "no time". If `name` is a
    /// sentinel, the cascade episodes are measured immediately afterwards.
    /// Returns the stored time.
    pub fn mark(&mut self, name: &str, time: Option<i64>) -> Result<i64, EpisodeError> {
        debug!("EpisodeStore.mark: {}, {:?}", name, time);

        if name.is_empty() {
            return Err(EpisodeError::empty_mark_name());
        }

        let time = time.filter(|t| *t != 0).unwrap_or_else(|| self.now());
        self.marks.insert(name, time);
        self.publish(&EpisodeEvent::Mark {
            name: name.to_string(),
            time,
        });

        self.run_cascade(name);

        Ok(time)
    }

    /// Measure an episode
    ///
    /// - no `start`: the mark named like the episode, or now
    /// - no `end`: now
    ///
    /// An unknown mark reference fails the whole measure and records nothing.
    /// The duration is `end - start` and is not clamped.
    pub fn measure(
        &mut self,
        name: &str,
        start: Option<Reference>,
        end: Option<Reference>,
    ) -> Result<Episode, EpisodeError> {
        debug!("EpisodeStore.measure: {}, {:?}, {:?}", name, start, end);

        if name.is_empty() {
            return Err(EpisodeError::empty_episode_name());
        }

        let start_epoch = match start {
            None => self.marks.get(name).unwrap_or_else(|| self.now()),
            Some(reference) => self.resolve(name, &reference)?,
        };

        let end_epoch = match end {
            None => self.now(),
            Some(reference) => self.resolve(name, &reference)?,
        };

        let episode = Episode::between(start_epoch, end_epoch);
        self.starts.insert(name, episode.start_epoch);
        self.measures.insert(name, episode.duration_ms);

        self.publish(&EpisodeEvent::Measure {
            name: name.to_string(),
            start: start_epoch,
            end: end_epoch,
        });

        Ok(episode)
    }

    /// Write the `done` mark (and its cascade) and flag the store as done
    pub fn mark_done(&mut self) -> Result<i64, EpisodeError> {
        self.done = true;
        let time = self.mark(DONE_MARK, None)?;
        info!("Episodes done at {}", time);
        Ok(time)
    }

    /// Tell listeners the page is done
    pub fn notify_done(&self) {
        self.publish(&EpisodeEvent::Done);
    }

    /// Whether `done` has run since the last reset
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Execute a deferred command
    ///
    /// `Command::Done` only marks and announces `done`; resource aggregation
    /// and beacons are the page component's business.
    pub fn apply(&mut self, command: Command) -> Result<(), EpisodeError> {
        match command {
            Command::Mark { name, time } => self.mark(&name, time).map(|_| ()),
            Command::Measure { name, start, end } => self.measure(&name, start, end).map(|_| ()),
            Command::Done => {
                self.mark_done()?;
                self.notify_done();
                Ok(())
            }
        }
    }

    /// Mark name → epoch ms
    pub fn marks(&self) -> &NamedTimes {
        &self.marks
    }

    /// Episode name → duration ms
    pub fn measures(&self) -> &NamedTimes {
        &self.measures
    }

    /// Episode name → start epoch ms
    pub fn starts(&self) -> &NamedTimes {
        &self.starts
    }

    /// One episode
    pub fn episode(&self, name: &str) -> Option<Episode> {
        let start_epoch = self.starts.get(name)?;
        let duration_ms = self.measures.get(name)?;
        Some(Episode {
            start_epoch,
            duration_ms,
        })
    }

    /// Every episode, in measurement order
    pub fn episodes(&self) -> impl Iterator<Item = (&str, Episode)> + '_ {
        self.measures.iter().filter_map(move |(name, duration_ms)| {
            self.starts.get(name).map(|start_epoch| {
                (
                    name,
                    Episode {
                        start_epoch,
                        duration_ms,
                    },
                )
            })
        })
    }

    fn resolve(&self, episode: &str, reference: &Reference) -> Result<i64, EpisodeError> {
        match reference {
            Reference::MarkName(mark) => self
                .marks
                .get(mark)
                .ok_or_else(|| EpisodeError::unresolved(episode, mark.as_str())),
            Reference::AbsoluteTime(time) => Ok(*time),
            Reference::Now => Ok(self.now()),
        }
    }

    fn run_cascade(&mut self, mark: &str) {
        let specs = self.cascades.episodes_for(mark).to_vec();

        for spec in specs {
            let start = Some(Reference::MarkName(spec.start_mark));
            let end = Some(Reference::MarkName(spec.end_mark));

            if let Err(e) = self.measure(&spec.name, start, end) {
                warn!(
                    "Skipping '{}' triggered by mark '{}': {}",
                    spec.name, mark, e
                );
            }
        }
    }

    fn publish(&self, event: &EpisodeEvent) {
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for EpisodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodeStore")
            .field("marks", &self.marks)
            .field("measures", &self.measures)
            .field("starts", &self.starts)
            .field("listeners", &self.listeners.len())
            .field("done", &self.done)
            .finish()
    }
}
