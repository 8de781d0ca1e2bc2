//! TimelineLayout implementation
//!
//! Orders episodes and stand-alone marks by start time and maps them onto a
//! fixed pixel width. Producing markup from the rows is left to the host.

use episode_store::EpisodeStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Default left margin in pixels
pub const DEFAULT_LEFT_MARGIN_PX: i64 = 40;

/// Default vertical distance between rows in pixels
pub const DEFAULT_ROW_HEIGHT_PX: i64 = 30;

/// One episode, or a mark that has no episode of the same name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Epoch ms at which the entry starts
    pub start: i64,
    /// Epoch ms at which the entry ends; equal to `start` for a mark
    pub end: i64,
    /// Episode or mark name
    pub name: String,
}

impl TimelineEntry {
    /// Create an entry
    pub fn new(start: i64, end: i64, name: impl Into<String>) -> Self {
        Self {
            start,
            end,
            name: name.into(),
        }
    }

    /// Collect every episode and every mark-only name from a store
    pub fn collect(store: &EpisodeStore) -> Vec<TimelineEntry> {
        let mut entries: Vec<TimelineEntry> = store
            .episodes()
            .map(|(name, episode)| TimelineEntry::new(episode.start_epoch, episode.end_epoch(), name))
            .collect();

        entries.extend(
            store
                .marks()
                .iter()
                .filter(|(name, _)| !store.measures().contains(name))
                .map(|(name, time)| TimelineEntry::new(time, time, name)),
        );

        entries
    }

    /// Length in milliseconds (negative for backwards episodes)
    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether this is a point in time rather than an interval
    pub fn is_mark(&self) -> bool {
        self.start == self.end
    }
}

/// Timeline ordering: start ascending, then end descending, then name
pub fn compare_entries(a: &TimelineEntry, b: &TimelineEntry) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.end.cmp(&a.end))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort entries into timeline order
pub fn sort_entries(entries: &mut [TimelineEntry]) {
    entries.sort_by(compare_entries);
}

/// Pixel geometry for a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Width the whole time window is spread across
    pub width_px: u32,
    /// Offset added to every row's left edge
    pub left_margin_px: i64,
    /// Vertical distance between consecutive rows
    pub row_height_px: i64,
}

impl LayoutOptions {
    /// Default margins for a given width
    pub fn with_width(width_px: u32) -> Self {
        Self {
            width_px,
            ..Default::default()
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width_px: 800,
            left_margin_px: DEFAULT_LEFT_MARGIN_PX,
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
        }
    }
}

/// A positioned timeline row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRow {
    /// The entry being drawn
    pub entry: TimelineEntry,
    /// Left edge in pixels, margin included
    pub left_px: i64,
    /// Width in pixels
    pub width_px: i64,
    /// Top edge in pixels
    pub top_px: i64,
    /// Text shown in the row, with the duration for intervals
    pub label: String,
}

/// Rows in timeline order plus the time window they span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    /// Earliest start
    pub t_first: i64,
    /// Latest end
    pub t_last: i64,
    /// Pixels per millisecond
    pub px_per_ms: f64,
    /// Positioned rows
    pub rows: Vec<LayoutRow>,
}

impl TimelineLayout {
    /// Lay out entries
    ///
    /// Returns `None` when there is nothing to draw. A window of zero length
    /// places every row at the left margin.
    pub fn compute(mut entries: Vec<TimelineEntry>, options: LayoutOptions) -> Option<Self> {
        if entries.is_empty() {
            debug!("No episodes or marks to lay out");
            return None;
        }

        sort_entries(&mut entries);

        let t_first = entries.iter().map(|e| e.start).min()?;
        let t_last = entries.iter().map(|e| e.end).max()?;
        let span = t_last.saturating_sub(t_first);
        let px_per_ms = if span > 0 {
            f64::from(options.width_px) / span as f64
        } else {
            0.0
        };

        let rows = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let delta = entry.duration();
                let offset = entry.start.saturating_sub(t_first);
                let left_px =
                    ((px_per_ms * offset as f64) as i64).saturating_add(options.left_margin_px);
                let width_px = (px_per_ms * delta as f64) as i64;
                let label = if delta > 0 {
                    format!("{} - {}ms", entry.name, delta)
                } else {
                    entry.name.clone()
                };

                LayoutRow {
                    entry,
                    left_px,
                    width_px,
                    top_px: index as i64 * options.row_height_px,
                    label,
                }
            })
            .collect();

        Some(Self {
            t_first,
            t_last,
            px_per_ms,
            rows,
        })
    }

    /// Lay out everything a store holds
    pub fn from_store(store: &EpisodeStore, options: LayoutOptions) -> Option<Self> {
        Self::compute(TimelineEntry::collect(store), options)
    }

    /// Row names in drawing order
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.entry.name.as_str()).collect()
    }
}
