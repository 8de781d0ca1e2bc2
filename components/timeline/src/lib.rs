//! Timeline layout for episodes and marks
//!
//! A read-only consumer of an [`episode_store::EpisodeStore`]: it sorts the
//! store's episodes and mark-only names and computes proportional pixel
//! offsets for a visual timeline.

mod layout;

pub use layout::{
    compare_entries, sort_entries, LayoutOptions, LayoutRow, TimelineEntry, TimelineLayout,
    DEFAULT_LEFT_MARGIN_PX, DEFAULT_ROW_HEIGHT_PX,
};
