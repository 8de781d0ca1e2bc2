//! Resource timing aggregation
//!
//! This module turns the browser's per-resource timing entries into the
//! aggregate statistics reported in the page beacon.
//!
//! # Features
//!
//! - **StatAggregator**: count, max, median and average over integer samples
//! - **DomainFilter**: allowlist of hostnames with `*.` wildcard support
//! - **extract**: one resource timing entry → dns/tcp/ssl/ttfb/content/total
//! - **ResourceAggregationPipeline**: filter, extract and aggregate every entry,
//!   tracking the slowest download

mod domain_filter;
mod extractor;
mod pipeline;
mod stats;
mod types;

pub use domain_filter::DomainFilter;
pub use extractor::extract;
pub use pipeline::{ResourceAggregationPipeline, ResourceTimingSource, StaticResourceTiming};
pub use stats::StatAggregator;
pub use types::*;
