//! Resource timing aggregation
//!
//! Filters the page's resource timing entries by domain, splits each one into
//! phases and aggregates every phase over all resources and over the nonzero
//! values only. The slowest download is kept for detailed reporting.

use crate::domain_filter::DomainFilter;
use crate::extractor::extract;
use crate::stats::StatAggregator;
use crate::types::{
    Metric, MetricKey, ResourceSample, ResourceStats, ResourceTimingEntry, SlowestResource,
};
use tracing::{debug, info};

/// Host capability that lists resource timing entries
pub trait ResourceTimingSource: Send + Sync {
    /// Whether the platform exposes resource timing at all
    fn supports_resource_timing(&self) -> bool;

    /// Every resource timing entry recorded so far
    fn resource_entries(&self) -> Vec<ResourceTimingEntry>;
}

/// Resource timing entries already collected by the host
#[derive(Debug, Clone, Default)]
pub struct StaticResourceTiming {
    entries: Option<Vec<ResourceTimingEntry>>,
}

impl StaticResourceTiming {
    /// Source that exposes the given entries
    pub fn new(entries: Vec<ResourceTimingEntry>) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// Source for a platform without resource timing
    pub fn unsupported() -> Self {
        Self { entries: None }
    }
}

impl ResourceTimingSource for StaticResourceTiming {
    fn supports_resource_timing(&self) -> bool {
        self.entries.is_some()
    }

    fn resource_entries(&self) -> Vec<ResourceTimingEntry> {
        self.entries.clone().unwrap_or_default()
    }
}

/// Two running sample lists for one metric
#[derive(Debug, Default)]
struct Buckets {
    all: Vec<i64>,
    nonzero: Vec<i64>,
}

impl Buckets {
    fn push(&mut self, value: i64) {
        self.all.push(value);
        if value != 0 {
            self.nonzero.push(value);
        }
    }
}

/// Domain filter + extractor + aggregator
#[derive(Debug, Clone, Default)]
pub struct ResourceAggregationPipeline {
    filter: DomainFilter,
}

impl ResourceAggregationPipeline {
    /// Create a pipeline restricted to `filter`
    pub fn new(filter: DomainFilter) -> Self {
        Self { filter }
    }

    /// The domain filter in use
    pub fn filter(&self) -> &DomainFilter {
        &self.filter
    }

    /// Aggregate whatever `source` exposes
    ///
    /// Returns `None` without touching the source's entries when the platform
    /// has no resource timing.
    pub fn run(&self, source: &dyn ResourceTimingSource) -> Option<ResourceStats> {
        if !source.supports_resource_timing() {
            debug!("Resource timing unavailable, skipping aggregation");
            return None;
        }

        Some(self.aggregate(&source.resource_entries()))
    }

    /// Aggregate a list of entries
    pub fn aggregate(&self, entries: &[ResourceTimingEntry]) -> ResourceStats {
        let mut buckets: Vec<(Metric, Buckets)> = Metric::ALL
            .iter()
            .map(|metric| (*metric, Buckets::default()))
            .collect();
        let mut slowest: Option<SlowestResource> = None;
        let mut max_download = 0;
        let mut matched = 0usize;

        for entry in entries.iter().filter(|e| self.filter.matches_url(&e.name)) {
            matched += 1;
            let sample: ResourceSample = extract(entry);

            for (metric, bucket) in buckets.iter_mut() {
                if let Some(value) = sample.get(*metric) {
                    bucket.push(value);
                }
            }

            // Strictly greater: the first resource reaching the maximum wins
            if let Some(download) = sample.download {
                if download > max_download {
                    max_download = download;
                    slowest = Some(SlowestResource {
                        name: entry.name.clone(),
                        sample,
                    });
                }
            }
        }

        let mut stats = Vec::with_capacity(buckets.len() * 2);
        for (metric, bucket) in &buckets {
            stats.push((MetricKey::all(*metric), StatAggregator::aggregate(&bucket.all)));
            stats.push((
                MetricKey::nonzero(*metric),
                StatAggregator::aggregate(&bucket.nonzero),
            ));
        }

        info!(
            "Aggregated resource timing for {} of {} resources",
            matched,
            entries.len()
        );

        ResourceStats { stats, slowest }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, dns: f64, ttfb: f64) -> ResourceTimingEntry {
        ResourceTimingEntry {
            name: name.to_string(),
            duration: dns + ttfb,
            domain_lookup_start: 1.0,
            domain_lookup_end: 1.0 + dns,
            connect_start: 1.0 + dns,
            connect_end: 1.0 + dns,
            secure_connection_start: 0.0,
            request_start: 1.0 + dns,
            response_start: 1.0 + dns + ttfb,
            response_end: 1.0 + dns + ttfb,
        }
    }

    #[test]
    fn test_unsupported_source_is_noop() {
        let pipeline = ResourceAggregationPipeline::default();
        assert!(pipeline.run(&StaticResourceTiming::unsupported()).is_none());
    }

    #[test]
    fn test_supported_but_empty_source() {
        let pipeline = ResourceAggregationPipeline::default();
        let stats = pipeline.run(&StaticResourceTiming::new(vec![])).unwrap();

        assert_eq!(stats.stats.len(), 14);
        assert!(stats.stats.iter().all(|(_, stat)| stat.count == 0));
        assert!(stats.slowest.is_none());
    }

    #[test]
    fn test_key_order() {
        let stats = ResourceAggregationPipeline::default().aggregate(&[]);
        let keys: Vec<String> = stats.stats.iter().map(|(key, _)| key.to_string()).collect();

        assert_eq!(
            keys,
            vec![
                "dns", "dnsnz", "tcp", "tcpnz", "ssl", "sslnz", "ttfb", "ttfbnz", "content",
                "contentnz", "total", "totalnz", "download", "downloadnz"
            ]
        );
    }

    #[test]
    fn test_nonzero_bucket() {
        let pipeline = ResourceAggregationPipeline::default();
        let stats = pipeline.aggregate(&[
            entry("https://a.example.com/1", 0.0, 10.0),
            entry("https://a.example.com/2", 4.0, 20.0),
        ]);

        let dns = stats.get(MetricKey::all(Metric::Dns)).unwrap();
        let dns_nz = stats.get(MetricKey::nonzero(Metric::Dns)).unwrap();
        assert_eq!(dns.count, 2);
        assert_eq!(dns_nz.count, 1);
        assert_eq!(dns_nz.max, Some(4));
    }

    #[test]
    fn test_slowest_first_seen_wins_ties() {
        let pipeline = ResourceAggregationPipeline::default();
        let stats = pipeline.aggregate(&[
            entry("https://a.example.com/first", 0.0, 50.0),
            entry("https://a.example.com/second", 0.0, 50.0),
            entry("https://a.example.com/fast", 0.0, 5.0),
        ]);

        let slowest = stats.slowest.unwrap();
        assert_eq!(slowest.name, "https://a.example.com/first");
        assert_eq!(slowest.sample.download, Some(50));
    }

    #[test]
    fn test_filter_excludes_other_domains() {
        let filter = DomainFilter::new(&["*.example.com"]).unwrap();
        let pipeline = ResourceAggregationPipeline::new(filter);
        let stats = pipeline.aggregate(&[
            entry("https://a.example.com/1", 2.0, 10.0),
            entry("https://tracker.example.net/2", 2.0, 900.0),
        ]);

        assert_eq!(stats.get(MetricKey::all(Metric::Total)).unwrap().count, 1);
        assert_eq!(
            stats.slowest.map(|s| s.name),
            Some("https://a.example.com/1".to_string())
        );
    }
}
