//! Type definitions for resource timing aggregation
//!
//! Contains the raw per-resource record handed over by the host, the
//! per-resource sample derived from it, and the aggregate statistics
//! computed over all samples.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Raw input
// ============================================================================

/// One resource timing record as exposed by the browser
///
/// All times are fractional milliseconds relative to the navigation; `0`
/// means the platform did not expose the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceTimingEntry {
    /// Absolute URL of the resource
    pub name: String,
    /// Total fetch duration
    pub duration: f64,
    /// DNS lookup start
    pub domain_lookup_start: f64,
    /// DNS lookup end
    pub domain_lookup_end: f64,
    /// TCP connect start
    pub connect_start: f64,
    /// TCP connect end (includes TLS)
    pub connect_end: f64,
    /// TLS handshake start
    pub secure_connection_start: f64,
    /// Request sent; `0` for cross-origin resources without Timing-Allow-Origin
    pub request_start: f64,
    /// First response byte
    pub response_start: f64,
    /// Last response byte
    pub response_end: f64,
}

impl ResourceTimingEntry {
    /// Entry with only a URL and a duration, as seen for restricted
    /// cross-origin resources
    pub fn restricted(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Default::default()
        }
    }

    /// Whether the detailed phase timestamps are visible
    pub fn has_detailed_timing(&self) -> bool {
        self.request_start != 0.0
    }
}

// ============================================================================
// Derived sample
// ============================================================================

/// Per-resource phase durations in whole milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSample {
    /// Rounded total duration, always available
    pub total: i64,
    /// DNS lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<i64>,
    /// TCP connect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<i64>,
    /// TLS handshake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<i64>,
    /// Time to first byte
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<i64>,
    /// Content transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<i64>,
    /// dns + tcp + ttfb + content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<i64>,
}

impl ResourceSample {
    /// Value of one metric, if the sample carries it
    pub fn get(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Dns => self.dns,
            Metric::Tcp => self.tcp,
            Metric::Ssl => self.ssl,
            Metric::Ttfb => self.ttfb,
            Metric::Content => self.content,
            Metric::Total => Some(self.total),
            Metric::Download => self.download,
        }
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// A resource timing phase that is aggregated across resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// DNS lookup
    Dns,
    /// TCP connect
    Tcp,
    /// TLS handshake
    Ssl,
    /// Time to first byte
    Ttfb,
    /// Content transfer
    Content,
    /// Whole fetch
    Total,
    /// Sum of the network phases
    Download,
}

impl Metric {
    /// All metrics in reporting order
    pub const ALL: [Metric; 7] = [
        Metric::Dns,
        Metric::Tcp,
        Metric::Ssl,
        Metric::Ttfb,
        Metric::Content,
        Metric::Total,
        Metric::Download,
    ];

    /// Short name used in beacons
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Dns => "dns",
            Metric::Tcp => "tcp",
            Metric::Ssl => "ssl",
            Metric::Ttfb => "ttfb",
            Metric::Content => "content",
            Metric::Total => "total",
            Metric::Download => "download",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which samples of a metric an aggregate covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleSet {
    /// Every observed value
    All,
    /// Only values different from zero
    NonZero,
}

/// Name of one aggregate, e.g. `dns` or `dnsnz`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    /// Phase being aggregated
    pub metric: Metric,
    /// Sample selection
    pub set: SampleSet,
}

impl MetricKey {
    /// Key over all samples of `metric`
    pub fn all(metric: Metric) -> Self {
        Self {
            metric,
            set: SampleSet::All,
        }
    }

    /// Key over the nonzero samples of `metric`
    pub fn nonzero(metric: Metric) -> Self {
        Self {
            metric,
            set: SampleSet::NonZero,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.set {
            SampleSet::All => write!(f, "{}", self.metric),
            SampleSet::NonZero => write!(f, "{}nz", self.metric),
        }
    }
}

/// count/max/median/average over a sample set
///
/// The derived fields are present iff `count > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStat {
    /// Number of samples
    pub count: usize,
    /// Largest sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Median (rounded mean of the two central values for even counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<i64>,
    /// Rounded arithmetic mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<i64>,
}

impl AggregateStat {
    /// Whether any sample contributed
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The resource with the longest download phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowestResource {
    /// Resource URL
    pub name: String,
    /// Its phase breakdown
    pub sample: ResourceSample,
}

/// Output of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStats {
    /// Aggregates in reporting order
    pub stats: Vec<(MetricKey, AggregateStat)>,
    /// Slowest download among the matched resources
    pub slowest: Option<SlowestResource>,
}

impl ResourceStats {
    /// Look up one aggregate
    pub fn get(&self, key: MetricKey) -> Option<&AggregateStat> {
        self.stats
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, stat)| stat)
    }

    /// Aggregates with at least one sample
    pub fn non_empty(&self) -> impl Iterator<Item = &(MetricKey, AggregateStat)> {
        self.stats.iter().filter(|(_, stat)| !stat.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_display() {
        assert_eq!(MetricKey::all(Metric::Dns).to_string(), "dns");
        assert_eq!(MetricKey::nonzero(Metric::Dns).to_string(), "dnsnz");
        assert_eq!(MetricKey::nonzero(Metric::Download).to_string(), "downloadnz");
    }

    #[test]
    fn test_sample_get_total_always_present() {
        let sample = ResourceSample {
            total: 12,
            ..Default::default()
        };
        assert_eq!(sample.get(Metric::Total), Some(12));
        assert_eq!(sample.get(Metric::Dns), None);
    }

    #[test]
    fn test_entry_deserializes_from_browser_json() {
        let entry: ResourceTimingEntry = serde_json::from_str(
            r#"{"name":"https://cdn.example.com/a.js","duration":12.5,"requestStart":3.0}"#,
        )
        .unwrap();

        assert_eq!(entry.name, "https://cdn.example.com/a.js");
        assert_eq!(entry.duration, 12.5);
        assert!(entry.has_detailed_timing());
        assert_eq!(entry.connect_end, 0.0);
    }

    #[test]
    fn test_empty_stat_serializes_count_only() {
        let json = serde_json::to_string(&AggregateStat::default()).unwrap();
        assert_eq!(json, r#"{"count":0}"#);
    }
}
