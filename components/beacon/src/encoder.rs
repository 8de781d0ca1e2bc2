//! Beacon query-string encoder
//!
//! Layout:
//!
//! ```text
//! ets=<episode>:<ms>,<episode>:<ms>...
//!   &rt_<metric>=<count>,<max>,<median>,<average>   (per non-empty aggregate)
//!   &slowest=<url>,<total>,<download>,<dns>,<tcp>,<ssl>,<ttfb>,<content>
//!   &<key>=<value>                                  (per caller parameter)
//!   &v=<version>
//! ```

use resource_timing::{ResourceSample, ResourceStats};
use tracing::debug;
use urlencoding::encode;

/// Beacon format version sent as `v=`
pub const BEACON_VERSION: &str = "0.3";

/// Written in `slowest=` for a phase that is missing or zero
const NOT_AVAILABLE: &str = "na";

/// Serializes episode timings into a beacon query string
#[derive(Debug, Clone)]
pub struct BeaconEncoder {
    version: String,
}

impl BeaconEncoder {
    /// Create an encoder reporting `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Version written as `v=`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Encode one beacon
    ///
    /// Returns an empty string when there are no episodes; nothing else is
    /// worth reporting on its own.
    pub fn encode<'a, I, K, V>(
        &self,
        measures: I,
        stats: Option<&ResourceStats>,
        params: &[(K, V)],
    ) -> String
    where
        I: IntoIterator<Item = (&'a str, i64)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let times: Vec<String> = measures
            .into_iter()
            .map(|(name, duration)| format!("{}:{}", encode(name), duration))
            .collect();

        if times.is_empty() {
            debug!("No episodes, nothing to beacon");
            return String::new();
        }

        let mut query = format!("ets={}", times.join(","));

        if let Some(stats) = stats {
            Self::append_resource_stats(&mut query, stats);
        }

        for (key, value) in params {
            query.push_str(&format!(
                "&{}={}",
                encode(key.as_ref()),
                encode(value.as_ref())
            ));
        }

        query.push_str(&format!("&v={}", encode(&self.version)));
        query
    }

    fn append_resource_stats(query: &mut String, stats: &ResourceStats) {
        for (key, stat) in stats.non_empty() {
            if let (Some(max), Some(median), Some(average)) = (stat.max, stat.median, stat.average)
            {
                query.push_str(&format!(
                    "&rt_{}={},{},{},{}",
                    key, stat.count, max, median, average
                ));
            }
        }

        if let Some(slowest) = &stats.slowest {
            let sample: &ResourceSample = &slowest.sample;
            query.push_str(&format!(
                "&slowest={},{},{},{},{},{},{},{}",
                encode(&slowest.name),
                sample.total,
                or_na(sample.download),
                or_na(sample.dns),
                or_na(sample.tcp),
                or_na(sample.ssl),
                or_na(sample.ttfb),
                or_na(sample.content),
            ));
        }
    }
}

impl Default for BeaconEncoder {
    fn default() -> Self {
        Self::new(BEACON_VERSION)
    }
}

fn or_na(value: Option<i64>) -> String {
    match value {
        Some(v) if v != 0 => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Append an encoded beacon to its endpoint
///
/// An empty query means there is nothing to send, and yields an empty string.
pub fn beacon_url(endpoint: &str, query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}", endpoint, separator, query)
}
