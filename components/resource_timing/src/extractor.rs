//! Resource timing record → phase durations

use crate::types::{ResourceSample, ResourceTimingEntry};
use episode_types::round_half_up;

/// Split one resource timing record into whole-millisecond phases
///
/// Without `requestStart` the browser is hiding the phase timestamps
/// (cross-origin without Timing-Allow-Origin) and only `total` is filled.
pub fn extract(entry: &ResourceTimingEntry) -> ResourceSample {
    let mut sample = ResourceSample {
        total: round_half_up(entry.duration),
        ..Default::default()
    };

    if !entry.has_detailed_timing() {
        return sample;
    }

    let dns = round_half_up(entry.domain_lookup_end - entry.domain_lookup_start);
    let tcp = round_half_up(entry.connect_end - entry.connect_start);
    let ttfb = round_half_up(entry.response_start - entry.request_start);
    let content = round_half_up(entry.response_end - entry.response_start);

    sample.dns = Some(dns);
    sample.tcp = Some(tcp);
    sample.ttfb = Some(ttfb);
    sample.content = Some(content);
    sample.download = Some(
        dns.saturating_add(tcp)
            .saturating_add(ttfb)
            .saturating_add(content),
    );

    // secureConnectionStart is 0 for plain http and for reused connections
    if entry.secure_connection_start != 0.0 {
        sample.ssl = Some(round_half_up(
            entry.connect_end - entry.secure_connection_start,
        ));
    }

    sample
}

impl From<&ResourceTimingEntry> for ResourceSample {
    fn from(entry: &ResourceTimingEntry) -> Self {
        extract(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detailed_entry() -> ResourceTimingEntry {
        ResourceTimingEntry {
            name: "https://static.example.com/app.js".to_string(),
            duration: 120.4,
            domain_lookup_start: 10.0,
            domain_lookup_end: 14.6,
            connect_start: 14.6,
            connect_end: 40.0,
            secure_connection_start: 25.0,
            request_start: 40.2,
            response_start: 90.0,
            response_end: 130.5,
        }
    }

    #[test]
    fn test_detailed_entry() {
        let sample = extract(&detailed_entry());

        assert_eq!(sample.total, 120);
        assert_eq!(sample.dns, Some(5));
        assert_eq!(sample.tcp, Some(25));
        assert_eq!(sample.ssl, Some(15));
        assert_eq!(sample.ttfb, Some(50));
        assert_eq!(sample.content, Some(41));
        assert_eq!(sample.download, Some(5 + 25 + 50 + 41));
    }

    #[test]
    fn test_restricted_entry_only_has_total() {
        let sample = extract(&ResourceTimingEntry::restricted(
            "https://ads.other.net/pixel.gif",
            33.5,
        ));

        assert_eq!(sample.total, 34);
        assert_eq!(sample.dns, None);
        assert_eq!(sample.tcp, None);
        assert_eq!(sample.ssl, None);
        assert_eq!(sample.ttfb, None);
        assert_eq!(sample.content, None);
        assert_eq!(sample.download, None);
    }

    #[test]
    fn test_huge_phases_saturate() {
        let entry = ResourceTimingEntry {
            name: "https://static.example.com/huge.bin".to_string(),
            duration: 1e300,
            domain_lookup_end: 1e300,
            connect_end: 1e300,
            request_start: 1.0,
            response_start: 1e300,
            response_end: 2e300,
            ..Default::default()
        };

        let sample = extract(&entry);
        assert_eq!(sample.total, i64::MAX);
        assert_eq!(sample.download, Some(i64::MAX));
    }

    #[test]
    fn test_no_ssl_without_secure_connection_start() {
        let mut entry = detailed_entry();
        entry.secure_connection_start = 0.0;

        let sample = ResourceSample::from(&entry);
        assert_eq!(sample.ssl, None);
        assert!(sample.download.is_some());
    }
}
