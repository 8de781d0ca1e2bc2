//! Integration tests for resource timing aggregation
//!
//! Feeds browser-shaped JSON through the public pipeline and checks the
//! statistics that end up in the beacon.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use resource_timing::*;

fn entries_from_json() -> Vec<ResourceTimingEntry> {
    serde_json::from_str(
        r#"[
            {
                "name": "https://www.example.com/app.js",
                "duration": 80.2,
                "domainLookupStart": 5.0, "domainLookupEnd": 15.0,
                "connectStart": 15.0, "connectEnd": 45.0,
                "secureConnectionStart": 25.0,
                "requestStart": 45.0, "responseStart": 70.0, "responseEnd": 85.0
            },
            {
                "name": "https://img.example.com/hero.jpg",
                "duration": 140.0,
                "domainLookupStart": 20.0, "domainLookupEnd": 20.0,
                "connectStart": 20.0, "connectEnd": 20.0,
                "requestStart": 20.0, "responseStart": 60.0, "responseEnd": 160.0
            },
            {
                "name": "https://ads.thirdparty.net/pixel.gif",
                "duration": 300.0
            },
            {
                "name": "https://example.com/favicon.ico",
                "duration": 12.0
            }
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_allowlisted_aggregation() {
    let filter = DomainFilter::new(&["*.example.com"]).unwrap();
    let pipeline = ResourceAggregationPipeline::new(filter);
    let stats = pipeline
        .run(&StaticResourceTiming::new(entries_from_json()))
        .unwrap();

    // favicon (apex) and the two subdomain resources; the ad is filtered out
    let total = stats.get(MetricKey::all(Metric::Total)).unwrap();
    assert_eq!(
        *total,
        AggregateStat {
            count: 3,
            max: Some(140),
            median: Some(80),
            average: Some(77),
        }
    );

    // favicon is restricted, so only two resources carry phases
    let download = stats.get(MetricKey::all(Metric::Download)).unwrap();
    assert_eq!(download.count, 2);
    assert_eq!(download.max, Some(140));

    let ssl = stats.get(MetricKey::all(Metric::Ssl)).unwrap();
    assert_eq!(ssl.count, 1);
    assert_eq!(ssl.max, Some(20));

    let dns_nz = stats.get(MetricKey::nonzero(Metric::Dns)).unwrap();
    assert_eq!(dns_nz.count, 1);

    let slowest = stats.slowest.unwrap();
    assert_eq!(slowest.name, "https://img.example.com/hero.jpg");
    assert_eq!(slowest.sample.ttfb, Some(40));
    assert_eq!(slowest.sample.content, Some(100));
}

#[test]
fn test_all_domains_when_allowlist_empty() {
    let pipeline = ResourceAggregationPipeline::new(DomainFilter::allow_all());
    let stats = pipeline.aggregate(&entries_from_json());

    assert_eq!(stats.get(MetricKey::all(Metric::Total)).unwrap().count, 4);
    assert_eq!(stats.get(MetricKey::all(Metric::Total)).unwrap().max, Some(300));
}

#[test]
fn test_stats_serialize_for_reports() {
    let stats = ResourceAggregationPipeline::default().aggregate(&entries_from_json()[2..]);
    let json = serde_json::to_value(&stats).unwrap();

    assert!(json["slowest"].is_null());
    assert_eq!(json["stats"].as_array().unwrap().len(), 14);
}

proptest! {
    #[test]
    fn median_is_independent_of_sort_direction(mut samples in prop::collection::vec(0i64..100_000, 1..64)) {
        samples.sort_unstable();
        let ascending = StatAggregator::median(&samples);

        samples.reverse();
        let descending = StatAggregator::median(&samples);

        prop_assert_eq!(ascending, descending);
    }

    #[test]
    fn aggregate_bounds_hold(samples in prop::collection::vec(0i64..100_000, 1..64)) {
        let stat = StatAggregator::aggregate(&samples);
        let max = *samples.iter().max().unwrap();
        let min = *samples.iter().min().unwrap();

        prop_assert_eq!(stat.count, samples.len());
        prop_assert_eq!(stat.max, Some(max));
        prop_assert!(stat.median.unwrap() >= min && stat.median.unwrap() <= max);
        prop_assert!(stat.average.unwrap() >= min && stat.average.unwrap() <= max);
    }
}

#[test]
fn test_saturated_durations_aggregate() {
    let huge = |name: &str| ResourceTimingEntry {
        name: name.to_string(),
        duration: 1e300,
        request_start: 1.0,
        response_start: 1e300,
        response_end: 1e300,
        ..Default::default()
    };
    let pipeline = ResourceAggregationPipeline::new(DomainFilter::allow_all());

    let stats = pipeline.aggregate(&[huge("https://a.example/1"), huge("https://a.example/2")]);

    let total = stats.get(MetricKey::all(Metric::Total)).unwrap();
    assert_eq!(total.count, 2);
    assert_eq!(total.median, Some(i64::MAX));
    assert_eq!(total.average, Some(i64::MAX));

    let download = stats.get(MetricKey::all(Metric::Download)).unwrap();
    assert_eq!(download.max, Some(i64::MAX));
    assert_eq!(stats.slowest.unwrap().name, "https://a.example/1");
}
