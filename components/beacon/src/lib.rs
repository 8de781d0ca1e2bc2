//! Beacon encoding
//!
//! Serializes episode durations, resource timing aggregates, the slowest
//! resource and caller parameters into the query string sent to the
//! collection endpoint. Sending it is the host's job.

mod encoder;

pub use encoder::{beacon_url, BeaconEncoder, BEACON_VERSION};
