//! Interfaces to the page environment
//!
//! The component never touches a browser directly. Navigation timing,
//! resource timing, the carried-over start time and beacon delivery are all
//! supplied by the host through the traits in this module.

use episode_types::{Clock, SystemClock};
use resource_timing::ResourceTimingSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Name of the cookie written at `beforeunload`
pub const START_COOKIE_NAME: &str = "EPISODES";

/// The navigation timing values the component reads
///
/// A value of `0` means the browser has not filled it in yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTiming {
    /// When navigation to this page began
    pub navigation_start: i64,
    /// When the first response byte arrived
    pub response_start: i64,
    /// When the load event finished, if the browser exposes it
    pub load_event_end: Option<i64>,
}

impl NavigationTiming {
    /// `navigation_start`, unless unavailable
    pub fn start(&self) -> Option<i64> {
        Some(self.navigation_start).filter(|t| *t != 0)
    }

    /// `response_start`, unless unavailable
    pub fn first_byte(&self) -> Option<i64> {
        Some(self.response_start).filter(|t| *t != 0)
    }

    /// `load_event_end`, unless missing or still `0`
    pub fn load_end(&self) -> Option<i64> {
        self.load_event_end.filter(|t| *t != 0)
    }
}

/// Provider of navigation timing
pub trait NavigationTimingSource: Send + Sync {
    /// Current values, or `None` when the browser has no navigation timing
    fn navigation_timing(&self) -> Option<NavigationTiming>;
}

impl NavigationTimingSource for NavigationTiming {
    fn navigation_timing(&self) -> Option<NavigationTiming> {
        Some(*self)
    }
}

/// A start time left behind by the previous page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarriedStart {
    /// When the previous page began unloading
    pub start_epoch: i64,
    /// Whether the previous page is this page's referrer
    pub referrer_match: bool,
}

/// Provider of a carried-over start time
pub trait StartTimeCarrier: Send + Sync {
    /// The carried start, if one was stored
    fn carried_start(&self) -> Option<CarriedStart>;
}

/// Start time carried in the `EPISODES` cookie
///
/// The previous page writes `EPISODES=s=<epoch ms>&r=<escaped location>` when
/// it unloads. The start is only trusted when the stored location is this
/// page's referrer.
#[derive(Debug, Clone, Default)]
pub struct CookieStartTime {
    cookies: String,
    referrer: String,
}

impl CookieStartTime {
    /// Create a carrier over a `document.cookie` style string
    pub fn new(cookies: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            cookies: cookies.into(),
            referrer: referrer.into(),
        }
    }

    /// Cookie value the host should store when the page unloads
    pub fn unload_cookie(now: i64, location: &str) -> String {
        format!(
            "{}=s={}&r={}; path=/",
            START_COOKIE_NAME,
            now,
            urlencoding::encode(location)
        )
    }

    fn parse(&self, value: &str) -> Option<CarriedStart> {
        let mut start_epoch = None;
        let mut referrer_match = false;

        for part in value.split('&') {
            if let Some(s) = part.strip_prefix("s=") {
                start_epoch = s.parse::<i64>().ok().filter(|t| *t != 0);
            } else if let Some(r) = part.strip_prefix("r=") {
                referrer_match = urlencoding::encode(&self.referrer) == r;
            }
        }

        start_epoch.map(|start_epoch| CarriedStart {
            start_epoch,
            referrer_match,
        })
    }
}

impl StartTimeCarrier for CookieStartTime {
    fn carried_start(&self) -> Option<CarriedStart> {
        let prefix = format!("{}=", START_COOKIE_NAME);

        let mut fallback = None;
        for cookie in self.cookies.split(';').map(str::trim) {
            let Some(value) = cookie.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match self.parse(value) {
                Some(carried) if carried.referrer_match => {
                    debug!("Carried start time from cookie: {}", carried.start_epoch);
                    return Some(carried);
                }
                Some(carried) => fallback = fallback.or(Some(carried)),
                None => {}
            }
        }

        fallback
    }
}

/// Delivery of a finished beacon URL
pub trait BeaconTransport: Send + Sync {
    /// Request `url`; failures are logged by the caller and otherwise ignored
    fn send(&self, url: &str) -> anyhow::Result<()>;
}

/// The page environment the component runs in
///
/// Every collaborator is optional; missing ones degrade to "unavailable".
#[derive(Clone)]
pub struct PageHost {
    clock: Arc<dyn Clock>,
    navigation: Option<Arc<dyn NavigationTimingSource>>,
    resources: Option<Arc<dyn ResourceTimingSource>>,
    start_carrier: Option<Arc<dyn StartTimeCarrier>>,
    transport: Option<Arc<dyn BeaconTransport>>,
}

impl PageHost {
    /// A host with only a clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            navigation: None,
            resources: None,
            start_carrier: None,
            transport: None,
        }
    }

    /// Attach navigation timing
    pub fn with_navigation_timing(mut self, source: Arc<dyn NavigationTimingSource>) -> Self {
        self.navigation = Some(source);
        self
    }

    /// Attach resource timing
    pub fn with_resource_timing(mut self, source: Arc<dyn ResourceTimingSource>) -> Self {
        self.resources = Some(source);
        self
    }

    /// Attach a carried-over start time
    pub fn with_start_carrier(mut self, carrier: Arc<dyn StartTimeCarrier>) -> Self {
        self.start_carrier = Some(carrier);
        self
    }

    /// Attach beacon delivery
    pub fn with_transport(mut self, transport: Arc<dyn BeaconTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The clock
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Navigation timing, if the host has it
    pub fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.navigation.as_ref()?.navigation_timing()
    }

    /// Resource timing source
    pub fn resource_timing(&self) -> Option<&dyn ResourceTimingSource> {
        self.resources.as_deref()
    }

    /// Carried start
    pub fn carried_start(&self) -> Option<CarriedStart> {
        self.start_carrier.as_ref()?.carried_start()
    }

    /// Beacon transport
    pub fn transport(&self) -> Option<&dyn BeaconTransport> {
        self.transport.as_deref()
    }
}

impl Default for PageHost {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for PageHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHost")
            .field("navigation", &self.navigation.is_some())
            .field("resources", &self.resources.is_some())
            .field("start_carrier", &self.start_carrier.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
