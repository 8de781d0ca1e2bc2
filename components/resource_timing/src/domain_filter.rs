//! Domain allowlist matching for resource timing entries
//!
//! Patterns are hostnames, optionally prefixed with `*.` to also accept any
//! subdomain. `*.example.com` matches `example.com` itself as well.

use episode_types::EpisodeError;
use regex::Regex;
use tracing::debug;
use url::Url;

const WILDCARD_PREFIX: &str = "*.";

/// Compiled domain allowlist
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    patterns: Vec<Regex>,
}

impl DomainFilter {
    /// Compile an allowlist; an empty list matches every host
    pub fn new<S: AsRef<str>>(domains: &[S]) -> Result<Self, EpisodeError> {
        let mut sources: Vec<String> = domains
            .iter()
            .map(|domain| domain.as_ref().trim().to_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();

        // A wildcard also covers the bare apex domain
        let apexes: Vec<String> = sources
            .iter()
            .filter_map(|domain| domain.strip_prefix(WILDCARD_PREFIX))
            .map(str::to_string)
            .collect();
        sources.extend(apexes);

        let patterns = sources
            .iter()
            .map(|domain| Self::compile(domain))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Compiled {} domain patterns", patterns.len());

        Ok(Self { patterns })
    }

    /// Filter that accepts every resource
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether every host passes
    pub fn matches_everything(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of compiled patterns, apex patterns included
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Test a bare hostname
    pub fn matches_host(&self, host: &str) -> bool {
        if self.matches_everything() {
            return true;
        }

        let host = host.to_lowercase();
        self.patterns.iter().any(|pattern| pattern.is_match(&host))
    }

    /// Test the host of an absolute URL
    ///
    /// URLs that do not parse, or have no host, never match a non-empty
    /// allowlist.
    pub fn matches_url(&self, url: &str) -> bool {
        if self.matches_everything() {
            return true;
        }

        match Url::parse(url) {
            Ok(parsed) => parsed
                .host_str()
                .map(|host| self.matches_host(host))
                .unwrap_or(false),
            Err(e) => {
                debug!("Skipping resource with unparsable URL {}: {}", url, e);
                false
            }
        }
    }

    fn compile(domain: &str) -> Result<Regex, EpisodeError> {
        let suffix = domain.strip_prefix(WILDCARD_PREFIX);
        let host = suffix.unwrap_or(domain);

        if let Some(bad) = host
            .chars()
            .find(|c| *c == '*' || *c == '/' || c.is_whitespace())
        {
            return Err(EpisodeError::InvalidPattern {
                pattern: domain.to_string(),
                reason: format!("unexpected '{}' in hostname", bad),
            });
        }

        let body = match suffix {
            Some(suffix) => format!(r".*\.{}", regex::escape(suffix)),
            None => regex::escape(domain),
        };

        Regex::new(&format!("^{}$", body)).map_err(|e| EpisodeError::InvalidPattern {
            pattern: domain.to_string(),
            reason: e.to_string(),
        })
    }
}
