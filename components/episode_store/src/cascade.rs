//! Episodes implied by well-known marks
//!
//! Writing a sentinel mark measures a fixed set of episodes between named
//! marks. The table is plain data so hosts can extend or replace it.

use episode_types::{DONE_MARK, START_MARK};
use serde::{Deserialize, Serialize};

/// Mark written when the first response byte arrives
pub const FIRSTBYTE_MARK: &str = "firstbyte";

/// Mark written when the load event fires
pub const ONLOAD_MARK: &str = "onload";

/// An episode measured between two marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSpec {
    /// Episode name
    pub name: String,
    /// Mark the episode starts at
    pub start_mark: String,
    /// Mark the episode ends at
    pub end_mark: String,
}

impl EpisodeSpec {
    /// Build a spec
    pub fn new(
        name: impl Into<String>,
        start_mark: impl Into<String>,
        end_mark: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_mark: start_mark.into(),
            end_mark: end_mark.into(),
        }
    }
}

/// One sentinel and the episodes it triggers, in measurement order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeRule {
    /// Mark name that triggers the rule
    pub sentinel: String,
    /// Episodes measured right after the sentinel is written
    pub episodes: Vec<EpisodeSpec>,
}

/// Sentinel → episodes lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeTable {
    rules: Vec<CascadeRule>,
}

impl CascadeTable {
    /// Table with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule; a sentinel that already has a rule gets the episodes
    /// appended
    pub fn with_rule(mut self, sentinel: impl Into<String>, episodes: Vec<EpisodeSpec>) -> Self {
        let sentinel = sentinel.into();
        match self.rules.iter_mut().find(|rule| rule.sentinel == sentinel) {
            Some(rule) => rule.episodes.extend(episodes),
            None => self.rules.push(CascadeRule { sentinel, episodes }),
        }
        self
    }

    /// Episodes to measure after `mark` is written
    pub fn episodes_for(&self, mark: &str) -> &[EpisodeSpec] {
        self.rules
            .iter()
            .find(|rule| rule.sentinel == mark)
            .map(|rule| rule.episodes.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `mark` triggers anything
    pub fn is_sentinel(&self, mark: &str) -> bool {
        !self.episodes_for(mark).is_empty()
    }

    /// All rules in declaration order
    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }
}

impl Default for CascadeTable {
    /// The page lifecycle episodes:
    /// - `firstbyte` → `backend`
    /// - `onload` → `frontend`, `page load time`
    /// - `done` → `total load time`
    fn default() -> Self {
        Self::empty()
            .with_rule(
                FIRSTBYTE_MARK,
                vec![EpisodeSpec::new("backend", START_MARK, FIRSTBYTE_MARK)],
            )
            .with_rule(
                ONLOAD_MARK,
                vec![
                    EpisodeSpec::new("frontend", FIRSTBYTE_MARK, ONLOAD_MARK),
                    EpisodeSpec::new("page load time", START_MARK, ONLOAD_MARK),
                ],
            )
            .with_rule(
                DONE_MARK,
                vec![EpisodeSpec::new("total load time", START_MARK, DONE_MARK)],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = CascadeTable::default();

        let names = |mark: &str| -> Vec<String> {
            table
                .episodes_for(mark)
                .iter()
                .map(|spec| spec.name.clone())
                .collect()
        };

        assert_eq!(names("firstbyte"), vec!["backend"]);
        assert_eq!(names("onload"), vec!["frontend", "page load time"]);
        assert_eq!(names("done"), vec!["total load time"]);
        assert!(names("starttime").is_empty());
        assert!(!table.is_sentinel("custom"));
    }

    #[test]
    fn test_with_rule_appends_to_existing_sentinel() {
        let table = CascadeTable::default().with_rule(
            "onload",
            vec![EpisodeSpec::new("onload after firstbyte", "firstbyte", "onload")],
        );

        assert_eq!(table.episodes_for("onload").len(), 3);
        assert_eq!(table.rules().len(), 3);
    }

    #[test]
    fn test_backend_spec() {
        let table = CascadeTable::default();
        assert_eq!(
            table.episodes_for("firstbyte")[0],
            EpisodeSpec::new("backend", "starttime", "firstbyte")
        );
    }
}
