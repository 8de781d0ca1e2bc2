//! Insertion-ordered name → time map
//!
//! Marks, durations and starts are reported in the order their names were
//! first written. Overwriting a name keeps its position.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Name → integer milliseconds, iterated in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedTimes {
    entries: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl NamedTimes {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, returning the previous value
    pub fn insert(&mut self, name: &str, value: i64) -> Option<i64> {
        match self.index.get(name) {
            Some(&position) => {
                let previous = self.entries[position].1;
                self.entries[position].1 = value;
                Some(previous)
            }
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
                None
            }
        }
    }

    /// Value stored under `name`
    pub fn get(&self, name: &str) -> Option<i64> {
        self.index.get(name).map(|&position| self.entries[position].1)
    }

    /// Whether `name` has a value
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no names
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl Serialize for NamedTimes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a NamedTimes {
    type Item = (&'a str, i64);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, i64)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut times = NamedTimes::new();
        times.insert("starttime", 100);
        times.insert("firstbyte", 150);
        assert_eq!(times.insert("starttime", 90), Some(100));

        let names: Vec<&str> = times.names().collect();
        assert_eq!(names, vec!["starttime", "firstbyte"]);
        assert_eq!(times.get("starttime"), Some(90));
    }

    #[test]
    fn test_clear() {
        let mut times = NamedTimes::new();
        times.insert("a", 1);
        times.clear();

        assert!(times.is_empty());
        assert!(!times.contains("a"));
        assert_eq!(times.insert("a", 2), None);
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut times = NamedTimes::new();
        times.insert("zeta", 1);
        times.insert("alpha", 2);

        let json = serde_json::to_string(&times).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":2}"#);
    }
}
