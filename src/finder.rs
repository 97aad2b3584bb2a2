//! Object finders and the storage lookup boundary.
//!
//! A finder selects which detections participate in matching or removal;
//! storage supplies the second ("other") collection for comparisons
//! against a separately-stored reference.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::error::LocmatchError;
use crate::object::LocatedObjects;
use crate::report::Report;

/// Selects a subset of a detection collection.
#[derive(Clone, Debug)]
pub enum ObjectFinder {
    /// Every object.
    All,
    /// Objects whose `index` metadata is in the set.
    ByIndex(BTreeSet<i64>),
    /// Objects whose metadata under `key` matches `pattern`.
    ByMetaValue { key: String, pattern: Regex },
}

impl ObjectFinder {
    /// Creates a metadata-value finder from a pattern string.
    ///
    /// # Errors
    /// Returns [`LocmatchError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn by_meta_value(
        key: impl Into<String>,
        pattern: &str,
    ) -> Result<ObjectFinder, LocmatchError> {
        let compiled = Regex::new(pattern).map_err(|source| LocmatchError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(ObjectFinder::ByMetaValue {
            key: key.into(),
            pattern: compiled,
        })
    }

    /// Returns the object indices of all matching objects.
    pub fn find(&self, objects: &LocatedObjects) -> BTreeSet<i64> {
        objects
            .iter()
            .filter(|obj| self.matches_object(obj))
            .filter_map(|obj| obj.index())
            .collect()
    }

    /// Returns a new collection holding only the matching objects.
    pub fn select(&self, objects: &LocatedObjects) -> LocatedObjects {
        objects
            .iter()
            .filter(|obj| self.matches_object(obj))
            .cloned()
            .collect()
    }

    fn matches_object(&self, obj: &crate::object::LocatedObject) -> bool {
        match self {
            ObjectFinder::All => true,
            ObjectFinder::ByIndex(indices) => {
                obj.index().map(|idx| indices.contains(&idx)).unwrap_or(false)
            }
            ObjectFinder::ByMetaValue { key, pattern } => obj
                .meta_str(key)
                .is_some_and(|value| pattern.is_match(&value)),
        }
    }
}

/// Lookup boundary for reports stored by the surrounding pipeline.
pub trait Storage {
    /// Returns the report stored under `name`, if any.
    fn get(&self, name: &str) -> Option<&Report>;
}

/// A simple in-memory storage implementation.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, Report>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a report under the given name.
    pub fn insert(&mut self, name: impl Into<String>, report: Report) {
        self.items.insert(name.into(), report);
    }
}

impl Storage for MemoryStorage {
    fn get(&self, name: &str) -> Option<&Report> {
        self.items.get(name)
    }
}

/// Fetches a report from storage, turning absence into
/// [`LocmatchError::StorageMiss`].
pub fn fetch<'a>(storage: &'a dyn Storage, name: &str) -> Result<&'a Report, LocmatchError> {
    storage
        .get(name)
        .ok_or_else(|| LocmatchError::StorageMiss(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::object::LocatedObject;

    fn objects() -> LocatedObjects {
        vec![
            LocatedObject::new(Rect::new(0, 0, 5, 5))
                .with_index(1)
                .with_meta("type", "car"),
            LocatedObject::new(Rect::new(10, 10, 5, 5))
                .with_index(2)
                .with_meta("type", "truck"),
            LocatedObject::new(Rect::new(20, 20, 5, 5)).with_index(3),
        ]
        .into()
    }

    #[test]
    fn all_finder_returns_every_index() {
        assert_eq!(
            ObjectFinder::All.find(&objects()),
            BTreeSet::from([1, 2, 3])
        );
    }

    #[test]
    fn index_finder_filters() {
        let finder = ObjectFinder::ByIndex(BTreeSet::from([2, 3]));
        let selected = finder.select(&objects());
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].index(), Some(2));
    }

    #[test]
    fn meta_value_finder_uses_regex() {
        let finder = ObjectFinder::by_meta_value("type", "^car$").unwrap();
        assert_eq!(finder.find(&objects()), BTreeSet::from([1]));

        let broad = ObjectFinder::by_meta_value("type", "car|truck").unwrap();
        assert_eq!(broad.find(&objects()), BTreeSet::from([1, 2]));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(
            ObjectFinder::by_meta_value("type", "["),
            Err(LocmatchError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn storage_miss_is_surfaced() {
        let mut storage = MemoryStorage::new();
        storage.insert("annotations", Report::new());

        assert!(fetch(&storage, "annotations").is_ok());
        assert!(matches!(
            fetch(&storage, "missing"),
            Err(LocmatchError::StorageMiss(name)) if name == "missing"
        ));
    }
}
