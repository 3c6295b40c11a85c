//! The closure map: resolved directory to the identifier it was first seen under.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};

/// A first-writer-wins collision recorded while building a [`ClosureMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ambiguity {
    /// A directory already in the map was reached again under another identifier.
    DirectoryRenamed {
        /// The directory in question.
        dir: PathBuf,
        /// Identifier kept in the map.
        kept: String,
        /// Identifier that was dropped.
        dropped: String,
    },
    /// One identifier was recorded for two different directories; both land in
    /// the same `vendor/<identifier>` subtree.
    IdentifierSplit {
        /// The shared identifier.
        import_path: String,
        /// Directory recorded first.
        first: PathBuf,
        /// Directory recorded later.
        second: PathBuf,
    },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryRenamed { dir, kept, dropped } => write!(
                f,
                "{} imported as both {kept:?} and {dropped:?}",
                dir.display()
            ),
            Self::IdentifierSplit {
                import_path,
                first,
                second,
            } => write!(
                f,
                "{import_path:?} resolves to both {} and {}",
                first.display(),
                second.display()
            ),
        }
    }
}

/// Mapping from each vendored directory to its import identifier.
///
/// Iteration is ordered by directory so logs and copies are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClosureMap {
    entries: BTreeMap<PathBuf, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ambiguities: Vec<Ambiguity>,
    #[serde(skip)]
    by_import: BTreeMap<String, PathBuf>,
}

impl ClosureMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `dir` under `import_path` unless `dir` is already present.
    ///
    /// Returns true when a new entry was added. Collisions are kept as
    /// [`Ambiguity`] values and logged.
    pub fn insert(&mut self, dir: impl Into<PathBuf>, import_path: impl Into<String>) -> bool {
        let dir = dir.into();
        let import_path = import_path.into();

        let (inserted, ambiguity) = match self.entries.entry(dir) {
            Entry::Occupied(existing) if existing.get() == &import_path => (false, None),
            Entry::Occupied(existing) => {
                let ambiguity = Ambiguity::DirectoryRenamed {
                    dir: existing.key().clone(),
                    kept: existing.get().clone(),
                    dropped: import_path,
                };
                (false, Some(ambiguity))
            }
            Entry::Vacant(slot) => {
                let dir = slot.key().clone();
                slot.insert(import_path.clone());
                let ambiguity = match self.by_import.entry(import_path) {
                    Entry::Occupied(first) => Some(Ambiguity::IdentifierSplit {
                        import_path: first.key().clone(),
                        first: first.get().clone(),
                        second: dir,
                    }),
                    Entry::Vacant(slot) => {
                        slot.insert(dir);
                        None
                    }
                };
                (true, ambiguity)
            }
        };

        if let Some(ambiguity) = ambiguity {
            self.record(ambiguity);
        }
        inserted
    }

    fn record(&mut self, ambiguity: Ambiguity) {
        if self.ambiguities.contains(&ambiguity) {
            return;
        }
        tracing::warn!("Ambiguous vendoring: {}", ambiguity);
        self.ambiguities.push(ambiguity);
    }

    /// Identifier recorded for `dir`, if any.
    #[must_use]
    pub fn get(&self, dir: &Path) -> Option<&str> {
        self.entries.get(dir).map(String::as_str)
    }

    /// Returns true if `dir` is part of the closure.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.entries.contains_key(dir)
    }

    /// Number of vendored directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing needs vendoring.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(directory, identifier)` pairs in directory order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries
            .iter()
            .map(|(dir, import_path)| (dir.as_path(), import_path.as_str()))
    }

    /// Collisions seen while building the map, in discovery order.
    #[must_use]
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Fails if any collision was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousVendoring`] listing every collision.
    pub fn ensure_unambiguous(&self) -> Result<()> {
        if self.ambiguities.is_empty() {
            Ok(())
        } else {
            Err(Error::AmbiguousVendoring {
                ambiguities: self.ambiguities.clone(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a ClosureMap {
    type Item = (&'a Path, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a Path, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let mut map = ClosureMap::new();
        assert!(map.insert("/src/a", "pkgA"));
        assert!(!map.insert("/src/a", "alias/pkgA"));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(Path::new("/src/a")), Some("pkgA"));
        assert_eq!(
            map.ambiguities(),
            [Ambiguity::DirectoryRenamed {
                dir: PathBuf::from("/src/a"),
                kept: "pkgA".to_string(),
                dropped: "alias/pkgA".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_identifier_rediscovery_is_not_ambiguous() {
        let mut map = ClosureMap::new();
        map.insert("/src/a", "pkgA");
        map.insert("/src/a", "pkgA");

        assert_eq!(map.len(), 1);
        assert!(map.ambiguities().is_empty());
    }

    #[test]
    fn test_identifier_split_keeps_both_directories() {
        let mut map = ClosureMap::new();
        map.insert("/gopath/src/pkgB", "pkgB");
        map.insert("/src/app/vendor/pkgB", "pkgB");

        assert_eq!(map.len(), 2);
        assert!(matches!(
            map.ambiguities(),
            [Ambiguity::IdentifierSplit { import_path, .. }] if import_path == "pkgB"
        ));
    }

    #[test]
    fn test_repeated_collision_recorded_once() {
        let mut map = ClosureMap::new();
        map.insert("/src/a", "pkgA");
        map.insert("/src/a", "other");
        map.insert("/src/a", "other");

        assert_eq!(map.ambiguities().len(), 1);
    }

    #[test]
    fn test_ensure_unambiguous() {
        let mut map = ClosureMap::new();
        map.insert("/src/a", "pkgA");
        assert!(map.ensure_unambiguous().is_ok());

        map.insert("/src/a", "other");
        assert!(matches!(
            map.ensure_unambiguous(),
            Err(Error::AmbiguousVendoring { ambiguities }) if ambiguities.len() == 1
        ));
    }

    #[test]
    fn test_iteration_is_ordered_by_directory() {
        let mut map = ClosureMap::new();
        map.insert("/src/z", "z");
        map.insert("/src/a", "a");
        map.insert("/src/m", "m");

        let dirs: Vec<_> = map.iter().map(|(dir, _)| dir.to_path_buf()).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/src/a"),
                PathBuf::from("/src/m"),
                PathBuf::from("/src/z"),
            ]
        );
    }

    #[test]
    fn test_serializes_entries_as_object() {
        let mut map = ClosureMap::new();
        map.insert("/src/a", "pkgA");

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["entries"]["/src/a"], "pkgA");
        assert!(json.get("ambiguities").is_none());
    }
}
