//! Dependency closure resolution.
//!
//! The [`Resolver`] walks the import graph breadth-first from a root directory
//! and collects every vendorable unit into a [`ClosureMap`].
//!
//! Traversal state is keyed on [`DiscoveryEdge`]s rather than on resolved
//! directories: two importers of the same identifier each get to resolve it once,
//! so per-origin lookup differences (nested `vendor/` trees, build constraints)
//! are honored, while a repeated identical edge is never walked twice.

use crate::closure::ClosureMap;
use crate::error::{Error, Result};
use crate::unit::{BuildMetadata, DiscoveryEdge, Lookup, is_foreign_import};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Computes the transitive set of units a program needs.
pub struct Resolver<M> {
    metadata: M,
}

impl<M: BuildMetadata> Resolver<M> {
    /// Creates a resolver backed by `metadata`.
    pub fn new(metadata: M) -> Self {
        Self { metadata }
    }

    /// Resolves the closure of `root`.
    ///
    /// The root itself is never part of the result; it is copied separately.
    ///
    /// # Errors
    ///
    /// Fails only when an origin directory cannot be made absolute. Metadata
    /// lookup problems are absorbed: the affected unit simply has no imports.
    pub fn resolve(&self, root: &Path) -> Result<ClosureMap> {
        let abs_root = absolute(root)?;
        let mut closure = ClosureMap::new();

        let root_unit = self.metadata.import_dir(root);
        match &root_unit {
            Lookup::Resolved(_) => {}
            Lookup::Unresolved => {
                tracing::debug!("No build unit at {}, continuing", root.display());
            }
            Lookup::Error(detail) => {
                // Usually all files were excluded by build constraints.
                tracing::debug!("Ignoring error for {}: {}", root.display(), detail);
            }
        }

        let mut queue: VecDeque<DiscoveryEdge> = root_unit
            .imports()
            .iter()
            .map(|import_path| DiscoveryEdge::new(import_path.clone(), root))
            .collect();
        let mut visited: HashSet<DiscoveryEdge> = HashSet::new();

        while let Some(edge) = queue.pop_front() {
            if is_foreign_import(&edge.import_path) {
                continue;
            }
            if visited.contains(&edge) {
                continue;
            }
            visited.insert(edge.clone());

            let origin = absolute(&edge.origin)?;
            let unit = match self.metadata.import(&edge.import_path, &origin) {
                Lookup::Resolved(unit) => unit,
                Lookup::Unresolved => {
                    tracing::debug!(
                        "Could not locate {:?} (imported from {:?})",
                        edge.import_path,
                        edge.origin
                    );
                    continue;
                }
                Lookup::Error(detail) => {
                    tracing::debug!(
                        "Ignoring error for {:?} (imported from {:?}): {}",
                        edge.import_path,
                        edge.origin,
                        detail
                    );
                    continue;
                }
            };

            if unit.platform_provided {
                continue;
            }
            let Some(dir) = unit.dir else {
                continue;
            };
            if dir == abs_root {
                continue;
            }

            tracing::debug!(
                "Located {:?} (imported from {:?}) -> {:?}",
                edge.import_path,
                edge.origin,
                dir
            );
            closure.insert(dir.clone(), edge.import_path);

            queue.extend(
                unit.imports
                    .into_iter()
                    .map(|import_path| DiscoveryEdge::new(import_path, dir.clone())),
            );
        }

        tracing::info!(
            "Resolved {} dependencies of {}",
            closure.len(),
            root.display()
        );
        Ok(closure)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| Error::AbsolutePath {
        path: path.to_path_buf(),
        source,
    })
}
