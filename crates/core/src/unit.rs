//! Build units and the metadata provider seam.
//!
//! A [`BuildUnit`] is the view of one source directory that the resolver needs:
//! where it lives, whether the platform ships it, and what it imports. Units are
//! produced on demand by a [`BuildMetadata`] implementation and never stored.

use std::path::{Path, PathBuf};

/// Import identifier reserved for native interop (cgo). Never followed or vendored.
pub const FOREIGN_IMPORT: &str = "C";

/// Returns true if `import_path` is the foreign-function pseudo-import.
#[must_use]
pub fn is_foreign_import(import_path: &str) -> bool {
    import_path == FOREIGN_IMPORT
}

/// One compilable source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildUnit {
    /// Absolute location of the unit, `None` when it could not be located.
    pub dir: Option<PathBuf>,
    /// Identifier the unit was requested under.
    pub import_path: String,
    /// True for units supplied by the language distribution itself.
    pub platform_provided: bool,
    /// Import identifiers referenced by the unit's source files, in order.
    pub imports: Vec<String>,
}

impl BuildUnit {
    /// Creates a located, non-platform unit with the given imports.
    #[must_use]
    pub fn new(
        import_path: impl Into<String>,
        dir: impl Into<PathBuf>,
        imports: Vec<String>,
    ) -> Self {
        Self {
            dir: Some(dir.into()),
            import_path: import_path.into(),
            platform_provided: false,
            imports,
        }
    }

    /// Marks the unit as supplied by the platform distribution.
    #[must_use]
    pub fn platform(mut self) -> Self {
        self.platform_provided = true;
        self
    }
}

/// Outcome of a single metadata lookup.
///
/// The resolver treats [`Lookup::Unresolved`] and [`Lookup::Error`] the same
/// way: the unit contributes no imports and is not vendored. The distinction is
/// kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The unit was found and inspected.
    Resolved(BuildUnit),
    /// No directory matches the identifier.
    Unresolved,
    /// The directory was found but could not be inspected.
    Error(String),
}

impl Lookup {
    /// Imports of a resolved unit, empty otherwise.
    #[must_use]
    pub fn imports(&self) -> &[String] {
        match self {
            Self::Resolved(unit) => &unit.imports,
            Self::Unresolved | Self::Error(_) => &[],
        }
    }
}

/// Source of build metadata for directories and import identifiers.
///
/// Implementations answer two questions: what does the directory at `dir`
/// import, and where does `import_path` live when referenced from `src_dir`.
/// Neither method fails hard; problems are reported through [`Lookup`].
pub trait BuildMetadata {
    /// Inspects the unit rooted at `dir`.
    fn import_dir(&self, dir: &Path) -> Lookup;

    /// Locates and inspects `import_path` as seen from the absolute directory `src_dir`.
    fn import(&self, import_path: &str, src_dir: &Path) -> Lookup;
}

impl<T: BuildMetadata + ?Sized> BuildMetadata for &T {
    fn import_dir(&self, dir: &Path) -> Lookup {
        (**self).import_dir(dir)
    }

    fn import(&self, import_path: &str, src_dir: &Path) -> Lookup {
        (**self).import(import_path, src_dir)
    }
}

/// "`import_path` was referenced from `origin`" - the traversal's dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryEdge {
    /// Referenced identifier.
    pub import_path: String,
    /// Directory of the importing unit.
    pub origin: PathBuf,
}

impl DiscoveryEdge {
    /// Creates an edge from `origin` to `import_path`.
    #[must_use]
    pub fn new(import_path: impl Into<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            origin: origin.into(),
        }
    }
}
