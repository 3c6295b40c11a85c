//! Error types for bundling operations.

use crate::closure::Ambiguity;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or materializing a bundle.
///
/// Build-metadata lookup failures never show up here: the resolver absorbs
/// them and treats the affected unit as having no imports.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The absolute location of an origin directory could not be computed.
    #[error("Unable to get absolute directory of {}: {source}", path.display())]
    #[diagnostic(
        code(gobundle::core::absolute_path),
        help("Check that the current working directory still exists and is readable")
    )]
    AbsolutePath {
        /// The directory that could not be made absolute.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation failed while copying a tree.
    #[error("Failed to {operation} while copying {} to {}: {source}", source_path.display(), dest_path.display())]
    #[diagnostic(
        code(gobundle::core::io_error),
        help(
            "Check that the source tree is readable and that the temporary directory has free space"
        )
    )]
    Io {
        /// Description of the operation being performed.
        operation: String,
        /// Path being copied from.
        source_path: PathBuf,
        /// Path being copied to.
        dest_path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The temporary workspace directory could not be created.
    #[error("Unable to create tmpdir: {source}")]
    #[diagnostic(
        code(gobundle::core::tempdir),
        help("Set TMPDIR to a writable directory")
    )]
    TempDir {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An import identifier cannot be used as a location below `vendor/`.
    #[error("Import path {import_path:?} does not name a directory inside vendor/")]
    #[diagnostic(
        code(gobundle::core::unsafe_import_path),
        help("Relative imports that climb out of the program tree cannot be vendored")
    )]
    UnsafeImportPath {
        /// The offending identifier.
        import_path: String,
    },

    /// More than one import identifier competes for a vendored location.
    #[error("Ambiguous vendoring: {}", ambiguities.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    #[diagnostic(
        code(gobundle::core::ambiguous_vendoring),
        help("Drop --strict to keep the first discovery of each directory")
    )]
    AmbiguousVendoring {
        /// Every collision recorded during resolution.
        ambiguities: Vec<Ambiguity>,
    },
}

impl Error {
    /// Build an [`Error::Io`] for a failed copy step.
    #[must_use]
    pub fn io(
        operation: impl Into<String>,
        source_path: impl Into<PathBuf>,
        dest_path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            source,
        }
    }
}
