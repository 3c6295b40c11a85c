//! Error types for Go build context discovery.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for build context operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring a [`GoBuildContext`](crate::GoBuildContext).
///
/// Package lookups never fail with these; they report through
/// [`gobundle_core::Lookup`] instead.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// GOROOT is unset and could not be asked from the `go` tool.
    #[error("Unable to determine GOROOT: {message}")]
    #[diagnostic(
        code(gobundle::gobuild::goroot_not_found),
        help("Set GOROOT or pass --goroot pointing at the Go distribution")
    )]
    GorootNotFound {
        /// Why detection failed.
        message: String,
    },

    /// GOPATH is unset and no home directory is known.
    #[error("Unable to determine GOPATH: no home directory")]
    #[diagnostic(
        code(gobundle::gobuild::gopath_not_found),
        help("Set GOPATH or pass --gopath")
    )]
    GopathNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goroot_not_found_message() {
        let error = Error::GorootNotFound {
            message: "go: command not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unable to determine GOROOT: go: command not found"
        );
    }
}
