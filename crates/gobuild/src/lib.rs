//! Go source tree build metadata for gobundle.
//!
//! [`GoBuildContext`] implements [`gobundle_core::BuildMetadata`] by scanning
//! `.go` files for their import clauses and locating imported packages the
//! GOPATH way:
//!
//! 1. relative imports (`./x`, `../x`) against the importing directory,
//! 2. `vendor/` directories from the importer up to its source root,
//! 3. `GOROOT/src` (reported as platform-provided),
//! 4. each `GOPATH/src`, in order.
//!
//! ```rust,ignore
//! use gobundle_core::Resolver;
//! use gobundle_gobuild::GoBuildContext;
//! use std::path::Path;
//!
//! let context = GoBuildContext::from_env()?;
//! let closure = Resolver::new(&context).resolve(Path::new("."))?;
//! ```

pub mod context;
pub mod error;
pub mod scan;

pub use context::GoBuildContext;
pub use error::{Error, Result};
pub use scan::imports_in_source;
