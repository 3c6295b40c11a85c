//! Dependency closure resolution and vendoring for gobundle.
//!
//! Bundling a program happens in two steps:
//!
//! 1. [`Resolver`] walks the import graph from the program's root directory and
//!    returns a [`ClosureMap`] of every dependency directory that is not shipped
//!    with the platform.
//! 2. [`Materializer`] copies each of those directories into
//!    `vendor/<import path>` of a fresh [`Workspace`], then copies the program
//!    itself into the workspace root.
//!
//! Build metadata comes from a [`BuildMetadata`] implementation, so the walk
//! can be driven by a real toolchain layout or by an in-memory graph.
//!
//! # Example
//!
//! ```rust,ignore
//! use gobundle_core::{Materializer, Resolver, SkipList, Workspace};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let closure = Resolver::new(&metadata).resolve(root)?;
//!
//! let workspace = Workspace::create()?;
//! Materializer::new(SkipList::default()).materialize(&closure, root, workspace.path())?;
//! // `workspace` is removed when it goes out of scope.
//! ```

pub mod closure;
pub mod error;
pub mod materializer;
pub mod resolver;
pub mod unit;

pub use closure::{Ambiguity, ClosureMap};
pub use error::{Error, Result};
pub use materializer::{Materializer, SkipList, VENDOR_DIR, Workspace, copy_tree};
pub use resolver::Resolver;
pub use unit::{BuildMetadata, BuildUnit, DiscoveryEdge, FOREIGN_IMPORT, Lookup, is_foreign_import};
