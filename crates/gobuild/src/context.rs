//! GOPATH-style package lookup.
//!
//! [`GoBuildContext`] answers [`BuildMetadata`] queries for a Go source tree
//! laid out the classic way: the standard library under `GOROOT/src`, everything
//! else under one of the `GOPATH/src` trees, optionally shadowed by `vendor/`
//! directories between the importer and its source root.
//!
//! Build constraints are ignored on purpose: every non-test `.go` file counts,
//! whatever its GOOS/GOARCH suffix or `//go:build` line. That is the greedy view
//! a bundler needs, since the target platform decides later which files to
//! compile.

use crate::error::{Error, Result};
use crate::scan::imports_in_source;
use gobundle_core::{BuildMetadata, BuildUnit, Lookup};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Package lookup over a GOROOT and an ordered GOPATH list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoBuildContext {
    goroot: PathBuf,
    gopath: Vec<PathBuf>,
}

impl GoBuildContext {
    /// Creates a context from explicit roots.
    pub fn new(goroot: impl Into<PathBuf>, gopath: Vec<PathBuf>) -> Self {
        Self {
            goroot: goroot.into(),
            gopath,
        }
    }

    /// Creates a context from `GOROOT` / `GOPATH`, falling back to
    /// `go env GOROOT` and `$HOME/go`.
    ///
    /// # Errors
    ///
    /// Returns an error if either root cannot be determined.
    pub fn from_env() -> Result<Self> {
        Self::from_parts(
            std::env::var_os("GOROOT"),
            std::env::var_os("GOPATH"),
        )
    }

    /// Creates a context from optional raw `GOROOT` / `GOPATH` values, detecting
    /// whatever is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if either root cannot be determined.
    pub fn from_parts(goroot: Option<OsString>, gopath: Option<OsString>) -> Result<Self> {
        let goroot = match goroot.filter(|v| !v.is_empty()) {
            Some(goroot) => PathBuf::from(goroot),
            None => detect_goroot()?,
        };
        let gopath = match gopath.filter(|v| !v.is_empty()) {
            Some(gopath) => std::env::split_paths(&gopath)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => vec![dirs::home_dir().ok_or(Error::GopathNotFound)?.join("go")],
        };
        let context = Self::new(goroot, gopath);
        tracing::debug!("Using build context {:?}", context);
        Ok(context)
    }

    /// The platform distribution root.
    #[must_use]
    pub fn goroot(&self) -> &Path {
        &self.goroot
    }

    /// The GOPATH entries, in search order.
    #[must_use]
    pub fn gopath(&self) -> &[PathBuf] {
        &self.gopath
    }

    /// Source roots that may contain `vendor/` trees: GOROOT first, then GOPATH.
    fn src_roots(&self) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(self.goroot.join("src")).chain(self.gopath.iter().map(|p| p.join("src")))
    }

    fn is_platform(&self, dir: &Path) -> bool {
        dir.starts_with(self.goroot.join("src"))
    }

    /// Locates `import_path` as seen from `src_dir`.
    fn find(&self, import_path: &str, src_dir: &Path) -> Option<PathBuf> {
        if is_local_import(import_path) {
            let dir = clean(&src_dir.join(import_path));
            return dir.is_dir().then_some(dir);
        }

        if let Some(dir) = self.find_vendored(import_path, src_dir) {
            return Some(dir);
        }

        self.src_roots()
            .map(|root| root.join(import_path))
            .find(|dir| dir.is_dir())
    }

    /// Searches `vendor/` directories from `src_dir` up to, but excluding, the
    /// source root that contains it.
    fn find_vendored(&self, import_path: &str, src_dir: &Path) -> Option<PathBuf> {
        let root = self.src_roots().find(|root| src_dir.starts_with(root))?;
        src_dir
            .ancestors()
            .take_while(|dir| *dir != root)
            .map(|dir| dir.join("vendor").join(import_path))
            .find(|dir| dir.is_dir() && has_go_files(dir))
    }

    /// Scans the package in `dir`.
    fn inspect(&self, import_path: &str, dir: &Path) -> Lookup {
        match package_imports(dir) {
            Ok(Some(imports)) => Lookup::Resolved(BuildUnit {
                dir: Some(dir.to_path_buf()),
                import_path: import_path.to_string(),
                platform_provided: self.is_platform(dir),
                imports: imports.into_iter().collect(),
            }),
            Ok(None) => Lookup::Error(format!(
                "no buildable Go source files in {}",
                dir.display()
            )),
            Err(e) => Lookup::Error(format!("unable to read {}: {e}", dir.display())),
        }
    }
}

impl BuildMetadata for GoBuildContext {
    fn import_dir(&self, dir: &Path) -> Lookup {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.inspect("", &dir)
    }

    fn import(&self, import_path: &str, src_dir: &Path) -> Lookup {
        match self.find(import_path, src_dir) {
            Some(dir) => self.inspect(import_path, &dir),
            None => Lookup::Unresolved,
        }
    }
}

fn detect_goroot() -> Result<PathBuf> {
    let output = Command::new("go")
        .args(["env", "GOROOT"])
        .output()
        .map_err(|e| Error::GorootNotFound {
            message: format!("unable to run `go env GOROOT`: {e}"),
        })?;
    if !output.status.success() {
        return Err(Error::GorootNotFound {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    let goroot = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if goroot.is_empty() {
        return Err(Error::GorootNotFound {
            message: "`go env GOROOT` printed nothing".to_string(),
        });
    }
    Ok(PathBuf::from(goroot))
}

fn is_local_import(import_path: &str) -> bool {
    import_path == "."
        || import_path == ".."
        || import_path.starts_with("./")
        || import_path.starts_with("../")
}

/// Lexically normalizes `path`, resolving `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether a directory entry name is a Go source file that takes part in a
/// regular (non-test) build.
fn is_go_source(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

fn go_sources(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !is_go_source(&name) {
            continue;
        }
        let path = entry.path();
        // Follows symlinks.
        if path.is_file() {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

fn has_go_files(dir: &Path) -> bool {
    go_sources(dir).is_ok_and(|sources| !sources.is_empty())
}

/// Union of the imports of every source file in `dir`, or `None` if it holds
/// no Go sources.
fn package_imports(dir: &Path) -> std::io::Result<Option<BTreeSet<String>>> {
    let sources = go_sources(dir)?;
    if sources.is_empty() {
        return Ok(None);
    }
    let mut imports = BTreeSet::new();
    for source in sources {
        let text = fs::read_to_string(&source)?;
        imports.extend(imports_in_source(&text));
    }
    Ok(Some(imports))
}
