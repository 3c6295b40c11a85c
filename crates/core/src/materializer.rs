//! Vendoring tree materialization.
//!
//! A [`Materializer`] lays a [`ClosureMap`] and the root program out in a
//! [`Workspace`]:
//!
//! ```text
//! <workspace>/
//!   vendor/<import path>/...   one subtree per dependency directory
//!   ...                        the root program's own files
//! ```
//!
//! Symbolic links are followed and written out as regular files or
//! directories. Entries named in the [`SkipList`] are never copied.

use crate::closure::ClosureMap;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fs::{self, DirBuilder, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

/// Directory that holds the vendored dependencies inside a workspace.
pub const VENDOR_DIR: &str = "vendor";

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Entry names excluded from every copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipList {
    names: BTreeSet<String>,
}

impl SkipList {
    /// Creates a skip list from explicit names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A skip list that copies everything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Returns true if entries called `name` are skipped.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for SkipList {
    /// Version-control metadata directories.
    fn default() -> Self {
        Self::new([".git", ".hg"])
    }
}

/// A freshly created temporary directory that is removed when dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocates a new empty workspace in the system temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TempDir`] if the directory cannot be created.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("gobundle")
            .tempdir()
            .map_err(|source| Error::TempDir { source })?;
        tracing::debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Location of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Disarms cleanup and returns the workspace location.
    #[must_use]
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Copies a dependency closure and its root program into a workspace.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    skip: SkipList,
}

impl Materializer {
    /// Creates a materializer that ignores entries in `skip`.
    #[must_use]
    pub fn new(skip: SkipList) -> Self {
        Self { skip }
    }

    /// Populates `workspace` with every closure entry under `vendor/` and the
    /// root program at the top level.
    ///
    /// On failure the workspace is left partially populated; the caller owns
    /// its cleanup.
    ///
    /// # Errors
    ///
    /// Returns the first I/O failure, naming the source and destination paths,
    /// or [`Error::UnsafeImportPath`] for an identifier that would leave the
    /// vendor tree.
    pub fn materialize(&self, closure: &ClosureMap, root: &Path, workspace: &Path) -> Result<()> {
        let vendor = workspace.join(VENDOR_DIR);
        for (dir, import_path) in closure {
            let dest = vendor.join(vendor_subpath(import_path)?);
            copy_tree(dir, &dest, &self.skip)?;
        }

        copy_tree(root, workspace, &self.skip)?;

        tracing::info!(
            "Materialized {} vendored directories into {}",
            closure.len(),
            workspace.display()
        );
        Ok(())
    }
}

/// Relative location of `import_path` below `vendor/`.
///
/// `.` components are dropped; identifiers with `..` or absolute components are
/// rejected.
fn vendor_subpath(import_path: &str) -> Result<PathBuf> {
    let mut subpath = PathBuf::new();
    for component in Path::new(import_path).components() {
        match component {
            Component::Normal(part) => subpath.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeImportPath {
                    import_path: import_path.to_string(),
                });
            }
        }
    }
    if subpath.as_os_str().is_empty() {
        return Err(Error::UnsafeImportPath {
            import_path: import_path.to_string(),
        });
    }
    Ok(subpath)
}

/// Recursively copies `src` into `dst`, skipping names in `skip`.
///
/// Symlinks are resolved and copied as what they point to. `dst` and any
/// missing parents are created. A symlink that leads back to one of its own
/// ancestors is an error rather than an endless copy.
///
/// # Errors
///
/// Returns [`Error::Io`] for the first failing filesystem operation.
pub fn copy_tree(src: &Path, dst: &Path, skip: &SkipList) -> Result<()> {
    tracing::debug!("Copying {:?} to {:?}", src, dst);
    create_dir_all(dst).map_err(|e| Error::io("create destination directory", src, dst, e))?;

    let walker = WalkDir::new(src)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !entry
                .file_name()
                .to_str()
                .is_some_and(|name| skip.contains(name))
        });

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(src, dst, e))?;
        let target = destination(src, dst, entry.path());

        // With follow_links the type is that of the link target.
        if entry.file_type().is_dir() {
            create_dir_all(&target)
                .map_err(|e| Error::io("create destination directory", entry.path(), &target, e))?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Where `path` (somewhere below `src`) lands below `dst`.
fn destination(src: &Path, dst: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(src) {
        Ok(rel) if !rel.as_os_str().is_empty() => dst.join(rel),
        _ => dst.to_path_buf(),
    }
}

fn walk_error(src: &Path, dst: &Path, err: walkdir::Error) -> Error {
    let source_path = err.path().map_or_else(|| src.to_path_buf(), Path::to_path_buf);
    let dest_path = destination(src, dst, &source_path);
    let through_link = err.loop_ancestor().is_some()
        || fs::symlink_metadata(&source_path).is_ok_and(|m| m.file_type().is_symlink());
    let operation = if through_link {
        "follow symlink"
    } else {
        "read directory"
    };
    Error::io(operation, source_path, dest_path, io::Error::from(err))
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let mut reader = File::open(src).map_err(|e| Error::io("open", src, dst, e))?;
    let mut writer = File::create(dst).map_err(|e| Error::io("create", src, dst, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| Error::io("copy file", src, dst, e))?;
    // Dropping a File swallows write-back failures; surface them here.
    writer
        .sync_all()
        .map_err(|e| Error::io("close", src, dst, e))?;
    Ok(())
}

fn create_dir_all(dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_skip_list() {
        let skip = SkipList::default();
        assert!(skip.contains(".git"));
        assert!(skip.contains(".hg"));
        assert!(!skip.contains(".github"));
        assert!(!SkipList::empty().contains(".git"));
    }

    #[test]
    fn test_vendor_subpath() {
        assert_eq!(
            vendor_subpath("github.com/x/y").unwrap(),
            PathBuf::from("github.com/x/y")
        );
        assert_eq!(vendor_subpath("./local").unwrap(), PathBuf::from("local"));
        assert!(vendor_subpath("../escape").is_err());
        assert!(vendor_subpath("/abs").is_err());
        assert!(vendor_subpath(".").is_err());
    }

    #[test]
    fn test_copy_tree_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("main.go"), "package main\n").unwrap();

        let dst = temp.path().join("out/vendor/example.com/pkg");
        copy_tree(&src, &dst, &SkipList::default()).unwrap();

        assert_eq!(
            fs::read_to_string(dst.join("main.go")).unwrap(),
            "package main\n"
        );
    }

    #[test]
    fn test_copy_tree_missing_source_names_both_paths() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("does-not-exist");
        let dst = temp.path().join("out");

        let err = copy_tree(&src, &dst, &SkipList::default()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("read directory"));
        assert!(message.contains("does-not-exist"));
        assert!(message.contains("out"));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_dangling_symlink_fails() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), src.join("dangling")).unwrap();

        let err = copy_tree(&src, &temp.path().join("out"), &SkipList::default()).unwrap_err();

        assert!(err.to_string().contains("follow symlink"));
    }

    #[cfg(unix)]
    #[test]
    fn test_created_directories_are_traversable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src/nested");
        fs::create_dir_all(&src).unwrap();

        let dst = temp.path().join("out");
        copy_tree(&temp.path().join("src"), &dst, &SkipList::default()).unwrap();

        let mode = fs::metadata(dst.join("nested")).unwrap().permissions().mode();
        assert_eq!(mode & 0o500, 0o500);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_symlink_loop_fails_without_recursing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("main.go"), "package main\n").unwrap();
        std::os::unix::fs::symlink(".", src.join("self")).unwrap();

        let dst = temp.path().join("out");
        let err = copy_tree(&src, &dst, &SkipList::default()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("follow symlink"), "{message}");
        assert!(message.contains("self"), "{message}");
        assert!(!dst.join("self/self").exists());
    }

    #[test]
    fn test_copy_file_writes_complete_contents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("blob.bin");
        let contents: Vec<u8> = (0..=255u8).cycle().take(64 * 1024 + 7).collect();
        fs::write(&src, &contents).unwrap();

        let dst = temp.path().join("copy.bin");
        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), contents);
    }

    #[test]
    fn test_copy_file_reports_unwritable_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.go");
        fs::write(&src, "package a\n").unwrap();

        let dst = temp.path().join("missing-dir/a.go");
        let err = copy_file(&src, &dst).unwrap_err();

        assert!(matches!(err, Error::Io { ref operation, .. } if operation == "create"));
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let workspace = Workspace::create().unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("gobundle")
        );

        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_workspace_keep_disarms_cleanup() {
        let path = Workspace::create().unwrap().keep();
        assert!(path.is_dir());
        fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_materialize_rejects_escaping_identifier() {
        let temp = TempDir::new().unwrap();
        let dep = temp.path().join("dep");
        fs::create_dir_all(&dep).unwrap();
        let root = temp.path().join("app");
        fs::create_dir_all(&root).unwrap();
        let workspace = temp.path().join("ws");

        let mut closure = ClosureMap::new();
        closure.insert(&dep, "../dep");

        let err = Materializer::default()
            .materialize(&closure, &root, &workspace)
            .unwrap_err();
        assert!(matches!(err, Error::UnsafeImportPath { .. }));
    }
}
