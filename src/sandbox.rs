//! Path sandboxing for Blikk.
//!
//! Every file operation resolves its caller-supplied relative path through
//! [`PathSandbox`] before touching the filesystem. Resolution is fail-closed:
//! anything that cannot be proven to lie inside the root is denied.

use crate::error::{BlikkError, Result};
use std::path::{Component, Path, PathBuf};

/// Resolves relative paths against an immutable root directory.
///
/// The root is canonicalized once at construction. Containment is checked by
/// path components, never by raw string prefix, so a sibling directory whose
/// name merely extends the root's name (`/data` vs `/database`) is rejected.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    /// Create a sandbox rooted at `root`. The directory must exist.
    pub fn new(root: &Path) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| {
            BlikkError::Config(format!(
                "Sandbox root {} is not accessible: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied relative path to a canonical absolute path
    /// proven to lie within the root.
    ///
    /// Traversal segments, absolute prefixes, and symlinks are all resolved
    /// before the containment check. Any resolution failure (permission
    /// error, broken symlink, malformed path) is reported as access denied
    /// rather than propagated.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        self.try_resolve(relative)
            .ok_or_else(|| self.denied(relative))
    }

    fn try_resolve(&self, relative: &str) -> Option<PathBuf> {
        if relative.contains('\0') {
            return None;
        }

        let joined = self.root.join(relative);
        let resolved = canonicalize_allow_missing(&joined)?;

        // Component-wise containment; equality covers the root itself.
        if resolved == self.root || resolved.starts_with(&self.root) {
            Some(resolved)
        } else {
            None
        }
    }

    fn denied(&self, relative: &str) -> BlikkError {
        BlikkError::AccessDenied(format!(
            "Path '{}' is outside repository bounds",
            relative
        ))
    }
}

/// Canonicalize a path that may not exist yet.
///
/// If the path exists it is canonicalized directly, which resolves every
/// symlink and `..` segment the way the filesystem would. Otherwise the
/// deepest existing ancestor is canonicalized and the missing tail is
/// re-appended. Walking up relies on `Path::file_name`, which yields `None`
/// for a `..` component, so a traversal segment under a directory that does
/// not exist yet cannot be resolved and is rejected (fail-closed).
fn canonicalize_allow_missing(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Some(resolved);
    }

    let mut base = path.to_path_buf();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();

    loop {
        match base.parent() {
            Some(parent) => {
                tail.push(base.file_name()?.to_os_string());
                base = parent.to_path_buf();
            }
            None => return None,
        }
        if base.exists() {
            break;
        }
    }

    debug_assert!(tail
        .iter()
        .all(|s| matches!(Path::new(s).components().next(), Some(Component::Normal(_)))));

    let mut resolved = base.canonicalize().ok()?;
    for segment in tail.iter().rev() {
        resolved.push(segment);
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, PathSandbox) {
        let dir = TempDir::new().unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();
        (dir, sandbox)
    }

    #[test]
    fn test_resolves_simple_relative_path() {
        let (dir, sandbox) = sandbox();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();

        let resolved = sandbox.resolve("file.txt").unwrap();
        assert!(resolved.starts_with(sandbox.root()));
        assert_eq!(resolved.file_name().unwrap(), "file.txt");
    }

    #[test]
    fn test_resolves_root_itself() {
        let (_dir, sandbox) = sandbox();
        let resolved = sandbox.resolve(".").unwrap();
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_resolves_missing_path_for_writing() {
        let (_dir, sandbox) = sandbox();
        let resolved = sandbox.resolve("notes/todo.txt").unwrap();
        assert!(resolved.starts_with(sandbox.root()));
        assert!(resolved.ends_with("notes/todo.txt"));
    }

    #[test]
    fn test_denies_parent_traversal() {
        let (_dir, sandbox) = sandbox();
        assert!(matches!(
            sandbox.resolve("../escape.txt"),
            Err(BlikkError::AccessDenied(_))
        ));
        assert!(matches!(
            sandbox.resolve("a/../../escape.txt"),
            Err(BlikkError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_denies_traversal_under_missing_directory() {
        let (_dir, sandbox) = sandbox();
        // "missing" does not exist, so the ".." cannot be checked against
        // the real filesystem; ambiguity denies.
        assert!(sandbox.resolve("missing/../../etc/passwd").is_err());
    }

    #[test]
    fn test_curdir_segment_under_missing_directory_is_harmless() {
        let (_dir, sandbox) = sandbox();
        // "." segments carry no navigation and normalize away.
        let resolved = sandbox.resolve("missing/./file.txt").unwrap();
        assert!(resolved.starts_with(sandbox.root()));
    }

    #[test]
    fn test_denies_absolute_path_outside_root() {
        let (_dir, sandbox) = sandbox();
        // Joining an absolute path replaces the root entirely.
        assert!(matches!(
            sandbox.resolve("/etc/passwd"),
            Err(BlikkError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_inner_traversal_that_stays_inside_is_allowed() {
        let (dir, sandbox) = sandbox();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();

        let resolved = sandbox.resolve("sub/../file.txt").unwrap();
        assert_eq!(resolved.file_name().unwrap(), "file.txt");
    }

    #[test]
    fn test_denies_sibling_sharing_root_string_prefix() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("data");
        let sibling = parent.path().join("database");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&sibling).unwrap();
        std::fs::write(sibling.join("secret.txt"), "x").unwrap();

        let sandbox = PathSandbox::new(&root).unwrap();
        assert!(sandbox.resolve("../database/secret.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_denies_symlink_escape() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("target.txt"), "secret").unwrap();

        let (dir, sandbox) = sandbox();
        std::os::unix::fs::symlink(
            outside.path().join("target.txt"),
            dir.path().join("link.txt"),
        )
        .unwrap();

        assert!(matches!(
            sandbox.resolve("link.txt"),
            Err(BlikkError::AccessDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_allows_symlink_within_root() {
        let (dir, sandbox) = sandbox();
        std::fs::write(dir.path().join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("real.txt"),
            dir.path().join("alias.txt"),
        )
        .unwrap();

        let resolved = sandbox.resolve("alias.txt").unwrap();
        assert_eq!(resolved.file_name().unwrap(), "real.txt");
    }

    #[test]
    fn test_rejects_nul_bytes() {
        let (_dir, sandbox) = sandbox();
        assert!(sandbox.resolve("file\0.txt").is_err());
    }

    #[test]
    fn test_missing_root_is_config_error() {
        assert!(matches!(
            PathSandbox::new(Path::new("/nonexistent/blikk-root")),
            Err(BlikkError::Config(_))
        ));
    }
}
