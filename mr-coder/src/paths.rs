//! Keeps file access inside the working root, symlinks included.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Relative, non-empty, and made only of normal components.
fn is_plain_relative(candidate: &Path) -> bool {
    !candidate.as_os_str().is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Canonical form of the deepest ancestor of `path` that exists.
fn canonicalize_existing_ancestor(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    while !current.exists() {
        if !current.pop() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "path has no existing ancestor"));
        }
    }
    current.canonicalize()
}

/// Joins `candidate` onto `root` when the result stays under `root` after
/// symlinks are followed. `None` for absolute paths, `..`, and links that
/// lead out of the tree.
pub fn resolve_in_root(root: &Path, candidate: &str) -> Option<PathBuf> {
    let rel = Path::new(candidate);
    if !is_plain_relative(rel) {
        return None;
    }
    let root = root.canonicalize().ok()?;
    let joined = root.join(rel);
    let resolved = canonicalize_existing_ancestor(&joined).ok()?;
    resolved.starts_with(&root).then_some(joined)
}

/// `true` when an existing `path` resolves to somewhere under `root`.
pub fn is_within(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn plain_paths_resolve_even_when_missing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        let got = resolve_in_root(tmp.path(), "src/new/deep.rs").unwrap();
        assert!(got.ends_with("src/new/deep.rs"));
    }

    #[test]
    fn traversal_and_absolute_paths_are_refused() {
        let tmp = TempDir::new().unwrap();
        for name in ["", "../x", "/etc/passwd", "a/../../b"] {
            assert_eq!(resolve_in_root(tmp.path(), name), None, "{name}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_out_of_the_root_are_refused() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            tmp.path().join("file-link"),
        )
        .unwrap();

        assert_eq!(resolve_in_root(tmp.path(), "link/pwned.txt"), None);
        assert_eq!(resolve_in_root(tmp.path(), "file-link"), None);
        assert!(!is_within(tmp.path(), &tmp.path().join("link/secret.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_inside_the_root_are_allowed() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("real")).unwrap();
        fs::write(tmp.path().join("real/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("alias")).unwrap();

        assert!(resolve_in_root(tmp.path(), "alias/a.txt").is_some());
        assert!(is_within(tmp.path(), &tmp.path().join("alias/a.txt")));
    }
}
