//! Lexical path resolution against the session's current directory.

use std::path::{Component, Path, PathBuf};

/// Resolve `raw` against `cwd` into a normalized absolute path.
///
/// Purely lexical: the file system is never consulted, so `..` through a
/// symlink collapses the textual parent, and a path that does not exist
/// still resolves to *some* absolute path.
pub fn resolve(raw: &str, cwd: &Path) -> PathBuf {
    let raw = Path::new(raw);
    if raw.is_absolute() {
        normalize(raw)
    } else {
        normalize(&cwd.join(raw))
    }
}

/// Collapse `.` and `..` components. `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() refuses to remove the root
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir.as_os_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_passes_through() {
        assert_eq!(resolve("/tmp/x", Path::new("/home")), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn relative_joins_cwd() {
        assert_eq!(
            resolve("docs/a.txt", Path::new("/home/user")),
            PathBuf::from("/home/user/docs/a.txt")
        );
    }

    #[test]
    fn dot_segments_collapse() {
        assert_eq!(
            resolve("./a/../b/./c", Path::new("/srv")),
            PathBuf::from("/srv/b/c")
        );
    }

    #[test]
    fn parent_stops_at_root() {
        assert_eq!(resolve("../../../..", Path::new("/a")), PathBuf::from("/"));
    }

    #[test]
    fn repeated_separators() {
        assert_eq!(resolve("x//y///", Path::new("/")), PathBuf::from("/x/y"));
    }

    #[test]
    fn empty_is_cwd() {
        assert_eq!(resolve("", Path::new("/home/user")), PathBuf::from("/home/user"));
    }
}
