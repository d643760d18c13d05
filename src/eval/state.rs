use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::path;

/// Per-session mutable state: the working directory every relative path is
/// resolved against.
///
/// The process working directory is never changed; commands only ever see
/// this value.
#[derive(Debug, Clone)]
pub struct ShellState {
    current_directory: PathBuf,
    home: PathBuf,
}

impl ShellState {
    /// Start a session in `dir`, which also becomes the session home for a
    /// bare `cd`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = path::normalize(dir.as_ref());
        Self {
            current_directory: dir.clone(),
            home: dir,
        }
    }

    /// Start a session in the process's working directory.
    pub fn from_process() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn current_directory(&self) -> &Path {
        &self.current_directory
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve a user-supplied path against the current directory.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        path::resolve(raw, &self.current_directory)
    }

    /// Resolve `raw` and check that it names an existing directory.
    pub fn directory_at(&self, raw: &str) -> io::Result<PathBuf> {
        let target = self.resolve(raw);
        if !std::fs::metadata(&target)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", target.display()),
            ));
        }
        Ok(target)
    }

    pub(crate) fn set_directory(&mut self, target: PathBuf) {
        info!(
            "cwd {} -> {}",
            self.current_directory.display(),
            target.display()
        );
        self.current_directory = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_into_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut state = ShellState::new(tmp.path());
        let sub = state.directory_at("sub").unwrap();
        state.set_directory(sub);
        assert_eq!(state.current_directory(), path::normalize(&tmp.path().join("sub")));
        assert_eq!(state.home(), path::normalize(tmp.path()));
    }

    #[test]
    fn missing_dir_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let state = ShellState::new(tmp.path());
        let err = state.directory_at("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn file_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("f"), "x").unwrap();
        let state = ShellState::new(tmp.path());
        let err = state.directory_at("f").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
        assert_eq!(state.current_directory(), path::normalize(tmp.path()));
    }

    #[test]
    fn dotdot_moves_up() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        let mut state = ShellState::new(tmp.path().join("a"));
        let up = state.directory_at("..").unwrap();
        state.set_directory(up);
        assert_eq!(state.current_directory(), path::normalize(tmp.path()));
    }
}
