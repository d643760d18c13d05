//! Builtin operations and the contract the evaluator dispatches through.
//!
//! Every builtin declares a [`CommandSpec`] (name, arity bounds, whether it
//! reads piped input) and implements [`Builtin::run`]. The evaluator checks
//! those bounds before `run` is ever called, so implementations may index
//! `args` freely within them.

/// `cp`, `mv`, `rm`, `mkdir`, `rmdir`.
pub mod files;
/// `args`, `help`, `date`, `clear`.
pub mod info;
/// `pwd`, `cd`, `ls`.
pub mod navigate;
/// `cat`, `more`.
pub mod text;

use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::config::Config;
use crate::eval::{CommandRegistry, Outcome, ShellState, Status};

/// Upper arity bound for commands taking any number of arguments.
pub const UNBOUNDED: usize = usize::MAX;

/// Registry entry describing a builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub accepts_piped_input: bool,
    /// May move the session to another directory. Only `cd` sets this.
    pub changes_directory: bool,
    /// One-line description for `help`.
    pub summary: &'static str,
    /// Argument names for `args` and usage lines.
    pub params: &'static [&'static str],
}

impl CommandSpec {
    pub fn accepts_arity(&self, count: usize) -> bool {
        (self.min_args..=self.max_args).contains(&count)
    }

    /// `cp SourcePath DestinationPath`
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in self.params {
            usage.push(' ');
            usage.push_str(param);
        }
        if self.max_args == UNBOUNDED {
            usage.push_str(" ...");
        }
        usage
    }
}

/// Everything a builtin may look at while it runs.
///
/// Session state is read-only here. A builtin whose spec sets
/// `changes_directory` asks for a move with [`Invocation::request_directory`]
/// and [`invoke`] applies it after the builtin returns successfully.
pub struct Invocation<'a> {
    pub args: &'a [String],
    /// Text piped in from the previous stage, if any.
    pub stdin: Option<&'a str>,
    pub state: &'a ShellState,
    pub registry: &'a CommandRegistry,
    /// Output goes straight to a user rather than into a pipe or file.
    pub interactive: bool,
    pub(crate) requested_directory: &'a mut Option<PathBuf>,
}

impl Invocation<'_> {
    pub fn cwd(&self) -> &Path {
        self.state.current_directory()
    }

    pub fn resolve(&self, raw: &str) -> PathBuf {
        self.state.resolve(raw)
    }

    /// Move the session to `dir` once this builtin has succeeded.
    pub fn request_directory(&mut self, dir: PathBuf) {
        *self.requested_directory = Some(dir);
    }
}

/// Run one builtin against the session, then apply the directory change it
/// requested. Requests from builtins without `changes_directory` are dropped.
pub(crate) fn invoke(
    builtin: &dyn Builtin,
    args: &[String],
    stdin: Option<&str>,
    state: &mut ShellState,
    registry: &CommandRegistry,
    interactive: bool,
) -> BuiltinResult {
    let spec = builtin.spec();
    let mut requested = None;
    let output = builtin.run(Invocation {
        args,
        stdin: if spec.accepts_piped_input { stdin } else { None },
        state: &*state,
        registry,
        interactive,
        requested_directory: &mut requested,
    })?;

    if let Some(dir) = requested {
        if spec.changes_directory {
            state.set_directory(dir);
        } else {
            warn!("{} may not change directory, ignoring {}", spec.name, dir.display());
        }
    }
    Ok(output)
}

/// Failure reported by a builtin.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Failed(String),
}

impl BuiltinError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuiltinError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            BuiltinError::Io { .. } => Status::IoError,
            BuiltinError::Failed(_) => Status::GenericError,
        }
    }
}

/// Attach the offending path to an `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T, BuiltinError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, BuiltinError> {
        self.map_err(|e| BuiltinError::io(path, e))
    }
}

pub type BuiltinResult = Result<Option<String>, BuiltinError>;

impl From<BuiltinError> for Outcome {
    fn from(err: BuiltinError) -> Self {
        Outcome::failure_with(err.status(), err.to_string())
    }
}

/// A named operation the evaluator can dispatch to.
pub trait Builtin: Send + Sync {
    fn spec(&self) -> &CommandSpec;

    /// Run with arguments already checked against [`CommandSpec`] bounds.
    ///
    /// `Ok(None)` means the command legitimately produced no text.
    fn run(&self, inv: Invocation<'_>) -> BuiltinResult;
}

/// All shipped builtins, configured from `config`.
pub fn builtins(config: &Config) -> Vec<Box<dyn Builtin>> {
    vec![
        Box::new(navigate::Pwd),
        Box::new(navigate::Cd),
        Box::new(navigate::Ls),
        Box::new(files::Cp),
        Box::new(files::Mv),
        Box::new(files::Rm),
        Box::new(files::Mkdir),
        Box::new(files::Rmdir),
        Box::new(text::Cat),
        Box::new(text::More::new(config.more.page_lines)),
        Box::new(info::Args),
        Box::new(info::Help),
        Box::new(info::Date::new(config.date.format.clone())),
        Box::new(info::Clear),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use super::*;

    /// Run one builtin directly against a session rooted at `dir`.
    pub fn run(
        builtin: &dyn Builtin,
        dir: &Path,
        args: &[&str],
        stdin: Option<&str>,
    ) -> BuiltinResult {
        let mut state = ShellState::new(dir);
        run_in(builtin, &mut state, args, stdin)
    }

    pub fn run_in(
        builtin: &dyn Builtin,
        state: &mut ShellState,
        args: &[&str],
        stdin: Option<&str>,
    ) -> BuiltinResult {
        let registry = CommandRegistry::from_config(&Config::default_config());
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        invoke(builtin, &args, stdin, state, &registry, false)
    }
}
