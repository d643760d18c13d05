pub mod outcome;
pub mod registry;
pub mod state;

pub use outcome::{Outcome, Status};
pub use registry::CommandRegistry;
pub use state::ShellState;

use std::fs::OpenOptions;
use std::io::Write;

use log::{debug, warn};

use crate::commands::{self, CommandSpec, UNBOUNDED};
use crate::config::Config;
use crate::parse::{self, Directive};

/// How a redirect opens its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Truncate,
    Append,
}

/// Turns raw lines into builtin invocations.
///
/// Pipelines and redirects are evaluated by recursion on their raw sides:
/// the left (or inner) side always runs to completion first, and the first
/// failure is returned as-is without touching the rest of the line.
pub struct Evaluator {
    registry: CommandRegistry,
    interactive: bool,
}

impl Evaluator {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            registry,
            interactive: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CommandRegistry::from_config(config))
    }

    /// Mark top-level output as going straight to a user's terminal.
    ///
    /// Stages whose output is piped or redirected are never interactive.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Evaluate one raw line with optional piped-in text.
    pub fn evaluate(&self, line: &str, stdin: Option<&str>, state: &mut ShellState) -> Outcome {
        self.eval(line, stdin, state, self.interactive)
    }

    fn eval(
        &self,
        line: &str,
        stdin: Option<&str>,
        state: &mut ShellState,
        to_user: bool,
    ) -> Outcome {
        let directive = match parse::partition(line, &self.registry) {
            Ok(directive) => directive,
            Err(e) => {
                debug!("syntax error in {line:?}: {e}");
                return Outcome::failure_with(Status::SyntaxError, e.to_string());
            }
        };

        match directive {
            Directive::Empty => Outcome::success(None),
            Directive::Unregistered { name, .. } => {
                Outcome::failure_with(Status::CommandNotFound, format!("{name}: command not found"))
            }
            Directive::Simple { name, args } => self.dispatch(&name, &args, stdin, state, to_user),
            Directive::Pipeline {
                left_raw,
                right_raw,
            } => {
                let left = self.eval(&left_raw, stdin, state, false);
                if !left.is_success() {
                    return left;
                }
                self.eval(&right_raw, left.output.as_deref(), state, to_user)
            }
            Directive::RedirectOverwrite {
                left_raw,
                target_path,
            } => self.redirect(&left_raw, &target_path, WriteMode::Truncate, stdin, state),
            Directive::RedirectAppend {
                left_raw,
                target_path,
            } => self.redirect(&left_raw, &target_path, WriteMode::Append, stdin, state),
        }
    }

    fn dispatch(
        &self,
        name: &str,
        args: &[String],
        stdin: Option<&str>,
        state: &mut ShellState,
        to_user: bool,
    ) -> Outcome {
        let Some(builtin) = self.registry.get(name) else {
            return Outcome::failure_with(Status::CommandNotFound, format!("{name}: command not found"));
        };
        let spec = builtin.spec();
        if !spec.accepts_arity(args.len()) {
            return Outcome::failure_with(
                Status::InvalidArguments,
                format!(
                    "{name}: expected {}, got {}",
                    describe_arity(spec),
                    args.len()
                ),
            );
        }

        let argv = std::iter::once(name).chain(args.iter().map(String::as_str));
        debug!(
            "dispatch {}",
            shlex::try_join(argv).unwrap_or_else(|_| name.to_string())
        );

        match commands::invoke(builtin, args, stdin, state, &self.registry, to_user) {
            Ok(output) => Outcome::success(output),
            Err(e) => {
                debug!("{name} failed: {e}");
                e.into()
            }
        }
    }

    fn redirect(
        &self,
        left_raw: &str,
        target: &str,
        mode: WriteMode,
        stdin: Option<&str>,
        state: &mut ShellState,
    ) -> Outcome {
        let inner = self.eval(left_raw, stdin, state, false);
        if !inner.is_success() {
            return inner;
        }

        let path = state.resolve(target);
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let text = inner.output.as_deref().unwrap_or_default();
        let written = options
            .open(&path)
            .and_then(|mut file| file.write_all(text.as_bytes()));

        match written {
            Ok(()) => {
                debug!("wrote {} bytes to {} ({mode:?})", text.len(), path.display());
                Outcome::success(None)
            }
            Err(e) => {
                warn!("redirect to {} failed: {e}", path.display());
                Outcome::failure_with(Status::IoError, format!("{}: {e}", path.display()))
            }
        }
    }
}

/// "exactly 2 arguments", "0 to 1 arguments", "at least 1 argument"
fn describe_arity(spec: &CommandSpec) -> String {
    let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
    if spec.max_args == UNBOUNDED {
        format!("at least {} {}", spec.min_args, plural(spec.min_args))
    } else if spec.min_args == spec.max_args {
        format!("exactly {} {}", spec.min_args, plural(spec.min_args))
    } else {
        format!("{} to {} arguments", spec.min_args, spec.max_args)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::commands::{Builtin, BuiltinError, BuiltinResult, Invocation};

    /// Records how often it ran and what it was piped.
    struct Recorder {
        spec: CommandSpec,
        calls: Arc<AtomicUsize>,
        reply: Result<&'static str, Status>,
    }

    impl Recorder {
        fn new(
            name: &'static str,
            min_args: usize,
            max_args: usize,
            reply: Result<&'static str, Status>,
        ) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let recorder = Self {
                spec: CommandSpec {
                    name,
                    min_args,
                    max_args,
                    accepts_piped_input: true,
                    changes_directory: false,
                    summary: "test double",
                    params: &[],
                },
                calls: Arc::clone(&calls),
                reply,
            };
            (recorder, calls)
        }
    }

    impl Builtin for Recorder {
        fn spec(&self) -> &CommandSpec {
            &self.spec
        }

        fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(Some(format!("{}{text}", inv.stdin.unwrap_or_default()))),
                Err(Status::IoError) => Err(BuiltinError::io(
                    "/recorder",
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                )),
                Err(_) => Err(BuiltinError::Failed("recorder failed".into())),
            }
        }
    }

    fn default_evaluator() -> Evaluator {
        Evaluator::from_config(&Config::default_config())
    }

    #[test]
    fn empty_line_is_noop_success() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("   ", None, &mut state);
        assert_eq!(outcome, Outcome::success(None));
    }

    #[test]
    fn unterminated_quote_is_syntax_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("cat 'oops", None, &mut state);
        assert_eq!(outcome.status, Status::SyntaxError);
    }

    #[test]
    fn arity_checked_before_dispatch() {
        let (recorder, calls) = Recorder::new("two", 2, 2, Ok("ran"));
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(recorder));
        let evaluator = Evaluator::new(registry);
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());

        assert_eq!(evaluator.evaluate("two a", None, &mut state).status, Status::InvalidArguments);
        assert_eq!(evaluator.evaluate("two a b c", None, &mut state).status, Status::InvalidArguments);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(evaluator.evaluate("two a b", None, &mut state).status, Status::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_left_side_short_circuits() {
        let (right, calls) = Recorder::new("right", 0, 0, Ok("x"));
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(right));
        let evaluator = Evaluator::new(registry);
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());

        let outcome = evaluator.evaluate("nosuch | right", None, &mut state);
        assert_eq!(outcome.status, Status::CommandNotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn builtin_failure_propagates_through_pipeline() {
        let (bad, _) = Recorder::new("bad", 0, 0, Err(Status::IoError));
        let (right, calls) = Recorder::new("right", 0, 0, Ok("x"));
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(bad));
        registry.register(Box::new(right));
        let evaluator = Evaluator::new(registry);
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());

        let outcome = evaluator.evaluate("bad | right | right", None, &mut state);
        assert_eq!(outcome.status, Status::IoError);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pipeline_threads_text_left_to_right() {
        let (a, _) = Recorder::new("a", 0, 0, Ok("A"));
        let (b, _) = Recorder::new("b", 0, 0, Ok("B"));
        let (c, _) = Recorder::new("c", 0, 0, Ok("C"));
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(a));
        registry.register(Box::new(b));
        registry.register(Box::new(c));
        let evaluator = Evaluator::new(registry);
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());

        let outcome = evaluator.evaluate("a | b | c", Some(">"), &mut state);
        assert_eq!(outcome.output.as_deref(), Some(">ABC"));

        let staged = evaluator.evaluate("a", Some(">"), &mut state);
        let staged = evaluator.evaluate("b | c", staged.output.as_deref(), &mut state);
        assert_eq!(staged, outcome);
    }

    #[test]
    fn non_piped_builtins_do_not_see_stdin() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("pwd", Some("ignored"), &mut state);
        assert_eq!(
            outcome.output,
            Some(format!("{}\n", state.current_directory().display()))
        );
    }

    #[test]
    fn redirect_overwrites_then_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let evaluator = default_evaluator();
        let pwd = format!("{}\n", state.current_directory().display());

        for _ in 0..2 {
            let outcome = evaluator.evaluate("pwd > out.txt", None, &mut state);
            assert_eq!(outcome, Outcome::success(None));
        }
        assert_eq!(fs::read_to_string(tmp.path().join("out.txt")).unwrap(), pwd);

        for _ in 0..2 {
            evaluator.evaluate("pwd >> log.txt", None, &mut state);
        }
        assert_eq!(
            fs::read_to_string(tmp.path().join("log.txt")).unwrap(),
            format!("{pwd}{pwd}")
        );
    }

    #[test]
    fn redirect_of_no_output_creates_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("mkdir d > made.txt", None, &mut state);
        assert!(outcome.is_success());
        assert_eq!(fs::read_to_string(tmp.path().join("made.txt")).unwrap(), "");
        assert!(tmp.path().join("d").is_dir());
    }

    #[test]
    fn redirect_skipped_when_inner_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("cat missing > out.txt", None, &mut state);
        assert_eq!(outcome.status, Status::IoError);
        assert!(!tmp.path().join("out.txt").exists());
    }

    #[test]
    fn redirect_into_missing_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("pwd > no/such/file", None, &mut state);
        assert_eq!(outcome.status, Status::IoError);
    }

    #[test]
    fn redirect_resolves_after_inner_runs() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("cd sub > here.txt", None, &mut state);
        assert!(outcome.is_success());
        assert!(tmp.path().join("sub/here.txt").exists());
    }

    /// Asks to move into `sub` every time it runs.
    struct Relocate {
        spec: CommandSpec,
    }

    impl Relocate {
        fn new(changes_directory: bool) -> Self {
            Self {
                spec: CommandSpec {
                    name: "relocate",
                    min_args: 0,
                    max_args: 0,
                    accepts_piped_input: false,
                    changes_directory,
                    summary: "test double",
                    params: &[],
                },
            }
        }
    }

    impl Builtin for Relocate {
        fn spec(&self) -> &CommandSpec {
            &self.spec
        }

        fn run(&self, mut inv: Invocation<'_>) -> BuiltinResult {
            let dir = inv.resolve("sub");
            inv.request_directory(dir);
            Ok(None)
        }
    }

    fn relocate_once(changes_directory: bool) -> (tempfile::TempDir, ShellState) {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Relocate::new(changes_directory)));
        let mut state = ShellState::new(tmp.path());
        let outcome = Evaluator::new(registry).evaluate("relocate", None, &mut state);
        assert_eq!(outcome, Outcome::success(None));
        (tmp, state)
    }

    #[test]
    fn directory_request_needs_permission() {
        let (tmp, state) = relocate_once(false);
        assert_eq!(state.current_directory(), crate::path::normalize(tmp.path()));
    }

    #[test]
    fn directory_request_applied_when_declared() {
        let (tmp, state) = relocate_once(true);
        assert_eq!(
            state.current_directory(),
            crate::path::normalize(&tmp.path().join("sub"))
        );
    }

    #[test]
    fn cd_inside_pipeline_moves_session() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut state = ShellState::new(tmp.path());
        let outcome = default_evaluator().evaluate("cd sub | pwd", None, &mut state);
        assert!(state.current_directory().ends_with("sub"));
        assert_eq!(
            outcome.output,
            Some(format!("{}\n", state.current_directory().display()))
        );
    }

    #[test]
    fn describe_arity_forms() {
        let cp = CommandSpec {
            name: "cp",
            min_args: 2,
            max_args: 2,
            accepts_piped_input: false,
            changes_directory: false,
            summary: "",
            params: &[],
        };
        assert_eq!(describe_arity(&cp), "exactly 2 arguments");
        let rm = CommandSpec {
            min_args: 1,
            max_args: UNBOUNDED,
            ..cp.clone()
        };
        assert_eq!(describe_arity(&rm), "at least 1 argument");
        let cd = CommandSpec {
            min_args: 0,
            max_args: 1,
            ..cp
        };
        assert_eq!(describe_arity(&cd), "0 to 1 arguments");
    }
}
