//! The interactive session: prompt, read a line, evaluate, print.

use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, info};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config::Config;
use crate::eval::{Evaluator, Outcome, ShellState};
use crate::parse;

/// One interpreter session: the evaluator plus the state it mutates.
pub struct Terminal {
    evaluator: Evaluator,
    state: ShellState,
    prompt: String,
    history: Option<PathBuf>,
}

impl Terminal {
    pub fn new(config: &Config, state: ShellState) -> Self {
        Self {
            evaluator: Evaluator::from_config(config),
            state,
            prompt: config.settings.prompt.clone(),
            history: config.settings.history_path(),
        }
    }

    /// Let builtins such as `more` talk to the user's terminal directly.
    pub fn interactive(mut self) -> Self {
        self.evaluator = self.evaluator.interactive(true);
        self
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Evaluate one line with no piped input.
    pub fn run_line(&mut self, line: &str) -> Outcome {
        self.evaluator.evaluate(line, None, &mut self.state)
    }

    /// Read-eval-print until `exit`, Ctrl-D, or a line editor failure.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &self.history {
            // A fresh install has no history yet.
            let _ = editor.load_history(path);
        }
        info!("session started in {}", self.state.current_directory().display());

        loop {
            match editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if is_exit(&line) {
                        break;
                    }
                    let outcome = self.run_line(&line);
                    report(&outcome, &mut io::stdout(), &mut io::stderr())?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e),
            }
        }

        if let Some(path) = &self.history {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            if let Err(e) = editor.save_history(path) {
                debug!("could not save history to {}: {e}", path.display());
            }
        }
        println!("Exiting...");
        Ok(())
    }
}

/// A line whose only word is `exit`.
///
/// Checked before evaluation so `exit` never reaches the registry.
pub fn is_exit(line: &str) -> bool {
    matches!(
        parse::scan(line),
        Ok(scan) if scan.boundary.is_none() && scan.words == ["exit"]
    )
}

/// Print an outcome the way the session shows it: output to `out` on
/// success, otherwise the status message and any output to `err`.
pub fn report<O: Write, E: Write>(outcome: &Outcome, out: &mut O, err: &mut E) -> io::Result<()> {
    if outcome.is_success() {
        if let Some(text) = &outcome.output {
            out.write_all(text.as_bytes())?;
        }
        return out.flush();
    }
    writeln!(err, "{}", outcome.status.message())?;
    if let Some(text) = &outcome.output {
        err.write_all(text.as_bytes())?;
    }
    err.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Status;

    #[test]
    fn exit_detection() {
        assert!(is_exit("exit"));
        assert!(is_exit("  exit  "));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("exit | cat"));
        assert!(!is_exit("'exit"));
        assert!(!is_exit("pwd"));
    }

    #[test]
    fn success_goes_to_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        report(&Outcome::success(Some("hi\n".into())), &mut out, &mut err).unwrap();
        assert_eq!(out, b"hi\n");
        assert!(err.is_empty());
    }

    #[test]
    fn failure_goes_to_stderr() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let outcome = Outcome::failure_with(Status::CommandNotFound, "zap: command not found");
        report(&outcome, &mut out, &mut err).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "command not found\nzap: command not found\n"
        );
    }

    #[test]
    fn session_keeps_directory_between_lines() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("inner")).unwrap();
        let mut term = Terminal::new(&Config::default_config(), ShellState::new(tmp.path()));
        assert!(term.run_line("cd inner").is_success());
        let pwd = term.run_line("pwd");
        assert_eq!(
            pwd.output,
            Some(format!("{}\n", term.state().current_directory().display()))
        );
        assert!(term.state().current_directory().ends_with("inner"));
    }
}
