use std::fmt::Write as _;

use chrono::Local;

use crate::commands::{Builtin, BuiltinError, BuiltinResult, CommandSpec, Invocation, UNBOUNDED};

static ARGS: CommandSpec = CommandSpec {
    name: "args",
    min_args: 1,
    max_args: 1,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "list the arguments a command takes",
    params: &["CommandName"],
};

static HELP: CommandSpec = CommandSpec {
    name: "help",
    min_args: 0,
    max_args: 1,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "list commands, or show usage for one",
    params: &["CommandName"],
};

static DATE: CommandSpec = CommandSpec {
    name: "date",
    min_args: 0,
    max_args: 0,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "print the current date and time",
    params: &[],
};

static CLEAR: CommandSpec = CommandSpec {
    name: "clear",
    min_args: 0,
    max_args: 0,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "clear the screen",
    params: &[],
};

/// ANSI: erase display, cursor home.
pub const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[H";

fn lookup<'r>(inv: &'r Invocation<'_>, name: &str) -> Result<&'r CommandSpec, BuiltinError> {
    inv.registry
        .lookup(name)
        .ok_or_else(|| BuiltinError::Failed(format!("{name}: no such command")))
}

pub struct Args;

impl Builtin for Args {
    fn spec(&self) -> &CommandSpec {
        &ARGS
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        let spec = lookup(&inv, &inv.args[0])?;
        if spec.params.is_empty() {
            return Ok(Some(format!("{} takes no arguments\n", spec.name)));
        }
        let mut out = String::new();
        for (i, param) in spec.params.iter().enumerate() {
            let _ = write!(out, "arg{}: {param}", i + 1);
            if spec.max_args == UNBOUNDED && i + 1 == spec.params.len() {
                out.push_str(" ...");
            }
            if i >= spec.min_args {
                out.push_str(" (optional)");
            }
            out.push('\n');
        }
        Ok(Some(out))
    }
}

pub struct Help;

impl Builtin for Help {
    fn spec(&self) -> &CommandSpec {
        &HELP
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        if let Some(name) = inv.args.first() {
            let spec = lookup(&inv, name)?;
            return Ok(Some(format!("usage: {}\n  {}\n", spec.usage(), spec.summary)));
        }

        let width = inv
            .registry
            .specs()
            .map(|s| s.name.len())
            .chain(["exit".len()])
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        for spec in inv.registry.specs() {
            let _ = writeln!(out, "{:<width$}  {}", spec.name, spec.summary);
        }
        let _ = writeln!(out, "{:<width$}  {}", "exit", "leave the terminal");
        Ok(Some(out))
    }
}

pub struct Date {
    format: String,
}

impl Date {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Builtin for Date {
    fn spec(&self) -> &CommandSpec {
        &DATE
    }

    fn run(&self, _inv: Invocation<'_>) -> BuiltinResult {
        let mut out = String::new();
        // An invalid strftime specifier surfaces as fmt::Error here instead of a panic.
        write!(out, "{}", Local::now().format(&self.format))
            .map_err(|_| BuiltinError::Failed(format!("date: invalid format {:?}", self.format)))?;
        out.push('\n');
        Ok(Some(out))
    }
}

pub struct Clear;

impl Builtin for Clear {
    fn spec(&self) -> &CommandSpec {
        &CLEAR
    }

    fn run(&self, _inv: Invocation<'_>) -> BuiltinResult {
        Ok(Some(CLEAR_SEQUENCE.to_string()))
    }
}
