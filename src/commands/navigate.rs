use std::fs;

use crate::commands::{Builtin, BuiltinResult, CommandSpec, Invocation, IoContext};

static PWD: CommandSpec = CommandSpec {
    name: "pwd",
    min_args: 0,
    max_args: 0,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "print the current directory",
    params: &[],
};

static CD: CommandSpec = CommandSpec {
    name: "cd",
    min_args: 0,
    max_args: 1,
    accepts_piped_input: false,
    changes_directory: true,
    summary: "change the current directory (no argument: back to the start directory)",
    params: &["DirectoryPath"],
};

static LS: CommandSpec = CommandSpec {
    name: "ls",
    min_args: 0,
    max_args: 1,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "list directory contents",
    params: &["DirectoryPath"],
};

pub struct Pwd;

impl Builtin for Pwd {
    fn spec(&self) -> &CommandSpec {
        &PWD
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        Ok(Some(format!("{}\n", inv.cwd().display())))
    }
}

pub struct Cd;

impl Builtin for Cd {
    fn spec(&self) -> &CommandSpec {
        &CD
    }

    fn run(&self, mut inv: Invocation<'_>) -> BuiltinResult {
        let target = match inv.args.first() {
            Some(raw) => raw.clone(),
            None => inv.state.home().to_string_lossy().into_owned(),
        };
        let resolved = inv.resolve(&target);
        let dir = inv.state.directory_at(&target).at(&resolved)?;
        inv.request_directory(dir);
        Ok(None)
    }
}

pub struct Ls;

impl Builtin for Ls {
    fn spec(&self) -> &CommandSpec {
        &LS
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        let dir = match inv.args.first() {
            Some(raw) => inv.resolve(raw),
            None => inv.cwd().to_path_buf(),
        };
        let meta = fs::metadata(&dir).at(&dir)?;
        if !meta.is_dir() {
            let name = inv.args.first().cloned().unwrap_or_default();
            return Ok(Some(format!("{name}\n")));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).at(&dir)? {
            let entry = entry.at(&dir)?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().at(&entry.path())?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            return Ok(None);
        }
        let mut out = names.join("\n");
        out.push('\n');
        Ok(Some(out))
    }
}
