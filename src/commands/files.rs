use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::{
    Builtin, BuiltinError, BuiltinResult, CommandSpec, Invocation, IoContext, UNBOUNDED,
};

static CP: CommandSpec = CommandSpec {
    name: "cp",
    min_args: 2,
    max_args: 2,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "copy a file (into a directory if the destination is one)",
    params: &["SourcePath", "DestinationPath"],
};

static MV: CommandSpec = CommandSpec {
    name: "mv",
    min_args: 2,
    max_args: 2,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "move or rename a file or directory",
    params: &["SourcePath", "DestinationPath"],
};

static RM: CommandSpec = CommandSpec {
    name: "rm",
    min_args: 1,
    max_args: UNBOUNDED,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "remove files",
    params: &["FilePath"],
};

static MKDIR: CommandSpec = CommandSpec {
    name: "mkdir",
    min_args: 1,
    max_args: UNBOUNDED,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "create directories, including missing parents",
    params: &["DirectoryPath"],
};

static RMDIR: CommandSpec = CommandSpec {
    name: "rmdir",
    min_args: 1,
    max_args: UNBOUNDED,
    accepts_piped_input: false,
    changes_directory: false,
    summary: "remove empty directories",
    params: &["DirectoryPath"],
};

/// Where `source` ends up when the destination may be an existing
/// directory: `dst/<source name>` in that case, `dst` otherwise.
fn destination_for(source: &Path, dst: PathBuf) -> Result<PathBuf, BuiltinError> {
    if !dst.is_dir() {
        return Ok(dst);
    }
    let name = source.file_name().ok_or_else(|| {
        BuiltinError::Failed(format!("{}: has no file name", source.display()))
    })?;
    Ok(dst.join(name))
}

pub struct Cp;

impl Builtin for Cp {
    fn spec(&self) -> &CommandSpec {
        &CP
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        let source = inv.resolve(&inv.args[0]);
        if fs::metadata(&source).at(&source)?.is_dir() {
            return Err(BuiltinError::Failed(format!(
                "cp: {}: is a directory",
                source.display()
            )));
        }
        let dest = destination_for(&source, inv.resolve(&inv.args[1]))?;
        if dest == source {
            return Err(BuiltinError::Failed(format!(
                "cp: {} and {} are the same file",
                inv.args[0], inv.args[1]
            )));
        }
        fs::copy(&source, &dest).at(&dest)?;
        Ok(None)
    }
}

pub struct Mv;

impl Builtin for Mv {
    fn spec(&self) -> &CommandSpec {
        &MV
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        let source = inv.resolve(&inv.args[0]);
        fs::symlink_metadata(&source).at(&source)?;
        let dest = destination_for(&source, inv.resolve(&inv.args[1]))?;
        if dest.starts_with(&source) && dest != source {
            return Err(BuiltinError::Failed(format!(
                "mv: cannot move {} into itself",
                inv.args[0]
            )));
        }
        fs::rename(&source, &dest).at(&dest)?;
        Ok(None)
    }
}

pub struct Rm;

impl Builtin for Rm {
    fn spec(&self) -> &CommandSpec {
        &RM
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        for raw in inv.args {
            let path = inv.resolve(raw);
            fs::remove_file(&path).at(&path)?;
        }
        Ok(None)
    }
}

pub struct Mkdir;

impl Builtin for Mkdir {
    fn spec(&self) -> &CommandSpec {
        &MKDIR
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        for raw in inv.args {
            let path = inv.resolve(raw);
            fs::create_dir_all(&path).at(&path)?;
        }
        Ok(None)
    }
}

pub struct Rmdir;

impl Builtin for Rmdir {
    fn spec(&self) -> &CommandSpec {
        &RMDIR
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        for raw in inv.args {
            let path = inv.resolve(raw);
            fs::remove_dir(&path).at(&path)?;
        }
        Ok(None)
    }
}
