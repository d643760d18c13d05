use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::commands::{
    Builtin, BuiltinError, BuiltinResult, CommandSpec, Invocation, IoContext, UNBOUNDED,
};

static CAT: CommandSpec = CommandSpec {
    name: "cat",
    min_args: 0,
    max_args: UNBOUNDED,
    accepts_piped_input: true,
    changes_directory: false,
    summary: "concatenate files, or pass piped input through",
    params: &["FilePath"],
};

static MORE: CommandSpec = CommandSpec {
    name: "more",
    min_args: 0,
    max_args: 1,
    accepts_piped_input: true,
    changes_directory: false,
    summary: "show a file or piped input one page at a time",
    params: &["FilePath"],
};

/// Contents of the named file, or the piped text when no file is named.
fn file_or_stdin(inv: &Invocation<'_>, command: &str) -> Result<String, BuiltinError> {
    match (inv.args.first(), inv.stdin) {
        (Some(raw), _) => {
            let path = inv.resolve(raw);
            let bytes = fs::read(&path).at(&path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        (None, Some(text)) => Ok(text.to_string()),
        (None, None) => Err(BuiltinError::Failed(format!(
            "{command}: expected a file or piped input"
        ))),
    }
}

pub struct Cat;

impl Builtin for Cat {
    fn spec(&self) -> &CommandSpec {
        &CAT
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        if inv.args.is_empty() {
            return file_or_stdin(&inv, "cat").map(Some);
        }
        let mut out = String::new();
        for raw in inv.args {
            let path = inv.resolve(raw);
            let bytes = fs::read(&path).at(&path)?;
            out.push_str(&String::from_utf8_lossy(&bytes));
        }
        Ok(Some(out))
    }
}

pub struct More {
    page_lines: usize,
}

impl More {
    pub fn new(page_lines: usize) -> Self {
        Self {
            page_lines: page_lines.max(1),
        }
    }
}

impl Builtin for More {
    fn spec(&self) -> &CommandSpec {
        &MORE
    }

    fn run(&self, inv: Invocation<'_>) -> BuiltinResult {
        let text = file_or_stdin(&inv, "more")?;
        let to_terminal = inv.interactive && io::stdin().is_terminal() && io::stdout().is_terminal();
        if !to_terminal {
            return Ok(Some(text));
        }
        let stdin = io::stdin();
        let stdout = io::stdout();
        page(&text, self.page_lines, &mut stdin.lock(), &mut stdout.lock())
            .map_err(|e| BuiltinError::Failed(format!("more: {e}")))?;
        Ok(None)
    }
}

/// Split `text` into pages of at most `lines` lines each.
pub fn paginate(text: &str, lines: usize) -> Vec<&str> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            count += 1;
            if count == lines {
                pages.push(&text[start..=i]);
                start = i + 1;
                count = 0;
            }
        }
    }
    if start < text.len() {
        pages.push(&text[start..]);
    }
    pages
}

/// Write `text` to `output` a page at a time, waiting on `input` between
/// pages. `q` or end of input stops early.
pub fn page<R: BufRead, W: Write>(
    text: &str,
    lines: usize,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    let pages = paginate(text, lines);
    let total = pages.len();
    let mut reply = String::new();
    for (n, chunk) in pages.into_iter().enumerate() {
        output.write_all(chunk.as_bytes())?;
        if n + 1 == total {
            break;
        }
        write!(output, "--More-- ({}/{total})", n + 1)?;
        output.flush()?;
        reply.clear();
        if input.read_line(&mut reply)? == 0 || reply.trim() == "q" {
            writeln!(output)?;
            break;
        }
    }
    output.flush()
}
