//! Types produced by the partitioner and consumed by the evaluator.

use thiserror::Error;

/// Structural shape of one raw command line.
///
/// Composite variants keep their sides as unparsed text; the evaluator
/// re-partitions them on each recursive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Nothing but whitespace.
    Empty,
    /// A registered command and its arguments (arity not yet checked).
    Simple { name: String, args: Vec<String> },
    /// `left | right`
    Pipeline { left_raw: String, right_raw: String },
    /// `left > target`
    RedirectOverwrite { left_raw: String, target_path: String },
    /// `left >> target`
    RedirectAppend { left_raw: String, target_path: String },
    /// Well-formed words whose leading word is not a registered command.
    Unregistered { name: String, args: Vec<String> },
}

impl Directive {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Directive::Empty => "empty",
            Directive::Simple { .. } => "simple",
            Directive::Pipeline { .. } => "pipeline",
            Directive::RedirectOverwrite { .. } => "redirect",
            Directive::RedirectAppend { .. } => "redirect-append",
            Directive::Unregistered { .. } => "unregistered",
        }
    }
}

/// The first unquoted operator found while scanning, as a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// `|` at the offset.
    Pipe(usize),
    /// `>` at the offset.
    Overwrite(usize),
    /// `>>` starting at the offset.
    Append(usize),
}

impl Boundary {
    /// Byte offset where the operator starts.
    pub fn position(self) -> usize {
        match self {
            Boundary::Pipe(p) | Boundary::Overwrite(p) | Boundary::Append(p) => p,
        }
    }

    /// Number of bytes the operator occupies.
    pub fn width(self) -> usize {
        match self {
            Boundary::Append(_) => 2,
            Boundary::Pipe(_) | Boundary::Overwrite(_) => 1,
        }
    }
}

/// Raw result of the character scan, before the registry is consulted.
///
/// When `boundary` is set, `words` holds only what was completed before the
/// operator and is not meaningful to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub words: Vec<String>,
    pub boundary: Option<Boundary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {quote} quote opened at offset {position}")]
    UnterminatedQuote { quote: char, position: usize },
}
