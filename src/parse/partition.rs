use log::debug;

use super::types::{Boundary, Directive, ParseError, Scan};
use crate::eval::CommandRegistry;

/// Scan a line left to right, splitting words and stopping at the first
/// unquoted `|`, `>` or `>>`.
///
/// Quote characters open a quoted run and are dropped from the word. Inside
/// a quoted run every character except the matching quote is literal,
/// including spaces, operators and the other quote style. Closing a quote
/// always completes a word, so `''` yields an empty word; unquoted runs of
/// spaces never do.
pub fn scan(line: &str) -> Result<Scan, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<(char, usize)> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some((open, _)) = quote {
            if c == open {
                words.push(std::mem::take(&mut current));
                quote = None;
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some((c, i)),
            ' ' => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            '|' => {
                return Ok(Scan {
                    words,
                    boundary: Some(Boundary::Pipe(i)),
                });
            }
            '>' => {
                let boundary = if chars.peek().is_some_and(|&(_, next)| next == '>') {
                    Boundary::Append(i)
                } else {
                    Boundary::Overwrite(i)
                };
                return Ok(Scan {
                    words,
                    boundary: Some(boundary),
                });
            }
            _ => current.push(c),
        }
    }

    if let Some((quote, position)) = quote {
        return Err(ParseError::UnterminatedQuote { quote, position });
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(Scan {
        words,
        boundary: None,
    })
}

/// Partition one raw line into a [`Directive`].
///
/// The leftmost operator decides the shape; anything after it stays raw
/// text for the recursive call to deal with.
pub fn partition(line: &str, registry: &CommandRegistry) -> Result<Directive, ParseError> {
    let scan = scan(line)?;

    let directive = match scan.boundary {
        Some(Boundary::Pipe(p)) => Directive::Pipeline {
            left_raw: line[..p].to_string(),
            right_raw: line[p + 1..].trim_start().to_string(),
        },
        Some(boundary) => {
            let p = boundary.position();
            let left_raw = line[..p].to_string();
            let target_path = line[p + boundary.width()..].trim().to_string();
            if let Boundary::Append(_) = boundary {
                Directive::RedirectAppend {
                    left_raw,
                    target_path,
                }
            } else {
                Directive::RedirectOverwrite {
                    left_raw,
                    target_path,
                }
            }
        }
        None => {
            let mut words = scan.words.into_iter();
            match words.next() {
                None => Directive::Empty,
                Some(name) => {
                    let args: Vec<String> = words.collect();
                    if registry.contains(&name) {
                        Directive::Simple { name, args }
                    } else {
                        Directive::Unregistered { name, args }
                    }
                }
            }
        }
    };

    debug!("partitioned {line:?} as {}", directive.kind());
    Ok(directive)
}
