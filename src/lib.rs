//! lineterm: a line-oriented command interpreter.
//!
//! One input line is partitioned into a [`parse::Directive`] (plain command,
//! pipeline, or file redirect) and evaluated by dispatching to a fixed set of
//! file-system builtins, threading a text buffer between stages as standard
//! input and output. Nothing is spawned: every command runs in-process.
//!
//! # Architecture
//!
//! - **[`parse`]**: Quote-aware scan that finds the leftmost `|`, `>` or `>>`.
//! - **[`eval`]**: Evaluator, command registry, session state, outcome types.
//! - **[`commands`]**: The builtin contract and every shipped builtin.
//! - **[`path`]**: Lexical resolution of user paths against the session directory.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: `simplelog` setup for the `log` facade.
//! - **[`repl`]**: The interactive read-eval-print session.

/// Builtin trait, command specs, and the builtin implementations.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Evaluation engine: registry, outcome types, session state.
pub mod eval;
/// Logger initialisation.
pub mod logging;
/// Partitioning of raw lines into directives.
pub mod parse;
/// Lexical path resolution.
pub mod path;
/// Interactive session.
pub mod repl;

use eval::{Evaluator, Outcome, ShellState};

/// Build an evaluator from the default config and evaluate one line.
///
/// This is the main entry point for tests and simple usage. Sessions that
/// keep a registry across lines should hold an [`Evaluator`] instead.
pub fn run_line(line: &str, state: &mut ShellState) -> Outcome {
    let config = config::Config::default_config();
    Evaluator::from_config(&config).evaluate(line, None, state)
}
