//! lineterm: interactive command interpreter.
//!
//! Without arguments, starts a prompt in the current directory. With
//! `-c LINE`, evaluates a single line and exits with its status code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use lineterm::config::Config;
use lineterm::eval::ShellState;
use lineterm::repl::{self, Terminal};

#[derive(Debug, Parser)]
#[command(name = "lineterm", version, about)]
struct Cli {
    /// Evaluate one line and exit.
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    command: Option<String>,

    /// With -c, print the outcome as JSON instead of plain text.
    #[arg(long, requires = "command")]
    json: bool,

    /// Use this config overlay instead of ~/.config/lineterm/config.toml.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the merged configuration and exit.
    #[arg(long)]
    dump_config: bool,

    /// Log at debug level to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    if cli.dump_config {
        print!("{}", config.to_toml().context("serializing config")?);
        return Ok(ExitCode::SUCCESS);
    }

    lineterm::logging::init(&config.settings, cli.verbose).context("installing logger")?;

    let state = ShellState::from_process().context("reading the working directory")?;
    let mut terminal = Terminal::new(&config, state);

    if let Some(line) = cli.command {
        if repl::is_exit(&line) {
            return Ok(ExitCode::SUCCESS);
        }
        let outcome = terminal.run_line(&line);
        if cli.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            repl::report(&outcome, &mut std::io::stdout(), &mut std::io::stderr())?;
        }
        let code = u8::try_from(outcome.status.exit_code()).unwrap_or(1);
        return Ok(ExitCode::from(code));
    }

    let mut terminal = terminal.interactive();
    terminal.repl().context("line editor failed")?;
    Ok(ExitCode::SUCCESS)
}
