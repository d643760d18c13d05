use std::fs::OpenOptions;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::Settings;

/// Parse a configured level name, falling back to `warn`.
pub fn level_from(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Warn)
}

/// Install the global logger.
///
/// File logging goes to `settings.log_file` and is best-effort: if the file
/// cannot be opened the interpreter runs without it. `verbose` adds a
/// debug-level logger on stderr.
pub fn init(settings: &Settings, verbose: bool) -> Result<(), log::SetLoggerError> {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if let Some(path) = settings.log_path() {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            loggers.push(WriteLogger::new(
                level_from(&settings.log_level),
                config.clone(),
                file,
            ));
        }
    }

    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Debug,
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    if loggers.is_empty() {
        return Ok(());
    }
    CombinedLogger::init(loggers)
}
