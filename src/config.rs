use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub commands: Commands,
    #[serde(default)]
    pub date: DateConfig,
    #[serde(default)]
    pub more: MoreConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Empty disables file logging.
    #[serde(default)]
    pub log_file: String,
    /// Empty disables persisted history.
    #[serde(default)]
    pub history_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            log_level: default_log_level(),
            log_file: String::new(),
            history_file: String::new(),
        }
    }
}

fn default_prompt() -> String {
    "$ ".into()
}

fn default_log_level() -> String {
    "warn".into()
}

impl Settings {
    pub fn log_path(&self) -> Option<PathBuf> {
        expand_path(&self.log_file)
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        expand_path(&self.history_file)
    }
}

/// `~/x` → `$HOME/x`; empty → `None`.
fn expand_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Commands {
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DateConfig {
    #[serde(default = "default_date_format")]
    pub format: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%a %b %e %H:%M:%S %Y".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MoreConfig {
    #[serde(default = "default_page_lines")]
    pub page_lines: usize,
}

impl Default for MoreConfig {
    fn default() -> Self {
        Self {
            page_lines: default_page_lines(),
        }
    }
}

fn default_page_lines() -> usize {
    20
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    commands: CommandsOverlay,
    #[serde(default)]
    date: DateOverlay,
    #[serde(default)]
    more: MoreOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    prompt: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    history_file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CommandsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    disabled: Vec<String>,
    #[serde(default)]
    remove_disabled: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DateOverlay {
    format: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MoreOverlay {
    page_lines: Option<usize>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

fn merge_scalar<T>(base: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *base = v;
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/lineterm/config.toml (if exists)
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(path) = Self::user_config_path()
            && let Some(overlay) = Self::load_overlay(&path)
        {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Load with an explicit overlay file instead of the per-user one.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay(path) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/lineterm/config.toml"))
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                // Logger is not up yet; config decides where it goes.
                eprintln!("lineterm: config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        merge_scalar(&mut self.settings.prompt, s.prompt);
        merge_scalar(&mut self.settings.log_level, s.log_level);
        merge_scalar(&mut self.settings.log_file, s.log_file);
        merge_scalar(&mut self.settings.history_file, s.history_file);

        let c = overlay.commands;
        merge_list(
            &mut self.commands.disabled,
            c.disabled,
            &c.remove_disabled,
            c.replace,
        );

        merge_scalar(&mut self.date.format, overlay.date.format);
        merge_scalar(&mut self.more.page_lines, overlay.more.page_lines);
    }

    /// Render the merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
