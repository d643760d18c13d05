use std::collections::BTreeMap;

use crate::commands::{self, Builtin, CommandSpec};
use crate::config::Config;

/// Registry of builtins keyed by command name.
///
/// Built once per session and read-only afterwards. Ordered so `help`
/// lists commands alphabetically.
#[derive(Default)]
pub struct CommandRegistry {
    builtins: BTreeMap<&'static str, Box<dyn Builtin>>,
}

impl CommandRegistry {
    /// An empty registry; every name is unregistered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration, leaving out disabled commands.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for builtin in commands::builtins(config) {
            let name = builtin.spec().name;
            if config.commands.disabled.iter().any(|d| d == name) {
                continue;
            }
            registry.register(builtin);
        }
        registry
    }

    /// Add a builtin, replacing any existing entry with the same name.
    pub fn register(&mut self, builtin: Box<dyn Builtin>) {
        self.builtins.insert(builtin.spec().name, builtin);
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.builtins.get(name).map(|b| b.spec())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    /// Specs of every registered command, by name.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.builtins.values().map(|b| b.spec())
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_registers_everything() {
        let registry = CommandRegistry::from_config(&Config::default_config());
        for name in [
            "args", "cat", "cd", "clear", "cp", "date", "help", "ls", "mkdir", "more", "mv",
            "pwd", "rm", "rmdir",
        ] {
            assert!(registry.contains(name), "{name} not registered");
        }
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn exit_is_not_a_builtin() {
        let registry = CommandRegistry::from_config(&Config::default_config());
        assert!(registry.lookup("exit").is_none());
    }

    #[test]
    fn disabled_commands_are_skipped() {
        let mut config = Config::default_config();
        config.commands.disabled = vec!["rm".into(), "rmdir".into()];
        let registry = CommandRegistry::from_config(&config);
        assert!(!registry.contains("rm"));
        assert!(!registry.contains("rmdir"));
        assert!(registry.contains("mkdir"));
    }

    #[test]
    fn specs_are_sorted() {
        let registry = CommandRegistry::from_config(&Config::default_config());
        let names: Vec<&str> = registry.specs().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn lookup_returns_arity() {
        let registry = CommandRegistry::from_config(&Config::default_config());
        let cp = registry.lookup("cp").unwrap();
        assert_eq!((cp.min_args, cp.max_args), (2, 2));
        assert!(registry.lookup("cat").unwrap().accepts_piped_input);
    }

    #[test]
    fn only_cd_changes_directory() {
        let registry = CommandRegistry::from_config(&Config::default_config());
        let movers: Vec<&str> = registry
            .specs()
            .filter(|s| s.changes_directory)
            .map(|s| s.name)
            .collect();
        assert_eq!(movers, ["cd"]);
    }
}
