use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bibnav_engine::keys::{DEFAULT_BINDINGS, parse_key_spec};
use bibnav_engine::{Command, Key, KeyMap, KeyTable, Settings};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::StoreOptions;
use crate::{Error, Result};

/// Color names accepted in `[tui.colors]`, in ANSI order.
pub const ANSI_COLORS: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// Default `(fg, bg)` of every configurable color.
pub const DEFAULT_COLORS: [(&str, &str, &str); 9] = [
    ("cursor_line", "white", "cyan"),
    ("top_statusbar", "black", "yellow"),
    ("bottom_statusbar", "black", "yellow"),
    ("search_label", "blue", "black"),
    ("search_query", "red", "black"),
    ("popup_help", "white", "green"),
    ("popup_stdout", "white", "blue"),
    ("popup_stderr", "white", "red"),
    ("selection", "white", "magenta"),
];

/// A configured terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// Index into [`ANSI_COLORS`].
    Ansi(u8),
    Rgb(u8, u8, u8),
}

impl ColorSpec {
    /// Parse an ANSI color name or `#rrggbb`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(ColorSpec::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        ANSI_COLORS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(value))
            .map(|index| ColorSpec::Ansi(index as u8))
    }
}

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. BIBNAV_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.bibnav
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("BIBNAV_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("bibnav"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".bibnav"));
    }

    Err(Error::Config(
        "Could not determine data directory: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Record file; defaults to `records.toml` in the data directory.
    pub file: Option<String>,
    /// Program used to open `file`/`url` fields.
    pub open: String,
    /// Editor for the edit command; falls back to `$EDITOR`, then `vi`.
    pub editor: Option<String>,
    pub search_ignore_case: bool,
    /// Lines shown per search match.
    pub search_context: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: None,
            open: if cfg!(target_os = "macos") { "open" } else { "xdg-open" }.to_string(),
            editor: None,
            search_ignore_case: false,
            search_context: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    pub default_list_args: Vec<String>,
    pub prompt_before_quit: bool,
    pub reverse_order: bool,
    pub scroll_offset: usize,
    /// `<name>_fg` / `<name>_bg` → color; missing entries use the defaults.
    pub colors: BTreeMap<String, String>,
    /// Command name → key spec; missing commands keep their default key.
    pub key_bindings: BTreeMap<String, String>,
    /// Key → key it should act as. The target key is disabled.
    pub key_aliases: BTreeMap<String, String>,
    pub disabled_keys: Vec<String>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        let mut colors = BTreeMap::new();
        for (name, fg, bg) in DEFAULT_COLORS {
            colors.insert(format!("{}_fg", name), fg.to_string());
            colors.insert(format!("{}_bg", name), bg.to_string());
        }

        let key_bindings = DEFAULT_BINDINGS
            .iter()
            .map(|(command, spec)| (command.name().to_string(), spec.to_string()))
            .collect();

        Self {
            default_list_args: vec!["-l".to_string()],
            prompt_before_quit: true,
            reverse_order: true,
            scroll_offset: 3,
            colors,
            key_bindings,
            key_aliases: BTreeMap::new(),
            disabled_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub tui: TuiConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        match dirs::config_dir() {
            Some(dir) => Ok(dir.join("bibnav").join("config.toml")),
            None => Ok(resolve_data_dir(None)?.join("config.toml")),
        }
    }

    /// Check values that serde cannot: colors, key specs and command names.
    /// Unknown color settings are only warned about.
    pub fn validate(&self) -> Result<()> {
        if self.database.open.trim().is_empty() {
            return Err(Error::Config("database.open must not be empty".to_string()));
        }
        if self.tui.default_list_args.iter().any(|a| a.trim().is_empty()) {
            return Err(Error::Config(
                "tui.default_list_args must not contain empty arguments".to_string(),
            ));
        }

        for (key, value) in &self.tui.colors {
            let known = key
                .strip_suffix("_fg")
                .or_else(|| key.strip_suffix("_bg"))
                .is_some_and(|name| DEFAULT_COLORS.iter().any(|(n, _, _)| *n == name));
            if !known {
                warn!(setting = %key, "ignoring unknown color setting");
                continue;
            }
            if ColorSpec::parse(value).is_none() {
                return Err(Error::Config(format!(
                    "tui.colors.{}: unknown color '{}' (expected one of {} or #rrggbb)",
                    key,
                    value,
                    ANSI_COLORS.join(", ")
                )));
            }
        }

        self.key_table()?;
        self.key_map()?;
        Ok(())
    }

    /// Path of the record file.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        match &self.database.file {
            Some(file) => expand_tilde(file),
            None => data_dir.join("records.toml"),
        }
    }

    /// Navigation keys plus the configured command bindings.
    pub fn key_table(&self) -> Result<KeyTable> {
        let mut bindings = Vec::with_capacity(self.tui.key_bindings.len());
        for (name, spec) in &self.tui.key_bindings {
            let command = Command::from_name(name).ok_or_else(|| {
                Error::Config(format!("tui.key_bindings: unknown command '{}'", name))
            })?;
            if !Command::CONFIGURABLE.contains(&command) {
                return Err(Error::Config(format!(
                    "tui.key_bindings: '{}' cannot be rebound",
                    name
                )));
            }
            bindings.push((command, spec.as_str()));
        }

        Ok(KeyTable::from_bindings(bindings)?)
    }

    pub fn key_map(&self) -> Result<KeyMap> {
        let mut keymap = KeyMap::new();
        for spec in &self.tui.disabled_keys {
            for key in parse_key_spec(spec)? {
                keymap.disable(key);
            }
        }
        for (from, to) in &self.tui.key_aliases {
            keymap.alias(single_key(from)?, single_key(to)?);
        }
        Ok(keymap)
    }

    /// List arguments the TUI starts with.
    pub fn list_args(&self) -> Vec<String> {
        let mut args = self.tui.default_list_args.clone();
        if self.tui.reverse_order {
            args.push("-r".to_string());
        }
        args
    }

    pub fn settings(&self) -> Settings {
        Settings {
            scroll_offset: self.tui.scroll_offset,
            prompt_before_quit: self.tui.prompt_before_quit,
            list_args: self.list_args(),
            search_ignore_case: self.database.search_ignore_case,
            ..Settings::default()
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        let editor = self
            .database
            .editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string());

        StoreOptions {
            opener: self.database.open.clone(),
            editor,
            ignore_case: self.database.search_ignore_case,
            search_context: self.database.search_context.max(1),
        }
    }

    /// `(fg, bg)` of a named color, falling back to the default for missing
    /// or invalid entries.
    pub fn color(&self, name: &str) -> (ColorSpec, ColorSpec) {
        let defaults = DEFAULT_COLORS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, fg, bg)| (*fg, *bg))
            .unwrap_or(("white", "black"));

        let lookup = |suffix: &str, fallback: &str| {
            self.tui
                .colors
                .get(&format!("{}_{}", name, suffix))
                .and_then(|value| ColorSpec::parse(value))
                .or_else(|| ColorSpec::parse(fallback))
                .unwrap_or(ColorSpec::Ansi(7))
        };

        (lookup("fg", defaults.0), lookup("bg", defaults.1))
    }
}

fn single_key(spec: &str) -> Result<Key> {
    match parse_key_spec(spec)?.as_slice() {
        [key] => Ok(*key),
        _ => Err(Error::Config(format!(
            "tui.key_aliases: '{}' must be a single character",
            spec
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.tui.scroll_offset, 3);
        assert_eq!(config.tui.key_bindings.get("show").map(String::as_str), Some("ENTER"));
        assert_eq!(config.list_args(), vec!["-l", "-r"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.tui.scroll_offset = 5;
        config.database.file = Some("/tmp/records.toml".to_string());

        config.save_to(&config_path)?;
        let loaded = Config::load_from(&config_path)?;

        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_from(&temp_dir.path().join("nonexistent.toml"))?;

        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [tui]
            reverse_order = false

            [tui.key_bindings]
            quit = "Q"
            "#,
        )?;

        assert_eq!(config.list_args(), vec!["-l"]);
        assert!(config.tui.prompt_before_quit);

        let table = config.key_table()?;
        assert_eq!(table.command(Key::Char('Q')), Some(Command::Quit));
        assert_eq!(table.command(Key::Char('d')), Some(Command::Delete));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_color_and_ignores_unknown_name() {
        let mut config = Config::default();
        config
            .tui
            .colors
            .insert("sparkle_fg".to_string(), "glitter".to_string());
        assert!(config.validate().is_ok());

        config
            .tui
            .colors
            .insert("selection_bg".to_string(), "mauve".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tui.colors.selection_bg"));
    }

    #[test]
    fn test_validate_rejects_bad_bindings() {
        let mut config = Config::default();
        config
            .tui
            .key_bindings
            .insert("quit".to_string(), "d".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .tui
            .key_bindings
            .insert("teleport".to_string(), "t".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .tui
            .key_bindings
            .insert("down".to_string(), "n".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_map_aliases_and_disables() -> Result<()> {
        let mut config = Config::default();
        config
            .tui
            .key_aliases
            .insert("n".to_string(), "j".to_string());
        config.tui.disabled_keys.push("x".to_string());

        let keymap = config.key_map()?;
        assert_eq!(keymap.resolve(Key::Char('n')), Some(Key::Char('j')));
        assert_eq!(keymap.resolve(Key::Char('j')), None);
        assert_eq!(keymap.resolve(Key::Char('x')), None);
        Ok(())
    }

    #[test]
    fn test_color_parsing_and_fallback() {
        assert_eq!(ColorSpec::parse("Cyan"), Some(ColorSpec::Ansi(6)));
        assert_eq!(ColorSpec::parse("#ff8000"), Some(ColorSpec::Rgb(255, 128, 0)));
        assert_eq!(ColorSpec::parse("#ff80"), None);

        let mut config = Config::default();
        config.tui.colors.remove("cursor_line_fg");
        assert_eq!(
            config.color("cursor_line"),
            (ColorSpec::Ansi(7), ColorSpec::Ansi(6))
        );
    }

    #[test]
    fn test_database_path_defaults_into_data_dir() {
        let config = Config::default();
        assert_eq!(
            config.database_path(Path::new("/data")),
            PathBuf::from("/data/records.toml")
        );
    }
}
