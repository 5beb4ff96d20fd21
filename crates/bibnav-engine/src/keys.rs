//! Key → command tables and key aliasing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::command::Command;
use crate::error::{Error, Result};

/// A keypress as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Esc,
    Backspace,
}

impl Key {
    pub fn is_enter(self) -> bool {
        matches!(self, Key::Char('\n') | Key::Char('\r'))
    }

    /// Short human-readable name used in the help and status bar.
    pub fn label(self) -> String {
        match self {
            Key::Char('\n') | Key::Char('\r') => "ENTER".to_string(),
            Key::Char(' ') => "SPACE".to_string(),
            Key::Char(c) => c.to_string(),
            Key::Up => "↑".to_string(),
            Key::Down => "↓".to_string(),
            Key::Left => "←".to_string(),
            Key::Right => "→".to_string(),
            Key::PageUp => "PGUP".to_string(),
            Key::PageDown => "PGDN".to_string(),
            Key::Home => "HOME".to_string(),
            Key::End => "END".to_string(),
            Key::Esc => "ESC".to_string(),
            Key::Backspace => "BACKSPACE".to_string(),
        }
    }
}

/// Default bindings of the configurable commands.
pub const DEFAULT_BINDINGS: [(Command, &str); 17] = [
    (Command::Prompt, ":"),
    (Command::Search, "/"),
    (Command::Help, "?"),
    (Command::Add, "a"),
    (Command::Delete, "d"),
    (Command::Edit, "e"),
    (Command::Filter, "f"),
    (Command::Modify, "m"),
    (Command::Open, "o"),
    (Command::Quit, "q"),
    (Command::Redo, "r"),
    (Command::Sort, "s"),
    (Command::Undo, "u"),
    (Command::Select, "v"),
    (Command::Wrap, "w"),
    (Command::Export, "x"),
    (Command::Show, "ENTER"),
];

/// Parse a key spec from the config file: `ENTER` or a single character.
pub fn parse_key_spec(spec: &str) -> Result<Vec<Key>> {
    if spec.eq_ignore_ascii_case("ENTER") {
        return Ok(vec![Key::Char('\n'), Key::Char('\r')]);
    }

    let mut chars = spec.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(vec![Key::Char(c)]),
        _ => Err(Error::KeySpec(format!(
            "'{}' must be a single character or ENTER",
            spec
        ))),
    }
}

/// Maps keys to commands. Each key triggers at most one command.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    bindings: HashMap<Key, Command>,
}

impl KeyTable {
    /// Fixed navigation keys (arrows, hjkl, `g`/`G`, `0`/`$`, paging).
    pub fn navigation() -> Self {
        let mut table = Self::default();
        let fixed = [
            (Key::Down, Command::Down),
            (Key::Char('j'), Command::Down),
            (Key::Up, Command::Up),
            (Key::Char('k'), Command::Up),
            (Key::Left, Command::Left),
            (Key::Char('h'), Command::Left),
            (Key::Right, Command::Right),
            (Key::Char('l'), Command::Right),
            (Key::PageDown, Command::PageDown),
            (Key::PageUp, Command::PageUp),
            (Key::Char('g'), Command::Top),
            (Key::Home, Command::Top),
            (Key::Char('G'), Command::Bottom),
            (Key::End, Command::Bottom),
            (Key::Char('0'), Command::Start),
            (Key::Char('$'), Command::End),
        ];
        for (key, command) in fixed {
            table.bind(key, command);
        }
        table
    }

    /// Navigation keys plus the default command bindings.
    pub fn with_defaults() -> Self {
        let mut table = Self::navigation();
        for (command, spec) in DEFAULT_BINDINGS {
            if let Ok(keys) = parse_key_spec(spec) {
                for key in keys {
                    table.bind(key, command);
                }
            }
        }
        table
    }

    /// Navigation keys plus the given command bindings; commands missing from
    /// `bindings` keep their default key.
    pub fn from_bindings<'a, I>(bindings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Command, &'a str)>,
    {
        let overrides: BTreeMap<Command, &str> = bindings.into_iter().collect();
        let mut table = Self::navigation();

        for (command, default_spec) in DEFAULT_BINDINGS {
            let spec = overrides.get(&command).copied().unwrap_or(default_spec);
            for key in parse_key_spec(spec)? {
                if let Some(existing) = table.command(key)
                    && existing != command
                {
                    return Err(Error::KeySpec(format!(
                        "'{}' is bound to both {} and {}",
                        spec, existing, command
                    )));
                }
                table.bind(key, command);
            }
        }

        Ok(table)
    }

    /// Bind `key` to `command`, replacing any previous binding of `key`.
    pub fn bind(&mut self, key: Key, command: Command) {
        self.bindings.insert(key, command);
    }

    pub fn command(&self, key: Key) -> Option<Command> {
        self.bindings.get(&key).copied()
    }

    /// Keys bound to `command`, in a stable order. `\r` is folded into ENTER.
    pub fn keys_for(&self, command: Command) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(key, bound)| **bound == command && **key != Key::Char('\r'))
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Bottom status line: `key:Command` for every configurable command that
    /// is not inactive.
    pub fn status_line(&self, inactive: &BTreeSet<Command>) -> String {
        Command::CONFIGURABLE
            .into_iter()
            .filter(|command| !inactive.contains(command))
            .filter_map(|command| {
                let key = self.keys_for(command).into_iter().next()?;
                Some(format!("{}:{}", key.label(), capitalize(command.name())))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Key remapping applied before the key table lookup.
///
/// A key with no override maps to itself; an override of `None` disables it.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    overrides: HashMap<Key, Option<Key>>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` act as `alt` and disable `alt` itself.
    pub fn alias(&mut self, key: Key, alt: Key) {
        self.overrides.insert(key, Some(alt));
        if alt != key {
            self.overrides.insert(alt, None);
        }
    }

    pub fn disable(&mut self, key: Key) {
        self.overrides.insert(key, None);
    }

    pub fn enable(&mut self, key: Key) {
        self.overrides.remove(&key);
    }

    pub fn resolve(&self, key: Key) -> Option<Key> {
        match self.overrides.get(&key) {
            Some(mapped) => *mapped,
            None => Some(key),
        }
    }
}
