//! The single-line prompt under the bottom status bar.

use crate::keys::Key;

/// What the prompt line currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromptStatus {
    #[default]
    Empty,
    /// Text being typed; `cursor` is the display column of the caret.
    Editing { text: String, cursor: usize },
    Message(String),
    Error(String),
}

impl PromptStatus {
    pub fn text(&self) -> &str {
        match self {
            PromptStatus::Empty => "",
            PromptStatus::Editing { text, .. } => text,
            PromptStatus::Message(text) | PromptStatus::Error(text) => text,
        }
    }
}

/// Outcome of feeding one key to a [`LineEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStep {
    Pending,
    Submitted(String),
    Cancelled,
}

/// Minimal line input: printable characters, backspace, enter, escape.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    prefix: String,
    input: String,
}

impl LineEditor {
    /// Start editing with `prefix` pre-filled in front of the input
    /// (e.g. `"search "`). The prefix cannot be deleted.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            input: String::new(),
        }
    }

    pub fn handle(&mut self, key: Key) -> PromptStep {
        match key {
            key if key.is_enter() => PromptStep::Submitted(self.input.trim().to_string()),
            Key::Esc => PromptStep::Cancelled,
            Key::Backspace => {
                if self.input.pop().is_none() {
                    PromptStep::Cancelled
                } else {
                    PromptStep::Pending
                }
            }
            Key::Char(c) if !c.is_control() => {
                self.input.push(c);
                PromptStep::Pending
            }
            _ => PromptStep::Pending,
        }
    }

    pub fn render(&self) -> String {
        format!(":{}{}", self.prefix, self.input)
    }

    pub fn status(&self) -> PromptStatus {
        let text = self.render();
        let cursor = text.chars().count();
        PromptStatus::Editing { text, cursor }
    }
}

/// Split prompt input into arguments. Single or double quotes group words.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut pending = false;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                pending = true;
            }
            (None, c) if c.is_whitespace() => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            (None, c) => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }

    args
}
