use std::fmt;
use std::str::FromStr;

/// Everything a keypress or the `:` prompt can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Command {
    Add,
    Delete,
    Edit,
    Export,
    Filter,
    Help,
    Modify,
    Open,
    Prompt,
    Quit,
    Redo,
    Search,
    Select,
    Show,
    Sort,
    Undo,
    Wrap,
    Down,
    Up,
    Left,
    Right,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Start,
    End,
}

impl Command {
    /// Commands whose key can be rebound in the config file.
    pub const CONFIGURABLE: [Command; 17] = [
        Command::Prompt,
        Command::Search,
        Command::Help,
        Command::Add,
        Command::Delete,
        Command::Edit,
        Command::Filter,
        Command::Modify,
        Command::Open,
        Command::Quit,
        Command::Redo,
        Command::Sort,
        Command::Undo,
        Command::Select,
        Command::Wrap,
        Command::Export,
        Command::Show,
    ];

    pub const ALL: [Command; 27] = [
        Command::Add,
        Command::Delete,
        Command::Edit,
        Command::Export,
        Command::Filter,
        Command::Help,
        Command::Modify,
        Command::Open,
        Command::Prompt,
        Command::Quit,
        Command::Redo,
        Command::Search,
        Command::Select,
        Command::Show,
        Command::Sort,
        Command::Undo,
        Command::Wrap,
        Command::Down,
        Command::Up,
        Command::Left,
        Command::Right,
        Command::PageDown,
        Command::PageUp,
        Command::Top,
        Command::Bottom,
        Command::Start,
        Command::End,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Delete => "delete",
            Command::Edit => "edit",
            Command::Export => "export",
            Command::Filter => "filter",
            Command::Help => "help",
            Command::Modify => "modify",
            Command::Open => "open",
            Command::Prompt => "prompt",
            Command::Quit => "quit",
            Command::Redo => "redo",
            Command::Search => "search",
            Command::Select => "select",
            Command::Show => "show",
            Command::Sort => "sort",
            Command::Undo => "undo",
            Command::Wrap => "wrap",
            Command::Down => "down",
            Command::Up => "up",
            Command::Left => "left",
            Command::Right => "right",
            Command::PageDown => "page_down",
            Command::PageUp => "page_up",
            Command::Top => "top",
            Command::Bottom => "bottom",
            Command::Start => "start",
            Command::End => "end",
        }
    }

    /// Case-insensitive lookup by [`Command::name`].
    pub fn from_name(name: &str) -> Option<Command> {
        let name = name.trim();
        Command::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Add => "Add new records",
            Command::Delete => "Delete the current or selected records",
            Command::Edit => "Edit the current record in $EDITOR",
            Command::Export => "Export the selected (or all listed) records",
            Command::Filter => "Add filter arguments to the list",
            Command::Help => "Show this help",
            Command::Modify => "Modify a field of the current or selected records",
            Command::Open => "Open the file or URL of the current record",
            Command::Prompt => "Run a command by name",
            Command::Quit => "Close the detail view or quit",
            Command::Redo => "Redo the last undone change",
            Command::Search => "Search the listed records",
            Command::Select => "Toggle selection of the current record",
            Command::Show => "Show the current record",
            Command::Sort => "Sort the list by a field",
            Command::Undo => "Undo the last change",
            Command::Wrap => "Toggle line wrapping",
            Command::Down => "Move down one row",
            Command::Up => "Move up one row",
            Command::Left => "Scroll left one column",
            Command::Right => "Scroll right one column",
            Command::PageDown => "Move down one page",
            Command::PageUp => "Move up one page",
            Command::Top => "Jump to the first row",
            Command::Bottom => "Jump to the last row",
            Command::Start => "Scroll to the first column",
            Command::End => "Scroll to the last column",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::from_name(s).ok_or_else(|| format!("unknown command '{}'", s.trim()))
    }
}
