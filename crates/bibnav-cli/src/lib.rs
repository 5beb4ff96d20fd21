// NOTE: bibnav CLI layout
//
// Why is the TUI a thin adapter?
// - The engine owns every navigation rule and is tested without a terminal
// - This crate only translates crossterm events into engine events and draws
//   engine views into ratatui buffers
//
// Why plain subcommands next to the TUI?
// - `list`, `show` and `search` print the same rows the TUI displays, which
//   makes the record file scriptable and easy to inspect from tests

mod args;
mod commands;
pub mod context;
mod handlers;
pub mod tui;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
