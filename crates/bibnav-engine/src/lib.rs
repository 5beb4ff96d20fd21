// NOTE: bibnav engine layout
//
// Why is the engine free of terminal I/O?
// - Scrolling, wrapping and mode transitions are the parts that break in subtle ways
// - Keeping them behind `Surface`, `Screen` and `EventSource` lets tests drive the
//   whole dispatch loop with scripted keys and an in-memory grid
// - The CLI crate only adapts crossterm events and ratatui buffers to these traits
//
// Why one owned `ViewportState` instead of shared session state?
// - Every handler gets `&mut self` on the dispatcher, so the borrow checker proves
//   that cursor, window and selection are never updated from two places at once
// - Detail views are state transitions inside the same loop, not nested loops

pub mod buffer;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod keys;
pub mod label;
pub mod prompt;
pub mod records;
pub mod scroll;
pub mod state;
pub mod surface;

pub use buffer::{CONTINUATION_INDENT, CONTINUATION_MARKER, TextBuffer};
pub use command::Command;
pub use dispatch::{Dispatcher, Event, EventSource, Flow, Screen, Settings, View};
pub use error::{Error, Result};
pub use frame::Frame;
pub use keys::{Key, KeyMap, KeyTable};
pub use prompt::{LineEditor, PromptStatus};
pub use records::{CollaboratorError, Records, Request};
pub use scroll::{ScrollX, ScrollY};
pub use state::{DetailView, ListPosition, Mode, ViewportState};
pub use surface::{Attr, Geometry, GridSurface, StyleMap, Surface};
