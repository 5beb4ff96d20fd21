//! Scroll, cursor, selection and mode state of the viewport.

use std::collections::BTreeSet;

use tracing::debug;

use crate::buffer::TextBuffer;
use crate::command::Command;

/// Kind of content a detail view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailView {
    /// A single record; its label lives in the top status bar.
    Show,
    /// Search hits: per-record title rows followed by `[n]` match rows.
    Search,
    /// Command reference.
    Help,
    /// Free-form output of a command.
    Report,
}

impl DetailView {
    /// Commands that make no sense while this view is displayed.
    pub fn inactive_commands(self) -> BTreeSet<Command> {
        use Command::*;

        let commands: &[Command] = match self {
            DetailView::Show => &[Add, Export, Filter, Search, Select, Show, Sort],
            DetailView::Search => &[Add, Filter, Search, Sort],
            DetailView::Help | DetailView::Report => &[
                Add, Delete, Edit, Export, Filter, Help, Modify, Open, Search, Select, Show, Sort,
            ],
        };

        commands.iter().copied().collect()
    }
}

/// Where the list cursor was when a detail view opened.
///
/// `record` is the unwrapped list row, so it survives the list being wrapped
/// or unwrapped while the detail view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListPosition {
    pub record: usize,
    pub wrapped: bool,
}

/// Navigation mode. Detail views do not nest: entering one while another is
/// shown replaces it and keeps the original list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    List,
    Detail {
        return_to: ListPosition,
        view: DetailView,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ViewportState {
    pub current_line: usize,
    pub top_line: usize,
    pub left_edge: usize,
    pub list_args: Vec<String>,
    pub top_status: String,
    mode: Mode,
    selection: BTreeSet<String>,
    inactive: BTreeSet<Command>,
}

impl ViewportState {
    pub fn new(list_args: Vec<String>) -> Self {
        Self {
            list_args,
            ..Self::default()
        }
    }

    /// Cursor row, or `None` while the buffer is empty.
    pub fn cursor(&self, buffer: &TextBuffer) -> Option<usize> {
        (!buffer.is_empty()).then(|| self.current_line.min(buffer.height() - 1))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_list_mode(&self) -> bool {
        self.mode == Mode::List
    }

    pub fn detail_view(&self) -> Option<DetailView> {
        match self.mode {
            Mode::List => None,
            Mode::Detail { view, .. } => Some(view),
        }
    }

    /// Switch to a detail view. `position` is kept only when leaving the
    /// list; a detail view replacing another keeps the first position.
    pub fn enter_detail(&mut self, view: DetailView, position: ListPosition) {
        let return_to = match self.mode {
            Mode::List => position,
            Mode::Detail { return_to, .. } => return_to,
        };
        debug!(?view, ?return_to, "entering detail view");

        self.mode = Mode::Detail { return_to, view };
        self.inactive = view.inactive_commands();
        self.reset_position();
    }

    /// Leave the detail view; returns the saved list position.
    pub fn exit_detail(&mut self) -> Option<ListPosition> {
        match std::mem::take(&mut self.mode) {
            Mode::List => None,
            Mode::Detail { return_to, .. } => {
                debug!(?return_to, "leaving detail view");
                self.inactive.clear();
                Some(return_to)
            }
        }
    }

    /// Put the cursor back on `line`, clamped to the buffer height.
    pub fn restore_line(&mut self, line: usize, height: usize) {
        self.current_line = line.min(height.saturating_sub(1));
    }

    pub fn reset_position(&mut self) {
        self.current_line = 0;
        self.top_line = 0;
        self.left_edge = 0;
    }

    pub fn is_inactive(&self, command: Command) -> bool {
        self.inactive.contains(&command)
    }

    pub fn inactive_commands(&self) -> &BTreeSet<Command> {
        &self.inactive
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Add or remove `label`; returns whether it is selected afterwards.
    pub fn toggle_selection(&mut self, label: &str) -> bool {
        if self.selection.remove(label) {
            false
        } else {
            self.selection.insert(label.to_string());
            true
        }
    }

    pub fn deselect<S: AsRef<str>>(&mut self, labels: &[S]) {
        for label in labels {
            self.selection.remove(label.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_exit_detail_restores_line() {
        let mut state = ViewportState::default();
        state.current_line = 4;
        state.top_line = 2;
        state.left_edge = 3;

        let position = ListPosition {
            record: 4,
            wrapped: true,
        };

        state.enter_detail(DetailView::Show, position);
        assert_eq!((state.current_line, state.top_line, state.left_edge), (0, 0, 0));
        assert!(state.is_inactive(Command::Add));
        assert!(!state.is_inactive(Command::Delete));

        assert_eq!(state.exit_detail(), Some(position));
        assert!(state.is_list_mode());
        assert!(state.inactive_commands().is_empty());
        assert_eq!(state.exit_detail(), None);
    }

    #[test]
    fn test_detail_views_do_not_nest() {
        let mut state = ViewportState::default();
        let first = ListPosition {
            record: 7,
            wrapped: false,
        };
        state.enter_detail(DetailView::Search, first);
        state.current_line = 2;
        state.enter_detail(
            DetailView::Show,
            ListPosition {
                record: 2,
                wrapped: true,
            },
        );

        assert_eq!(
            state.mode(),
            Mode::Detail {
                return_to: first,
                view: DetailView::Show
            }
        );
        assert_eq!(state.exit_detail(), Some(first));
    }

    #[test]
    fn test_restore_line_clamps_to_height() {
        let mut state = ViewportState::default();
        state.restore_line(4, 3);
        assert_eq!(state.current_line, 2);
        state.restore_line(4, 0);
        assert_eq!(state.current_line, 0);
    }

    #[test]
    fn test_toggle_selection_twice_is_identity() {
        let mut state = ViewportState::default();
        state.toggle_selection("einstein");
        let before = state.selection().clone();

        assert!(state.toggle_selection("knuth"));
        assert!(!state.toggle_selection("knuth"));
        assert!(!state.toggle_selection("einstein"));
        assert!(state.toggle_selection("einstein"));

        assert_eq!(state.selection(), &before);
    }

    #[test]
    fn test_cursor_is_none_for_empty_buffer() {
        let state = ViewportState::default();
        assert_eq!(state.cursor(&TextBuffer::new()), None);
        assert_eq!(state.cursor(&TextBuffer::from_lines(["x"])), Some(0));
    }
}
