//! The read → dispatch → render loop.
//!
//! Input arrives through an [`EventSource`] and every frame is handed to a
//! [`Screen`]; the dispatcher itself owns the buffer and viewport state and
//! talks to records only through [`Records`].

use tracing::{debug, warn};

use crate::buffer::{CONTINUATION_MARKER, TextBuffer};
use crate::command::Command;
use crate::error::Result;
use crate::frame::Frame;
use crate::keys::{Key, KeyMap, KeyTable};
use crate::label;
use crate::prompt::{LineEditor, PromptStatus, PromptStep, split_args};
use crate::records::{Records, Request};
use crate::scroll::{self, ScrollX, ScrollY};
use crate::state::{DetailView, ListPosition, ViewportState};
use crate::surface::{Attr, Geometry, StyleMap, Surface};

/// Input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    /// New terminal size in columns and rows.
    Resize { width: u16, height: u16 },
    /// Unconditional exit (e.g. Ctrl-C).
    Quit,
}

pub trait EventSource {
    /// Block until the next event is available.
    fn next_event(&mut self) -> Result<Event>;
}

pub trait Screen {
    /// Terminal size as `(columns, rows)`.
    fn size(&self) -> Result<(u16, u16)>;

    fn present(&mut self, view: &View<'_>) -> Result<()>;

    /// Hand the terminal to another process (e.g. an editor).
    fn suspend(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take the terminal back after [`Screen::suspend`].
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Everything a [`Screen`] needs to draw one frame.
pub struct View<'a> {
    pub top_status: &'a str,
    pub bottom_status: String,
    pub prompt: &'a PromptStatus,
    pub buffer: &'a TextBuffer,
    pub state: &'a ViewportState,
    pub styles: StyleMap,
    pub geometry: Geometry,
}

impl View<'_> {
    pub fn render_viewport(&self, surface: &mut dyn Surface) {
        self.buffer
            .render(surface, self.state, self.geometry, &self.styles);
    }
}

/// Dispatcher settings taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub app_name: String,
    pub version: String,
    pub scroll_offset: usize,
    pub prompt_before_quit: bool,
    pub list_args: Vec<String>,
    /// Highlight search terms regardless of case.
    pub search_ignore_case: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "bibnav".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            scroll_offset: 3,
            prompt_before_quit: true,
            list_args: vec!["-l".to_string()],
            search_ignore_case: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Input the dispatcher is waiting for before it can finish a command.
#[derive(Debug, Clone)]
enum Pending {
    Line { editor: LineEditor, command: Command },
    ConfirmQuit,
}

const QUIT_QUESTION: &str = "Do you really want to quit? [y/n]";

pub struct Dispatcher<R: Records> {
    records: R,
    keys: KeyTable,
    keymap: KeyMap,
    settings: Settings,
    state: ViewportState,
    frame: Frame,
    labels: Vec<String>,
    geometry: Geometry,
    prompt: PromptStatus,
    pending: Option<Pending>,
    search_styles: StyleMap,
}

impl<R: Records> Dispatcher<R> {
    pub fn new(records: R, keys: KeyTable, settings: Settings) -> Self {
        let state = ViewportState::new(settings.list_args.clone());
        Self {
            records,
            keys,
            keymap: KeyMap::new(),
            settings,
            state,
            frame: Frame::default(),
            labels: Vec::new(),
            geometry: Geometry::default(),
            prompt: PromptStatus::Empty,
            pending: None,
            search_styles: StyleMap::new(),
        }
    }

    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn buffer(&self) -> &TextBuffer {
        self.frame.buffer()
    }

    pub fn is_wrapped(&self) -> bool {
        self.frame.is_wrapped()
    }

    pub fn prompt(&self) -> &PromptStatus {
        &self.prompt
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn keymap_mut(&mut self) -> &mut KeyMap {
        &mut self.keymap
    }

    /// Size the viewport for a `columns` × `rows` terminal and load the list.
    pub fn start(&mut self, columns: u16, rows: u16) {
        self.geometry = Geometry::for_terminal(columns, rows);
        self.refresh_list(false);
        self.clamp();
    }

    /// Run until quit or until the event source fails.
    pub fn run<E, S>(&mut self, events: &mut E, screen: &mut S) -> Result<()>
    where
        E: EventSource + ?Sized,
        S: Screen + ?Sized,
    {
        let (columns, rows) = screen.size()?;
        self.start(columns, rows);
        screen.present(&self.view())?;

        loop {
            let event = events.next_event()?;
            if self.handle_event(event, screen)? == Flow::Exit {
                debug!("dispatch loop finished");
                return Ok(());
            }
            screen.present(&self.view())?;
        }
    }

    pub fn view(&self) -> View<'_> {
        let styles = match self.state.detail_view() {
            None => self.selection_styles(),
            Some(DetailView::Search) => self.search_styles.clone(),
            Some(_) => StyleMap::new(),
        };

        View {
            top_status: &self.state.top_status,
            bottom_status: self.keys.status_line(self.state.inactive_commands()),
            prompt: &self.prompt,
            buffer: self.frame.buffer(),
            state: &self.state,
            styles,
            geometry: self.geometry,
        }
    }

    pub fn handle_event<S>(&mut self, event: Event, screen: &mut S) -> Result<Flow>
    where
        S: Screen + ?Sized,
    {
        match event {
            Event::Quit => Ok(Flow::Exit),
            Event::Resize { width, height } => {
                self.geometry = Geometry::for_terminal(width, height);
                debug!(geometry = ?self.geometry, "resized");
                scroll::rewrap(&mut self.state, &mut self.frame, self.geometry);
                Ok(Flow::Continue)
            }
            Event::Key(key) => self.handle_key(key, screen),
        }
    }

    fn handle_key<S>(&mut self, key: Key, screen: &mut S) -> Result<Flow>
    where
        S: Screen + ?Sized,
    {
        if let Some(pending) = self.pending.take() {
            return self.handle_pending(pending, key, screen);
        }

        if matches!(self.prompt, PromptStatus::Message(_) | PromptStatus::Error(_)) {
            self.prompt = PromptStatus::Empty;
        }

        let Some(key) = self.keymap.resolve(key) else {
            return Ok(Flow::Continue);
        };
        let Some(command) = self.keys.command(key) else {
            return Ok(Flow::Continue);
        };
        if self.state.is_inactive(command) {
            debug!(%command, "ignoring inactive command");
            return Ok(Flow::Continue);
        }

        self.dispatch(command, None, screen)
    }

    fn handle_pending<S>(&mut self, pending: Pending, key: Key, screen: &mut S) -> Result<Flow>
    where
        S: Screen + ?Sized,
    {
        match pending {
            Pending::ConfirmQuit => {
                self.prompt = PromptStatus::Empty;
                if matches!(key, Key::Char('y') | Key::Char('Y')) {
                    return Ok(Flow::Exit);
                }
                Ok(Flow::Continue)
            }
            Pending::Line {
                mut editor,
                command,
            } => match editor.handle(key) {
                PromptStep::Pending => {
                    self.prompt = editor.status();
                    self.pending = Some(Pending::Line { editor, command });
                    Ok(Flow::Continue)
                }
                PromptStep::Cancelled => {
                    self.prompt = PromptStatus::Empty;
                    Ok(Flow::Continue)
                }
                PromptStep::Submitted(input) => {
                    self.prompt = PromptStatus::Empty;
                    if command == Command::Prompt {
                        self.run_command_line(&input, screen)
                    } else {
                        self.dispatch(command, Some(input), screen)
                    }
                }
            },
        }
    }

    /// Run a `:` command line; the first word names the command.
    fn run_command_line<S>(&mut self, input: &str, screen: &mut S) -> Result<Flow>
    where
        S: Screen + ?Sized,
    {
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim().to_string())),
            None => (input, None),
        };
        if name.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(command) = Command::from_name(name) else {
            self.prompt = PromptStatus::Error(format!("Unknown command: {}", name));
            return Ok(Flow::Continue);
        };
        if command == Command::Prompt || self.state.is_inactive(command) {
            self.prompt = PromptStatus::Error(format!("Command '{}' is not available here", name));
            return Ok(Flow::Continue);
        }

        self.dispatch(command, rest, screen)
    }

    fn dispatch<S>(&mut self, command: Command, input: Option<String>, screen: &mut S) -> Result<Flow>
    where
        S: Screen + ?Sized,
    {
        debug!(%command, ?input, "dispatching");

        let visible = self.geometry.height as isize;
        match command {
            Command::Down => self.scroll_y(ScrollY::Delta(1)),
            Command::Up => self.scroll_y(ScrollY::Delta(-1)),
            Command::PageDown => self.scroll_y(ScrollY::Delta(visible)),
            Command::PageUp => self.scroll_y(ScrollY::Delta(-visible)),
            Command::Top => self.scroll_y(ScrollY::Top),
            Command::Bottom => self.scroll_y(ScrollY::Bottom),
            Command::Right => self.scroll_x(ScrollX::Delta(1)),
            Command::Left => self.scroll_x(ScrollX::Delta(-1)),
            Command::Start => self.scroll_x(ScrollX::Start),
            Command::End => self.scroll_x(ScrollX::End),
            Command::Wrap => scroll::wrap_toggle(&mut self.state, &mut self.frame, self.geometry),
            Command::Select => self.select(),
            Command::Show => self.show(input.as_deref()),
            Command::Help => self.help(),
            Command::Quit => return Ok(self.quit()),
            Command::Prompt => self.ask(Command::Prompt, String::new()),
            Command::Search | Command::Filter | Command::Sort | Command::Add | Command::Modify
            | Command::Export => match input {
                Some(input) => self.run_with_input(command, &input),
                None => self.ask(command, format!("{} ", command.name())),
            },
            Command::Delete | Command::Undo | Command::Redo | Command::Open => {
                self.mutate(command, split_args(input.as_deref().unwrap_or_default()));
            }
            Command::Edit => {
                screen.suspend()?;
                self.mutate(command, Vec::new());
                screen.resume()?;
            }
        }

        Ok(Flow::Continue)
    }

    fn ask(&mut self, command: Command, prefix: String) {
        let editor = LineEditor::new(prefix);
        self.prompt = editor.status();
        self.pending = Some(Pending::Line { editor, command });
    }

    fn run_with_input(&mut self, command: Command, input: &str) {
        match command {
            Command::Search => self.search(input),
            Command::Filter => self.filter(input),
            Command::Sort => self.sort(input),
            Command::Export => self.export(input),
            _ => self.mutate(command, split_args(input)),
        }
    }

    fn scroll_y(&mut self, update: ScrollY) {
        scroll::scroll_y(
            &mut self.state,
            self.frame.buffer(),
            update,
            self.geometry.height,
            self.settings.scroll_offset,
        );
    }

    fn scroll_x(&mut self, update: ScrollX) {
        scroll::scroll_x(&mut self.state, self.frame.buffer(), update, self.geometry.width);
    }

    fn clamp(&mut self) {
        scroll::clamp(&mut self.state, self.frame.buffer(), self.geometry);
    }

    fn current_label(&self) -> Option<String> {
        let buffer = self.frame.buffer();
        if buffer.is_empty() {
            return None;
        }
        // List rows are written one per label, so the row origin indexes `labels`.
        if self.state.is_list_mode()
            && let Some(label) = buffer
                .origin(self.state.current_line)
                .and_then(|row| self.labels.get(row))
        {
            return Some(label.clone());
        }
        label::resolve(
            buffer,
            self.state.current_line,
            self.state.detail_view(),
            &self.state.top_status,
        )
        .map(|(label, _)| label)
    }

    /// Labels a mutating command acts on: the selection if any, otherwise
    /// the record under the cursor.
    fn target_labels(&self, command: Command) -> Option<Vec<String>> {
        match command {
            Command::Add | Command::Undo | Command::Redo => Some(Vec::new()),
            Command::Delete | Command::Modify if !self.state.selection().is_empty() => {
                Some(self.state.selection().iter().cloned().collect())
            }
            _ => self.current_label().map(|label| vec![label]),
        }
    }

    /// Regenerate the list from the collaborator with the current arguments,
    /// wrapped at the viewport width when `wrapped` is set.
    fn refresh_list(&mut self, wrapped: bool) {
        let mut out = TextBuffer::new();
        match self.records.list(&self.state.list_args, &mut out) {
            Ok(labels) => self.labels = labels,
            Err(err) => {
                warn!(error = %err, "listing records failed");
                self.labels.clear();
                self.prompt = PromptStatus::Error(err.to_string());
            }
        }

        self.frame.replace(out);
        if wrapped {
            self.frame.wrap(self.geometry.width);
        }

        self.state.top_status = format!(
            "{} v{} - {} Entries",
            self.settings.app_name,
            self.settings.version,
            self.labels.len()
        );
    }

    /// Cursor record and wrap state of the list currently shown.
    fn list_position(&self) -> ListPosition {
        let buffer = self.frame.buffer();
        ListPosition {
            record: buffer
                .origin(self.state.current_line)
                .unwrap_or(self.state.current_line),
            wrapped: self.frame.is_wrapped(),
        }
    }

    /// Leave any detail view and show the refreshed list on the saved record.
    /// A record that no longer exists puts the cursor on the last row.
    fn return_to_list(&mut self) {
        let position = match self.state.exit_detail() {
            Some(position) => position,
            None => self.list_position(),
        };
        self.refresh_list(position.wrapped);

        let buffer = self.frame.buffer();
        let line = buffer
            .first_row_of(position.record)
            .unwrap_or(buffer.height());
        self.state.restore_line(line, buffer.height());
        self.clamp();
    }

    fn enter_detail(&mut self, view: DetailView, mut out: TextBuffer, title: String) {
        let position = self.list_position();
        out.split();
        self.state.enter_detail(view, position);
        self.state.top_status = title;
        self.frame.replace(out);
    }

    fn title(&self, suffix: impl std::fmt::Display) -> String {
        format!(
            "{} v{} - {}",
            self.settings.app_name, self.settings.version, suffix
        )
    }

    fn show(&mut self, label: Option<&str>) {
        if self.frame.buffer().is_empty() {
            return;
        }
        let label = match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => label.to_string(),
            None => match self.current_label() {
                Some(label) => label,
                None => return,
            },
        };

        let mut out = TextBuffer::new();
        let request = Request::new(Command::Show).with_labels([label.as_str()]);
        if let Err(err) = self.records.execute(&request, &mut out) {
            self.fail(Command::Show, err.to_string());
            return;
        }
        if out.is_empty() {
            return;
        }

        let title = label::detail_title(&self.settings.app_name, &self.settings.version, &label);
        self.enter_detail(DetailView::Show, out, title);
    }

    fn search(&mut self, input: &str) {
        let query = split_args(input);
        if query.is_empty() {
            return;
        }

        let mut args = query.clone();
        args.extend(self.state.list_args.iter().cloned());

        let mut out = TextBuffer::new();
        let request = Request::new(Command::Search).with_args(args);
        let hits = match self.records.execute(&request, &mut out) {
            Ok(hits) => hits,
            Err(err) => {
                self.fail(Command::Search, err.to_string());
                return;
            }
        };

        if out.is_empty() {
            self.prompt = PromptStatus::Message(format!(
                "No search hits for '{}'!",
                search_terms(&query).join(" ")
            ));
            return;
        }

        let mut styles = StyleMap::new();
        for line in out.lines().iter().flat_map(|l| l.lines()) {
            if line.starts_with('[') || line.starts_with(CONTINUATION_MARKER) {
                continue;
            }
            if let Some(label) = line.split_whitespace().next() {
                styles.push(label, Attr::SearchLabel);
            }
        }
        for term in search_terms(&query) {
            if self.settings.search_ignore_case {
                styles.push_ignore_case(term, Attr::SearchQuery);
            } else {
                styles.push(term, Attr::SearchQuery);
            }
        }
        self.search_styles = styles;

        let title = self.title(format!("{} hit{}", hits, if hits > 1 { "s" } else { "" }));
        self.enter_detail(DetailView::Search, out, title);
    }

    fn filter(&mut self, input: &str) {
        let args = split_args(input);
        if args.is_empty() {
            self.state.list_args = self.settings.list_args.clone();
        } else {
            self.state.list_args.extend(args);
        }
        self.reload_list();
    }

    fn sort(&mut self, input: &str) {
        let mut args = Vec::with_capacity(self.state.list_args.len() + 2);
        let mut iter = std::mem::take(&mut self.state.list_args).into_iter();
        while let Some(arg) = iter.next() {
            if arg == "-s" {
                iter.next();
            } else {
                args.push(arg);
            }
        }

        let field = input.trim();
        if !field.is_empty() {
            args.push("-s".to_string());
            args.push(field.to_string());
        }
        self.state.list_args = args;
        self.reload_list();
    }

    fn reload_list(&mut self) {
        self.refresh_list(self.frame.is_wrapped());
        self.state.reset_position();
        self.clamp();
    }

    fn export(&mut self, input: &str) {
        let labels: Vec<String> = if self.state.selection().is_empty() {
            self.labels.clone()
        } else {
            self.state.selection().iter().cloned().collect()
        };

        let mut out = TextBuffer::new();
        let request = Request::new(Command::Export)
            .with_labels(labels)
            .with_args(split_args(input));
        match self.records.execute(&request, &mut out) {
            Ok(count) => {
                let message = out
                    .line(0)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Exported {} record(s)", count));
                self.prompt = PromptStatus::Message(message);
            }
            Err(err) => self.fail(Command::Export, err.to_string()),
        }
    }

    /// Commands that change records (and Open). Empty output returns to the
    /// list; anything else is shown as a report.
    fn mutate(&mut self, command: Command, args: Vec<String>) {
        let Some(labels) = self.target_labels(command) else {
            return;
        };

        let mut out = TextBuffer::new();
        let request = Request::new(command)
            .with_labels(labels.iter().map(String::as_str))
            .with_args(args);
        if let Err(err) = self.records.execute(&request, &mut out) {
            self.fail(command, err.to_string());
            return;
        }

        if command == Command::Open {
            if let Some(line) = out.line(0) {
                self.prompt = PromptStatus::Message(line.to_string());
            }
            return;
        }
        if command == Command::Delete {
            self.state.deselect(&labels);
        }

        if out.is_empty() {
            self.return_to_list();
        } else {
            let title = self.title(format!("{} output", command));
            self.enter_detail(DetailView::Report, out, title);
        }
    }

    fn select(&mut self) {
        if let Some(label) = self.current_label() {
            let selected = self.state.toggle_selection(&label);
            debug!(%label, selected, "toggled selection");
        }
    }

    fn help(&mut self) {
        let mut out = TextBuffer::new();
        for command in Command::ALL {
            let keys = self
                .keys
                .keys_for(command)
                .into_iter()
                .map(Key::label)
                .collect::<Vec<_>>()
                .join(", ");
            out.write(format!(
                "{:<10} {:<10} {}",
                command.name(),
                if keys.is_empty() { "-" } else { keys.as_str() },
                command.description()
            ));
        }

        let title = self.title("Help");
        self.enter_detail(DetailView::Help, out, title);
    }

    fn quit(&mut self) -> Flow {
        if !self.state.is_list_mode() {
            self.return_to_list();
            return Flow::Continue;
        }
        if self.settings.prompt_before_quit {
            self.prompt = PromptStatus::Editing {
                text: QUIT_QUESTION.to_string(),
                cursor: QUIT_QUESTION.chars().count(),
            };
            self.pending = Some(Pending::ConfirmQuit);
            return Flow::Continue;
        }
        Flow::Exit
    }

    fn selection_styles(&self) -> StyleMap {
        let mut styles = StyleMap::new();
        for label in self.state.selection() {
            styles.push(label.as_str(), Attr::Selection);
        }
        styles
    }

    fn fail(&mut self, command: Command, message: String) {
        warn!(%command, error = %message, "command failed");
        self.prompt = PromptStatus::Error(message);
    }
}

/// Query words of a search input: everything before a `--`, otherwise the
/// leading words that are neither flags nor filters.
fn search_terms(words: &[String]) -> Vec<&str> {
    let words = words.iter().map(String::as_str);
    match words.clone().position(|w| w == "--") {
        Some(end) => words.take(end).collect(),
        None => words
            .take_while(|w| !w.starts_with('-') && !w.contains('='))
            .collect(),
    }
}
