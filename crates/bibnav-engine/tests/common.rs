//! Shared fixtures for the dispatch integration tests.
//!
//! Clippy cannot track usage across integration test files, hence the
//! `allow(dead_code)`.
#![cfg(test)]
#![allow(dead_code)]

use std::collections::VecDeque;

use bibnav_engine::{
    CollaboratorError, Command, Dispatcher, Event, EventSource, GridSurface, Key, KeyTable,
    Records, Request, Result, Screen, Settings, TextBuffer, View,
};

/// Events fed to the dispatcher in order; `Quit` once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(mut self, text: &str) -> Self {
        self.events
            .extend(text.chars().map(|c| Event::Key(Key::Char(c))));
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.events.push_back(Event::Key(key));
        self
    }

    pub fn resize(mut self, width: u16, height: u16) -> Self {
        self.events.push_back(Event::Resize { width, height });
        self
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self) -> Result<Event> {
        Ok(self.events.pop_front().unwrap_or(Event::Quit))
    }
}

/// Screen that keeps every presented frame as plain text.
#[derive(Debug)]
pub struct GridScreen {
    pub columns: u16,
    pub rows: u16,
    /// Top status followed by the viewport rows.
    pub frames: Vec<String>,
    pub prompts: Vec<String>,
    pub suspended: usize,
    pub resumed: usize,
}

impl GridScreen {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            frames: Vec::new(),
            prompts: Vec::new(),
            suspended: 0,
            resumed: 0,
        }
    }

    pub fn last_frame(&self) -> &str {
        self.frames.last().map(String::as_str).unwrap_or_default()
    }
}

impl Screen for GridScreen {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.columns, self.rows))
    }

    fn present(&mut self, view: &View<'_>) -> Result<()> {
        let mut grid = GridSurface::new(view.geometry);
        view.render_viewport(&mut grid);
        self.frames
            .push(format!("{}\n{}", view.top_status, grid.contents().trim_end()));
        self.prompts.push(view.prompt.text().to_string());
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.suspended += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.resumed += 1;
        Ok(())
    }
}

/// In-memory record collaborator: `(label, title)` pairs.
#[derive(Debug, Default)]
pub struct FakeRecords {
    pub records: Vec<(String, String)>,
    pub calls: Vec<Request>,
    pub fail_on: Option<Command>,
}

impl FakeRecords {
    pub fn new(records: &[(&str, &str)]) -> Self {
        Self {
            records: records
                .iter()
                .map(|(label, title)| (label.to_string(), title.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// `count` records labelled `rec00`, `rec01`, ...
    pub fn numbered(count: usize) -> Self {
        Self {
            records: (0..count)
                .map(|i| (format!("rec{:02}", i), format!("Title {}", i)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn calls_of(&self, command: Command) -> Vec<&Request> {
        self.calls.iter().filter(|r| r.command == command).collect()
    }

    fn title_of(&self, label: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, title)| title.as_str())
    }
}

impl Records for FakeRecords {
    fn list(
        &mut self,
        args: &[String],
        out: &mut TextBuffer,
    ) -> std::result::Result<Vec<String>, CollaboratorError> {
        let mut records = self.records.clone();
        if args.iter().any(|a| a == "-r") {
            records.reverse();
        }
        for (label, title) in &records {
            out.write(format!("{:<10} {}", label, title));
        }
        Ok(records.into_iter().map(|(label, _)| label).collect())
    }

    fn execute(
        &mut self,
        request: &Request,
        out: &mut TextBuffer,
    ) -> std::result::Result<usize, CollaboratorError> {
        self.calls.push(request.clone());
        if self.fail_on == Some(request.command) {
            return Err(format!("{} failed", request.command).into());
        }

        match request.command {
            Command::Show => {
                let label = request.labels.first().ok_or("no label")?;
                let title = self
                    .title_of(label)
                    .ok_or_else(|| format!("No entry with the label '{}'", label))?;
                out.write(format!("[{}]\ntitle = \"{}\"", label, title));
                Ok(1)
            }
            Command::Search => {
                let query = request.args.first().ok_or("no query")?.to_lowercase();
                let mut hits = 0;
                for (label, title) in &self.records {
                    if title.to_lowercase().contains(&query) {
                        hits += 1;
                        out.write(format!("{} - 1 match", label));
                        out.write(format!("[1]     {}", title));
                    }
                }
                Ok(hits)
            }
            Command::Delete => {
                let before = self.records.len();
                self.records
                    .retain(|(label, _)| !request.labels.contains(label));
                Ok(before - self.records.len())
            }
            Command::Add => {
                let (label, title) = request.args.split_first().ok_or("no label")?;
                self.records.push((label.clone(), title.join(" ")));
                Ok(1)
            }
            Command::Open => {
                out.write(format!("Opened {}", request.labels.join(", ")));
                Ok(1)
            }
            Command::Modify => {
                out.write(format!("Modified {}", request.labels.join(", ")));
                Ok(request.labels.len())
            }
            _ => Ok(request.labels.len()),
        }
    }
}

pub fn settings() -> Settings {
    Settings {
        app_name: "bibnav".to_string(),
        version: "1.0".to_string(),
        scroll_offset: 3,
        prompt_before_quit: false,
        list_args: vec!["-l".to_string()],
        search_ignore_case: false,
    }
}

pub fn dispatcher(records: FakeRecords) -> Dispatcher<FakeRecords> {
    Dispatcher::new(records, KeyTable::with_defaults(), settings())
}

/// Feed `text` to the dispatcher one character at a time.
pub fn press(dispatcher: &mut Dispatcher<FakeRecords>, screen: &mut GridScreen, text: &str) {
    for c in text.chars() {
        dispatcher
            .handle_event(Event::Key(Key::Char(c)), screen)
            .expect("handling a key never fails with an in-memory screen");
    }
}

pub fn physics() -> FakeRecords {
    FakeRecords::new(&[
        ("alpha", "Special relativity"),
        ("beta", "General relativity"),
        ("gamma", "Quantum theory"),
    ])
}
