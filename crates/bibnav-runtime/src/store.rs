//! TOML-backed record collection.
//!
//! The file holds one table per record, keyed by label:
//!
//! ```toml
//! [einstein]
//! author = "Albert Einstein"
//! title = "On the electrodynamics of moving bodies"
//! year = 1905
//! ```
//!
//! Table order is preserved and is the natural list order.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};

use bibnav_engine::{CollaboratorError, Command, Records, Request, TextBuffer};
use toml::{Table, Value};
use tracing::{debug, info};

use crate::history::History;
use crate::{Error, Result};

/// Settings of the external programs and search behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub opener: String,
    pub editor: String,
    pub ignore_case: bool,
    pub search_context: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            opener: "xdg-open".to_string(),
            editor: "vi".to_string(),
            ignore_case: false,
            search_context: 1,
        }
    }
}

/// Parsed arguments of the list command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// `-l`: add year and author columns.
    pub long: bool,
    /// `-r`: reverse the order.
    pub reverse: bool,
    /// `-s FIELD`: sort by a field.
    pub sort: Option<String>,
    /// `FIELD=VALUE`: case-insensitive substring filters, all must match.
    pub filters: Vec<(String, String)>,
}

impl ListArgs {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            match arg {
                "-l" | "--long" => parsed.long = true,
                "-r" | "--reverse" => parsed.reverse = true,
                "-s" | "--sort" => {
                    let field = iter
                        .next()
                        .ok_or_else(|| Error::InvalidArgs(format!("{} needs a field name", arg)))?;
                    parsed.sort = Some(field.to_string());
                }
                _ => match arg.split_once('=') {
                    Some((field, value)) if !field.is_empty() => {
                        parsed.filters.push((field.to_string(), value.to_string()))
                    }
                    _ => {
                        return Err(Error::InvalidArgs(format!(
                            "unrecognized list argument '{}'",
                            arg
                        )));
                    }
                },
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Table,
    history: History,
    options: StoreOptions,
}

impl RecordStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            parse_records(&content)
                .map_err(|msg| Error::Store(format!("{}: {}", path.display(), msg)))?
        } else {
            Table::new()
        };
        info!(path = %path.display(), records = records.len(), "loaded record store");

        Ok(Self {
            path,
            records,
            history: History::default(),
            options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn get(&self, label: &str) -> Option<&Table> {
        self.records.get(label).and_then(Value::as_table)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string(&self.records).map_err(|e| Error::Store(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), records = self.records.len(), "saved record store");
        Ok(())
    }

    /// `(label, row)` pairs in display order.
    pub fn list_rows(&self, args: &ListArgs) -> Vec<(String, String)> {
        let mut labels: Vec<&String> = self
            .records
            .iter()
            .filter(|(label, value)| {
                let Some(record) = value.as_table() else {
                    return false;
                };
                args.filters.iter().all(|(field, wanted)| {
                    field_value(label, record, field)
                        .to_lowercase()
                        .contains(&wanted.to_lowercase())
                })
            })
            .map(|(label, _)| label)
            .collect();

        if let Some(field) = &args.sort {
            labels.sort_by_cached_key(|label| {
                self.get(label)
                    .map(|record| field_value(label, record, field).to_lowercase())
                    .unwrap_or_default()
            });
        }
        if args.reverse {
            labels.reverse();
        }

        let column = |field: &str| -> Vec<String> {
            labels
                .iter()
                .map(|label| {
                    self.get(label)
                        .map(|record| field_value(label, record, field))
                        .unwrap_or_default()
                })
                .collect()
        };
        let titles = column("title");
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let rows: Vec<String> = if args.long {
            let years = column("year");
            let authors = column("author");
            let year_width = width_of(&years);
            let author_width = width_of(&authors);
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    format!(
                        "{:<lw$}  {:<yw$}  {:<aw$}  {}",
                        label,
                        years[i],
                        authors[i],
                        titles[i],
                        lw = label_width,
                        yw = year_width,
                        aw = author_width
                    )
                })
                .collect()
        } else {
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| format!("{:<lw$}  {}", label, titles[i], lw = label_width))
                .collect()
        };

        labels
            .into_iter()
            .cloned()
            .zip(rows.into_iter().map(|row| row.trim_end().to_string()))
            .collect()
    }

    /// The record as a TOML table headed by its label.
    pub fn show(&self, label: &str) -> Result<String> {
        let record = self
            .get(label)
            .ok_or_else(|| Error::NotFound(label.to_string()))?;

        let mut single = Table::new();
        single.insert(label.to_string(), Value::Table(record.clone()));
        toml::to_string(&single).map_err(|e| Error::Store(e.to_string()))
    }

    /// Search the rendered records listed by `args` for `query`. Each match
    /// shows `context` lines starting at the matching one.
    ///
    /// Returns the result rows (`"<label> - N match(es)"` followed by
    /// `"[i]     <line>"` rows) and the total number of matches.
    pub fn search(
        &self,
        query: &str,
        context: Option<usize>,
        args: &ListArgs,
    ) -> Result<(Vec<String>, usize)> {
        let needle = if self.options.ignore_case {
            query.to_lowercase()
        } else {
            query.to_string()
        };
        let context = context.unwrap_or(self.options.search_context).max(1);

        let mut rows = Vec::new();
        let mut hits = 0;
        for (label, _) in self.list_rows(args) {
            let text = self.show(&label)?;
            let lines: Vec<&str> = text.lines().collect();

            let matches: Vec<&[&str]> = lines
                .iter()
                .enumerate()
                .filter(|(_, line)| {
                    if self.options.ignore_case {
                        line.to_lowercase().contains(&needle)
                    } else {
                        line.contains(&needle)
                    }
                })
                .map(|(i, _)| &lines[i..(i + context).min(lines.len())])
                .collect();
            if matches.is_empty() {
                continue;
            }

            hits += matches.len();
            rows.push(format!(
                "{} - {} match{}",
                label,
                matches.len(),
                if matches.len() > 1 { "es" } else { "" }
            ));
            for (index, lines) in matches.iter().enumerate() {
                let marker = format!("[{}]", index + 1);
                for line in lines.iter() {
                    rows.push(format!("{:<8}{}", marker, line));
                }
            }
        }

        debug!(query, hits, "searched records");
        Ok((rows, hits))
    }

    pub fn add(&mut self, label: &str, fields: Table) -> Result<()> {
        if label.trim().is_empty() {
            return Err(Error::InvalidArgs("a record needs a label".to_string()));
        }
        if self.records.contains_key(label) {
            return Err(Error::InvalidArgs(format!(
                "an entry with the label '{}' already exists",
                label
            )));
        }

        let before = self.records.clone();
        self.records.insert(label.to_string(), Value::Table(fields));
        self.commit(format!("add {}", label), before)
    }

    pub fn delete(&mut self, labels: &[String]) -> Result<usize> {
        self.require(labels)?;

        let before = self.records.clone();
        for label in labels {
            self.records.remove(label);
        }
        self.commit(format!("delete {}", labels.join(" ")), before)?;
        Ok(labels.len())
    }

    /// Set `FIELD=VALUE` pairs on every record; an empty value removes the field.
    pub fn modify(&mut self, labels: &[String], fields: &[(String, String)]) -> Result<usize> {
        self.require(labels)?;
        if fields.is_empty() {
            return Err(Error::InvalidArgs("modify needs FIELD=VALUE arguments".to_string()));
        }

        let before = self.records.clone();
        for label in labels {
            if let Some(record) = self.records.get_mut(label).and_then(Value::as_table_mut) {
                for (field, value) in fields {
                    if value.is_empty() {
                        record.remove(field);
                    } else {
                        record.insert(field.clone(), Value::String(value.clone()));
                    }
                }
            }
        }
        self.commit(format!("modify {}", labels.join(" ")), before)?;
        Ok(labels.len())
    }

    /// Open the record in the editor and store the result. The label may be
    /// changed in the editor. Returns the label after editing.
    pub fn edit(&mut self, label: &str) -> Result<String> {
        let original = self.show(label)?;

        let mut file = tempfile::Builder::new()
            .prefix("bibnav-")
            .suffix(".toml")
            .tempfile()?;
        file.write_all(original.as_bytes())?;
        file.flush()?;

        let mut words = self.options.editor.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| Error::External("no editor configured".to_string()))?;
        let status = Process::new(program)
            .args(words)
            .arg(file.path())
            .status()
            .map_err(|e| Error::External(format!("{}: {}", program, e)))?;
        if !status.success() {
            return Err(Error::External(format!("{} exited with {}", program, status)));
        }

        let edited = std::fs::read_to_string(file.path())?;
        if edited == original {
            return Ok(label.to_string());
        }

        let table = parse_records(&edited)
            .map_err(|msg| Error::InvalidArgs(format!("edited record is invalid: {}", msg)))?;
        if table.len() != 1 {
            return Err(Error::InvalidArgs(
                "the edited file must contain exactly one record".to_string(),
            ));
        }
        let Some((new_label, record)) = table.into_iter().next() else {
            return Err(Error::InvalidArgs("the edited file is empty".to_string()));
        };
        if new_label != label && self.records.contains_key(&new_label) {
            return Err(Error::InvalidArgs(format!(
                "an entry with the label '{}' already exists",
                new_label
            )));
        }

        let before = self.records.clone();
        self.records = before
            .iter()
            .map(|(key, value)| {
                if key == label {
                    (new_label.clone(), record.clone())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect();
        self.commit(format!("edit {}", label), before)?;
        Ok(new_label)
    }

    /// Run the opener on every `file` and `url` entry of the record.
    pub fn open_record(&self, label: &str) -> Result<Vec<String>> {
        let record = self
            .get(label)
            .ok_or_else(|| Error::NotFound(label.to_string()))?;

        let targets: Vec<String> = ["file", "url"]
            .iter()
            .filter_map(|field| record.get(*field))
            .flat_map(|value| {
                value_text(value)
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();
        if targets.is_empty() {
            return Err(Error::InvalidArgs(format!(
                "the entry '{}' has no file or url field",
                label
            )));
        }

        for target in &targets {
            debug!(opener = %self.options.opener, %target, "opening");
            Process::new(&self.options.opener)
                .arg(target)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| Error::External(format!("{}: {}", self.options.opener, e)))?;
        }
        Ok(targets)
    }

    /// Write the given records (all records when `labels` is empty) to `path`.
    pub fn export(&self, labels: &[String], path: &Path) -> Result<usize> {
        let labels = if labels.is_empty() {
            self.labels()
        } else {
            self.require(labels)?;
            labels.to_vec()
        };

        let mut exported = Table::new();
        for label in &labels {
            if let Some(record) = self.records.get(label) {
                exported.insert(label.clone(), record.clone());
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(&exported).map_err(|e| Error::Store(e.to_string()))?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), records = exported.len(), "exported records");
        Ok(exported.len())
    }

    /// Revert the last change; returns its description.
    pub fn undo(&mut self) -> Result<String> {
        let (description, records) = self
            .history
            .undo(self.records.clone())
            .ok_or_else(|| Error::InvalidArgs("nothing to undo".to_string()))?;
        self.records = records;
        self.save()?;
        Ok(description)
    }

    pub fn redo(&mut self) -> Result<String> {
        let (description, records) = self
            .history
            .redo(self.records.clone())
            .ok_or_else(|| Error::InvalidArgs("nothing to redo".to_string()))?;
        self.records = records;
        self.save()?;
        Ok(description)
    }

    fn require(&self, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Err(Error::InvalidArgs("no labels given".to_string()));
        }
        match labels.iter().find(|l| !self.records.contains_key(l.as_str())) {
            Some(missing) => Err(Error::NotFound(missing.clone())),
            None => Ok(()),
        }
    }

    fn commit(&mut self, description: String, before: Table) -> Result<()> {
        debug!(%description, "committing change");
        self.history.record(description, before);
        self.save()
    }

    fn run(&mut self, request: &Request, out: &mut TextBuffer) -> Result<usize> {
        match request.command {
            Command::Show => {
                let label = first_label(request)?;
                out.write(self.show(label)?);
                Ok(1)
            }
            Command::Search => {
                let (query, context, list_args) = parse_search_args(&request.args)?;
                let (rows, hits) = self.search(&query, context, &list_args)?;
                for row in rows {
                    out.write(row);
                }
                Ok(hits)
            }
            Command::Add => {
                let (label, fields) = request
                    .args
                    .split_first()
                    .ok_or_else(|| Error::InvalidArgs("add needs a label".to_string()))?;
                let mut record = Table::new();
                for (field, value) in parse_fields(fields)? {
                    record.insert(field, Value::String(value));
                }
                self.add(label, record)?;
                Ok(1)
            }
            Command::Delete => self.delete(&request.labels),
            Command::Modify => {
                let fields = parse_fields(&request.args)?;
                self.modify(&request.labels, &fields)
            }
            Command::Edit => {
                let label = first_label(request)?;
                self.edit(label)?;
                Ok(1)
            }
            Command::Open => {
                let label = first_label(request)?;
                let targets = self.open_record(label)?;
                out.write(format!("Opened {}", targets.join(", ")));
                Ok(targets.len())
            }
            Command::Export => {
                let path = request
                    .args
                    .first()
                    .ok_or_else(|| Error::InvalidArgs("export needs a target file".to_string()))?;
                let count = self.export(&request.labels, Path::new(path))?;
                out.write(format!("Exported {} record(s) to {}", count, path));
                Ok(count)
            }
            Command::Undo => {
                self.undo()?;
                Ok(1)
            }
            Command::Redo => {
                self.redo()?;
                Ok(1)
            }
            other => Err(Error::InvalidArgs(format!(
                "'{}' is not a record command",
                other
            ))),
        }
    }
}

impl Records for RecordStore {
    fn list(&mut self, args: &[String], out: &mut TextBuffer) -> std::result::Result<Vec<String>, CollaboratorError> {
        let args = ListArgs::parse(args)?;
        let rows = self.list_rows(&args);

        let mut labels = Vec::with_capacity(rows.len());
        for (label, row) in rows {
            out.write(row);
            labels.push(label);
        }
        Ok(labels)
    }

    fn execute(&mut self, request: &Request, out: &mut TextBuffer) -> std::result::Result<usize, CollaboratorError> {
        Ok(self.run(request, out)?)
    }
}

fn parse_records(content: &str) -> std::result::Result<Table, String> {
    let table: Table = toml::from_str(content).map_err(|e| e.to_string())?;
    if let Some((label, _)) = table.iter().find(|(_, value)| !value.is_table()) {
        return Err(format!("'{}' is not a record table", label));
    }
    Ok(table)
}

fn first_label(request: &Request) -> Result<&str> {
    request
        .labels
        .first()
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidArgs(format!("{} needs a label", request.command)))
}

fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => {
                Ok((field.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::InvalidArgs(format!(
                "expected FIELD=VALUE, got '{}'",
                arg
            ))),
        })
        .collect()
}

/// Split `QUERY... [--] [-c N] [LIST ARGS...]`. Words before a `--` are the
/// query as typed; without one the query is every leading word that is
/// neither a flag nor a filter.
fn parse_search_args(args: &[String]) -> Result<(String, Option<usize>, ListArgs)> {
    let (query, options) = match args.iter().position(|a| a == "--") {
        Some(end) => (&args[..end], &args[end + 1..]),
        None => {
            let split = args
                .iter()
                .position(|a| a.starts_with('-') || a.contains('='))
                .unwrap_or(args.len());
            args.split_at(split)
        }
    };
    let query = query.join(" ");
    if query.is_empty() {
        return Err(Error::InvalidArgs("search needs a query".to_string()));
    }

    let mut context = None;
    let mut rest = Vec::new();
    let mut iter = options.iter();
    while let Some(arg) = iter.next() {
        if arg == "-c" || arg == "--context" {
            let value = iter
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::InvalidArgs(format!("{} needs a number", arg)))?;
            context = Some(value);
        } else {
            rest.push(arg.as_str());
        }
    }

    Ok((query, context, ListArgs::parse(rest.as_slice())?))
}

fn field_value(label: &str, record: &Table, field: &str) -> String {
    if field == "label" {
        return label.to_string();
    }
    record.get(field).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn width_of(column: &[String]) -> usize {
    column.iter().map(|s| s.chars().count()).max().unwrap_or(0)
}
