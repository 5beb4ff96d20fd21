//! Drawing targets for the viewport.
//!
//! The engine never talks to a terminal directly. `TextBuffer::render` writes
//! styled runs into a [`Surface`]; the CLI implements it on top of a ratatui
//! buffer and tests use [`GridSurface`].

use regex::{Regex, RegexBuilder};
use unicode_width::UnicodeWidthChar;

/// Rows taken by chrome around the viewport: top status bar, bottom status
/// bar and the prompt line.
pub const CHROME_ROWS: u16 = 3;

/// Display attribute of a run of viewport text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Attr {
    #[default]
    Normal,
    Cursor,
    Selection,
    SearchLabel,
    SearchQuery,
}

/// Visible size of the viewport in rows and display columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub height: usize,
    pub width: usize,
}

impl Geometry {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height: height.max(1),
            width: width.max(1),
        }
    }

    /// Viewport geometry for a terminal of the given size.
    pub fn for_terminal(columns: u16, rows: u16) -> Self {
        Self::new(
            rows.saturating_sub(CHROME_ROWS) as usize,
            columns as usize,
        )
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::for_terminal(80, 24)
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    Literal(String),
    IgnoreCase(Regex),
}

impl Pattern {
    /// Byte ranges of every match in `line`.
    fn ranges(&self, line: &str) -> Vec<(usize, usize)> {
        match self {
            Pattern::Literal(text) => line
                .match_indices(text.as_str())
                .map(|(start, matched)| (start, start + matched.len()))
                .collect(),
            Pattern::IgnoreCase(re) => re.find_iter(line).map(|m| (m.start(), m.end())).collect(),
        }
    }
}

/// Ordered substring → attribute overrides applied while rendering.
///
/// Earlier entries win where matches overlap.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    entries: Vec<(Pattern, Attr)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pattern: impl Into<String>, attr: Attr) -> Self {
        self.push(pattern, attr);
        self
    }

    pub fn push(&mut self, pattern: impl Into<String>, attr: Attr) {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.entries.push((Pattern::Literal(pattern), attr));
        }
    }

    /// Like [`StyleMap::push`], but `pattern` matches regardless of case.
    pub fn push_ignore_case(&mut self, pattern: &str, attr: Attr) {
        if pattern.is_empty() {
            return;
        }
        match RegexBuilder::new(&regex::escape(pattern))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => self.entries.push((Pattern::IgnoreCase(re), attr)),
            Err(_) => self.push(pattern, attr),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-character attributes for `line`, starting from `base`.
    pub fn attrs_for(&self, line: &str, base: Attr) -> Vec<Attr> {
        let offsets: Vec<usize> = line.char_indices().map(|(i, _)| i).collect();
        let mut attrs = vec![base; offsets.len()];
        let mut styled = vec![false; offsets.len()];

        for (pattern, attr) in &self.entries {
            for (start, end) in pattern.ranges(line) {
                let first = offsets.partition_point(|&o| o < start);
                let last = offsets.partition_point(|&o| o < end);
                for index in first..last {
                    if !styled[index] {
                        styled[index] = true;
                        attrs[index] = *attr;
                    }
                }
            }
        }

        attrs
    }
}

/// A character grid the viewport can be drawn onto.
pub trait Surface {
    /// Blank the whole drawing area.
    fn clear(&mut self);

    /// Draw `text` at `row`/`column` (display columns, relative to the
    /// viewport origin) with `attr`.
    fn put(&mut self, row: usize, column: usize, text: &str, attr: Attr);
}

/// In-memory surface, one `(char, Attr)` cell per display column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSurface {
    cells: Vec<Vec<(char, Attr)>>,
    width: usize,
}

impl GridSurface {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            cells: vec![vec![(' ', Attr::Normal); geometry.width]; geometry.height],
            width: geometry.width,
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Text of one row with trailing blanks removed.
    pub fn row_text(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|cells| cells.iter().map(|(c, _)| *c).collect::<String>())
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    pub fn attr_at(&self, row: usize, column: usize) -> Option<Attr> {
        self.cells.get(row)?.get(column).map(|(_, attr)| *attr)
    }

    /// All rows joined with newlines, trailing blanks trimmed.
    pub fn contents(&self) -> String {
        (0..self.height())
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Surface for GridSurface {
    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill((' ', Attr::Normal));
        }
    }

    fn put(&mut self, row: usize, column: usize, text: &str, attr: Attr) {
        let Some(cells) = self.cells.get_mut(row) else {
            return;
        };
        let mut column = column;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0);
            if width == 0 {
                continue;
            }
            if column + width > self.width {
                break;
            }
            cells[column] = (ch, attr);
            for pad in 1..width {
                cells[column + pad] = (' ', attr);
            }
            column += width;
        }
    }
}
