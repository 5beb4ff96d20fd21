//! Line-oriented text container backing the viewport.

use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::state::ViewportState;
use crate::surface::{Attr, Geometry, StyleMap, Surface};

/// Glyph that starts every wrapped continuation row.
pub const CONTINUATION_MARKER: char = '↪';

/// Indent placed in front of continuation rows by [`TextBuffer::wrap`].
pub const CONTINUATION_INDENT: &str = "↪ ";

/// Narrowest wrap column that still leaves room for content after the indent.
const MIN_WRAP_COLUMNS: usize = 3;

/// Ordered rows of display text.
///
/// Rows are written by collaborators and only ever reshaped by the engine
/// (`split`, `wrap`). Each row remembers the index of the pre-wrap row it was
/// produced from so the cursor can follow a logical row across re-wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    origins: Vec<usize>,
    width: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self::new();
        for line in lines {
            buffer.write(line);
        }
        buffer
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pre-wrap row index the given row was produced from.
    pub fn origin(&self, row: usize) -> Option<usize> {
        self.origins.get(row).copied()
    }

    /// First row produced from the given pre-wrap row.
    pub fn first_row_of(&self, origin: usize) -> Option<usize> {
        self.origins.iter().position(|&o| o == origin)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.origins.clear();
        self.width = 0;
    }

    /// Append `text` as one row unless it is blank.
    pub fn write(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        let origin = self.lines.len();
        self.push_row(text, origin);
    }

    /// Break rows containing embedded line breaks into one row per segment.
    pub fn split(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        self.origins.clear();
        self.width = 0;

        for line in lines {
            for segment in line.lines() {
                let origin = self.lines.len();
                self.push_row(segment.to_string(), origin);
            }
        }
    }

    /// Greedy word wrap of every row at `target_width - 1` columns.
    ///
    /// Continuation rows start with [`CONTINUATION_INDENT`]. Wrapping is a
    /// one-way transform: re-wrapping at another width must start from the
    /// unwrapped rows (see [`crate::Frame`]).
    ///
    /// Afterwards every row fits in `target_width` columns and
    /// [`TextBuffer::width`] equals it. Targets narrower than four columns
    /// are raised to four, the narrowest width a continuation row fits in.
    pub fn wrap(&mut self, target_width: usize) {
        let columns = target_width.saturating_sub(1).max(MIN_WRAP_COLUMNS);
        let options = Options::new(columns)
            .subsequent_indent(CONTINUATION_INDENT)
            .word_separator(WordSeparator::AsciiSpace)
            .word_splitter(WordSplitter::NoHyphenation)
            .wrap_algorithm(WrapAlgorithm::FirstFit);

        let lines = std::mem::take(&mut self.lines);
        self.origins.clear();

        for (origin, line) in lines.iter().enumerate() {
            for row in textwrap::wrap(line, &options) {
                self.lines.push(row.into_owned());
                self.origins.push(origin);
            }
        }

        self.width = target_width.max(columns + 1);
    }

    /// Draw the visible window of rows onto `surface`.
    ///
    /// The cursor row is drawn with [`Attr::Cursor`] across the full viewport
    /// width; substrings listed in `styles` override the base attribute.
    pub fn render(
        &self,
        surface: &mut dyn Surface,
        state: &ViewportState,
        geometry: Geometry,
        styles: &StyleMap,
    ) {
        surface.clear();

        let cursor = state.cursor(self);
        let rows = self
            .lines
            .iter()
            .enumerate()
            .skip(state.top_line)
            .take(geometry.height);

        for (screen_row, (index, line)) in rows.enumerate() {
            let base = if cursor == Some(index) {
                Attr::Cursor
            } else {
                Attr::Normal
            };
            let attrs = styles.attrs_for(line, base);
            let drawn = draw_window(surface, screen_row, line, &attrs, state.left_edge, geometry.width);

            if base == Attr::Cursor && drawn < geometry.width {
                let padding = " ".repeat(geometry.width - drawn);
                surface.put(screen_row, drawn, &padding, Attr::Cursor);
            }
        }
    }

    fn push_row(&mut self, text: String, origin: usize) {
        self.width = self.width.max(text.width());
        self.lines.push(text);
        self.origins.push(origin);
    }
}

/// Draw the `[left_edge, left_edge + width)` column window of `line`, grouping
/// equally styled characters into runs. Returns the number of columns drawn.
fn draw_window(
    surface: &mut dyn Surface,
    row: usize,
    line: &str,
    attrs: &[Attr],
    left_edge: usize,
    width: usize,
) -> usize {
    let mut column = 0;
    let mut drawn = 0;
    let mut run = String::new();
    let mut run_start = 0;
    let mut run_attr = Attr::Normal;

    for (ch, attr) in line.chars().zip(attrs.iter().copied()) {
        let ch_width = ch.width().unwrap_or(0);
        let start = column;
        column += ch_width;

        if ch_width == 0 || start < left_edge {
            continue;
        }
        if column > left_edge + width {
            break;
        }

        let position = start - left_edge;
        if run.is_empty() || attr != run_attr {
            if !run.is_empty() {
                surface.put(row, run_start, &run, run_attr);
                run.clear();
            }
            run_start = position;
            run_attr = attr;
        }
        run.push(ch);
        drawn = position + ch_width;
    }

    if !run.is_empty() {
        surface.put(row, run_start, &run, run_attr);
    }

    drawn
}
