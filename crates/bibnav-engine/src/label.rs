//! Recover the record label the cursor points at from displayed text.

use std::sync::LazyLock;

use regex::Regex;

use crate::buffer::{CONTINUATION_MARKER, TextBuffer};
use crate::state::DetailView;

static DETAIL_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+ v\S+ - (\S+)$").unwrap());

/// Top status text of a Show detail view.
pub fn detail_title(app_name: &str, version: &str, label: &str) -> String {
    format!("{} v{} - {}", app_name, version, label)
}

/// Label embedded in a title built by [`detail_title`].
pub fn parse_detail_title(title: &str) -> Option<&str> {
    DETAIL_TITLE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Find the label for `row` and the row it was read from.
///
/// In the list (`view == None`) the label is the first token of the row,
/// skipping upwards over wrapped continuation rows. Search results also skip
/// the `[n]` match rows. A Show view carries its label in the top status.
pub fn resolve(
    buffer: &TextBuffer,
    row: usize,
    view: Option<DetailView>,
    top_status: &str,
) -> Option<(String, usize)> {
    match view {
        None => label_above(buffer, row, |line| line.starts_with(CONTINUATION_MARKER)),
        Some(DetailView::Search) => label_above(buffer, row, |line| {
            line.starts_with(CONTINUATION_MARKER) || line.starts_with('[')
        }),
        Some(DetailView::Show) => parse_detail_title(top_status).map(|label| (label.to_string(), 0)),
        Some(DetailView::Help) | Some(DetailView::Report) => None,
    }
}

fn label_above(
    buffer: &TextBuffer,
    row: usize,
    skip: impl Fn(&str) -> bool,
) -> Option<(String, usize)> {
    if buffer.is_empty() {
        return None;
    }

    let mut row = row.min(buffer.height() - 1);
    loop {
        let line = buffer.line(row)?;
        if !skip(line) {
            let label = line.split_whitespace().next()?;
            return Some((label.to_string(), row));
        }
        row = row.checked_sub(1)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_label_skips_continuation_rows() {
        let mut buffer = TextBuffer::from_lines([
            "einstein  1905  On the electrodynamics of moving bodies",
            "knuth  1984  Literate programming",
        ]);
        buffer.wrap(24);

        let last = buffer.height() - 1;
        assert!(buffer.line(last).unwrap_or_default().starts_with(CONTINUATION_MARKER));

        let (label, row) = resolve(&buffer, last, None, "").unwrap();
        assert_eq!(label, "knuth");
        assert_eq!(buffer.origin(row), Some(1));
    }

    #[test]
    fn test_search_label_skips_match_rows() {
        let buffer = TextBuffer::from_lines([
            "einstein - 2 matches",
            "[1]     relativity",
            "[2]     electrodynamics",
            "knuth - 1 match",
            "[1]     literate",
        ]);

        assert_eq!(
            resolve(&buffer, 2, Some(DetailView::Search), ""),
            Some(("einstein".to_string(), 0))
        );
        assert_eq!(
            resolve(&buffer, 4, Some(DetailView::Search), ""),
            Some(("knuth".to_string(), 3))
        );
    }

    #[test]
    fn test_show_label_comes_from_title() {
        let buffer = TextBuffer::from_lines(["[einstein]", "year = 1905"]);
        let title = detail_title("bibnav", "0.3.0", "einstein");

        assert_eq!(title, "bibnav v0.3.0 - einstein");
        assert_eq!(
            resolve(&buffer, 1, Some(DetailView::Show), &title),
            Some(("einstein".to_string(), 0))
        );
        assert_eq!(resolve(&buffer, 1, Some(DetailView::Show), "bibnav v0.3.0 - 3 Entries"), None);
    }

    #[test]
    fn test_no_label_in_help_or_empty_buffer() {
        let buffer = TextBuffer::from_lines(["q  quit"]);
        assert_eq!(resolve(&buffer, 0, Some(DetailView::Help), ""), None);
        assert_eq!(resolve(&TextBuffer::new(), 0, None, ""), None);
    }

    #[test]
    fn test_no_label_when_only_continuation_rows_above() {
        let buffer = TextBuffer::from_lines(["↪ orphan", "↪ rows"]);
        assert_eq!(resolve(&buffer, 1, None, ""), None);
    }
}
