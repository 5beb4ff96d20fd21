//! Vertical/horizontal scrolling and wrap toggling.
//!
//! All functions here are pure state transitions over a [`ViewportState`] and
//! the buffer it points into. Requests that would leave the buffer are clamped
//! or dropped silently.

use crate::buffer::TextBuffer;
use crate::frame::Frame;
use crate::state::ViewportState;
use crate::surface::Geometry;

/// Vertical scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollY {
    Delta(isize),
    Top,
    Bottom,
}

/// Horizontal scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollX {
    Delta(isize),
    Start,
    End,
}

/// Move the cursor vertically, keeping `scroll_offset` rows of context above
/// and below it where the viewport is tall enough.
///
/// When `2 * scroll_offset >= visible_height` the margin cannot be honoured on
/// both edges, so the cursor settles on the centre row instead.
pub fn scroll_y(
    state: &mut ViewportState,
    buffer: &TextBuffer,
    update: ScrollY,
    visible_height: usize,
    scroll_offset: usize,
) {
    let height = buffer.height();
    if height == 0 {
        return;
    }

    match update {
        ScrollY::Top => {
            state.top_line = 0;
            state.current_line = 0;
        }
        ScrollY::Bottom => {
            state.top_line = height.saturating_sub(visible_height);
            state.current_line = height - 1;
        }
        ScrollY::Delta(0) => {}
        ScrollY::Delta(delta) => {
            let height = height as isize;
            let visible = visible_height as isize;
            let offset = scroll_offset as isize;
            let center = visible / 2;

            let current = state.current_line as isize;
            let mut top = state.top_line as isize;
            let overlap = offset * 2 >= visible;
            let scroll_lock = overlap && current - top == center;
            let next = current + delta;

            let landed = if delta < 0 {
                if top > 0 && next < top + offset {
                    if scroll_lock || !overlap {
                        top += delta;
                    } else if current - top > center && next - top < center {
                        top = next - center;
                    }
                }
                next.max(0)
            } else {
                if height > top + visible && next >= top + visible - offset {
                    if scroll_lock || !overlap {
                        top += delta;
                    } else if current - top < center && next - top > center {
                        top = next - center;
                    }
                }
                if next >= height {
                    top = height - visible;
                    height - 1
                } else {
                    next
                }
            };

            state.current_line = landed as usize;
            state.top_line = top.max(0) as usize;
        }
    }

    keep_cursor_visible(state, buffer.height(), visible_height);
}

/// Move the window horizontally. Deltas that would expose blank columns on
/// either edge are rejected.
pub fn scroll_x(state: &mut ViewportState, buffer: &TextBuffer, update: ScrollX, visible_width: usize) {
    let max_edge = buffer.width() as isize - visible_width as isize;

    match update {
        ScrollX::Start => state.left_edge = 0,
        ScrollX::End => state.left_edge = max_edge.max(0) as usize,
        ScrollX::Delta(delta) => {
            let next = state.left_edge as isize + delta;
            if 0 <= next && next <= max_edge {
                state.left_edge = next as usize;
            }
        }
    }
}

/// Toggle line wrapping of the frame at the viewport width. The cursor stays
/// on the row it was on before (its first wrapped row, when wrapping).
pub fn wrap_toggle(state: &mut ViewportState, frame: &mut Frame, geometry: Geometry) {
    let row = frame.buffer().origin(state.current_line);

    state.left_edge = 0;
    if frame.is_wrapped() {
        frame.restore();
        if let Some(row) = row {
            state.current_line = row;
        }
    } else {
        frame.wrap(geometry.width);
        if let Some(row) = row.and_then(|r| frame.buffer().first_row_of(r)) {
            state.current_line = row;
        }
    }

    clamp(state, frame.buffer(), geometry);
}

/// Re-wrap a wrapped frame for a new viewport width.
pub fn rewrap(state: &mut ViewportState, frame: &mut Frame, geometry: Geometry) {
    if frame.is_wrapped() {
        let row = frame.buffer().origin(state.current_line);
        frame.wrap(geometry.width);
        if let Some(row) = row.and_then(|r| frame.buffer().first_row_of(r)) {
            state.current_line = row;
        }
    }

    clamp(state, frame.buffer(), geometry);
}

/// Re-establish the viewport invariants after the buffer or geometry changed.
pub fn clamp(state: &mut ViewportState, buffer: &TextBuffer, geometry: Geometry) {
    state.current_line = state.current_line.min(buffer.height().saturating_sub(1));
    state.left_edge = state
        .left_edge
        .min(buffer.width().saturating_sub(geometry.width));
    keep_cursor_visible(state, buffer.height(), geometry.height);
}

fn keep_cursor_visible(state: &mut ViewportState, height: usize, visible_height: usize) {
    let max_top = height.saturating_sub(visible_height);
    state.top_line = state.top_line.min(max_top).min(state.current_line);
    if visible_height > 0 && state.current_line >= state.top_line + visible_height {
        state.top_line = state.current_line + 1 - visible_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buffer_of(height: usize, width: usize) -> TextBuffer {
        TextBuffer::from_lines((0..height).map(|i| format!("{i:0>width$}")))
    }

    fn state_at(current_line: usize, top_line: usize) -> ViewportState {
        let mut state = ViewportState::default();
        state.current_line = current_line;
        state.top_line = top_line;
        state
    }

    #[test]
    fn test_jump_to_bottom_then_top() {
        let buffer = buffer_of(10, 3);
        let mut state = state_at(0, 0);

        scroll_y(&mut state, &buffer, ScrollY::Bottom, 5, 3);
        assert_eq!((state.top_line, state.current_line), (5, 9));

        scroll_y(&mut state, &buffer, ScrollY::Top, 5, 3);
        assert_eq!((state.top_line, state.current_line), (0, 0));
    }

    #[test]
    fn test_bottom_on_short_buffer_keeps_top_at_zero() {
        let buffer = buffer_of(3, 3);
        let mut state = state_at(0, 0);

        scroll_y(&mut state, &buffer, ScrollY::Bottom, 5, 1);
        assert_eq!((state.top_line, state.current_line), (0, 2));
    }

    #[test]
    fn test_scroll_down_honours_margin() {
        let buffer = buffer_of(30, 3);
        let mut state = state_at(0, 0);

        for _ in 0..6 {
            scroll_y(&mut state, &buffer, ScrollY::Delta(1), 10, 3);
        }
        assert_eq!((state.top_line, state.current_line), (0, 6));

        scroll_y(&mut state, &buffer, ScrollY::Delta(1), 10, 3);
        assert_eq!((state.top_line, state.current_line), (1, 7));
    }

    #[test]
    fn test_scroll_up_honours_margin() {
        let buffer = buffer_of(30, 3);
        let mut state = state_at(13, 10);

        scroll_y(&mut state, &buffer, ScrollY::Delta(-1), 10, 3);
        assert_eq!((state.top_line, state.current_line), (9, 12));
    }

    #[test]
    fn test_overlapping_margin_centres_cursor() {
        let buffer = buffer_of(20, 3);
        let mut state = state_at(0, 0);

        for _ in 0..2 {
            scroll_y(&mut state, &buffer, ScrollY::Delta(1), 5, 3);
        }
        assert_eq!((state.top_line, state.current_line), (0, 2));

        scroll_y(&mut state, &buffer, ScrollY::Delta(1), 5, 3);
        assert_eq!((state.top_line, state.current_line), (1, 3));

        scroll_y(&mut state, &buffer, ScrollY::Delta(-1), 5, 3);
        assert_eq!((state.top_line, state.current_line), (0, 2));
    }

    #[test]
    fn test_page_down_past_end_clamps() {
        let buffer = buffer_of(12, 3);
        let mut state = state_at(8, 3);

        scroll_y(&mut state, &buffer, ScrollY::Delta(10), 5, 1);
        assert_eq!((state.top_line, state.current_line), (7, 11));
    }

    #[test]
    fn test_scroll_on_empty_buffer_is_noop() {
        let mut state = state_at(0, 0);
        scroll_y(&mut state, &TextBuffer::new(), ScrollY::Delta(1), 5, 1);
        scroll_y(&mut state, &TextBuffer::new(), ScrollY::Bottom, 5, 1);
        assert_eq!((state.top_line, state.current_line), (0, 0));
    }

    #[test]
    fn test_scroll_x_rejects_out_of_range() {
        let buffer = buffer_of(2, 12);
        let mut state = ViewportState::default();

        scroll_x(&mut state, &buffer, ScrollX::Delta(-1), 10);
        assert_eq!(state.left_edge, 0);

        scroll_x(&mut state, &buffer, ScrollX::Delta(2), 10);
        assert_eq!(state.left_edge, 2);

        scroll_x(&mut state, &buffer, ScrollX::Delta(1), 10);
        assert_eq!(state.left_edge, 2);

        scroll_x(&mut state, &buffer, ScrollX::Start, 10);
        assert_eq!(state.left_edge, 0);

        scroll_x(&mut state, &buffer, ScrollX::End, 10);
        assert_eq!(state.left_edge, 2);
    }

    #[test]
    fn test_scroll_x_end_on_narrow_buffer() {
        let buffer = buffer_of(2, 4);
        let mut state = ViewportState::default();

        scroll_x(&mut state, &buffer, ScrollX::End, 10);
        assert_eq!(state.left_edge, 0);
    }

    #[test]
    fn test_wrap_toggle_follows_cursor_row() {
        let mut frame = Frame::new(TextBuffer::from_lines([
            "alpha beta gamma delta epsilon",
            "zeta eta theta",
        ]));
        let geometry = Geometry::new(10, 12);
        let mut state = state_at(1, 0);
        state.left_edge = 4;

        wrap_toggle(&mut state, &mut frame, geometry);
        assert!(frame.is_wrapped());
        assert_eq!(state.left_edge, 0);
        assert_eq!(frame.buffer().origin(state.current_line), Some(1));
        assert_eq!(frame.buffer().line(state.current_line), Some("zeta eta"));

        wrap_toggle(&mut state, &mut frame, geometry);
        assert!(!frame.is_wrapped());
        assert_eq!(state.current_line, 1);
    }

    #[test]
    fn test_clamp_after_buffer_shrinks() {
        let buffer = buffer_of(3, 4);
        let mut state = state_at(9, 7);
        state.left_edge = 5;

        clamp(&mut state, &buffer, Geometry::new(5, 2));
        assert_eq!((state.top_line, state.current_line, state.left_edge), (0, 2, 2));
    }

    proptest! {
        #[test]
        fn prop_scroll_y_keeps_cursor_in_buffer(
            height in 1usize..60,
            visible in 1usize..25,
            offset in 0usize..8,
            moves in proptest::collection::vec(
                prop_oneof![
                    (-12isize..12).prop_map(ScrollY::Delta),
                    Just(ScrollY::Top),
                    Just(ScrollY::Bottom),
                ],
                0..40,
            ),
        ) {
            let buffer = buffer_of(height, 2);
            let mut state = ViewportState::default();
            for update in moves {
                scroll_y(&mut state, &buffer, update, visible, offset);
                prop_assert!(state.current_line < height);
                prop_assert!(state.top_line <= state.current_line);
                prop_assert!(state.current_line < state.top_line + visible);
            }
        }

        #[test]
        fn prop_scroll_x_keeps_edge_in_range(
            width in 1usize..120,
            visible in 1usize..80,
            moves in proptest::collection::vec(
                prop_oneof![
                    (-20isize..20).prop_map(ScrollX::Delta),
                    Just(ScrollX::Start),
                    Just(ScrollX::End),
                ],
                0..40,
            ),
        ) {
            let buffer = buffer_of(1, width);
            let mut state = ViewportState::default();
            for update in moves {
                scroll_x(&mut state, &buffer, update, visible);
                prop_assert!(state.left_edge <= width.saturating_sub(visible));
            }
        }

        #[test]
        fn prop_bottom_then_top_resets(
            height in 1usize..60,
            visible in 1usize..25,
            offset in 0usize..8,
            start in 0usize..60,
        ) {
            let buffer = buffer_of(height, 2);
            let mut state = state_at(start.min(height - 1), 0);
            clamp(&mut state, &buffer, Geometry::new(visible, 10));

            scroll_y(&mut state, &buffer, ScrollY::Bottom, visible, offset);
            scroll_y(&mut state, &buffer, ScrollY::Top, visible, offset);
            prop_assert_eq!((state.current_line, state.top_line), (0, 0));
        }
    }
}
