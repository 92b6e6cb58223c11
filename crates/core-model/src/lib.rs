//! Cursor & viewport engine.
//!
//! A state machine over screen rows, not editor modes: given the frame
//! dimensions it keeps four quantities consistent on the active buffer —
//! `top` (first visible line index), `line` (1-based cursor row within the
//! frame), `cursor_line` (1-based absolute screen row including wrapped
//! rows), and `loff`/`column` (byte offset and 1-based render column within
//! the current line).
//!
//! Core invariants (must hold after every public call):
//! * `top + (line - 1)` indexes the line array; `line >= 1` always.
//! * `cursor_line` equals 1 plus the summed row spans of every line strictly
//!   between `top` and the cursor line; it is recomputed wholesale after
//!   each structural change rather than tracked incrementally, so it cannot
//!   drift.
//! * `column` is always the rendered width of the bytes left of `loff`,
//!   plus one.
//!
//! Out-of-range bookkeeping here is a programming error, not an environment
//! condition; the engine asserts and aborts rather than limping on over
//! corrupted state.

pub mod editing;
pub mod motion;

use core_buffer::Buffer;
use core_text::width;

pub use editing::{erase_backward, erase_forward, insert_byte, insert_newline};
pub use motion::{
    constrain_cursor_column, jump_left, jump_right, move_down, move_left, move_right, move_up,
    page_down, page_up, search_and_move,
};

/// Rows of breathing room kept between the cursor and the frame edge before
/// vertical motion scrolls instead of stepping.
pub const SCROLL_MARGIN: usize = 10;

/// Rows of context retained across a page jump.
pub const PAGE_OVERLAP: usize = 2;

/// Character-grid dimensions of the text area, queried from the terminal
/// collaborator (the engine never owns them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "frame must have positive area");
        Self { width, height }
    }
}

/// Screen rows line `idx` occupies under the current frame width; identical
/// math to the render projector's wrapping.
pub fn line_span(buf: &Buffer, idx: usize, frame: Frame) -> usize {
    width::row_span(buf.line(idx).columns(), frame.width)
}

/// Total screen rows for the whole buffer (page motions use this to detect
/// content that fits within one frame).
pub fn total_rows(buf: &Buffer, frame: Frame) -> usize {
    (0..buf.line_count())
        .map(|idx| line_span(buf, idx, frame))
        .sum()
}

/// Recompute `cursor_line` from scratch: spans of every line strictly
/// between `top` and the cursor line, plus one.
pub fn recompute_cursor_row(buf: &mut Buffer, frame: Frame) {
    let cur = buf.cur_index();
    assert!(buf.top <= cur, "top must not pass the cursor line");
    let mut row = 1usize;
    for idx in buf.top..cur {
        row += line_span(buf, idx, frame);
    }
    buf.cursor_line = row;
}

/// Pull `top` forward while the cursor's last wrapped row hangs below the
/// frame; trades rows leaving the top against rows entering the bottom one
/// line at a time. Also refreshes `cursor_line`.
pub(crate) fn rebalance(buf: &mut Buffer, frame: Frame) {
    loop {
        recompute_cursor_row(buf, frame);
        let cur = buf.cur_index();
        let end_row = buf.cursor_line + line_span(buf, cur, frame) - 1;
        if end_row <= frame.height || buf.line <= 1 {
            break;
        }
        buf.top += 1;
        buf.line -= 1;
    }
}

/// Re-derive `column` from `loff` (the rendered width of everything left of
/// the cursor, plus one).
pub(crate) fn sync_column(buf: &mut Buffer) {
    let cur = buf.cur_index();
    let bytes = buf.line_bytes(cur);
    assert!(
        buf.loff <= loff_limit(bytes),
        "cursor byte offset past line end"
    );
    buf.column = width::columns_of(&bytes[..buf.loff]) + 1;
}

/// Largest legal cursor byte offset for a line: the trailing newline itself
/// on terminated lines (a valid insert-mode resting point), one past the end
/// on an unterminated final line so appending stays possible.
pub(crate) fn loff_limit(bytes: &[u8]) -> usize {
    match bytes.last() {
        Some(b'\n') => bytes.len() - 1,
        _ => bytes.len(),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use core_buffer::Buffer;
    use core_state::EditorState;

    /// State whose active buffer holds `content`.
    pub fn state_with(content: &[u8]) -> EditorState {
        let mut state = EditorState::new();
        let id = state.register(Buffer::from_bytes("t", content));
        state.switch_to(id);
        state
    }
}
