//! Cursor motion: vertical and horizontal movement, page jumps, the
//! newline-constraint policy hook, and search-driven repositioning.
//!
//! Vertical motion restores the remembered column on every new line;
//! horizontal motion and search clear it. All row math goes through
//! `line_span`, the same wrap computation the renderer uses.

use core_buffer::{Buffer, SearchMode};
use core_state::EditorState;
use core_text::width;

use crate::{
    Frame, PAGE_OVERLAP, SCROLL_MARGIN, line_span, loff_limit, rebalance, recompute_cursor_row,
    sync_column, total_rows,
};

/// Index of the last line with at least one row inside the frame.
fn last_visible_index(buf: &Buffer, frame: Frame) -> usize {
    let mut rows = 0usize;
    let mut idx = buf.top;
    loop {
        rows += line_span(buf, idx, frame);
        if rows >= frame.height || idx + 1 >= buf.line_count() {
            return idx;
        }
        idx += 1;
    }
}

/// Place the cursor on the current line at the byte offset rendering
/// closest to `target_col` (1-based), clamped to the line.
fn seat_column(buf: &mut Buffer, target_col: usize) {
    let cur = buf.cur_index();
    let bytes = buf.line_bytes(cur);
    buf.loff = width::byte_offset_for_column(bytes, target_col.saturating_sub(1));
    sync_column(buf);
}

/// Step the cursor's frame row up by one, scrolling when already on the top
/// row. Callers guarantee a line above exists.
fn step_row_up(buf: &mut Buffer) {
    if buf.line > 1 {
        buf.line -= 1;
    } else {
        assert!(buf.top > 0, "cursor row underflow");
        buf.top -= 1;
    }
}

pub fn move_up(state: &mut EditorState, frame: Frame) {
    let target_col = state
        .remembered_column
        .unwrap_or_else(|| state.active_buffer().column);
    let buf = state.active_buffer_mut();
    if buf.cur_index() == 0 {
        return;
    }
    // near the top edge with content above: scroll instead of stepping
    if buf.line <= SCROLL_MARGIN && buf.top > 0 {
        buf.top -= 1;
    } else {
        step_row_up(buf);
    }
    seat_column(buf, target_col);
    rebalance(buf, frame);
    state.remembered_column = Some(target_col);
}

pub fn move_down(state: &mut EditorState, frame: Frame) {
    let target_col = state
        .remembered_column
        .unwrap_or_else(|| state.active_buffer().column);
    let buf = state.active_buffer_mut();
    if buf.cur_index() + 1 >= buf.line_count() {
        return;
    }
    let rows_below = frame.height.saturating_sub(buf.cursor_line);
    let more_beyond = last_visible_index(buf, frame) + 1 < buf.line_count();
    if rows_below <= SCROLL_MARGIN && more_beyond {
        // scroll: top advances, the cursor keeps its frame row and thereby
        // lands on the next line
        buf.top += 1;
    } else {
        buf.line += 1;
    }
    seat_column(buf, target_col);
    rebalance(buf, frame);
    state.remembered_column = Some(target_col);
}

/// Seat the cursor roughly mid-frame after a page jump by walking rows
/// forward from `top` until half the frame height is consumed.
fn seat_mid_frame(buf: &mut Buffer, frame: Frame) {
    let half = (frame.height / 2).max(1);
    let mut rows = 0usize;
    let mut idx = buf.top;
    while idx + 1 < buf.line_count() {
        let span = line_span(buf, idx, frame);
        if rows + span >= half {
            break;
        }
        rows += span;
        idx += 1;
    }
    buf.line = idx - buf.top + 1;
}

pub fn page_down(state: &mut EditorState, frame: Frame) {
    let target_col = state
        .remembered_column
        .unwrap_or_else(|| state.active_buffer().column);
    let buf = state.active_buffer_mut();
    if total_rows(buf, frame) <= frame.height {
        return; // everything already fits in one frame
    }
    let jump = frame.height.saturating_sub(PAGE_OVERLAP).max(1);
    buf.top = (buf.top + jump).min(buf.line_count() - 1);
    seat_mid_frame(buf, frame);
    seat_column(buf, target_col);
    rebalance(buf, frame);
    state.remembered_column = Some(target_col);
}

pub fn page_up(state: &mut EditorState, frame: Frame) {
    let target_col = state
        .remembered_column
        .unwrap_or_else(|| state.active_buffer().column);
    let buf = state.active_buffer_mut();
    if total_rows(buf, frame) <= frame.height {
        return;
    }
    let jump = frame.height.saturating_sub(PAGE_OVERLAP).max(1);
    buf.top = buf.top.saturating_sub(jump);
    seat_mid_frame(buf, frame);
    seat_column(buf, target_col);
    rebalance(buf, frame);
    state.remembered_column = Some(target_col);
}

pub fn move_left(state: &mut EditorState) {
    let buf = state.active_buffer_mut();
    if buf.loff > 0 {
        buf.loff -= 1;
        sync_column(buf);
    }
    state.remembered_column = None;
}

pub fn move_right(state: &mut EditorState) {
    let buf = state.active_buffer_mut();
    let limit = loff_limit(buf.cur_bytes());
    if buf.loff < limit {
        buf.loff += 1;
        sync_column(buf);
    }
    state.remembered_column = None;
}

pub fn jump_left(state: &mut EditorState) {
    let buf = state.active_buffer_mut();
    buf.loff = 0;
    buf.column = 1;
    state.remembered_column = None;
}

pub fn jump_right(state: &mut EditorState) {
    let buf = state.active_buffer_mut();
    buf.loff = loff_limit(buf.cur_bytes());
    sync_column(buf);
    state.remembered_column = None;
}

/// Non-insert policy: the cursor may not rest on a trailing newline byte;
/// pull it back one position. Invoked by the outer mode machine, not by
/// every motion.
pub fn constrain_cursor_column(buf: &mut Buffer) {
    let bytes = buf.cur_bytes();
    if buf.loff > 0 && buf.loff + 1 == bytes.len() && bytes[buf.loff] == b'\n' {
        buf.loff -= 1;
        sync_column(buf);
    }
}

/// Run a buffer search and, on a hit, reposition viewport and cursor: the
/// viewport is kept when the hit is already fully visible, otherwise the
/// matching line is centered. A miss changes nothing and returns false.
pub fn search_and_move(
    state: &mut EditorState,
    needle: &[u8],
    mode: SearchMode,
    frame: Frame,
) -> bool {
    let buf = state.active_buffer_mut();
    let Some(m) = buf.search(needle, mode) else {
        return false;
    };
    let visible = if m.line >= buf.top {
        let mut row = 1usize;
        for idx in buf.top..m.line {
            row += line_span(buf, idx, frame);
        }
        row + line_span(buf, m.line, frame) - 1 <= frame.height
    } else {
        false
    };
    if visible {
        buf.line = m.line - buf.top + 1;
    } else {
        center_on(buf, m.line, frame);
    }
    buf.loff = m.offset;
    sync_column(buf);
    recompute_cursor_row(buf, frame);
    state.remembered_column = None;
    tracing::debug!(target: "search", line = m.line, offset = m.offset, "match");
    true
}

/// Scroll so `target` sits roughly half a frame below the top.
fn center_on(buf: &mut Buffer, target: usize, frame: Frame) {
    let half = frame.height / 2;
    let mut top = target;
    let mut rows = line_span(buf, target, frame);
    while top > 0 {
        let above = line_span(buf, top - 1, frame);
        if rows + above > half {
            break;
        }
        rows += above;
        top -= 1;
    }
    buf.top = top;
    buf.line = target - top + 1;
}
