//! Text entry: byte insertion, newline splitting, and the two erase
//! directions, each composing the buffer's structural edits with cursor and
//! viewport updates. Read-only buffers reject every entry point silently;
//! the caller surfaces the refusal to the user.

use core_buffer::Buffer;
use core_state::EditorState;

use crate::{Frame, loff_limit, rebalance, sync_column};

/// Insert one byte at the cursor and step past it.
pub fn insert_byte(state: &mut EditorState, byte: u8) {
    let buf = state.active_buffer_mut();
    if buf.is_read_only() {
        return;
    }
    let cur = buf.cur_index();
    buf.insert_byte_at(cur, buf.loff, byte);
    buf.loff += 1;
    sync_column(buf);
    state.remembered_column = None;
}

/// Split the cursor line at the cursor: a newline lands at the cursor offset
/// and the remainder becomes the following line, with the cursor at its
/// start.
pub fn insert_newline(state: &mut EditorState, frame: Frame) {
    let buf = state.active_buffer_mut();
    if buf.is_read_only() {
        return;
    }
    let cur = buf.cur_index();
    buf.split_line(cur, buf.loff);
    buf.line += 1;
    buf.loff = 0;
    sync_column(buf);
    rebalance(buf, frame);
    state.remembered_column = None;
}

/// Backspace. Mid-line it removes the byte left of the cursor; at line start
/// it joins with the previous line, seating the cursor on the junction. An
/// erase that leaves a non-final line empty splices the line out entirely.
pub fn erase_backward(state: &mut EditorState, frame: Frame) {
    let buf = state.active_buffer_mut();
    if buf.is_read_only() {
        return;
    }
    let cur = buf.cur_index();
    if buf.loff == 0 {
        if cur == 0 {
            return; // top of buffer
        }
        let junction = buf.join_line(cur - 1);
        step_cursor_up(buf);
        buf.loff = junction;
        sync_column(buf);
        rebalance(buf, frame);
        state.remembered_column = None;
        return;
    }

    buf.remove_byte_at(cur, buf.loff - 1);
    buf.loff -= 1;
    sync_column(buf);

    // A line reduced to its bare newline is spliced out, the cursor landing
    // at the end of the previous line.
    if buf.content_len(cur) == 0 && cur > 0 && cur + 1 < buf.line_count() {
        buf.remove_line(cur);
        step_cursor_up(buf);
        buf.loff = loff_limit(buf.cur_bytes());
        sync_column(buf);
    }
    rebalance(buf, frame);
    state.remembered_column = None;
}

/// Delete. Mid-line it removes the byte under the cursor; on the trailing
/// newline it joins the following line up.
pub fn erase_forward(state: &mut EditorState, frame: Frame) {
    let buf = state.active_buffer_mut();
    if buf.is_read_only() {
        return;
    }
    let cur = buf.cur_index();
    let bytes = buf.line_bytes(cur);
    if buf.loff >= bytes.len() {
        return; // past the end of an unterminated final line
    }
    if bytes[buf.loff] == b'\n' {
        if cur + 1 >= buf.line_count() {
            return; // final newline of the buffer stays
        }
        buf.join_line(cur);
        rebalance(buf, frame);
        state.remembered_column = None;
        return;
    }
    buf.remove_byte_at(cur, buf.loff);
    buf.loff = buf.loff.min(loff_limit(buf.cur_bytes()));
    sync_column(buf);
    rebalance(buf, frame);
    state.remembered_column = None;
}

/// Move the cursor to the previous line, scrolling if it sits on the first
/// frame row.
fn step_cursor_up(buf: &mut Buffer) {
    if buf.line > 1 {
        buf.line -= 1;
    } else {
        assert!(buf.top > 0, "cursor row underflow");
        buf.top -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{move_down, move_right};
    use crate::testutil::state_with;

    fn frame() -> Frame {
        Frame::new(80, 24)
    }

    #[test]
    fn insert_advances_cursor_and_column() {
        let mut state = state_with(b"abc\ndef\n");
        let f = frame();
        move_right(&mut state);
        insert_byte(&mut state, b'X');
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"aXbc\n");
        assert_eq!(buf.loff, 2);
        assert_eq!(buf.column, 3);
        assert_eq!(buf.line_bytes(1), b"def\n", "neighbor untouched");
        assert!(buf.is_dirty());
        erase_backward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"abc\n");
        assert_eq!(buf.loff, 1);
        assert_eq!(buf.column, 2);
    }

    #[test]
    fn newline_splits_and_join_restores() {
        let mut state = state_with(b"abcd\n");
        let f = frame();
        move_right(&mut state);
        move_right(&mut state);
        insert_newline(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_bytes(0), b"ab\n");
        assert_eq!(buf.line_bytes(1), b"cd\n");
        assert_eq!(buf.cur_index(), 1);
        assert_eq!(buf.loff, 0);
        assert_eq!(buf.column, 1);
        // backspace at line start inverts the split exactly
        erase_backward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_bytes(0), b"abcd\n");
        assert_eq!(buf.loff, 2);
        assert_eq!(buf.column, 3);
    }

    #[test]
    fn backspace_at_buffer_start_is_noop() {
        let mut state = state_with(b"abc\n");
        let f = frame();
        erase_backward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"abc\n");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn backspace_splices_out_emptied_line() {
        let mut state = state_with(b"abc\nx\ndef\n");
        let f = frame();
        move_down(&mut state, f);
        move_right(&mut state);
        assert_eq!(state.active_buffer().loff, 1);
        erase_backward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_bytes(0), b"abc\n");
        assert_eq!(buf.line_bytes(1), b"def\n");
        // cursor lands at the end of the previous line
        assert_eq!(buf.cur_index(), 0);
        assert_eq!(buf.loff, 3);
        assert_eq!(buf.column, 4);
    }

    #[test]
    fn backspace_keeps_emptied_final_line() {
        let mut state = state_with(b"abc\nx\n");
        let f = frame();
        move_down(&mut state, f);
        move_right(&mut state);
        erase_backward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_bytes(1), b"\n");
        assert_eq!(buf.cur_index(), 1);
        assert_eq!(buf.loff, 0);
    }

    #[test]
    fn delete_removes_byte_under_cursor() {
        let mut state = state_with(b"abc\n");
        let f = frame();
        move_right(&mut state);
        erase_forward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"ac\n");
        assert_eq!(buf.loff, 1);
        assert_eq!(buf.column, 2);
    }

    #[test]
    fn delete_on_newline_joins_next_line() {
        let mut state = state_with(b"ab\ncd\n");
        let f = frame();
        move_right(&mut state);
        move_right(&mut state);
        assert_eq!(state.active_buffer().loff, 2, "on the newline");
        erase_forward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_bytes(0), b"abcd\n");
        assert_eq!(buf.loff, 2);
    }

    #[test]
    fn delete_keeps_final_newline() {
        let mut state = state_with(b"ab\n");
        let f = frame();
        move_right(&mut state);
        move_right(&mut state);
        erase_forward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"ab\n");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn delete_clamps_cursor_after_shortening_line() {
        let mut state = state_with(b"ab");
        let f = frame();
        move_right(&mut state);
        move_right(&mut state);
        assert_eq!(state.active_buffer().loff, 2, "past the unterminated end");
        erase_forward(&mut state, f); // nothing under the cursor
        assert_eq!(state.active_buffer().line_bytes(0), b"ab");
    }

    #[test]
    fn typing_into_empty_buffer_reads_in_order() {
        let mut state = state_with(b"");
        let f = frame();
        for &b in b"hi" {
            insert_byte(&mut state, b);
        }
        insert_newline(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"hi\n");
        assert_eq!(buf.cur_index(), 1);
        assert_eq!(buf.line_bytes(1), b"");
    }

    #[test]
    fn read_only_buffer_rejects_edits() {
        let mut state = state_with(b"abc\n");
        let f = frame();
        state.active_buffer_mut().set_read_only(true);
        insert_byte(&mut state, b'x');
        insert_newline(&mut state, f);
        erase_backward(&mut state, f);
        erase_forward(&mut state, f);
        let buf = state.active_buffer();
        assert_eq!(buf.line_bytes(0), b"abc\n");
        assert_eq!(buf.line_count(), 1);
        assert!(!buf.is_dirty());
    }
}
