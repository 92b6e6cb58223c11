//! Substring search with wraparound.
//!
//! Two-phase scan at line granularity: phase one runs from just past (or
//! before, for reverse) the anchor line to the buffer's edge; phase two only
//! runs when phase one found nothing, wrapping around to cover the remainder
//! up to the anchor. Within a line, candidates are filtered on the first
//! byte then verified by full comparison; the earliest byte position in scan
//! order wins. A miss changes nothing.

use crate::Buffer;

/// Directional search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Scan forward starting at the line after the anchor.
    Next,
    /// Scan backward starting at the line before the anchor.
    Previous,
    /// Scan forward starting within the anchor line at the cursor offset.
    FromCursor,
}

/// A successful hit: line index plus byte offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub line: usize,
    pub offset: usize,
}

impl Buffer {
    /// Locate `needle` relative to the cursor line. Pure lookup; cursor and
    /// viewport stay untouched (repositioning is the cursor engine's job).
    pub fn search(&self, needle: &[u8], mode: SearchMode) -> Option<Match> {
        if needle.is_empty() {
            return None;
        }
        let anchor = self.cur_index();
        let count = self.line_count();
        let hit = match mode {
            SearchMode::Next => {
                // phase 1: after the anchor to the end; phase 2: wrap to the
                // anchor inclusive
                self.scan_forward(anchor + 1..count, needle)
                    .or_else(|| self.scan_forward(0..anchor + 1, needle))
            }
            SearchMode::Previous => {
                // phase 1: before the anchor down to the start; phase 2:
                // wrap from the end down to the anchor inclusive
                self.scan_backward((0..anchor).rev(), needle)
                    .or_else(|| self.scan_backward((anchor..count).rev(), needle))
            }
            SearchMode::FromCursor => self
                .find_in_line(anchor, needle, self.loff)
                .or_else(|| self.scan_forward(anchor + 1..count, needle))
                .or_else(|| self.scan_forward(0..anchor + 1, needle)),
        };
        if hit.is_none() {
            tracing::debug!(target: "search", needle_len = needle.len(), "no_match");
        }
        hit
    }

    fn scan_forward(
        &self,
        range: impl Iterator<Item = usize>,
        needle: &[u8],
    ) -> Option<Match> {
        for idx in range {
            if let Some(m) = self.find_in_line(idx, needle, 0) {
                return Some(m);
            }
        }
        None
    }

    fn scan_backward(
        &self,
        range: impl Iterator<Item = usize>,
        needle: &[u8],
    ) -> Option<Match> {
        // Lines walk descending; within a line the earliest occurrence still
        // wins, matching the forward in-line scan order.
        for idx in range {
            if let Some(m) = self.find_in_line(idx, needle, 0) {
                return Some(m);
            }
        }
        None
    }

    fn find_in_line(&self, idx: usize, needle: &[u8], from: usize) -> Option<Match> {
        let hay = self.line_bytes(idx);
        if needle.len() > hay.len() {
            return None;
        }
        let last_start = hay.len() - needle.len();
        for start in from..=last_start {
            // first-byte filter, then full verification
            if hay[start] == needle[0] && &hay[start..start + needle.len()] == needle {
                return Some(Match { line: idx, offset: start });
            }
        }
        None
    }
}
