//! Line highlighters.
//!
//! The kind of highlighter is chosen once when a file is opened and rides
//! with the buffer from then on; classification never re-runs per keystroke.
//! Highlighters may carry state between lines, so the contract hands them
//! lines in ascending order with the absolute line index attached.

use std::ops::Range;
use std::path::Path;

/// Paint class for a byte range. The terminal layer maps these to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    /// Diff `+` line.
    Added,
    /// Diff `-` line.
    Removed,
    /// Diff file/hunk header.
    Header,
}

/// A styled byte range within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
    pub style: Style,
}

/// Per-line span producer. Lines arrive in ascending `line_index` order so
/// implementations may keep cross-line state; a full repaint restarts from
/// a fresh instance.
pub trait Highlighter {
    fn spans(&mut self, bytes: &[u8], line_index: usize) -> Vec<Span>;
}

/// Content kind, decided once from the path at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Plain,
    Diff,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("diff") | Some("patch") => FileKind::Diff,
            _ => FileKind::Plain,
        }
    }
}

/// Highlighter instance for a kind.
pub fn highlighter_for(kind: FileKind) -> Box<dyn Highlighter> {
    match kind {
        FileKind::Plain => Box::new(PlainHighlighter),
        FileKind::Diff => Box::new(DiffHighlighter::default()),
    }
}

/// Everything normal; produces no spans at all.
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn spans(&mut self, _bytes: &[u8], _line_index: usize) -> Vec<Span> {
        Vec::new()
    }
}

/// Unified-diff coloring. `+`/`-` lines only count inside a hunk, so the
/// preamble (and `+++`/`---` file markers) classify as headers; that hunk
/// tracking is the cross-line state.
#[derive(Default)]
pub struct DiffHighlighter {
    in_hunk: bool,
}

impl Highlighter for DiffHighlighter {
    fn spans(&mut self, bytes: &[u8], _line_index: usize) -> Vec<Span> {
        let content_len = match bytes.last() {
            Some(b'\n') => bytes.len() - 1,
            _ => bytes.len(),
        };
        if content_len == 0 {
            return Vec::new();
        }
        let style = if bytes.starts_with(b"@@") {
            self.in_hunk = true;
            Style::Header
        } else if !self.in_hunk {
            if bytes.starts_with(b"diff ")
                || bytes.starts_with(b"+++")
                || bytes.starts_with(b"---")
                || bytes.starts_with(b"index ")
            {
                Style::Header
            } else {
                Style::Normal
            }
        } else if bytes[0] == b'+' {
            Style::Added
        } else if bytes[0] == b'-' {
            Style::Removed
        } else {
            Style::Normal
        };
        match style {
            Style::Normal => Vec::new(),
            s => vec![Span {
                range: 0..content_len,
                style: s,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_of(h: &mut dyn Highlighter, line: &[u8], idx: usize) -> Style {
        h.spans(line, idx)
            .first()
            .map(|s| s.style)
            .unwrap_or(Style::Normal)
    }

    #[test]
    fn kind_is_chosen_from_the_extension() {
        assert_eq!(FileKind::from_path(Path::new("x.diff")), FileKind::Diff);
        assert_eq!(FileKind::from_path(Path::new("fix.patch")), FileKind::Diff);
        assert_eq!(FileKind::from_path(Path::new("main.rs")), FileKind::Plain);
        assert_eq!(FileKind::from_path(Path::new("README")), FileKind::Plain);
    }

    #[test]
    fn plain_emits_no_spans() {
        let mut h = highlighter_for(FileKind::Plain);
        assert!(h.spans(b"+looks like a diff\n", 0).is_empty());
    }

    #[test]
    fn diff_classifies_hunk_lines() {
        let mut h = DiffHighlighter::default();
        assert_eq!(style_of(&mut h, b"diff --git a/x b/x\n", 0), Style::Header);
        assert_eq!(style_of(&mut h, b"--- a/x\n", 1), Style::Header);
        assert_eq!(style_of(&mut h, b"+++ b/x\n", 2), Style::Header);
        assert_eq!(style_of(&mut h, b"@@ -1,3 +1,4 @@\n", 3), Style::Header);
        assert_eq!(style_of(&mut h, b" context\n", 4), Style::Normal);
        assert_eq!(style_of(&mut h, b"+added\n", 5), Style::Added);
        assert_eq!(style_of(&mut h, b"-removed\n", 6), Style::Removed);
    }

    #[test]
    fn plus_minus_outside_a_hunk_stay_normal() {
        let mut h = DiffHighlighter::default();
        // commit-message preamble ahead of the first hunk
        assert_eq!(style_of(&mut h, b"+not a diff line\n", 0), Style::Normal);
        assert_eq!(style_of(&mut h, b"@@ -1 +1 @@\n", 1), Style::Header);
        assert_eq!(style_of(&mut h, b"+now it is\n", 2), Style::Added);
    }

    #[test]
    fn span_excludes_the_trailing_newline() {
        let mut h = DiffHighlighter::default();
        h.spans(b"@@ -1 +1 @@\n", 0);
        let spans = h.spans(b"+abc\n", 1);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 0..4);
    }

    #[test]
    fn empty_line_produces_nothing() {
        let mut h = DiffHighlighter::default();
        assert!(h.spans(b"\n", 0).is_empty());
        assert!(h.spans(b"", 1).is_empty());
    }
}
