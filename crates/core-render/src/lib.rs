//! Render projector.
//!
//! Pure functions from buffer + frame to paintable geometry: which lines are
//! visible, where each one's first wrapped row lands, where the cursor cell
//! is, and what styled text fragments a row holds. No terminal I/O lives
//! here; the binary feeds fragments to the terminal writer.
//!
//! Wrapping math is shared with the cursor engine through
//! `core_model::line_span`; the projector never computes spans its own way.

pub mod highlight;
pub mod project;

pub use highlight::{FileKind, Highlighter, Span, Style, highlighter_for};
pub use project::{Fragment, VisibleLine, cursor_position, layout_line, project};
