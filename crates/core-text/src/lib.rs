//! Byte-level text primitives: the copy-on-write line store plus the column
//! and UTF-8 sequence math shared by the cursor engine and the renderer.
//!
//! A `Line` is either a zero-copy view into the owning buffer's raw arena or
//! an independently owned, growable allocation created on first edit
//! ("materialized"). Lines never hold a reference into the arena; byte access
//! threads the arena slice through every call so the buffer remains the single
//! owner of shared storage.
//!
//! Invariants upheld here:
//! * A line materializes at most once; later edits reuse and grow that block.
//! * The cached render width (`columns`) is recomputed immediately after every
//!   byte mutation, never left stale.
//! * Column math counts stored bytes (tabs expand to 8-column stops, a
//!   trailing newline is free); the same walk backs both cursor positioning
//!   and render wrapping, so the two can never disagree.

pub mod line;
pub mod utf8;
pub mod width;

pub use line::Line;

/// Slack added to every growing allocation (arena and materialized lines) so
/// repeated single-byte edits amortize to O(1) reallocations.
pub const ALLOC_SLACK: usize = 1024;
