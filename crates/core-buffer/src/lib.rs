//! Buffer: a raw byte arena plus an ordered line index, with persistence and
//! substring search.
//!
//! Loading reads the whole file into one sized allocation and splits it into
//! zero-copy view lines in a single scan. Edits materialize individual lines
//! (see `core-text`) and leave the arena untouched; saving walks the line
//! index, coalesces runs of still-contiguous view lines into single write
//! regions, and flushes through a sibling temp file renamed over the target
//! only after every byte is confirmed written.
//!
//! Error tiers follow the two-level design used across the workspace:
//! environment failures (open/read/write/rename) surface as [`BufferError`]
//! and leave in-memory state unchanged (DIRTY stays set on a failed save);
//! bookkeeping violations (cursor index out of range, arena length overflow)
//! are bugs and panic.

pub mod buffer;
pub mod save;
pub mod search;

pub use buffer::{Buffer, BufferFlags, BufferId};
pub use save::SaveRegion;
pub use search::{Match, SearchMode};

/// Environment-tier buffer errors. Invariant violations are not represented
/// here; those panic.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("buffer `{0}` has no file path")]
    NoPath(String),
    #[error("read {actual} bytes, expected {expected}")]
    ShortRead { expected: u64, actual: u64 },
    #[error("short write while saving ({written} of {expected} bytes)")]
    ShortWrite { expected: usize, written: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
