//! Atomic save.
//!
//! The write plan walks the line index in order, coalescing runs of
//! still-contiguous view lines into single regions (they share the arena, so
//! one slice covers the whole run) while every materialized line stands
//! alone. Regions flush via vectored writes, chunked at a conservative
//! per-call element count; data lands in a sibling `.#<name>.tmp` file that
//! is renamed over the target only after the descriptor is closed. Any
//! failure unlinks the temp file and leaves DIRTY set so the caller can
//! retry; there is no partial-success state.

use std::fs::File;
use std::io::{ErrorKind, IoSlice, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::{Buffer, BufferError, BufferFlags};

/// Upper bound on vectored-write elements per syscall, conservative against
/// common `IOV_MAX` values.
const MAX_WRITE_ELEMENTS: usize = 64;

/// One contiguous run of bytes written as a single vectored-write element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRegion {
    /// Byte range of the raw arena covering one or more coalesced view lines.
    Arena(Range<usize>),
    /// A materialized line, identified by index.
    Owned(usize),
}

impl Buffer {
    /// Build the minimal write-region list for the current line index.
    pub fn write_regions(&self) -> Vec<SaveRegion> {
        let mut regions: Vec<SaveRegion> = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            match line.view_range() {
                Some(r) => match regions.last_mut() {
                    // Extend the open arena run only while lines stay
                    // contiguous in the arena; deleting a view line in the
                    // middle breaks adjacency even though the index is
                    // consecutive.
                    Some(SaveRegion::Arena(run)) if run.end == r.start => run.end = r.end,
                    _ => regions.push(SaveRegion::Arena(r)),
                },
                None => regions.push(SaveRegion::Owned(idx)),
            }
        }
        regions
    }

    /// Persist the buffer if DIRTY. Success clears DIRTY; every failure path
    /// removes the temp file and leaves DIRTY set.
    pub fn save(&mut self) -> Result<(), BufferError> {
        if !self.flags.contains(BufferFlags::DIRTY) {
            return Ok(());
        }
        let Some(path) = self.path.clone() else {
            return Err(BufferError::NoPath(self.name.clone()));
        };
        let tmp = sibling_temp_path(&path);
        let regions = self.write_regions();

        let flushed = self.flush_regions(&tmp, &regions);
        let bytes = match flushed {
            Ok(b) => b,
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                tracing::error!(target: "io", file = %path.display(), error = %e, "save_write_failed");
                return Err(e);
            }
        };
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            tracing::error!(target: "io", file = %path.display(), error = %e, "save_rename_failed");
            return Err(e.into());
        }
        self.flags.remove(BufferFlags::DIRTY);
        tracing::debug!(
            target: "io",
            file = %path.display(),
            bytes,
            regions = regions.len(),
            "save_ok"
        );
        Ok(())
    }

    /// Write all regions to `path`, closing the file before returning.
    /// `EINTR` retries the whole vectored call; a short write is a hard
    /// failure.
    fn flush_regions(&self, path: &Path, regions: &[SaveRegion]) -> Result<usize, BufferError> {
        let slices: Vec<&[u8]> = regions
            .iter()
            .map(|r| match r {
                SaveRegion::Arena(range) => &self.data[range.clone()],
                SaveRegion::Owned(idx) => self.lines[*idx].bytes(&self.data),
            })
            .collect();

        let mut file = File::create(path)?;
        let mut total = 0usize;
        for chunk in slices.chunks(MAX_WRITE_ELEMENTS) {
            let expected: usize = chunk.iter().map(|s| s.len()).sum();
            let bufs: Vec<IoSlice<'_>> = chunk.iter().map(|s| IoSlice::new(s)).collect();
            let written = loop {
                match file.write_vectored(&bufs) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            if written != expected {
                return Err(BufferError::ShortWrite { expected, written });
            }
            total += written;
        }
        Ok(total)
    }
}

/// Temp file beside the target: `.#<basename>.tmp` in the same directory, so
/// the final rename never crosses a filesystem boundary.
fn sibling_temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("buffer");
    path.with_file_name(format!(".#{name}.tmp"))
}
