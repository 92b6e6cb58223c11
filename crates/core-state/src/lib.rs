//! Process-wide editor state: the buffer lists, the active buffer, and the
//! remembered cursor column.
//!
//! Two historically implicit globals are modeled as explicit fields here and
//! passed into the cursor engine by reference:
//! * the active-buffer pointer, rendered as a [`BufferId`] resolved through
//!   this state (no raw back-pointers between buffers), and
//! * `remembered_column`, the render column vertical movement tries to
//!   restore on each new line. Initialized empty at startup, set by vertical
//!   motion, cleared by horizontal movement and search.
//!
//! File-backed and scratch buffers live on the main list; internal
//! (message/listing) buffers live on a separate list and are never part of
//! normal cycling. Each buffer records the id of the buffer that was active
//! when it became active; closing the active buffer restores that one level.

use core_buffer::{Buffer, BufferId};

#[derive(Clone, Copy)]
enum List {
    Main,
    Internal,
}

#[derive(Debug)]
pub struct EditorState {
    buffers: Vec<Buffer>,
    ids: Vec<BufferId>,
    internals: Vec<Buffer>,
    internal_ids: Vec<BufferId>,
    active: BufferId,
    next_id: u64,
    /// Column vertical movement tries to restore; `None` until the first
    /// vertical motion after a horizontal move or search.
    pub remembered_column: Option<usize>,
}

impl EditorState {
    /// State seeded with one scratch buffer so an active buffer always
    /// exists.
    pub fn new() -> Self {
        let mut state = Self {
            buffers: Vec::new(),
            ids: Vec::new(),
            internals: Vec::new(),
            internal_ids: Vec::new(),
            active: BufferId(0),
            next_id: 0,
            remembered_column: None,
        };
        let id = state.register(Buffer::scratch("*scratch*"));
        state.active = id;
        state
    }

    fn assign_id(&mut self) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a buffer to the main list and return its id. Does not change the
    /// active buffer.
    pub fn register(&mut self, mut buffer: Buffer) -> BufferId {
        let id = self.assign_id();
        buffer.prev = None;
        self.buffers.push(buffer);
        self.ids.push(id);
        id
    }

    /// Add an internal buffer (messages, listings) to the separate internal
    /// list.
    pub fn register_internal(&mut self, mut buffer: Buffer) -> BufferId {
        let id = self.assign_id();
        buffer.prev = None;
        buffer.internal = true;
        self.internals.push(buffer);
        self.internal_ids.push(id);
        id
    }

    pub fn active_id(&self) -> BufferId {
        self.active
    }

    fn position(&self, id: BufferId) -> Option<(List, usize)> {
        if let Some(i) = self.ids.iter().position(|x| *x == id) {
            return Some((List::Main, i));
        }
        self.internal_ids
            .iter()
            .position(|x| *x == id)
            .map(|i| (List::Internal, i))
    }

    pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
        match self.position(id)? {
            (List::Main, i) => Some(&self.buffers[i]),
            (List::Internal, i) => Some(&self.internals[i]),
        }
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        match self.position(id)? {
            (List::Main, i) => Some(&mut self.buffers[i]),
            (List::Internal, i) => Some(&mut self.internals[i]),
        }
    }

    pub fn active_buffer(&self) -> &Buffer {
        self.buffer(self.active)
            .expect("active buffer must always exist")
    }

    pub fn active_buffer_mut(&mut self) -> &mut Buffer {
        let id = self.active;
        self.buffer_mut(id)
            .expect("active buffer must always exist")
    }

    /// Make `id` active, recording the outgoing buffer as its `prev` for the
    /// single-level restore on close. No-op for unknown ids.
    pub fn switch_to(&mut self, id: BufferId) {
        if id == self.active || self.position(id).is_none() {
            return;
        }
        let outgoing = self.active;
        self.active = id;
        if let Some(buf) = self.buffer_mut(id) {
            buf.prev = Some(outgoing);
        }
        self.remembered_column = None;
        tracing::debug!(target: "runtime", from = outgoing.0, to = id.0, "buffer_switch");
    }

    /// Already-open buffer for `path`, if any.
    pub fn find_by_path(&self, path: &std::path::Path) -> Option<BufferId> {
        self.buffers
            .iter()
            .zip(&self.ids)
            .find(|(b, _)| b.path.as_deref() == Some(path))
            .map(|(_, id)| *id)
    }

    /// Close the active buffer, restoring its `prev` when that buffer still
    /// exists, otherwise falling back to any remaining main-list buffer (a
    /// fresh scratch buffer is created if the list empties out).
    pub fn close_active(&mut self) {
        let closing = self.active;
        let prev = self.active_buffer().prev;
        match self.position(closing) {
            Some((List::Main, i)) => {
                self.buffers.remove(i);
                self.ids.remove(i);
            }
            Some((List::Internal, i)) => {
                self.internals.remove(i);
                self.internal_ids.remove(i);
            }
            None => {}
        }
        let next = prev
            .filter(|id| self.position(*id).is_some())
            .or_else(|| self.ids.first().copied());
        self.active = match next {
            Some(id) => id,
            None => self.register(Buffer::scratch("*scratch*")),
        };
        self.remembered_column = None;
        tracing::debug!(target: "runtime", closed = closing.0, now = self.active.0, "buffer_close");
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
