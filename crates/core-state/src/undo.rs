use core_text::Buffer;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Maximum number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// Brackets groups of edits into single undo units. Begin/end pairs nest;
/// only the outermost pair delimits a unit.
pub trait UndoBoundary {
    fn begin(&mut self, buffer: &Buffer, cursor: usize);
    fn end(&mut self, buffer: &Buffer);

    /// Restore the state before the last unit. Returns false when there is
    /// nothing to undo.
    fn undo(&mut self, _buffer: &mut Buffer, _cursor: &mut usize) -> bool {
        false
    }

    fn redo(&mut self, _buffer: &mut Buffer, _cursor: &mut usize) -> bool {
        false
    }
}

/// A full-state snapshot for undo/redo (coarse clone of the buffer).
#[derive(Clone)]
pub struct EditSnapshot {
    pub buffer: Buffer,
    pub cursor: usize,
    /// Content hash of the buffer at snapshot capture.
    pub hash: u64,
}

pub struct UndoEngine {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    /// Snapshot taken when the outermost bracket opened.
    open: Option<EditSnapshot>,
    depth: u32,
    /// Count of units dropped because they left the buffer unchanged.
    units_skipped: AtomicU64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open: None,
            depth: 0,
            units_skipped: AtomicU64::new(0),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    /// Current bracket nesting.
    pub fn nesting(&self) -> u32 {
        self.depth
    }
    pub fn units_skipped(&self) -> u64 {
        self.units_skipped.load(Ordering::Relaxed)
    }

    fn push_unit(&mut self, snap: EditSnapshot) {
        self.undo_stack.push(snap);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "push_snapshot");
        if self.undo_stack.len() > UNDO_HISTORY_MAX {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
    }
}

impl UndoBoundary for UndoEngine {
    fn begin(&mut self, buffer: &Buffer, cursor: usize) {
        if self.depth == 0 {
            self.open = Some(EditSnapshot {
                buffer: buffer.clone(),
                cursor,
                hash: buffer_hash(buffer),
            });
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "unit_open");
        }
        self.depth += 1;
    }

    fn end(&mut self, buffer: &Buffer) {
        if self.depth == 0 {
            trace!(target: "state.undo", "unbalanced_end_ignored");
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        let Some(snap) = self.open.take() else {
            return;
        };
        if snap.hash == buffer_hash(buffer) {
            self.units_skipped.fetch_add(1, Ordering::Relaxed);
            trace!(target: "state.undo", hash = snap.hash, "snapshot_dedupe_skip");
            return;
        }
        self.push_unit(snap);
    }

    fn undo(&mut self, buffer: &mut Buffer, cursor: &mut usize) -> bool {
        if self.depth > 0 {
            return false;
        }
        let Some(last) = self.undo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        self.redo_stack.push(EditSnapshot {
            buffer: buffer.clone(),
            cursor: *cursor,
            hash: buffer_hash(buffer),
        });
        *buffer = last.buffer;
        *cursor = last.cursor;
        true
    }

    fn redo(&mut self, buffer: &mut Buffer, cursor: &mut usize) -> bool {
        if self.depth > 0 {
            return false;
        }
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        self.undo_stack.push(EditSnapshot {
            buffer: buffer.clone(),
            cursor: *cursor,
            hash: buffer_hash(buffer),
        });
        *buffer = next.buffer;
        *cursor = next.cursor;
        true
    }
}

fn buffer_hash(buf: &Buffer) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(buf.contents().as_bytes());
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_brackets_form_one_unit() {
        let mut undo = UndoEngine::new();
        let mut buf = Buffer::from_str("t", "abc");
        undo.begin(&buf, 0);
        undo.begin(&buf, 0);
        buf.remove(0, 1);
        undo.end(&buf);
        assert_eq!(undo.undo_depth(), 0);
        buf.insert(0, "xy");
        undo.end(&buf);
        assert_eq!(undo.undo_depth(), 1);

        let mut cursor = 2;
        assert!(undo.undo(&mut buf, &mut cursor));
        assert_eq!(buf.contents(), "abc");
        assert_eq!(cursor, 0);
        assert!(undo.redo(&mut buf, &mut cursor));
        assert_eq!(buf.contents(), "xybc");
    }

    #[test]
    fn unchanged_unit_is_dropped() {
        let mut undo = UndoEngine::new();
        let buf = Buffer::from_str("t", "abc");
        undo.begin(&buf, 1);
        undo.end(&buf);
        assert_eq!(undo.undo_depth(), 0);
        assert_eq!(undo.units_skipped(), 1);
        undo.end(&buf);
        assert_eq!(undo.nesting(), 0);
    }

    #[test]
    fn undo_refused_inside_open_unit() {
        let mut undo = UndoEngine::new();
        let mut buf = Buffer::from_str("t", "abc");
        undo.begin(&buf, 0);
        buf.remove(0, 1);
        undo.end(&buf);
        undo.begin(&buf, 0);
        let mut cursor = 0;
        assert!(!undo.undo(&mut buf, &mut cursor));
    }
}
