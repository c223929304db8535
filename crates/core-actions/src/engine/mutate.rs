//! Mutation primitives.
//!
//! Every buffer change the engine makes goes through one of these. Deletions
//! hand the removed text to the register store before touching the buffer;
//! a refused capture aborts the deletion with the buffer untouched.

use core_model::Document;
use core_state::RangeShape;
use core_state::marks::{CHANGE_END, CHANGE_START, LAST_CHANGE};
use core_text::{TextRange, motion};
use tracing::{trace, warn};

use super::Engine;
use crate::error::{EditError, EditResult};

fn ordered(doc: &dyn Document, start: usize, end: usize) -> (usize, usize) {
    let len = doc.buffer().len();
    let (s, e) = if start <= end { (start, end) } else { (end, start) };
    (s.min(len), e.min(len))
}

impl Engine {
    /// Insert `text` at `offset` and leave the caret after it.
    pub fn insert_text(&mut self, doc: &mut dyn Document, offset: usize, text: &str) {
        let at = offset.min(doc.buffer().len());
        self.bracket(doc, |engine, doc| {
            doc.splice(at, at, text);
            doc.set_cursor(at + text.chars().count());
            engine.marks.set_mark(LAST_CHANGE, at);
        });
        trace!(target: "actions.mutate", at, chars = text.chars().count(), "insert_text");
    }

    /// Remove `[start, end)` after capturing it into the registers. An empty
    /// span is a no-op and leaves the registers alone.
    pub fn delete_text(
        &mut self,
        doc: &mut dyn Document,
        start: usize,
        end: usize,
        shape: RangeShape,
    ) -> EditResult {
        let (s, e) = ordered(&*doc, start, end);
        if s == e {
            trace!(target: "actions.mutate", at = s, "delete_text_empty");
            return Ok(());
        }
        let text = doc.buffer().slice(s, e);
        if let Err(err) = self.registers.capture(&text, shape, true) {
            warn!(target: "actions.mutate", start = s, end = e, error = %err, "delete_refused");
            return Err(EditError::RegisterDenied(err));
        }
        self.bracket(doc, |engine, doc| {
            doc.splice(s, e, "");
            engine.marks.set_mark(LAST_CHANGE, s);
            engine.marks.set_mark(CHANGE_START, s);
            engine.marks.set_mark(CHANGE_END, s);
        });
        trace!(target: "actions.mutate", start = s, end = e, ?shape, "delete_text");
        Ok(())
    }

    /// Replace `[start, end)` with `text` as one edit. Nothing is captured.
    pub fn replace_text(&mut self, doc: &mut dyn Document, start: usize, end: usize, text: &str) {
        let (s, e) = ordered(&*doc, start, end);
        let after = s + text.chars().count();
        self.bracket(doc, |engine, doc| {
            doc.splice(s, e, text);
            engine.marks.set_mark(CHANGE_START, s);
            engine.marks.set_mark(CHANGE_END, after);
            engine.marks.set_mark(LAST_CHANGE, after);
        });
        trace!(target: "actions.mutate", start = s, end = e, chars = after - s, "replace_text");
    }

    /// Delete every segment of `range`, highest offset first. Outside a
    /// change the caret is then settled onto a valid command-mode position.
    pub fn delete_range(
        &mut self,
        doc: &mut dyn Document,
        range: &TextRange,
        shape: RangeShape,
        is_change: bool,
    ) -> EditResult {
        self.bracket(doc, |engine, doc| {
            for seg in range.segments().iter().rev() {
                engine.delete_text(doc, seg.start, seg.end, shape)?;
            }
            if !is_change {
                settle_caret(doc);
            }
            Ok(())
        })
    }
}

/// Caret after a deletion: a caret left on the empty line after the last
/// newline moves to the first non-blank of the line above. Anything else,
/// including a caret past the end of an unterminated last line, is pulled
/// back onto its own line's content.
pub(super) fn settle_caret(doc: &mut dyn Document) {
    let buf = doc.buffer();
    let cursor = doc.cursor();
    let line = buf.line_of(cursor);
    let target = if cursor >= buf.len() && !buf.is_empty() && line > 0 && cursor == buf.line_start(line)
    {
        motion::first_non_blank(buf, line - 1)
    } else {
        motion::normalize_caret(buf, cursor)
    };
    doc.set_cursor(target);
}
