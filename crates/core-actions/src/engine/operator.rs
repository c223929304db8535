//! Motion-driven operators.
//!
//! Each operator resolves its argument to a range and then applies a
//! primitive to it. Delete and change first correct the range:
//! 1. A forward word motion that ran onto the next line keeps that line's
//!    break out of the deletion.
//! 2. A delete bounded by whitespace on both sides and spanning lines
//!    becomes linewise (`d}` over indented blocks removes whole lines).
//! 3. Linewise deletions reaching an unterminated final line take the
//!    newline before it so no empty line is left behind.
//!
//! Change additionally turns `cw` into `ce` when the caret sits on a word,
//! and then reopens an insert session where the text was.

use core_model::Document;
use core_state::{Argument, MotionKind, RangeShape};
use core_text::{TextRange, motion};
use tracing::{debug, trace};

use super::Engine;
use super::transform::{CaseMode, IndentDirection};
use crate::error::{EditError, EditResult};

impl Engine {
    /// `d{motion}`.
    pub fn delete_motion(
        &mut self,
        doc: &mut dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
    ) -> EditResult {
        self.bracket(doc, |engine, doc| {
            let Some(range) = engine.operator_range(&*doc, count, raw_count, argument, false) else {
                return Engine::empty_or(&*doc, EditError::NoRange);
            };
            engine.delete_range(doc, &range, argument.motion.shape(), false)
        })
    }

    /// `c{motion}`: delete, then insert where the text was.
    pub fn change_motion(
        &mut self,
        doc: &mut dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
    ) -> EditResult {
        let mut count = count;
        self.retarget_change_word(&*doc, &mut count, argument);
        self.bracket(doc, |engine, doc| {
            let Some(range) = engine.operator_range(&*doc, count, raw_count, argument, true) else {
                return Engine::empty_or(&*doc, EditError::NoRange);
            };
            engine.change_range(doc, &range, argument.motion.shape())
        })
    }

    /// `g~{motion}`, `gU{motion}`, `gu{motion}`.
    pub fn change_case_motion(
        &mut self,
        doc: &mut dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
        mode: CaseMode,
    ) -> EditResult {
        let Some(range) = self.resolver.resolve(&*doc, count, raw_count, argument) else {
            return Engine::empty_or(&*doc, EditError::NoRange);
        };
        self.change_case_range(doc, &range, mode);
        Ok(())
    }

    /// `>{motion}` / `<{motion}`.
    pub fn indent_motion(
        &mut self,
        doc: &mut dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
        dir: IndentDirection,
    ) -> EditResult {
        let Some(range) = self.resolver.resolve(&*doc, count, raw_count, argument) else {
            return Engine::empty_or(&*doc, EditError::NoRange);
        };
        self.indent_range(doc, &range, 1, dir);
        Ok(())
    }

    /// Resolve and correct the range of a delete (or change) operator. The
    /// argument's shape is updated when the range is promoted to linewise.
    fn operator_range(
        &mut self,
        doc: &dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
        is_change: bool,
    ) -> Option<TextRange> {
        let mut range = self.resolver.resolve(doc, count, raw_count, argument)?;
        let buf = doc.buffer();
        let (start, end) = (range.start_offset(), range.end_offset());

        let forward_word = argument.motion_kind().is_some_and(MotionKind::is_forward_word);
        if forward_word
            && !range.is_multi()
            && start > 0
            && end > start
            && buf.char_at(start - 1) != Some('\n')
            && buf.slice(start, end).contains('\n')
        {
            range.set_end(end - 1);
            trace!(target: "actions.operator", start, end = end - 1, "trailing_newline_dropped");
        }

        let (start, end) = (range.start_offset(), range.end_offset());
        let mut shape = argument.motion.shape();
        if !is_change
            && shape != RangeShape::Linewise
            && !range.is_multi()
            && buf.line_of(start) != buf.line_of(end)
            && !motion::non_blank_before(buf, start)
            && !motion::non_blank_after(buf, end)
        {
            let first = buf.line_of(start);
            let end_line = buf.line_of(end);
            let last = if buf.line_start(end_line) == end && end_line > first {
                end_line - 1
            } else {
                end_line
            };
            let (s, e) = motion::line_span(buf, first, last);
            range.reshape(s, e);
            argument.motion.set_shape(RangeShape::Linewise);
            shape = RangeShape::Linewise;
            debug!(target: "actions.operator", first, last, "promoted_to_linewise");
        }

        if shape == RangeShape::Linewise && !range.is_multi() {
            let (s, e) = motion::absorb_final_newline(buf, range.start_offset(), range.end_offset());
            range.reshape(s, e);
        }
        Some(range)
    }

    /// `cw` on a word acts like `ce`. When the caret already sits on the last
    /// char of the word, `ce` would run on to the next word, so the count
    /// (or failing that the motion itself) is scaled back.
    fn retarget_change_word(&mut self, doc: &dyn Document, count: &mut u32, argument: &mut Argument) {
        let Some(word_kind) = argument.motion_kind() else {
            return;
        };
        let Some(end_kind) = word_kind.word_end_variant() else {
            return;
        };
        let pos = doc.cursor();
        if !doc.buffer().char_at(pos).is_some_and(|c| !c.is_whitespace()) {
            return;
        }
        argument.retarget(end_kind, RangeShape::Inclusive);

        let cnt = (*count).max(1) as usize * argument.motion.count.max(1) as usize;
        let back_kind = end_kind.reverse_end_variant();
        let forward = self.resolver.target(doc, pos, cnt, end_kind);
        let back = match (forward, back_kind) {
            (Some(f), Some(kind)) => self.resolver.target(doc, f, cnt, kind),
            _ => None,
        };
        if back != Some(pos) {
            return;
        }
        if *count > 1 {
            *count -= 1;
        } else if argument.motion.count > 1 {
            argument.motion.count -= 1;
        } else {
            // Nothing left to scale back: the plain word motion stands.
            argument.retarget(word_kind, RangeShape::Exclusive);
        }
        debug!(target: "actions.operator", pos, count = *count, motion_count = argument.motion.count, kind = ?argument.motion_kind(), "change_word_scaled_back");
    }
}
