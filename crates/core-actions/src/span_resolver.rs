//! Reference motion resolver.
//!
//! Maps a [`MotionKind`] applied `count` times from the caret to a
//! [`TextRange`] an operator can consume. The range shape comes from the
//! argument's flags:
//! * Exclusive: `[min(origin, target), max(origin, target))`.
//! * Inclusive: as exclusive, but the char under the far end is included
//!   (never a line break).
//! * Linewise: every line touched, newline included. Absorbing the newline
//!   before a final unterminated line is left to the deleting operators so
//!   that indent and case operators still see only the lines they touch.
//!
//! The resolver never mutates the document. Motions that cannot move (left
//! at column 0, `j` on the last line, a count running past the buffer)
//! resolve to `None`.

use core_model::Document;
use core_state::{Argument, MotionKind, RangeShape};
use core_text::{Buffer, TextRange, motion, motion::WordStyle};
use tracing::trace;

use crate::host::MotionResolver;

#[derive(Debug, Default, Clone, Copy)]
pub struct BufferMotionResolver;

impl BufferMotionResolver {
    pub fn new() -> Self {
        Self
    }
}

impl MotionResolver for BufferMotionResolver {
    fn resolve(
        &mut self,
        doc: &dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
    ) -> Option<TextRange> {
        let kind = argument.motion_kind()?;
        let buf = doc.buffer();
        let origin = doc.cursor();
        let cnt = count.max(1) as usize * argument.motion.count.max(1) as usize;
        let typed = raw_count.max(argument.motion.raw_count) as usize;
        let target = match kind {
            // `gg` / `G` address a line by the typed count rather than
            // moving by it.
            MotionKind::FirstLine | MotionKind::LastLine if typed > 0 => {
                let line = (typed - 1).min(last_content_line(buf));
                motion::first_non_blank(buf, line)
            }
            _ => target_of(buf, origin, cnt, kind)?,
        };
        let (a, b) = if origin <= target {
            (origin, target)
        } else {
            (target, origin)
        };
        let shape = argument.motion.shape();
        let range = match shape {
            RangeShape::Linewise => {
                let (s, e) = motion::line_span(buf, buf.line_of(a), buf.line_of(b));
                TextRange::new(s, e)
            }
            RangeShape::Inclusive => {
                let end = if buf.char_at(b).is_some_and(|c| c != '\n') {
                    b + 1
                } else {
                    b
                };
                TextRange::new(a, end)
            }
            RangeShape::Exclusive => TextRange::new(a, b),
        };
        trace!(target: "actions.resolve", ?kind, count = cnt, origin, target, ?shape, start = range.start_offset(), end = range.end_offset(), "resolved");
        Some(range)
    }

    fn target(
        &mut self,
        doc: &dyn Document,
        from: usize,
        count: usize,
        kind: MotionKind,
    ) -> Option<usize> {
        target_of(doc.buffer(), from, count, kind)
    }
}

fn last_content_line(buf: &Buffer) -> usize {
    buf.content_line_count().saturating_sub(1)
}

fn target_of(buf: &Buffer, from: usize, count: usize, kind: MotionKind) -> Option<usize> {
    let from = from.min(buf.len());
    let count = count.max(1);
    let line = buf.line_of(from);
    match kind {
        MotionKind::Left => motion::left(buf, from, count),
        MotionKind::Right => motion::right(buf, from, count, true),
        MotionKind::Up => {
            let target = line.checked_sub(count)?;
            Some(same_column(buf, from, target))
        }
        MotionKind::Down => {
            let target = line + count;
            (target <= last_content_line(buf)).then(|| same_column(buf, from, target))
        }
        MotionKind::WordRight => forward_word(buf, from, count, WordStyle::Word),
        MotionKind::BigWordRight => forward_word(buf, from, count, WordStyle::BigWord),
        MotionKind::CamelRight => forward_word(buf, from, count, WordStyle::Camel),
        MotionKind::WordEndRight => word_end(buf, from, count, WordStyle::Word),
        MotionKind::BigWordEndRight => word_end(buf, from, count, WordStyle::BigWord),
        MotionKind::CamelEndRight => word_end(buf, from, count, WordStyle::Camel),
        MotionKind::WordLeft => {
            (from > 0).then(|| motion::prev_word_start(buf, from, count, WordStyle::Word))
        }
        MotionKind::BigWordLeft => {
            (from > 0).then(|| motion::prev_word_start(buf, from, count, WordStyle::BigWord))
        }
        MotionKind::WordEndLeft => motion::prev_word_end(buf, from, count, WordStyle::Word),
        MotionKind::BigWordEndLeft => motion::prev_word_end(buf, from, count, WordStyle::BigWord),
        MotionKind::CamelEndLeft => motion::prev_word_end(buf, from, count, WordStyle::Camel),
        MotionKind::LineStart => Some(buf.line_start(line)),
        MotionKind::FirstNonBlank => Some(motion::first_non_blank(buf, line)),
        MotionKind::LineEnd => {
            let last = line + count - 1;
            if last > last_content_line(buf) {
                return None;
            }
            let (start, end) = (buf.line_start(last), buf.line_end(last));
            Some(if end > start { end - 1 } else { end })
        }
        MotionKind::FirstLine => {
            let target = if count > 1 { count - 1 } else { 0 };
            Some(motion::first_non_blank(buf, target.min(last_content_line(buf))))
        }
        MotionKind::LastLine => {
            let last = last_content_line(buf);
            let target = if count > 1 { (count - 1).min(last) } else { last };
            Some(motion::first_non_blank(buf, target))
        }
    }
}

fn same_column(buf: &Buffer, from: usize, target: usize) -> usize {
    let col = from - buf.line_start(buf.line_of(from));
    buf.line_start(target) + col.min(buf.line_len(target))
}

fn forward_word(buf: &Buffer, from: usize, count: usize, style: WordStyle) -> Option<usize> {
    (from < buf.len()).then(|| motion::next_word_start(buf, from, count, style))
}

fn word_end(buf: &Buffer, from: usize, count: usize, style: WordStyle) -> Option<usize> {
    (!buf.is_empty()).then(|| motion::next_word_end(buf, from, count, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::EditorModel;
    use core_state::Command;

    fn resolve(text: &str, cursor: usize, kind: MotionKind, count: u32) -> Option<(usize, usize)> {
        let doc = EditorModel::from_text(text).with_cursor(cursor);
        let mut arg = Argument::of(kind);
        BufferMotionResolver
            .resolve(&doc, count, 0, &mut arg)
            .map(|r| (r.start_offset(), r.end_offset()))
    }

    #[test]
    fn word_motions_are_exclusive_or_inclusive() {
        assert_eq!(resolve("foo bar baz", 0, MotionKind::WordRight, 1), Some((0, 4)));
        assert_eq!(resolve("foo bar baz", 0, MotionKind::WordRight, 2), Some((0, 8)));
        assert_eq!(resolve("foo bar baz", 0, MotionKind::WordEndRight, 1), Some((0, 3)));
        assert_eq!(resolve("foo bar", 4, MotionKind::WordRight, 1), Some((4, 7)));
        assert_eq!(resolve("foo bar", 5, MotionKind::WordLeft, 1), Some((4, 5)));
    }

    #[test]
    fn vertical_motions_cover_whole_lines() {
        assert_eq!(resolve("a\nb\nc\n", 0, MotionKind::Down, 1), Some((0, 4)));
        assert_eq!(resolve("a\nb\nc\n", 4, MotionKind::Up, 2), Some((0, 6)));
        // No line below the last content line.
        assert_eq!(resolve("a\nb\n", 2, MotionKind::Down, 1), None);
        assert_eq!(resolve("a\nb\n", 0, MotionKind::Up, 1), None);
    }

    #[test]
    fn line_end_with_count_spans_lines() {
        assert_eq!(resolve("ab\ncd\n", 0, MotionKind::LineEnd, 1), Some((0, 2)));
        assert_eq!(resolve("ab\ncd\n", 1, MotionKind::LineEnd, 2), Some((1, 5)));
        assert_eq!(resolve("ab\ncd\n", 0, MotionKind::LineEnd, 3), None);
        assert_eq!(resolve("\n", 0, MotionKind::LineEnd, 1), Some((0, 0)));
    }

    #[test]
    fn motion_count_multiplies_operator_count() {
        let doc = EditorModel::from_text("a b c d e f");
        let mut arg = Argument::new(Command::motion(MotionKind::WordRight).with_count(2));
        let range = BufferMotionResolver.resolve(&doc, 2, 2, &mut arg);
        assert_eq!(range.map(|r| r.end_offset()), Some(8));
    }

    #[test]
    fn typed_count_addresses_line_for_goto() {
        let doc = EditorModel::from_text("a\n  b\nc\n");
        let mut arg = Argument::of(MotionKind::LastLine);
        let range = BufferMotionResolver.resolve(&doc, 2, 2, &mut arg).unwrap();
        assert_eq!((range.start_offset(), range.end_offset()), (0, 6));
        let mut last = Argument::of(MotionKind::LastLine);
        let range = BufferMotionResolver.resolve(&doc, 1, 0, &mut last).unwrap();
        assert_eq!(range.end_offset(), 8);
    }

    #[test]
    fn left_at_column_zero_has_no_range() {
        assert_eq!(resolve("ab\ncd", 3, MotionKind::Left, 1), None);
        assert_eq!(resolve("abc", 1, MotionKind::Right, 5), Some((1, 3)));
    }
}
