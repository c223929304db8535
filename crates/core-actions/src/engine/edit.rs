//! Fixed-range delete and change commands: `x`, `dd`, `D`, `J`, `gJ`, `r`,
//! `R`, `s`, `cc`, `C`, and the change applied to an already resolved range.

use core_model::Document;
use core_state::{Mode, RangeShape};
use core_text::{TextRange, motion};
use tracing::{debug, trace};

use super::Engine;
use super::mutate::settle_caret;
use crate::error::{EditError, EditResult};

/// Check that `count` lines starting at `line` exist.
pub(super) fn lines_available(doc: &dyn Document, line: usize, count: usize) -> EditResult {
    let available = doc.buffer().content_line_count().saturating_sub(line);
    if count > available {
        debug!(target: "actions.operator", line, requested = count, available, "count_overrun");
        return Err(EditError::CountOverrun {
            requested: count,
            available,
        });
    }
    Ok(())
}

impl Engine {
    /// `x`: delete `count` chars from the caret, staying on the line.
    pub fn delete_character(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        self.bracket(doc, |engine, doc| {
            engine.delete_characters(doc, count)?;
            let target = motion::normalize_caret(doc.buffer(), doc.cursor());
            doc.set_cursor(target);
            Ok(())
        })
    }

    /// Delete up to `count` chars from the caret. Nothing to delete is only
    /// an error in a non-empty buffer.
    fn delete_characters(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        let cursor = doc.cursor();
        let Some(end) = motion::right(doc.buffer(), cursor, count as usize, true) else {
            return Engine::empty_or(&*doc, EditError::NoRange);
        };
        self.delete_text(doc, cursor, end, RangeShape::Inclusive)
    }

    /// `dd`: delete `count` whole lines from the caret's line.
    pub fn delete_line(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        let count = count.max(1) as usize;
        let buf = doc.buffer();
        let line = buf.line_of(doc.cursor());
        lines_available(&*doc, line, count)?;
        let (start, end) = motion::linewise_span(doc.buffer(), line, line + count - 1);
        self.bracket(doc, |engine, doc| {
            engine.delete_text(doc, start, end, RangeShape::Linewise)?;
            settle_caret(doc);
            let buf = doc.buffer();
            let target = motion::first_non_blank(buf, buf.line_of(doc.cursor()));
            doc.set_cursor(target);
            Ok(())
        })
    }

    /// `D`: delete to the end of the line, `count - 1` further lines
    /// included.
    pub fn delete_end_of_line(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        let count = count.max(1) as usize;
        let cursor = doc.cursor();
        let line = doc.buffer().line_of(cursor);
        lines_available(&*doc, line, count)?;
        let end = doc.buffer().line_end(line + count - 1);
        self.bracket(doc, |engine, doc| {
            engine.delete_text(doc, cursor, end, RangeShape::Inclusive)?;
            let target = motion::normalize_caret(doc.buffer(), doc.cursor());
            doc.set_cursor(target);
            Ok(())
        })
    }

    /// `J` / `gJ`: join `count` lines (at least two) starting at the caret's.
    pub fn delete_join_lines(&mut self, doc: &mut dyn Document, count: u32, spaces: bool) -> EditResult {
        let count = count.max(2) as usize;
        let line = doc.buffer().line_of(doc.cursor());
        lines_available(&*doc, line, count)?;
        self.join_lines(doc, line, count, spaces)
    }

    /// Join every line touched by `range` (at least two).
    pub fn delete_join_range(&mut self, doc: &mut dyn Document, range: &TextRange, spaces: bool) -> EditResult {
        let buf = doc.buffer();
        let first = buf.line_of(range.start_offset());
        let last = buf.line_of(range.end_offset());
        let count = (last.saturating_sub(first) + 1).max(2);
        lines_available(&*doc, first, count)?;
        self.join_lines(doc, first, count, spaces)
    }

    fn join_lines(&mut self, doc: &mut dyn Document, line: usize, count: usize, spaces: bool) -> EditResult {
        self.bracket(doc, |engine, doc| {
            for _ in 1..count {
                let buf = doc.buffer();
                let at = buf.line_end(line);
                if at >= buf.len() {
                    break;
                }
                let next = line + 1;
                let to = if spaces {
                    motion::first_non_blank(buf, next)
                } else {
                    buf.line_start(next)
                };
                // No separator after trailing blanks or before an empty line.
                let separate = spaces
                    && to < buf.line_end(next)
                    && at > buf.line_start(line)
                    && !buf.char_at(at - 1).is_some_and(|c| c == ' ' || c == '\t');
                engine.delete_text(doc, at, to, RangeShape::Exclusive)?;
                if separate {
                    engine.insert_text(doc, at, " ");
                }
                doc.set_cursor(at);
            }
            trace!(target: "actions.operator", line, count, spaces, "join_lines");
            Ok(())
        })
    }

    /// `R`: enter replace mode.
    pub fn change_replace(&mut self, doc: &mut dyn Document) -> EditResult {
        self.begin_session(doc, Mode::Replace)
    }

    /// `r{char}`: replace `count` chars under the caret with `ch`. Replacing
    /// with a newline splits the line once and carries the indent over.
    pub fn change_character(&mut self, doc: &mut dyn Document, count: u32, ch: char) -> EditResult {
        let count = count.max(1) as usize;
        let buf = doc.buffer();
        let offset = doc.cursor();
        let line = buf.line_of(offset);
        let available = buf.line_end(line).saturating_sub(offset);
        if count > available {
            debug!(target: "actions.operator", requested = count, available, "replace_count_overrun");
            return Err(EditError::CountOverrun {
                requested: count,
                available,
            });
        }
        let indent = buf.slice(buf.line_start(line), motion::first_non_blank(buf, line));
        self.bracket(doc, |engine, doc| {
            if ch == '\n' {
                engine.replace_text(doc, offset, offset + count, "\n");
                engine.insert_text(doc, offset + 1, &indent);
                doc.set_cursor(offset + 1 + indent.chars().count());
            } else {
                let text: String = std::iter::repeat_n(ch, count).collect();
                engine.replace_text(doc, offset, offset + count, &text);
                doc.set_cursor(offset + count - 1);
            }
        });
        Ok(())
    }

    /// Visual `r{char}`: every char of `range` except line breaks becomes
    /// `ch`.
    pub fn change_character_range(&mut self, doc: &mut dyn Document, range: &TextRange, ch: char) {
        self.bracket(doc, |engine, doc| {
            let mut utf8 = [0u8; 4];
            let replacement: &str = ch.encode_utf8(&mut utf8);
            for seg in range.segments().iter().rev() {
                for i in (seg.start..seg.end).rev() {
                    match doc.buffer().char_at(i) {
                        Some(c) if c != '\n' && c != ch => engine.replace_text(doc, i, i + 1, replacement),
                        _ => {}
                    }
                }
            }
            doc.set_cursor(range.start_offset());
        });
    }

    /// `s`: delete `count` chars and start inserting.
    pub fn change_characters(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        self.bracket(doc, |engine, doc| {
            engine.delete_characters(doc, count)?;
            engine.insert_before_cursor(doc)
        })
    }

    /// `cc` / `S`: replace `count` whole lines with an insert session.
    pub fn change_line(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        let count = count.max(1) as usize;
        let line = doc.buffer().line_of(doc.cursor());
        lines_available(&*doc, line, count)?;
        let (start, end) = motion::linewise_span(doc.buffer(), line, line + count - 1);
        self.change_range(doc, &TextRange::new(start, end), RangeShape::Linewise)
    }

    /// `C`: change to the end of the line.
    pub fn change_end_of_line(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        self.bracket(doc, |engine, doc| {
            engine.delete_end_of_line(doc, count)?;
            engine.insert_after_line_end(doc)
        })
    }

    /// Delete `range` and open an insert session in its place. Linewise
    /// ranges reopen on a fresh line: below the remaining text when the
    /// deletion ran to the end of the buffer, above the following line
    /// otherwise. Emptying a buffer whose last line was terminated keeps
    /// that line break.
    pub fn change_range(&mut self, doc: &mut dyn Document, range: &TextRange, shape: RangeShape) -> EditResult {
        let buf = doc.buffer();
        let reached_end = range.end_offset() >= buf.len();
        let whole = reached_end && range.start_offset() == 0;
        let terminated = buf.len() > 0 && buf.char_at(buf.len() - 1) == Some('\n');
        self.bracket(doc, |engine, doc| {
            engine.delete_range(doc, range, shape, true)?;
            if shape != RangeShape::Linewise {
                let target = range.start_offset().min(doc.buffer().len());
                doc.set_cursor(target);
                return engine.insert_before_cursor(doc);
            }
            let buf = doc.buffer();
            let cursor = doc.cursor().min(buf.len());
            if buf.is_empty() {
                doc.set_cursor(0);
                if whole && terminated {
                    engine.insert_new_line_above(doc)
                } else {
                    engine.insert_before_cursor(doc)
                }
            } else if !reached_end {
                let target = buf.line_start(buf.line_of(cursor));
                doc.set_cursor(target);
                engine.insert_new_line_above(doc)
            } else {
                // Land on the last remaining line, not the empty one after
                // its newline.
                if cursor == buf.len() && buf.char_at(cursor - 1) == Some('\n') {
                    doc.set_cursor(cursor - 1);
                }
                engine.insert_new_line_below(doc)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::EditorModel;
    use pretty_assertions::assert_eq;

    #[test]
    fn x_clamps_to_line_and_settles_caret() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc\nd").with_cursor(1);
        engine.delete_character(&mut doc, 5).unwrap();
        assert_eq!(doc.text(), "a\nd");
        assert_eq!(doc.cursor(), 0);
        let mut empty_line = EditorModel::from_text("\nx");
        assert_eq!(
            engine.delete_character(&mut empty_line, 1),
            Err(EditError::NoRange)
        );
    }

    #[test]
    fn dd_counts_and_overruns() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("a\n  b\nc\n");
        engine.delete_line(&mut doc, 1).unwrap();
        assert_eq!(doc.text(), "  b\nc\n");
        assert_eq!(doc.cursor(), 2);
        assert_eq!(
            engine.delete_line(&mut doc, 3),
            Err(EditError::CountOverrun {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(doc.text(), "  b\nc\n");
    }

    #[test]
    fn dd_on_last_line_moves_up() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("  a\nb").with_cursor(4);
        engine.delete_line(&mut doc, 1).unwrap();
        assert_eq!(doc.text(), "  a");
        assert_eq!(doc.cursor(), 2);
    }

    #[test]
    fn d_dollar_with_count() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc\ndef\nghi").with_cursor(1);
        engine.delete_end_of_line(&mut doc, 2).unwrap();
        assert_eq!(doc.text(), "a\nghi");
        assert_eq!(doc.cursor(), 0);
    }

    #[test]
    fn join_with_and_without_spaces() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("a\n   b\nc\n");
        engine.delete_join_lines(&mut doc, 3, true).unwrap();
        assert_eq!(doc.text(), "a b c\n");
        assert_eq!(doc.cursor(), 3);

        let mut raw = EditorModel::from_text("a\n  b\n");
        engine.delete_join_lines(&mut raw, 1, false).unwrap();
        assert_eq!(raw.text(), "a  b\n");

        let mut last = EditorModel::from_text("a\nb\n").with_cursor(2);
        assert!(matches!(
            engine.delete_join_lines(&mut last, 1, true),
            Err(EditError::CountOverrun { .. })
        ));
    }

    #[test]
    fn join_range_covers_touched_lines() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("a\nb\nc\nd");
        engine
            .delete_join_range(&mut doc, &TextRange::new(0, 4), true)
            .unwrap();
        assert_eq!(doc.text(), "a b c\nd");
    }

    #[test]
    fn replace_char_with_count_and_newline() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abcd");
        engine.change_character(&mut doc, 3, 'x').unwrap();
        assert_eq!(doc.text(), "xxxd");
        assert_eq!(doc.cursor(), 2);
        assert!(engine.change_character(&mut doc, 3, 'y').is_err());

        let mut split = EditorModel::from_text("  ab cd").with_cursor(4);
        engine.change_character(&mut split, 1, '\n').unwrap();
        assert_eq!(split.text(), "  ab\n  cd");
        assert_eq!(split.cursor(), 7);
    }

    #[test]
    fn replace_range_skips_line_breaks() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("ab\ncd");
        engine.change_character_range(&mut doc, &TextRange::new(1, 4), '-');
        assert_eq!(doc.text(), "a-\n-d");
        assert_eq!(doc.cursor(), 1);
    }

    #[test]
    fn s_deletes_and_inserts() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc");
        engine.change_characters(&mut doc, 2).unwrap();
        assert_eq!(doc.text(), "c");
        assert_eq!(engine.mode(), Mode::Insert);
        assert_eq!(doc.cursor(), 0);
    }

    #[test]
    fn cc_on_last_line_reopens_below() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("a\nb\n").with_cursor(2);
        engine.change_line(&mut doc, 1).unwrap();
        engine.run_deferred(&mut doc).unwrap();
        engine.capture_char(&mut doc, 'x');
        engine.end_session(&mut doc).unwrap();
        assert_eq!(doc.text(), "a\nx\n");
    }

    #[test]
    fn cc_in_middle_reopens_above() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("a\nb\n");
        engine.change_line(&mut doc, 1).unwrap();
        engine.run_deferred(&mut doc).unwrap();
        engine.capture_char(&mut doc, 'x');
        engine.end_session(&mut doc).unwrap();
        assert_eq!(doc.text(), "x\nb\n");
    }

    #[test]
    fn c_dollar_appends_at_line_end() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc\n").with_cursor(1);
        engine.change_end_of_line(&mut doc, 1).unwrap();
        assert_eq!(doc.text(), "a\n");
        assert_eq!(doc.cursor(), 1);
        assert_eq!(engine.mode(), Mode::Insert);
    }
}
