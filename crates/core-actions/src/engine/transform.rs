//! Case and indent transformers.

use core_model::Document;
use core_state::{HostAction, RangeShape, Stroke};
use core_text::{TextRange, motion, visual_col};
use tracing::{debug, trace};

use super::Engine;
use super::edit::lines_available;
use crate::error::{EditError, EditResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Toggle,
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirection {
    Left,
    Right,
}

/// The single char a case mapping yields, or `c` itself when the mapping
/// expands (`ß` upper-cases to `SS`).
fn single(mut mapped: impl Iterator<Item = char>, c: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m,
        _ => c,
    }
}

fn transform_case(c: char, mode: CaseMode) -> char {
    match mode {
        CaseMode::Upper => single(c.to_uppercase(), c),
        CaseMode::Lower => single(c.to_lowercase(), c),
        CaseMode::Toggle if c.is_uppercase() => single(c.to_lowercase(), c),
        CaseMode::Toggle if c.is_lowercase() => single(c.to_uppercase(), c),
        CaseMode::Toggle => c,
    }
}

/// Leading whitespace reaching visual column `col`.
fn build_indent(col: usize, tab_width: usize, use_tabs: bool) -> String {
    if use_tabs {
        let mut s = "\t".repeat(col / tab_width);
        s.push_str(&" ".repeat(col % tab_width));
        s
    } else {
        " ".repeat(col)
    }
}

impl Engine {
    /// Re-case every char of `[start, end)` and put the caret on `start`.
    pub fn change_case(&mut self, doc: &mut dyn Document, start: usize, end: usize, mode: CaseMode) {
        let (s, e) = if start <= end { (start, end) } else { (end, start) };
        self.bracket(doc, |engine, doc| {
            let mut changed = 0usize;
            for i in s..e {
                // Earlier edits of the same operator may have shortened the buffer.
                let Some(c) = doc.buffer().char_at(i) else {
                    break;
                };
                if c == '\n' {
                    continue;
                }
                let t = transform_case(c, mode);
                if t != c {
                    let mut utf8 = [0u8; 4];
                    engine.replace_text(doc, i, i + 1, t.encode_utf8(&mut utf8));
                    changed += 1;
                }
            }
            let len = doc.buffer().len();
            doc.set_cursor(s.min(len));
            trace!(target: "actions.transform", start = s, end = e, ?mode, changed, "change_case");
        });
    }

    /// [`Engine::change_case`] over every segment, last segment first.
    pub fn change_case_range(&mut self, doc: &mut dyn Document, range: &TextRange, mode: CaseMode) {
        self.bracket(doc, |engine, doc| {
            for seg in range.segments().iter().rev() {
                engine.change_case(doc, seg.start, seg.end, mode);
            }
            doc.set_cursor(range.start_offset());
        });
    }

    /// `~`: toggle the case of `count` chars and step past them.
    pub fn change_case_toggle_character(&mut self, doc: &mut dyn Document, count: u32) -> EditResult {
        let cursor = doc.cursor();
        let Some(end) = motion::right(doc.buffer(), cursor, count as usize, true) else {
            return Engine::empty_or(&*doc, EditError::NoRange);
        };
        self.change_case(doc, cursor, end, CaseMode::Toggle);
        let target = motion::normalize_caret(doc.buffer(), end);
        doc.set_cursor(target);
        Ok(())
    }

    /// Shift every line touched by `range` by `multiplier` indent steps.
    pub fn indent_range(
        &mut self,
        doc: &mut dyn Document,
        range: &TextRange,
        multiplier: usize,
        dir: IndentDirection,
    ) {
        let tab = self.tabs.tab_width().max(1);
        let use_tabs = self.tabs.use_tabs();
        let buf = doc.buffer();
        let first = buf.line_of(range.start_offset());
        let end = range.end_offset();
        let end_line = buf.line_of(end);
        // A range ending exactly at a line start does not touch that line.
        let last = if buf.line_start(end_line) == end {
            end_line.checked_sub(1)
        } else {
            Some(end_line)
        };
        let Some(last) = last.filter(|&l| l >= first) else {
            trace!(target: "actions.transform", first, end, "indent_no_lines");
            return;
        };
        let step = tab * multiplier;
        self.bracket(doc, |engine, doc| {
            for line in first..=last {
                let buf = doc.buffer();
                let soff = buf.line_start(line);
                let woff = motion::first_non_blank(buf, line);
                let current = buf.slice(soff, woff);
                let col = visual_col(&current, tab);
                let new_col = match dir {
                    IndentDirection::Right => col + step,
                    IndentDirection::Left if col == 0 => continue,
                    IndentDirection::Left => col.saturating_sub(step),
                };
                let indent = build_indent(new_col, tab, use_tabs);
                if indent != current {
                    engine.replace_text(doc, soff, woff, &indent);
                }
            }
            if !engine.inserting() {
                let target = motion::first_non_blank(doc.buffer(), first);
                doc.set_cursor(target);
            }
            let buf = doc.buffer();
            let cursor = doc.cursor();
            let prefix = buf.slice(buf.line_start(buf.line_of(cursor)), cursor);
            let col = visual_col(&prefix, tab);
            doc.set_preferred_column(col);
        });
        debug!(target: "actions.transform", first, last, ?dir, multiplier, tab, use_tabs, "indent_range");
    }

    /// `>>`/`<<` over `lines` lines from the caret, or `Ctrl-T`/`Ctrl-D` in a
    /// session. Right after a typed `0`, `Ctrl-D` removes the `0` and all
    /// indent.
    pub fn indent_lines(&mut self, doc: &mut dyn Document, lines: u32, dir: IndentDirection) -> EditResult {
        self.bracket(doc, |engine, doc| {
            let mut multiplier = 1;
            if dir == IndentDirection::Left
                && engine.inserting()
                && engine.session.strokes.last() == Some(&Stroke::Char('0'))
            {
                let cursor = doc.cursor();
                if cursor > 0 {
                    engine.delete_text(doc, cursor - 1, cursor, RangeShape::Exclusive)?;
                }
                multiplier = 99;
            }
            let buf = doc.buffer();
            let cursor = doc.cursor();
            let line = buf.line_of(cursor);
            let last = (line + lines.max(1) as usize - 1)
                .min(buf.content_line_count().saturating_sub(1))
                .max(line);
            let end = buf.line_end(last);
            engine.indent_range(doc, &TextRange::new(cursor, end), multiplier, dir);
            Ok(())
        })
    }

    /// `==`: hand `lines` lines from the caret to the host's re-indenter,
    /// then rest on the first line's first non-blank.
    pub fn auto_indent_lines(&mut self, doc: &mut dyn Document, lines: u32) -> EditResult {
        let first = doc.buffer().line_of(doc.cursor());
        let count = lines.max(1) as usize;
        lines_available(&*doc, first, count)?;
        let last = first + count - 1;
        self.bracket(doc, |engine, doc| {
            engine.invoke_host(doc, &HostAction::AutoIndentLines { first, last });
            let target = motion::first_non_blank(doc.buffer(), first);
            doc.set_cursor(target);
        });
        trace!(target: "actions.transform", first, last, "auto_indented");
        Ok(())
    }
}
