//! Host document seen by the engine.
//!
//! The engine never owns text. It edits through [`Document`]: a buffer, one
//! caret expressed as a char offset, the host's insert/overwrite typing state
//! and a couple of presentation hints (cursor shape, preferred column) the
//! host is free to ignore.
//!
//! Core invariants (must hold after every trait call):
//! * `cursor() <= buffer().len()`; `set_cursor` clamps.
//! * `splice` keeps the caret attached to the text around it: a caret after
//!   the edited span shifts by the length delta, a caret inside the span
//!   collapses into what replaced it.
//!
//! [`EditorModel`] is the in-process implementation used by embedders that
//! do not bring their own editor component, and by the test suites.

use core_text::Buffer;

pub trait Document {
    fn buffer(&self) -> &Buffer;
    fn buffer_mut(&mut self) -> &mut Buffer;

    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, offset: usize);

    /// Host overwrite (replace) typing state.
    fn overwrite(&self) -> bool;
    fn set_overwrite(&mut self, on: bool);

    /// Cursor shape hint: block in command modes, bar while inserting.
    fn set_block_cursor(&mut self, _block: bool) {}

    /// Visual column vertical motions should aim for after an edit.
    fn set_preferred_column(&mut self, _col: usize) {}

    /// Replace `[start, end)` with `text`, carrying the caret along.
    /// Returns the replaced text.
    fn splice(&mut self, start: usize, end: usize, text: &str) -> String {
        let len = self.buffer().len();
        let (s, e) = if start <= end { (start, end) } else { (end, start) };
        let (s, e) = (s.min(len), e.min(len));
        let removed = self.buffer_mut().replace(s, e, text);
        let inserted = text.chars().count();
        let cursor = self.cursor();
        let moved = if cursor >= e {
            cursor - (e - s) + inserted
        } else if cursor > s {
            s + (cursor - s).min(inserted)
        } else {
            cursor
        };
        self.set_cursor(moved);
        removed
    }

    /// Host default typing path: insert `ch` at the caret, or overwrite the
    /// char under it when overwrite is on (never a line break), then step
    /// past it.
    fn type_char(&mut self, ch: char) {
        let at = self.cursor();
        let over = self.overwrite() && self.buffer().char_at(at).is_some_and(|c| c != '\n');
        let end = if over { at + 1 } else { at };
        let mut utf8 = [0u8; 4];
        self.splice(at, end, ch.encode_utf8(&mut utf8));
        self.set_cursor(at + 1);
    }
}

/// In-process document: one buffer, one caret.
#[derive(Debug, Clone)]
pub struct EditorModel {
    buffer: Buffer,
    cursor: usize,
    overwrite: bool,
    block_cursor: bool,
    preferred_column: Option<usize>,
}

impl EditorModel {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor: 0,
            overwrite: false,
            block_cursor: true,
            preferred_column: None,
        }
    }

    /// Convenience constructor used throughout the tests.
    pub fn from_text(text: &str) -> Self {
        Self::new(Buffer::from_str("[scratch]", text))
    }

    pub fn with_cursor(mut self, offset: usize) -> Self {
        self.set_cursor(offset);
        self
    }

    pub fn text(&self) -> String {
        self.buffer.contents()
    }

    pub fn block_cursor(&self) -> bool {
        self.block_cursor
    }

    pub fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }
}

impl Document for EditorModel {
    fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.buffer.len());
    }

    fn overwrite(&self) -> bool {
        self.overwrite
    }

    fn set_overwrite(&mut self, on: bool) {
        self.overwrite = on;
    }

    fn set_block_cursor(&mut self, block: bool) {
        self.block_cursor = block;
    }

    fn set_preferred_column(&mut self, col: usize) {
        self.preferred_column = Some(col);
    }
}
