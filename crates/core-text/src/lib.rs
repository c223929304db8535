//! Rope-based text buffer addressed by char offsets.
//!
//! Every offset handed to or returned from [`Buffer`] counts Unicode scalar
//! values from the start of the document. Only `'\n'` terminates a line; the
//! rope is built without the extra Unicode line-break classes so that line
//! arithmetic here and in the engine agree.
//!
//! Out-of-range offsets are clamped to `[0, len]` instead of panicking. The
//! engine relies on that: range primitives normalize their inputs and then
//! hand them straight to the buffer.

use ropey::Rope;

pub mod motion;
pub mod width;

pub use width::{egc_width, visual_col};

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug, Default)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            name: name.into(),
        }
    }

    /// Number of chars in the buffer.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Char at `offset`, `None` past the end.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.rope.len_chars() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Owned copy of `[start, end)`, clamped and normalized.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let (s, e) = self.clamp_span(start, end);
        self.rope.slice(s..e).to_string()
    }

    /// Entire contents as an owned `String`.
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Insert `text` at `offset` (clamped to the end of the buffer).
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = offset.min(self.len());
        self.rope.insert(at, text);
    }

    /// Remove `[start, end)` and return the removed text.
    pub fn remove(&mut self, start: usize, end: usize) -> String {
        let (s, e) = self.clamp_span(start, end);
        if s == e {
            return String::new();
        }
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        removed
    }

    /// Replace `[start, end)` with `text`; returns the replaced text.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> String {
        let (s, _) = self.clamp_span(start, end);
        let removed = self.remove(start, end);
        self.insert(s, text);
        removed
    }

    /// Total number of lines. A trailing newline opens a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Lines holding content: a trailing newline does not open a further
    /// line here, unlike [`Buffer::line_count`].
    pub fn content_line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        if lines > 1 && self.char_at(self.len() - 1) == Some('\n') {
            lines - 1
        } else {
            lines
        }
    }

    /// Zero-based line containing `offset` (clamped).
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.len()))
    }

    /// Offset of the first char of `line`; lines past the end map to `len`.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.len();
        }
        self.rope.line_to_char(line)
    }

    /// Exclusive end of the line's content (the offset of its `'\n'`, or the
    /// buffer end for the last line).
    pub fn line_end(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.len();
        }
        let next = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1)
        } else {
            self.len()
        };
        if next > self.line_start(line) && self.rope.char(next - 1) == '\n' {
            next - 1
        } else {
            next
        }
    }

    /// Char length of a line excluding its newline.
    pub fn line_len(&self, line: usize) -> usize {
        self.line_end(line) - self.line_start(line)
    }

    /// Line content without its trailing newline.
    pub fn line_text(&self, line: usize) -> String {
        self.slice(self.line_start(line), self.line_end(line))
    }

    /// Offset of the line after `line`, or the buffer end.
    pub fn next_line_start(&self, line: usize) -> usize {
        self.line_start(line + 1)
    }

    fn clamp_span(&self, start: usize, end: usize) -> (usize, usize) {
        let len = self.len();
        let (s, e) = if start > end { (end, start) } else { (start, end) };
        (s.min(len), e.min(len))
    }
}

/// A single contiguous span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Normalized span: `start <= end` always holds.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One or more spans in ascending order. Multi-segment ranges come from
/// block-shaped selections; operators walk them back to front so that
/// earlier offsets stay valid while later segments are edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    segments: Vec<Span>,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            segments: vec![Span::new(start, end)],
        }
    }

    /// Build from several spans. Spans are normalized and sorted by start;
    /// an empty list yields a single empty span at 0.
    pub fn from_spans(spans: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut segments: Vec<Span> = spans.into_iter().map(|(a, b)| Span::new(a, b)).collect();
        if segments.is_empty() {
            segments.push(Span::new(0, 0));
        }
        segments.sort_by_key(|s| s.start);
        Self { segments }
    }

    pub fn segments(&self) -> &[Span] {
        &self.segments
    }

    /// Smallest start among the segments.
    pub fn start_offset(&self) -> usize {
        self.segments.first().map(|s| s.start).unwrap_or(0)
    }

    /// Largest end among the segments.
    pub fn end_offset(&self) -> usize {
        self.segments.iter().map(|s| s.end).max().unwrap_or(0)
    }

    pub fn is_multi(&self) -> bool {
        self.segments.len() > 1
    }

    /// Moves the end of the last segment, keeping it normalized.
    pub fn set_end(&mut self, end: usize) {
        if let Some(last) = self.segments.last_mut() {
            *last = Span::new(last.start, end);
        }
    }

    /// Collapse to a single span covering `[start, end)`.
    pub fn reshape(&mut self, start: usize, end: usize) {
        self.segments = vec![Span::new(start, end)];
    }

    /// Clamp every segment into `[0, len]`.
    pub fn clamp_to(&mut self, len: usize) {
        for seg in &mut self.segments {
            *seg = Span::new(seg.start.min(len), seg.end.min(len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_geometry_with_trailing_newline() {
        let buf = Buffer::from_str("t", "ab\ncd\n");
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.content_line_count(), 2);
        assert_eq!(Buffer::from_str("t", "").content_line_count(), 1);
        assert_eq!(buf.line_start(1), 3);
        assert_eq!(buf.line_end(1), 5);
        assert_eq!(buf.line_len(2), 0);
        assert_eq!(buf.line_start(2), 6);
        assert_eq!(buf.line_of(6), 2);
        assert_eq!(buf.line_of(99), 2);
        assert_eq!(buf.line_text(0), "ab");
    }

    #[test]
    fn carriage_return_is_not_a_line_break() {
        let buf = Buffer::from_str("t", "a\rb\nc");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_end(0), 3);
    }

    #[test]
    fn edits_clamp_instead_of_panicking() {
        let mut buf = Buffer::from_str("t", "héllo");
        assert_eq!(buf.remove(3, 1), "él");
        assert_eq!(buf.contents(), "hlo");
        buf.insert(100, "!");
        assert_eq!(buf.contents(), "hlo!");
        assert_eq!(buf.replace(1, 50, "i"), "lo!");
        assert_eq!(buf.contents(), "hi");
        assert_eq!(buf.slice(5, 9), "");
    }

    #[test]
    fn text_range_normalizes_and_orders_segments() {
        let r = TextRange::from_spans([(9, 7), (1, 3)]);
        assert_eq!(r.segments(), &[Span::new(1, 3), Span::new(7, 9)]);
        assert_eq!(r.start_offset(), 1);
        assert_eq!(r.end_offset(), 9);
        assert!(r.is_multi());

        let mut single = TextRange::new(5, 2);
        assert_eq!(single.start_offset(), 2);
        single.set_end(4);
        assert_eq!(single.end_offset(), 4);
        single.clamp_to(3);
        assert_eq!(single.segments(), &[Span::new(2, 3)]);
    }
}
