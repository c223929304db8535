//! Offset-based motion helpers.
//!
//! These are pure functions over a [`Buffer`]; they never mutate and never
//! fail. Helpers that can legitimately have no answer (moving left from
//! column 0, stepping to a previous word end at the top of the buffer)
//! return `Option` so callers can tell "no movement" from "moved to 0".
//!
//! Character classes follow Vim: blanks (including `'\n'`), keyword chars
//! (alphanumerics and `_`) and everything else. Big words only distinguish
//! blank from non-blank. Camel words additionally split keyword runs at case
//! humps, digit boundaries and underscores.

use crate::Buffer;

/// Word flavour for the word family of motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStyle {
    Word,
    BigWord,
    Camel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Blank,
    Punct,
    Keyword,
}

fn class_of(c: char, style: WordStyle) -> Class {
    if c.is_whitespace() {
        Class::Blank
    } else if style == WordStyle::BigWord || c.is_alphanumeric() || c == '_' {
        Class::Keyword
    } else {
        Class::Punct
    }
}

fn class_at(buf: &Buffer, i: usize, style: WordStyle) -> Class {
    buf.char_at(i).map_or(Class::Blank, |c| class_of(c, style))
}

/// True when a camel word starts at `i` inside a keyword run.
fn hump(buf: &Buffer, i: usize) -> bool {
    if i == 0 {
        return false;
    }
    let (Some(prev), Some(cur)) = (buf.char_at(i - 1), buf.char_at(i)) else {
        return false;
    };
    let next = buf.char_at(i + 1);
    (prev.is_lowercase() || prev.is_ascii_digit()) && cur.is_uppercase()
        || prev.is_alphabetic() && cur.is_ascii_digit()
        || prev.is_ascii_digit() && cur.is_alphabetic()
        || prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase)
        || prev == '_' && cur != '_'
}

fn splits(buf: &Buffer, i: usize, style: WordStyle) -> bool {
    style == WordStyle::Camel && hump(buf, i)
}

fn empty_line_at(buf: &Buffer, i: usize) -> bool {
    i > 0 && buf.char_at(i) == Some('\n') && buf.char_at(i - 1) == Some('\n')
}

/// Start of the `count`-th next word (`w`). Stops on empty lines; returns
/// the buffer length when it runs out of words.
pub fn next_word_start(buf: &Buffer, pos: usize, count: usize, style: WordStyle) -> usize {
    let mut at = pos;
    for _ in 0..count.max(1) {
        at = next_word_start_one(buf, at, style);
    }
    at
}

fn next_word_start_one(buf: &Buffer, pos: usize, style: WordStyle) -> usize {
    let len = buf.len();
    let mut i = pos + 1;
    while i < len {
        let c = class_at(buf, i, style);
        let p = class_at(buf, i - 1, style);
        if c != Class::Blank && (c != p || splits(buf, i, style)) {
            return i;
        }
        if empty_line_at(buf, i) {
            return i;
        }
        i += 1;
    }
    len
}

/// Last char of the `count`-th next word (`e`). Clamps to the last char.
pub fn next_word_end(buf: &Buffer, pos: usize, count: usize, style: WordStyle) -> usize {
    let mut at = pos;
    for _ in 0..count.max(1) {
        at = next_word_end_one(buf, at, style);
    }
    at
}

fn next_word_end_one(buf: &Buffer, pos: usize, style: WordStyle) -> usize {
    let len = buf.len();
    if len == 0 {
        return 0;
    }
    let mut i = pos + 1;
    while i < len && class_at(buf, i, style) == Class::Blank {
        i += 1;
    }
    if i >= len {
        return len - 1;
    }
    let c = class_at(buf, i, style);
    while i + 1 < len && class_at(buf, i + 1, style) == c && !splits(buf, i + 1, style) {
        i += 1;
    }
    i
}

/// Start of the `count`-th previous word (`b`).
pub fn prev_word_start(buf: &Buffer, pos: usize, count: usize, style: WordStyle) -> usize {
    let mut at = pos;
    for _ in 0..count.max(1) {
        at = prev_word_start_one(buf, at, style);
    }
    at
}

fn prev_word_start_one(buf: &Buffer, pos: usize, style: WordStyle) -> usize {
    if pos == 0 {
        return 0;
    }
    let mut i = pos.min(buf.len()) - 1;
    while i > 0 && class_at(buf, i, style) == Class::Blank && !empty_line_at(buf, i) {
        i -= 1;
    }
    let c = class_at(buf, i, style);
    if c == Class::Blank {
        return i;
    }
    while i > 0 && class_at(buf, i - 1, style) == c && !splits(buf, i, style) {
        i -= 1;
    }
    i
}

/// Last char of the `count`-th previous word (`ge`). `None` when fewer than
/// `count` words precede `pos`.
pub fn prev_word_end(buf: &Buffer, pos: usize, count: usize, style: WordStyle) -> Option<usize> {
    let mut at = pos;
    for _ in 0..count.max(1) {
        at = prev_word_end_one(buf, at, style)?;
    }
    Some(at)
}

fn prev_word_end_one(buf: &Buffer, pos: usize, style: WordStyle) -> Option<usize> {
    let mut i = pos.min(buf.len());
    let c0 = class_at(buf, i, style);
    if c0 != Class::Blank {
        while i > 0 && class_at(buf, i - 1, style) == c0 && !splits(buf, i, style) {
            i -= 1;
        }
    }
    while i > 0 && class_at(buf, i - 1, style) == Class::Blank {
        i -= 1;
    }
    if i == 0 { None } else { Some(i - 1) }
}

/// Offset of the first non-blank char on `line`, or the line end when the
/// line is blank.
pub fn first_non_blank(buf: &Buffer, line: usize) -> usize {
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    (start..end)
        .find(|&i| buf.char_at(i).is_some_and(|c| c != ' ' && c != '\t'))
        .unwrap_or(end)
}

/// Caret position valid in a command mode: never on a line's newline
/// unless the line is empty.
pub fn normalize_caret(buf: &Buffer, offset: usize) -> usize {
    let line = buf.line_of(offset);
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    let at = offset.clamp(start, end);
    if at == end && end > start { end - 1 } else { at }
}

/// `count` chars left on the same line; `None` at column 0.
pub fn left(buf: &Buffer, pos: usize, count: usize) -> Option<usize> {
    let start = buf.line_start(buf.line_of(pos));
    if pos <= start {
        return None;
    }
    Some(pos.saturating_sub(count.max(1)).max(start))
}

/// `count` chars right on the same line. With `allow_end` the caret may land
/// on the line end (insert-like positioning).
pub fn right(buf: &Buffer, pos: usize, count: usize, allow_end: bool) -> Option<usize> {
    let line = buf.line_of(pos);
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    let last = if allow_end { end } else { end.saturating_sub(1).max(start) };
    if pos >= last {
        return None;
    }
    Some((pos + count.max(1)).min(last))
}

/// Same char column `delta` lines away, clamped to the target line's length.
pub fn vertical(buf: &Buffer, pos: usize, delta: isize) -> Option<usize> {
    let line = buf.line_of(pos);
    let target = line.checked_add_signed(delta)?;
    if target >= buf.line_count() {
        return None;
    }
    let col = pos - buf.line_start(line);
    Some(buf.line_start(target) + col.min(buf.line_len(target)))
}

/// Char span covering whole lines `first..=last`, including the final
/// newline when there is one.
pub fn line_span(buf: &Buffer, first: usize, last: usize) -> (usize, usize) {
    let last_line = buf.line_count().saturating_sub(1);
    let (first, last) = if first <= last { (first, last) } else { (last, first) };
    let last = last.min(last_line);
    (buf.line_start(first.min(last)), buf.next_line_start(last))
}

/// Widen a whole-line span that runs to the end of a buffer without a
/// trailing newline so it also takes the newline before it. Deleting the
/// result then leaves no empty line behind.
pub fn absorb_final_newline(buf: &Buffer, start: usize, end: usize) -> (usize, usize) {
    let ends_with_newline = end > start && buf.char_at(end - 1) == Some('\n');
    if end >= buf.len() && !ends_with_newline && start > 0 && buf.char_at(start - 1) == Some('\n') {
        (start - 1, end)
    } else {
        (start, end)
    }
}

/// [`line_span`] prepared for deletion (see [`absorb_final_newline`]).
pub fn linewise_span(buf: &Buffer, first: usize, last: usize) -> (usize, usize) {
    let (start, end) = line_span(buf, first, last);
    absorb_final_newline(buf, start, end)
}

/// True when the part of `offset`'s line before it holds a non-blank char.
/// The start of the buffer counts as blank.
pub fn non_blank_before(buf: &Buffer, offset: usize) -> bool {
    let start = buf.line_start(buf.line_of(offset));
    (start..offset.min(buf.len())).any(|i| buf.char_at(i).is_some_and(|c| !c.is_whitespace()))
}

/// True when the part of `offset`'s line from it onwards holds a non-blank
/// char. The end of the buffer counts as blank.
pub fn non_blank_after(buf: &Buffer, offset: usize) -> bool {
    let end = buf.line_end(buf.line_of(offset));
    (offset..end).any(|i| buf.char_at(i).is_some_and(|c| !c.is_whitespace()))
}
