//! Offset marks maintained by the engine.

use std::collections::HashMap;

/// Offset of the most recent change (`'.`).
pub const LAST_CHANGE: char = '.';
/// Start of the last changed or inserted text (`'[`).
pub const CHANGE_START: char = '[';
/// End of the last changed or inserted text (`']`).
pub const CHANGE_END: char = ']';
/// Caret position when the last insert session ended (`'^`).
pub const LAST_INSERT: char = '^';

pub trait MarkStore {
    fn set_mark(&mut self, name: char, offset: usize);
    fn mark(&self, name: char) -> Option<usize>;
}

/// In-process mark table. Marks are plain offsets; they are not shifted by
/// later edits.
#[derive(Debug, Default, Clone)]
pub struct Marks {
    table: HashMap<char, usize>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl MarkStore for Marks {
    fn set_mark(&mut self, name: char, offset: usize) {
        self.table.insert(name, offset);
    }

    fn mark(&self, name: char) -> Option<usize> {
        self.table.get(&name).copied()
    }
}
