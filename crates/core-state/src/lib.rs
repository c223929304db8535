//! Engine state: command model, mode stack, stroke log, registers, marks and
//! the undo engine.
//!
//! Mode Stack:
//! - The stack is never empty; its bottom is the mode the editor rests in
//!   (normally `Normal`). Insert sessions push `Insert` or `Replace`; the
//!   one-shot command escape from insert mode pushes `SingleCommand`.
//! - `pop` refuses to remove the bottom entry so that an unbalanced escape
//!   cannot leave the editor without a mode.
//!
//! Command Context:
//! - Carries the command currently being dispatched and the repeat flag the
//!   dispatch layer raises while re-running the last change (`.`). Session
//!   entry reads both.
//!
//! Collaborator traits (`RegisterStore`, `MarkStore`, `UndoBoundary`) live
//! next to their in-process implementations so hosts can either use those or
//! plug in their own.

pub mod command;
pub mod marks;
pub mod registers;
pub mod stroke;
pub mod undo;

pub use command::{
    ActionRef, Argument, Command, CommandFlags, HostAction, InsertAction, MotionKind, RangeShape,
};
pub use marks::{MarkStore, Marks};
pub use registers::{Register, RegisterError, RegisterStore, Registers};
pub use stroke::{Stroke, StrokeLog};
pub use undo::{UNDO_HISTORY_MAX, UndoBoundary, UndoEngine};

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Normal command/navigation mode.
    Normal,
    /// Text entry inserting before the caret.
    Insert,
    /// Text entry overwriting the char under the caret.
    Replace,
    /// One command executed from an insert session (`Ctrl-O`).
    SingleCommand,
}

impl Mode {
    pub fn is_insert_like(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }
}

#[derive(Debug, Clone)]
pub struct ModeStack {
    stack: Vec<Mode>,
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new(Mode::Normal)
    }
}

impl ModeStack {
    pub fn new(base: Mode) -> Self {
        Self { stack: vec![base] }
    }

    pub fn current(&self) -> Mode {
        self.stack.last().copied().unwrap_or(Mode::Normal)
    }

    pub fn push(&mut self, mode: Mode) {
        self.stack.push(mode);
    }

    /// Pop the top mode. The bottom entry stays; `None` when only it remains.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Replace the top mode (the bottom one when nothing is pushed).
    pub fn set_current(&mut self, mode: Mode) {
        if let Some(top) = self.stack.last_mut() {
            *top = mode;
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop everything above the bottom entry.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }

    pub fn in_insert_like(&self) -> bool {
        self.current().is_insert_like()
    }
}

/// Dispatch context shared between the key layer and the engine.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    modes: ModeStack,
    command: Option<Command>,
    repeating: bool,
}

impl CommandContext {
    pub fn modes(&self) -> &ModeStack {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeStack {
        &mut self.modes
    }

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    /// Command currently being dispatched.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub fn set_command(&mut self, command: Command) {
        self.command = Some(command);
    }

    pub fn clear_command(&mut self) {
        self.command = None;
    }

    /// True while the last change is being re-run.
    pub fn repeating(&self) -> bool {
        self.repeating
    }

    pub fn set_repeating(&mut self, on: bool) {
        self.repeating = on;
    }
}
