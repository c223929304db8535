//! Insert session lifecycle.
//!
//! A session starts when an insert-entry command pushes `Insert` or
//! `Replace` and ends on Escape. While it is open every typed char and every
//! command flagged `SAVE_STROKE` is recorded. On exit the recording becomes
//! the "last strokes": it is replayed `count - 1` more times right away and
//! again whenever the change is repeated with `.`.
//!
//! When the dispatch layer re-runs a change (`repeating()` is set) session
//! entry does not open anything: the last strokes are replayed in place and
//! the mode stack is left alone.

use core_events::{EngineEvent, note_session_replayed, note_session_started};
use core_model::Document;
use core_state::marks::{CHANGE_END, CHANGE_START, LAST_INSERT};
use core_state::{Command, HostAction, Mode};
use tracing::{debug, trace};

use super::Engine;
use crate::error::EditResult;

impl Engine {
    /// Enter `mode` (`Insert` or `Replace`) at the caret.
    pub fn begin_session(&mut self, doc: &mut dyn Document, mode: Mode) -> EditResult {
        let anchor = doc.cursor();
        self.session.anchor = anchor;
        self.marks.set_mark(CHANGE_START, anchor);

        if self.context.repeating() {
            let times = self.context.command().map_or(1, Command::repeat_count);
            let strokes = self.last_strokes.clone();
            let replace = mode == Mode::Replace;
            if replace {
                self.toggle_host_overwrite(doc);
            }
            let result = self.replay(doc, &strokes, times);
            if replace {
                self.toggle_host_overwrite(doc);
            }
            result?;
            note_session_replayed();
            debug!(target: "actions.session", ?mode, times, strokes = strokes.len(), "session_replayed");
            self.emit(EngineEvent::SessionReplayed {
                strokes: strokes.len(),
            });
            return Ok(());
        }

        if !self.session.open {
            self.undo.begin(doc.buffer(), anchor);
            self.session.open = true;
        }
        self.session.command = self.context.command().cloned();
        self.session.strokes.clear();
        if mode == Mode::Replace {
            self.toggle_host_overwrite(doc);
        }
        let from = self.context.mode();
        self.context.modes_mut().push(mode);
        doc.set_block_cursor(false);
        note_session_started();
        debug!(target: "actions.session", ?from, ?mode, anchor, "session_started");
        self.emit(EngineEvent::ModeChanged { from, to: mode });
        self.emit(EngineEvent::SessionStarted { mode, anchor });
        self.emit(EngineEvent::CursorShape { block: false });
        Ok(())
    }

    /// Leave the current insert session (Escape). Outside an insert-like
    /// mode this does nothing.
    pub fn end_session(&mut self, doc: &mut dyn Document) -> EditResult {
        let mode = self.context.mode();
        if !mode.is_insert_like() {
            trace!(target: "actions.session", ?mode, "end_session_outside_insert");
            return Ok(());
        }
        if mode == Mode::Replace {
            self.toggle_host_overwrite(doc);
        }
        self.last_strokes = self.session.strokes.snapshot();
        let times = self
            .session
            .command
            .as_ref()
            .map_or(1, Command::repeat_count);
        let replays = times.saturating_sub(1);
        let result = if replays > 0 {
            let strokes = self.last_strokes.clone();
            self.replay(doc, &strokes, replays)
        } else {
            Ok(())
        };

        let cursor = doc.cursor();
        self.marks.set_mark(LAST_INSERT, cursor);
        self.marks.set_mark(CHANGE_END, cursor);
        self.context.modes_mut().pop();
        let to = self.context.mode();
        if !to.is_insert_like() {
            doc.set_block_cursor(true);
            self.emit(EngineEvent::CursorShape { block: true });
        }
        if self.session.open {
            self.session.open = false;
            self.undo.end(doc.buffer());
        }
        self.session.command = None;
        debug!(target: "actions.session", ?mode, ?to, replays, strokes = self.last_strokes.len(), "session_ended");
        self.emit(EngineEvent::ModeChanged { from: mode, to });
        self.emit(EngineEvent::SessionEnded { mode, replays });
        result
    }

    /// Insert key: flip the host between inserting and overwriting and keep
    /// the mode stack in step.
    pub fn toggle_overwrite(&mut self, doc: &mut dyn Document) {
        self.toggle_host_overwrite(doc);
        let from = self.context.mode();
        let to = match from {
            Mode::Insert => Mode::Replace,
            Mode::Replace => Mode::Insert,
            _ => return,
        };
        self.context.modes_mut().set_current(to);
        debug!(target: "actions.session", ?from, ?to, "overwrite_toggled");
        self.emit(EngineEvent::ModeChanged { from, to });
    }

    /// `Ctrl-O`: run one command-mode command from inside a session.
    pub fn begin_single_command(&mut self, doc: &mut dyn Document) {
        let from = self.context.mode();
        self.context.modes_mut().push(Mode::SingleCommand);
        self.clear_strokes(doc);
        trace!(target: "actions.session", ?from, "single_command_started");
        self.emit(EngineEvent::ModeChanged {
            from,
            to: Mode::SingleCommand,
        });
    }

    /// Return from a single command to the session it interrupted.
    pub fn end_single_command(&mut self) {
        if self.context.mode() != Mode::SingleCommand {
            return;
        }
        self.context.modes_mut().pop();
        let to = self.context.mode();
        trace!(target: "actions.session", ?to, "single_command_ended");
        self.emit(EngineEvent::ModeChanged {
            from: Mode::SingleCommand,
            to,
        });
    }

    /// Enter pressed in a session. In replace mode the newline is inserted,
    /// never typed over a char.
    pub fn process_enter(&mut self, doc: &mut dyn Document) {
        let replace = self.context.mode() == Mode::Replace;
        self.bracket(doc, |engine, doc| {
            if replace {
                engine.toggle_host_overwrite(doc);
            }
            engine.invoke_host(doc, &HostAction::EditorEnter);
            if replace {
                engine.toggle_host_overwrite(doc);
            }
        });
    }

    /// A pointer click moved the caret; strokes recorded so far no longer
    /// replay meaningfully.
    pub fn on_pointer_click(&mut self, doc: &mut dyn Document) {
        if self.inserting() {
            self.clear_strokes(doc);
        }
    }

    /// The editor lost or changed focus: drop back to the resting mode,
    /// abandoning any session.
    pub fn on_focus_changed(&mut self, doc: &mut dyn Document) {
        let from = self.context.mode();
        self.context.modes_mut().reset();
        self.session.strokes.clear();
        self.session.command = None;
        if self.session.open {
            self.session.open = false;
            self.undo.end(doc.buffer());
        }
        self.deferred.clear();
        if doc.overwrite() {
            doc.set_overwrite(false);
            self.emit(EngineEvent::OverwriteToggled(false));
        }
        doc.set_block_cursor(true);
        let to = self.context.mode();
        debug!(target: "actions.session", ?from, ?to, "focus_reset");
        if from != to {
            self.emit(EngineEvent::ModeChanged { from, to });
        }
        self.emit(EngineEvent::CursorShape { block: true });
    }

    /// Forget the session's strokes and restart them at the caret.
    pub fn clear_strokes(&mut self, doc: &dyn Document) {
        self.session.strokes.clear();
        self.session.anchor = doc.cursor();
        trace!(target: "actions.session", anchor = self.session.anchor, "strokes_cleared");
        self.emit(EngineEvent::StrokesCleared);
    }

    fn toggle_host_overwrite(&mut self, doc: &mut dyn Document) {
        self.invoke_host(doc, &HostAction::ToggleInsertState);
        self.emit(EngineEvent::OverwriteToggled(doc.overwrite()));
    }

    pub(super) fn invoke_host(&mut self, doc: &mut dyn Document, action: &HostAction) -> bool {
        let handled = self.invoker.invoke(action, doc);
        if !handled {
            debug!(target: "actions.session", ?action, "host_action_unhandled");
        }
        handled
    }
}
