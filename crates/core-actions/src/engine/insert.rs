//! Insert-entry commands (`i a I A gI gi o O`) and the editing commands
//! available inside an insert session (`Ctrl-W`, `Ctrl-U`, `Ctrl-Y`,
//! `Ctrl-E`, `Ctrl-A`, `Ctrl-R`, help).
//!
//! `o`/`O` insert their newline through the host's Enter action, which must
//! not run while the opening command is still being dispatched. The session
//! is opened right away and the newline is parked in the deferred slot; the
//! host drains it with [`Engine::run_deferred`] once the command returns.
//! The newline is recorded as the session's first stroke, so count replays
//! and repeats (`.`) open one line per run from the stroke log alone.

use core_model::Document;
use core_state::marks::{CHANGE_START, LAST_INSERT};
use core_state::{ActionRef, HostAction, InsertAction, Mode, RangeShape, Stroke};
use core_text::{TextRange, motion, motion::WordStyle};
use tracing::{debug, trace, warn};

use super::{DeferredAction, Engine};
use crate::error::{EditError, EditResult};

impl Engine {
    /// `i`
    pub fn insert_before_cursor(&mut self, doc: &mut dyn Document) -> EditResult {
        self.begin_session(doc, Mode::Insert)
    }

    /// `a`
    pub fn insert_after_cursor(&mut self, doc: &mut dyn Document) -> EditResult {
        if let Some(next) = motion::right(doc.buffer(), doc.cursor(), 1, true) {
            doc.set_cursor(next);
        }
        self.begin_session(doc, Mode::Insert)
    }

    /// `gI`
    pub fn insert_line_start(&mut self, doc: &mut dyn Document) -> EditResult {
        let buf = doc.buffer();
        let target = buf.line_start(buf.line_of(doc.cursor()));
        doc.set_cursor(target);
        self.begin_session(doc, Mode::Insert)
    }

    /// `I`
    pub fn insert_before_first_non_blank(&mut self, doc: &mut dyn Document) -> EditResult {
        let buf = doc.buffer();
        let target = motion::first_non_blank(buf, buf.line_of(doc.cursor()));
        doc.set_cursor(target);
        self.begin_session(doc, Mode::Insert)
    }

    /// `A`
    pub fn insert_after_line_end(&mut self, doc: &mut dyn Document) -> EditResult {
        let buf = doc.buffer();
        let target = buf.line_end(buf.line_of(doc.cursor()));
        doc.set_cursor(target);
        self.begin_session(doc, Mode::Insert)
    }

    /// `gi`: insert where the last session ended.
    pub fn insert_at_previous_insert(&mut self, doc: &mut dyn Document) -> EditResult {
        if let Some(offset) = self.marks.mark(LAST_INSERT) {
            doc.set_cursor(offset);
        }
        self.begin_session(doc, Mode::Insert)
    }

    /// `o`
    pub fn insert_new_line_below(&mut self, doc: &mut dyn Document) -> EditResult {
        self.ensure_slot_free()?;
        let buf = doc.buffer();
        let target = buf.line_end(buf.line_of(doc.cursor()));
        doc.set_cursor(target);
        self.open_line(doc, false)
    }

    /// `O`
    pub fn insert_new_line_above(&mut self, doc: &mut dyn Document) -> EditResult {
        self.ensure_slot_free()?;
        let buf = doc.buffer();
        let line = buf.line_of(doc.cursor());
        if line == 0 {
            let target = buf.line_start(0);
            doc.set_cursor(target);
            return self.open_line(doc, true);
        }
        let target = buf.line_start(line - 1);
        doc.set_cursor(target);
        self.insert_new_line_below(doc)
    }

    fn ensure_slot_free(&self) -> EditResult {
        if self.deferred.is_pending() {
            warn!(target: "actions.session", "open_line_refused_slot_busy");
            return Err(EditError::DeferredSlotBusy);
        }
        Ok(())
    }

    fn open_line(&mut self, doc: &mut dyn Document, above: bool) -> EditResult {
        if self.context.repeating() {
            // The recorded strokes start with the line break.
            return self.begin_session(doc, Mode::Insert);
        }
        self.begin_session(doc, Mode::Insert)?;
        self.deferred
            .schedule(DeferredAction::OpenLine { above })
            .map_err(|_| EditError::DeferredSlotBusy)
    }

    /// Run the parked follow-on action, if any.
    pub fn run_deferred(&mut self, doc: &mut dyn Document) -> EditResult {
        let Some(action) = self.deferred.take() else {
            return Ok(());
        };
        trace!(target: "actions.session", ?action, "deferred_run");
        match action {
            DeferredAction::OpenLine { above } => {
                if self.inserting() {
                    self.session
                        .strokes
                        .push(Stroke::Action(ActionRef::Insert(InsertAction::OpenLine { above })));
                }
                self.open_line_now(doc, above);
            }
        }
        Ok(())
    }

    /// Break a fresh line below (or above) the caret's line and move onto
    /// it. The session's strokes start there.
    pub(super) fn open_line_now(&mut self, doc: &mut dyn Document, above: bool) {
        self.bracket(doc, |engine, doc| {
            let buf = doc.buffer();
            let line = buf.line_of(doc.cursor());
            let target = if above { buf.line_start(line) } else { buf.line_end(line) };
            doc.set_cursor(target);
            engine.invoke_host(doc, &HostAction::EditorEnter);
            if above {
                let buf = doc.buffer();
                let line = buf.line_of(doc.cursor());
                if line > 0 {
                    let target = buf.line_start(line - 1);
                    doc.set_cursor(target);
                }
            }
        });
        let anchor = doc.cursor();
        self.session.anchor = anchor;
        self.marks.set_mark(CHANGE_START, anchor);
    }

    /// `Ctrl-A` (`exit == false`) and `Ctrl-@` (`exit == true`): type the
    /// last session's text again.
    pub fn insert_previous_insert(&mut self, doc: &mut dyn Document, exit: bool) -> EditResult {
        let strokes = self.last_strokes.clone();
        self.replay(doc, &strokes, 1)?;
        if exit {
            self.end_session(doc)?;
        }
        Ok(())
    }

    /// Help key inside a session: leave the session, then show help.
    pub fn insert_help(&mut self, doc: &mut dyn Document) -> EditResult {
        self.end_session(doc)?;
        self.invoke_host(doc, &HostAction::HelpTopics);
        Ok(())
    }

    /// `Ctrl-R {register}`: type the register's contents.
    pub fn insert_register(&mut self, doc: &mut dyn Document, name: char) -> EditResult {
        let Some(register) = self.registers.read(name) else {
            debug!(target: "actions.session", register = %name, "register_empty");
            return Err(EditError::RegisterEmpty(name));
        };
        self.bracket(doc, |engine, doc| {
            for ch in register.text.chars() {
                engine.capture_char(doc, ch);
            }
        });
        Ok(())
    }

    /// `Ctrl-Y` (`dir == -1`) / `Ctrl-E` (`dir == 1`): type the char at the
    /// caret's column on the line above or below.
    pub fn insert_character_around_cursor(&mut self, doc: &mut dyn Document, dir: isize) -> EditResult {
        let buf = doc.buffer();
        let cursor = doc.cursor();
        let line = buf.line_of(cursor);
        let col = cursor - buf.line_start(line);
        let Some(target) = line
            .checked_add_signed(dir)
            .filter(|&l| l < buf.line_count())
        else {
            return Err(EditError::OutOfBounds(cursor));
        };
        if col >= buf.line_len(target) {
            return Err(EditError::OutOfBounds(cursor));
        }
        let Some(ch) = buf.char_at(buf.line_start(target) + col) else {
            return Err(EditError::OutOfBounds(cursor));
        };
        self.capture_char(doc, ch);
        Ok(())
    }

    /// `Ctrl-U`: delete what was typed on this line in the session, or the
    /// line's text before the caret when nothing was typed.
    pub fn insert_delete_inserted_text(&mut self, doc: &mut dyn Document) -> EditResult {
        let buf = doc.buffer();
        let cursor = doc.cursor();
        let line_start = buf.line_start(buf.line_of(cursor));
        let anchor = self.session.anchor;
        let to = if anchor < cursor && anchor >= line_start {
            anchor
        } else {
            let first = motion::first_non_blank(buf, buf.line_of(cursor));
            if first < cursor { first } else { line_start }
        };
        self.delete_back_to(doc, to)
    }

    /// `Ctrl-W`: delete the word before the caret, stopping once at the
    /// point where the session started.
    pub fn insert_delete_previous_word(&mut self, doc: &mut dyn Document) -> EditResult {
        let cursor = doc.cursor();
        let word = motion::prev_word_start(doc.buffer(), cursor, 1, WordStyle::Word);
        let anchor = self.session.anchor;
        let to = if anchor < cursor && word < anchor {
            anchor
        } else {
            word
        };
        self.delete_back_to(doc, to)
    }

    fn delete_back_to(&mut self, doc: &mut dyn Document, to: usize) -> EditResult {
        let cursor = doc.cursor();
        if to >= cursor {
            return Ok(());
        }
        self.delete_range(doc, &TextRange::new(to, cursor), RangeShape::Exclusive, true)?;
        doc.set_cursor(to);
        self.session.anchor = self.session.anchor.min(to);
        trace!(target: "actions.session", from = cursor, to, "deleted_back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActionInvoker, BuiltinActions};
    use core_config::Config;
    use core_model::EditorModel;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn entry_points_position_the_caret() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("  abc\n").with_cursor(3);
        engine.insert_after_cursor(&mut doc).unwrap();
        assert_eq!(doc.cursor(), 4);
        engine.end_session(&mut doc).unwrap();
        engine.insert_before_first_non_blank(&mut doc).unwrap();
        assert_eq!(doc.cursor(), 2);
        engine.end_session(&mut doc).unwrap();
        engine.insert_after_line_end(&mut doc).unwrap();
        assert_eq!(doc.cursor(), 5);
        engine.end_session(&mut doc).unwrap();
        engine.insert_line_start(&mut doc).unwrap();
        assert_eq!(doc.cursor(), 0);
        engine.end_session(&mut doc).unwrap();
        doc.set_cursor(4);
        engine.insert_at_previous_insert(&mut doc).unwrap();
        assert_eq!(doc.cursor(), 0);
    }

    #[test]
    fn open_line_above_first_line() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc").with_cursor(2);
        engine.insert_new_line_above(&mut doc).unwrap();
        assert!(engine.deferred_pending());
        assert_eq!(
            engine.insert_new_line_below(&mut doc),
            Err(EditError::DeferredSlotBusy)
        );
        engine.run_deferred(&mut doc).unwrap();
        assert_eq!(doc.text(), "\nabc");
        assert_eq!(doc.cursor(), 0);
        assert_eq!(engine.session_anchor(), 0);
    }

    /// Host that logs every action it is asked to run.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<HostAction>>>);

    impl ActionInvoker for Recorder {
        fn invoke(&mut self, action: &HostAction, doc: &mut dyn Document) -> bool {
            self.0.lock().unwrap().push(action.clone());
            BuiltinActions.invoke(action, doc)
        }
    }

    #[test]
    fn help_leaves_the_session_then_asks_the_host() {
        let host = Recorder::default();
        let mut engine = Engine::builder(Config::default()).invoker(host.clone()).build();
        let mut doc = EditorModel::from_text("ab");
        engine.insert_before_cursor(&mut doc).unwrap();
        engine.insert_help(&mut doc).unwrap();
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(host.0.lock().unwrap().last(), Some(&HostAction::HelpTopics));
    }

    #[test]
    fn deferred_line_break_is_recorded_first() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("ab");
        engine.insert_new_line_below(&mut doc).unwrap();
        assert!(engine.strokes().is_empty());
        engine.run_deferred(&mut doc).unwrap();
        engine.capture_char(&mut doc, 'x');
        assert_eq!(
            engine.strokes(),
            &[
                Stroke::Action(ActionRef::Insert(InsertAction::OpenLine { above: false })),
                Stroke::Char('x'),
            ]
        );
        assert_eq!(doc.text(), "ab\nx");
    }

    #[test]
    fn open_line_above_later_line_uses_previous_line_end() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("ab\ncd").with_cursor(4);
        engine.insert_new_line_above(&mut doc).unwrap();
        engine.run_deferred(&mut doc).unwrap();
        engine.capture_char(&mut doc, 'x');
        assert_eq!(doc.text(), "ab\nx\ncd");
    }

    #[test]
    fn character_above_and_below() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc\n\nxyz").with_cursor(4);
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        engine.insert_character_around_cursor(&mut doc, -1).unwrap();
        engine.insert_character_around_cursor(&mut doc, 1).unwrap();
        assert_eq!(doc.text(), "abc\nay\nxyz");
        doc.set_cursor(0);
        assert_eq!(
            engine.insert_character_around_cursor(&mut doc, -1),
            Err(EditError::OutOfBounds(0))
        );
    }

    #[test]
    fn ctrl_w_stops_at_session_start() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("foo ").with_cursor(4);
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        for ch in "ba".chars() {
            engine.capture_char(&mut doc, ch);
        }
        engine.insert_delete_previous_word(&mut doc).unwrap();
        assert_eq!(doc.text(), "foo ");
        engine.insert_delete_previous_word(&mut doc).unwrap();
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn ctrl_u_removes_typed_text_then_line() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("  ab").with_cursor(4);
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        engine.capture_char(&mut doc, 'c');
        engine.insert_delete_inserted_text(&mut doc).unwrap();
        assert_eq!(doc.text(), "  ab");
        engine.insert_delete_inserted_text(&mut doc).unwrap();
        assert_eq!(doc.text(), "  ");
        assert_eq!(doc.cursor(), 2);
    }

    #[test]
    fn register_insert_types_contents() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("hello world");
        engine.delete_text(&mut doc, 0, 6, RangeShape::Exclusive).unwrap();
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        engine.insert_register(&mut doc, '"').unwrap();
        assert_eq!(doc.text(), "hello world");
        assert_eq!(
            engine.insert_register(&mut doc, 'q'),
            Err(EditError::RegisterEmpty('q'))
        );
    }
}
