//! Stroke capture and replay.
//!
//! The stroke log records what was typed during a session as either chars or
//! action references. Replaying feeds chars back through [`Engine::capture_char`]
//! and performs actions through the same paths live input takes, so a replay
//! reproduces the session exactly (and re-records it when a session is open).
//!
//! Replays nest: a recorded "insert previous text" replays the last strokes
//! from inside a replay. Nesting is capped by the configured depth.

use core_model::Document;
use core_state::{ActionRef, Command, CommandFlags, InsertAction, Stroke};
use tracing::{trace, warn};

use super::Engine;
use super::transform::IndentDirection;
use crate::error::{EditError, EditResult};

fn self_recording(action: &ActionRef) -> bool {
    matches!(action, ActionRef::Insert(a) if a.records_itself())
}

impl Engine {
    /// Type `ch` at the caret through the host's typing path, recording it
    /// when a session is open. Control chars other than newline and tab are
    /// refused.
    pub fn capture_char(&mut self, doc: &mut dyn Document, ch: char) -> bool {
        if ch.is_control() && ch != '\n' && ch != '\t' {
            trace!(target: "actions.repeat", code = ch as u32, "control_char_refused");
            return false;
        }
        if self.inserting() {
            self.session.strokes.push(Stroke::Char(ch));
        }
        self.bracket(doc, |_, doc| doc.type_char(ch));
        true
    }

    /// Inspect a command that just ran in a session. Commands flagged
    /// `SAVE_STROKE` are recorded (returns true); `CLEAR_STROKES` restarts
    /// the recording at the caret.
    pub fn capture_command(&mut self, doc: &dyn Document, command: &Command) -> bool {
        if command.flags.contains(CommandFlags::SAVE_STROKE) {
            if !self_recording(&command.action) {
                self.session
                    .strokes
                    .push(Stroke::Action(command.action.clone()));
            }
            trace!(target: "actions.repeat", action = ?command.action, "stroke_saved");
            return true;
        }
        if command.flags.contains(CommandFlags::CLEAR_STROKES) {
            self.clear_strokes(doc);
        }
        false
    }

    /// Re-run `strokes` `times` times inside one undo unit.
    pub fn replay(&mut self, doc: &mut dyn Document, strokes: &[Stroke], times: u32) -> EditResult {
        if self.replay_depth >= self.max_replay_depth {
            warn!(target: "actions.repeat", depth = self.replay_depth, max = self.max_replay_depth, "replay_depth_exceeded");
            return Err(EditError::ReplayDepthExceeded(self.max_replay_depth));
        }
        self.replay_depth += 1;
        trace!(target: "actions.repeat", times, strokes = strokes.len(), depth = self.replay_depth, "replay");
        let result = self.bracket(doc, |engine, doc| {
            for _ in 0..times {
                for stroke in strokes {
                    engine.replay_stroke(doc, stroke)?;
                }
            }
            Ok(())
        });
        self.replay_depth -= 1;
        result
    }

    fn replay_stroke(&mut self, doc: &mut dyn Document, stroke: &Stroke) -> EditResult {
        match stroke {
            Stroke::Char(ch) => {
                self.capture_char(doc, *ch);
                Ok(())
            }
            Stroke::Action(action) => {
                self.perform(doc, action)?;
                if self.inserting() && !self_recording(action) {
                    self.session.strokes.push(stroke.clone());
                }
                Ok(())
            }
        }
    }

    fn perform(&mut self, doc: &mut dyn Document, action: &ActionRef) -> EditResult {
        match action {
            ActionRef::Host(host) => {
                self.invoke_host(doc, host);
                Ok(())
            }
            ActionRef::Motion(kind) => {
                let from = doc.cursor();
                if let Some(to) = self.resolver.target(&*doc, from, 1, *kind) {
                    doc.set_cursor(to);
                }
                Ok(())
            }
            ActionRef::Insert(insert) => self.insert_action(doc, *insert),
        }
    }

    /// Run an insert-mode command implemented by the engine.
    pub fn insert_action(&mut self, doc: &mut dyn Document, action: InsertAction) -> EditResult {
        match action {
            InsertAction::Enter => {
                self.process_enter(doc);
                Ok(())
            }
            InsertAction::DeletePreviousWord => self.insert_delete_previous_word(doc),
            InsertAction::DeleteInsertedText => self.insert_delete_inserted_text(doc),
            InsertAction::CharacterAbove => self.insert_character_around_cursor(doc, -1),
            InsertAction::CharacterBelow => self.insert_character_around_cursor(doc, 1),
            InsertAction::PreviousInsert => self.insert_previous_insert(doc, false),
            InsertAction::ShiftRight => self.indent_lines(doc, 1, IndentDirection::Right),
            InsertAction::ShiftLeft => self.indent_lines(doc, 1, IndentDirection::Left),
            InsertAction::Register(name) => self.insert_register(doc, name),
            InsertAction::OpenLine { above } => {
                self.open_line_now(doc, above);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Config;
    use core_model::EditorModel;
    use core_state::{HostAction, Mode, MotionKind};

    #[test]
    fn control_chars_are_refused() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("");
        assert!(!engine.capture_char(&mut doc, '\u{1b}'));
        assert!(engine.capture_char(&mut doc, '\t'));
        assert_eq!(doc.text(), "\t");
    }

    #[test]
    fn saved_commands_are_recorded_and_replayed() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("ab");
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        engine.capture_char(&mut doc, 'x');
        let enter = Command::host(HostAction::EditorEnter).with_flags(CommandFlags::SAVE_STROKE);
        engine.insert_action(&mut doc, InsertAction::Enter).unwrap();
        assert!(engine.capture_command(&doc, &enter));
        assert_eq!(
            engine.strokes(),
            &[Stroke::Char('x'), Stroke::Action(ActionRef::Host(HostAction::EditorEnter))]
        );
        engine.end_session(&mut doc).unwrap();
        assert_eq!(doc.text(), "x\nab");

        let strokes = engine.last_strokes().to_vec();
        engine.replay(&mut doc, &strokes, 2).unwrap();
        assert_eq!(doc.text(), "x\nx\nx\nab");
    }

    #[test]
    fn clear_strokes_command_moves_anchor() {
        let mut engine = Engine::default();
        let mut doc = EditorModel::from_text("abc");
        engine.begin_session(&mut doc, Mode::Insert).unwrap();
        engine.capture_char(&mut doc, 'x');
        doc.set_cursor(3);
        let motion = Command::motion(MotionKind::Right).with_flags(CommandFlags::CLEAR_STROKES);
        assert!(!engine.capture_command(&doc, &motion));
        assert!(engine.strokes().is_empty());
        assert_eq!(engine.session_anchor(), 3);
    }

    #[test]
    fn nested_replays_hit_the_depth_cap() {
        let mut cfg = Config::default();
        cfg.file.repeat.max_depth = 2;
        cfg.resolve();
        let mut engine = Engine::new(cfg);
        let mut doc = EditorModel::from_text("");
        // A recording that replays itself never terminates on its own.
        engine.last_strokes = vec![
            Stroke::Char('a'),
            Stroke::Action(ActionRef::Insert(InsertAction::PreviousInsert)),
        ];
        let strokes = engine.last_strokes.clone();
        assert_eq!(
            engine.replay(&mut doc, &strokes, 1),
            Err(EditError::ReplayDepthExceeded(2))
        );
        // Everything typed before the cap stays; the replay depth unwinds.
        assert_eq!(doc.text(), "aa");
        assert_eq!(engine.replay_depth, 0);
    }
}
