//! Seams between the engine and the host editor.
//!
//! * [`MotionResolver`] turns a motion argument into a concrete range. The
//!   engine asks it twice for `cw`: once to probe where the word ends, then
//!   again for the (possibly rewritten) motion.
//! * [`ActionInvoker`] runs host-owned editor actions. The engine never
//!   implements newline insertion, overwrite toggling or help itself; it
//!   only decides when they run.

use core_model::Document;
use core_state::{Argument, HostAction, MotionKind};
use core_text::{TextRange, motion};

pub trait MotionResolver {
    /// Range selected by `argument` from the caret. `count` is the operator
    /// count; it multiplies the motion's own count. The resolver may rewrite
    /// the argument's flags in place. `None` when the motion cannot move.
    fn resolve(
        &mut self,
        doc: &dyn Document,
        count: u32,
        raw_count: u32,
        argument: &mut Argument,
    ) -> Option<TextRange>;

    /// Offset `kind` reaches from `from` after `count` applications.
    fn target(&mut self, doc: &dyn Document, from: usize, count: usize, kind: MotionKind)
    -> Option<usize>;
}

pub trait ActionInvoker {
    /// Run `action` against `doc`. Returns false when the host does not
    /// handle it.
    fn invoke(&mut self, action: &HostAction, doc: &mut dyn Document) -> bool;
}

/// Minimal host actions for embedders without an editor component of their
/// own (and for tests). Newlines are inserted without auto-indent.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinActions;

impl ActionInvoker for BuiltinActions {
    fn invoke(&mut self, action: &HostAction, doc: &mut dyn Document) -> bool {
        let at = doc.cursor();
        match action {
            HostAction::EditorEnter => {
                doc.splice(at, at, "\n");
                true
            }
            HostAction::ToggleInsertState => {
                let on = !doc.overwrite();
                doc.set_overwrite(on);
                true
            }
            HostAction::Backspace => {
                if at == 0 {
                    return false;
                }
                doc.splice(at - 1, at, "");
                true
            }
            HostAction::DeleteForward => {
                if at >= doc.buffer().len() {
                    return false;
                }
                doc.splice(at, at + 1, "");
                true
            }
            HostAction::Tab => {
                doc.type_char('\t');
                true
            }
            HostAction::AutoIndentLines { first, last } => {
                auto_indent(doc, *first, *last);
                true
            }
            HostAction::HelpTopics | HostAction::Named(_) => false,
        }
    }
}

/// Give every line of `first..=last` the indent of the closest non-blank
/// line above `first`. Blank lines lose their whitespace.
fn auto_indent(doc: &mut dyn Document, first: usize, last: usize) {
    let buf = doc.buffer();
    let indent = (0..first)
        .rev()
        .find(|&l| motion::first_non_blank(buf, l) < buf.line_end(l))
        .map(|l| buf.slice(buf.line_start(l), motion::first_non_blank(buf, l)))
        .unwrap_or_default();
    let last = last.min(buf.line_count().saturating_sub(1));
    for line in (first..=last).rev() {
        let buf = doc.buffer();
        let start = buf.line_start(line);
        let body = motion::first_non_blank(buf, line);
        let replacement = if body == buf.line_end(line) { "" } else { indent.as_str() };
        doc.splice(start, body, replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::EditorModel;

    #[test]
    fn builtin_enter_and_toggle() {
        let mut doc = EditorModel::from_text("ab").with_cursor(1);
        let mut host = BuiltinActions;
        assert!(host.invoke(&HostAction::EditorEnter, &mut doc));
        assert_eq!(doc.text(), "a\nb");
        assert_eq!(doc.cursor(), 2);
        assert!(host.invoke(&HostAction::ToggleInsertState, &mut doc));
        assert!(doc.overwrite());
    }

    #[test]
    fn builtin_deletes_stop_at_buffer_edges() {
        let mut doc = EditorModel::from_text("ab");
        let mut host = BuiltinActions;
        assert!(!host.invoke(&HostAction::Backspace, &mut doc));
        assert!(host.invoke(&HostAction::DeleteForward, &mut doc));
        assert_eq!(doc.text(), "b");
        assert!(!host.invoke(&HostAction::HelpTopics, &mut doc));
    }

    #[test]
    fn builtin_auto_indent_follows_line_above() {
        let mut doc = EditorModel::from_text("  a
b
	
      c
");
        let mut host = BuiltinActions;
        assert!(host.invoke(&HostAction::AutoIndentLines { first: 1, last: 3 }, &mut doc));
        assert_eq!(doc.text(), "  a
  b

  c
");
    }
}
