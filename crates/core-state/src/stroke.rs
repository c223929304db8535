//! Stroke log of an insert session.

use crate::command::ActionRef;

/// One recorded input of an insert session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stroke {
    /// A typed character.
    Char(char),
    /// An action flagged for recording.
    Action(ActionRef),
}

#[derive(Debug, Default, Clone)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
}

impl StrokeLog {
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn as_slice(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Frozen copy used as the repeat source.
    pub fn snapshot(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }
}
