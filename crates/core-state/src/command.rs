//! Command model handed to the engine by the key-dispatch layer.
//!
//! A [`Command`] is the already-parsed form of a key sequence: a count, the
//! raw (user typed) count, behaviour flags and a reference to the action it
//! runs. Operators additionally receive an [`Argument`] wrapping the motion
//! command that selects their range.

use bitflags::bitflags;

bitflags! {
    /// Behaviour and range-shape flags carried by a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u32 {
        /// Command runs once on repeat regardless of its count.
        const NO_REPEAT = 1 << 0;
        /// Command is recorded into the active insert session's stroke log.
        const SAVE_STROKE = 1 << 1;
        /// Command resets the stroke log and the session anchor.
        const CLEAR_STROKES = 1 << 2;
        const LINEWISE = 1 << 3;
        const EXCLUSIVE = 1 << 4;
        const INCLUSIVE = 1 << 5;
    }
}

const SHAPE_BITS: CommandFlags = CommandFlags::LINEWISE
    .union(CommandFlags::EXCLUSIVE)
    .union(CommandFlags::INCLUSIVE);

impl CommandFlags {
    /// Range shape encoded in the flags. No shape bit reads as exclusive.
    pub fn shape(self) -> RangeShape {
        if self.contains(Self::LINEWISE) {
            RangeShape::Linewise
        } else if self.contains(Self::INCLUSIVE) {
            RangeShape::Inclusive
        } else {
            RangeShape::Exclusive
        }
    }

    /// Same flags with the shape bits swapped for `shape`.
    pub fn with_shape(self, shape: RangeShape) -> Self {
        self.difference(SHAPE_BITS) | shape.flag()
    }
}

/// How a motion's range is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeShape {
    /// Whole lines.
    Linewise,
    /// End offset excluded.
    Exclusive,
    /// End offset included.
    Inclusive,
}

impl RangeShape {
    pub fn flag(self) -> CommandFlags {
        match self {
            RangeShape::Linewise => CommandFlags::LINEWISE,
            RangeShape::Exclusive => CommandFlags::EXCLUSIVE,
            RangeShape::Inclusive => CommandFlags::INCLUSIVE,
        }
    }
}

/// Motions the reference resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    WordRight,
    BigWordRight,
    CamelRight,
    WordEndRight,
    BigWordEndRight,
    CamelEndRight,
    WordLeft,
    BigWordLeft,
    WordEndLeft,
    BigWordEndLeft,
    CamelEndLeft,
    LineStart,
    FirstNonBlank,
    LineEnd,
    FirstLine,
    LastLine,
}

impl MotionKind {
    /// Shape a freshly parsed motion carries.
    pub fn default_shape(self) -> RangeShape {
        match self {
            MotionKind::Up | MotionKind::Down | MotionKind::FirstLine | MotionKind::LastLine => {
                RangeShape::Linewise
            }
            MotionKind::WordEndRight
            | MotionKind::BigWordEndRight
            | MotionKind::CamelEndRight
            | MotionKind::WordEndLeft
            | MotionKind::BigWordEndLeft
            | MotionKind::CamelEndLeft
            | MotionKind::LineEnd => RangeShape::Inclusive,
            _ => RangeShape::Exclusive,
        }
    }

    /// Forward word-class motions (`w`, `W` and the camel variant).
    pub fn is_forward_word(self) -> bool {
        matches!(
            self,
            MotionKind::WordRight | MotionKind::BigWordRight | MotionKind::CamelRight
        )
    }

    /// Matching end-of-word motion for a forward word motion.
    pub fn word_end_variant(self) -> Option<MotionKind> {
        match self {
            MotionKind::WordRight => Some(MotionKind::WordEndRight),
            MotionKind::BigWordRight => Some(MotionKind::BigWordEndRight),
            MotionKind::CamelRight => Some(MotionKind::CamelEndRight),
            _ => None,
        }
    }

    /// Backward end-of-word motion (`ge` family) matching a forward one.
    pub fn reverse_end_variant(self) -> Option<MotionKind> {
        match self {
            MotionKind::WordEndRight => Some(MotionKind::WordEndLeft),
            MotionKind::BigWordEndRight => Some(MotionKind::BigWordEndLeft),
            MotionKind::CamelEndRight => Some(MotionKind::CamelEndLeft),
            _ => None,
        }
    }
}

/// Editor actions owned by the host. The engine invokes them but never
/// implements them itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostAction {
    /// Host newline insertion (may auto-indent).
    EditorEnter,
    /// Flip the host's insert/overwrite typing state.
    ToggleInsertState,
    Backspace,
    DeleteForward,
    Tab,
    HelpTopics,
    /// Re-indent lines `first..=last` the way the host's formatter would.
    AutoIndentLines { first: usize, last: usize },
    /// Any other host action addressed by id.
    Named(String),
}

/// Insert-mode commands implemented by the engine itself. Recording them as
/// strokes lets a repeat re-run the full engine logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertAction {
    Enter,
    DeletePreviousWord,
    DeleteInsertedText,
    CharacterAbove,
    CharacterBelow,
    PreviousInsert,
    ShiftRight,
    ShiftLeft,
    Register(char),
    /// The line break that opens the line of `o`/`O`.
    OpenLine { above: bool },
}

impl InsertAction {
    /// Actions whose effect is recorded as the strokes it produces (typed
    /// chars, replayed strokes) rather than as the action itself.
    pub fn records_itself(self) -> bool {
        matches!(
            self,
            InsertAction::CharacterAbove
                | InsertAction::CharacterBelow
                | InsertAction::PreviousInsert
                | InsertAction::Register(_)
        )
    }
}

/// What a command (or a recorded stroke) runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionRef {
    Host(HostAction),
    Motion(MotionKind),
    Insert(InsertAction),
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Effective count, at least 1.
    pub count: u32,
    /// Count as typed; 0 when none was given.
    pub raw_count: u32,
    pub flags: CommandFlags,
    pub action: ActionRef,
}

impl Command {
    pub fn new(action: ActionRef) -> Self {
        Self {
            count: 1,
            raw_count: 0,
            flags: CommandFlags::empty(),
            action,
        }
    }

    /// Motion command carrying the motion's default shape.
    pub fn motion(kind: MotionKind) -> Self {
        let mut cmd = Self::new(ActionRef::Motion(kind));
        cmd.flags = kind.default_shape().flag();
        cmd
    }

    pub fn host(action: HostAction) -> Self {
        Self::new(ActionRef::Host(action))
    }

    pub fn with_count(mut self, typed: u32) -> Self {
        self.raw_count = typed;
        self.count = typed.max(1);
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn shape(&self) -> RangeShape {
        self.flags.shape()
    }

    pub fn set_shape(&mut self, shape: RangeShape) {
        self.flags = self.flags.with_shape(shape);
    }

    /// Times an insert session opened by this command is replayed on exit.
    pub fn repeat_count(&self) -> u32 {
        if self.flags.contains(CommandFlags::NO_REPEAT) {
            1
        } else {
            self.count.max(1)
        }
    }

    pub fn motion_kind(&self) -> Option<MotionKind> {
        match self.action {
            ActionRef::Motion(kind) => Some(kind),
            _ => None,
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new(ActionRef::Host(HostAction::Named(String::new())))
    }
}

/// Operator argument: the motion command selecting the range. Operators may
/// rewrite it in place (retargeting `cw`, promoting shapes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub motion: Command,
}

impl Argument {
    pub fn new(motion: Command) -> Self {
        Self { motion }
    }

    pub fn of(kind: MotionKind) -> Self {
        Self::new(Command::motion(kind))
    }

    pub fn motion_kind(&self) -> Option<MotionKind> {
        self.motion.motion_kind()
    }

    /// Swap the motion for `kind` with `shape`, keeping count and other flags.
    pub fn retarget(&mut self, kind: MotionKind, shape: RangeShape) {
        self.motion.action = ActionRef::Motion(kind);
        self.motion.set_shape(shape);
    }
}
