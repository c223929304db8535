//! The change engine.
//!
//! [`Engine`] owns the session state the dispatch layer cannot keep itself:
//! the mode stack and current command ([`CommandContext`]), the stroke log of
//! the open insert session, the strokes of the last finished session and the
//! deferred follow-on slot. Everything else (registers, marks, undo, motion
//! resolution, host actions, tab geometry) is reached through collaborator
//! traits so hosts can substitute their own.
//!
//! Operations are split by concern:
//! * `session`: entering/leaving insert and replace mode, single-command
//!   escapes, focus and pointer notifications.
//! * `repeat`: stroke capture and replay.
//! * `mutate`: the mutation primitives every other operation is built on.
//! * `operator`: motion-driven operators (`d{motion}`, `c{motion}`, ...).
//! * `transform`: case, indent and replace-character transforms.
//! * `edit`: the fixed-range commands (`x`, `dd`, `D`, `J`, `s`, `cc`, ...).
//! * `insert`: insert-entry commands and insert-mode editing commands.
//!
//! Every public operation that mutates the document runs inside one undo
//! unit; nested operations share the outermost unit.

mod edit;
mod insert;
mod mutate;
mod operator;
mod repeat;
mod session;
mod transform;

use std::sync::Arc;

use core_config::{Config, TabPolicy};
use core_events::{DeferredSlot, EngineEvent, EngineObserver};
use core_model::Document;
use core_state::{
    Command, CommandContext, MarkStore, Marks, Mode, RegisterStore, Registers, Stroke, StrokeLog,
    UndoBoundary, UndoEngine,
};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::host::{ActionInvoker, BuiltinActions, MotionResolver};
use crate::span_resolver::BufferMotionResolver;

pub use transform::{CaseMode, IndentDirection};

/// Follow-on work parked until the in-flight command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Newline of `o` (`above == false`) or `O`.
    OpenLine { above: bool },
}

#[derive(Debug, Default)]
struct InsertSession {
    strokes: StrokeLog,
    /// Caret when the session (or the last stroke reset) started.
    anchor: usize,
    /// Command that opened the session; its count drives exit replays.
    command: Option<Command>,
    /// The session holds an open undo bracket.
    open: bool,
}

pub struct Engine {
    resolver: Box<dyn MotionResolver>,
    invoker: Box<dyn ActionInvoker>,
    registers: Box<dyn RegisterStore>,
    marks: Box<dyn MarkStore>,
    undo: Box<dyn UndoBoundary>,
    tabs: Box<dyn TabPolicy>,
    context: CommandContext,
    session: InsertSession,
    last_strokes: Vec<Stroke>,
    deferred: DeferredSlot<DeferredAction>,
    observers: Vec<Arc<dyn EngineObserver>>,
    max_replay_depth: u32,
    replay_depth: u32,
}

/// Assembles an [`Engine`]. Collaborators not supplied fall back to the
/// in-process implementations configured from the [`Config`].
pub struct EngineBuilder {
    config: Config,
    resolver: Option<Box<dyn MotionResolver>>,
    invoker: Option<Box<dyn ActionInvoker>>,
    registers: Option<Box<dyn RegisterStore>>,
    marks: Option<Box<dyn MarkStore>>,
    undo: Option<Box<dyn UndoBoundary>>,
    tabs: Option<Box<dyn TabPolicy>>,
    observers: Vec<Arc<dyn EngineObserver>>,
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resolver: None,
            invoker: None,
            registers: None,
            marks: None,
            undo: None,
            tabs: None,
            observers: Vec::new(),
        }
    }

    pub fn resolver(mut self, resolver: impl MotionResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn invoker(mut self, invoker: impl ActionInvoker + 'static) -> Self {
        self.invoker = Some(Box::new(invoker));
        self
    }

    pub fn registers(mut self, registers: impl RegisterStore + 'static) -> Self {
        self.registers = Some(Box::new(registers));
        self
    }

    pub fn marks(mut self, marks: impl MarkStore + 'static) -> Self {
        self.marks = Some(Box::new(marks));
        self
    }

    pub fn undo(mut self, undo: impl UndoBoundary + 'static) -> Self {
        self.undo = Some(Box::new(undo));
        self
    }

    pub fn tabs(mut self, tabs: impl TabPolicy + 'static) -> Self {
        self.tabs = Some(Box::new(tabs));
        self
    }

    pub fn observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Engine {
        let registers = self.registers.unwrap_or_else(|| {
            Box::new(Registers::new().with_read_only(self.config.read_only_registers()))
        });
        let max_replay_depth = self.config.effective_max_depth;
        let tabs = self
            .tabs
            .unwrap_or_else(|| Box::new(self.config.clone()) as Box<dyn TabPolicy>);
        debug!(target: "actions.session", tab_width = tabs.tab_width(), use_tabs = tabs.use_tabs(), max_replay_depth, "engine_built");
        Engine {
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(BufferMotionResolver::new())),
            invoker: self.invoker.unwrap_or_else(|| Box::new(BuiltinActions)),
            registers,
            marks: self.marks.unwrap_or_else(|| Box::new(Marks::new())),
            undo: self.undo.unwrap_or_else(|| Box::new(UndoEngine::new())),
            tabs,
            context: CommandContext::default(),
            session: InsertSession::default(),
            last_strokes: Vec::new(),
            deferred: DeferredSlot::new(),
            observers: self.observers,
            max_replay_depth,
            replay_depth: 0,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        EngineBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut CommandContext {
        &mut self.context
    }

    pub fn mode(&self) -> Mode {
        self.context.mode()
    }

    /// Record the command being dispatched. Session entry reads its count
    /// and flags.
    pub fn set_command(&mut self, command: Command) {
        self.context.set_command(command);
    }

    pub fn registers(&self) -> &dyn RegisterStore {
        self.registers.as_ref()
    }

    /// Direct the next register capture at `name`.
    pub fn select_register(&mut self, name: char) -> EditResult {
        self.registers.select(name).map_err(EditError::from)
    }

    pub fn marks(&self) -> &dyn MarkStore {
        self.marks.as_ref()
    }

    /// Strokes recorded by the open insert session.
    pub fn strokes(&self) -> &[Stroke] {
        self.session.strokes.as_slice()
    }

    /// Strokes of the last finished insert session.
    pub fn last_strokes(&self) -> &[Stroke] {
        &self.last_strokes
    }

    /// Caret position the open session's strokes are relative to.
    pub fn session_anchor(&self) -> usize {
        self.session.anchor
    }

    pub fn deferred_pending(&self) -> bool {
        self.deferred.is_pending()
    }

    /// Undo the last unit. False when there is nothing to undo or a unit is
    /// still open.
    pub fn undo(&mut self, doc: &mut dyn Document) -> bool {
        let mut cursor = doc.cursor();
        let done = self.undo.undo(doc.buffer_mut(), &mut cursor);
        doc.set_cursor(cursor);
        done
    }

    pub fn redo(&mut self, doc: &mut dyn Document) -> bool {
        let mut cursor = doc.cursor();
        let done = self.undo.redo(doc.buffer_mut(), &mut cursor);
        doc.set_cursor(cursor);
        done
    }

    /// Re-run a change the way `.` does: `f` runs with `command` current and
    /// the repeat flag raised, inside a single undo unit. Session entry then
    /// replays the last session's strokes instead of opening a new one.
    pub fn repeat<R>(
        &mut self,
        doc: &mut dyn Document,
        command: Command,
        f: impl FnOnce(&mut Self, &mut dyn Document) -> R,
    ) -> R {
        let saved = self.context.command().cloned();
        self.context.set_command(command);
        self.context.set_repeating(true);
        let out = self.bracket(doc, f);
        self.context.set_repeating(false);
        match saved {
            Some(command) => self.context.set_command(command),
            None => self.context.clear_command(),
        }
        out
    }

    /// Run `f` inside one undo unit.
    fn bracket<R>(
        &mut self,
        doc: &mut dyn Document,
        f: impl FnOnce(&mut Self, &mut dyn Document) -> R,
    ) -> R {
        self.undo.begin(doc.buffer(), doc.cursor());
        let out = f(self, &mut *doc);
        self.undo.end(doc.buffer());
        out
    }

    fn emit(&self, event: EngineEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// The current mode is an insert session (`Insert` or `Replace`).
    fn inserting(&self) -> bool {
        self.context.modes().in_insert_like()
    }

    /// `Ok` for an empty buffer, `err` otherwise. Operators that find
    /// nothing to act on succeed only when there was nothing to find.
    fn empty_or(doc: &dyn Document, err: EditError) -> EditResult {
        if doc.buffer().is_empty() {
            Ok(())
        } else {
            debug!(target: "actions.operator", error = %err, "operator_refused");
            Err(err)
        }
    }
}
