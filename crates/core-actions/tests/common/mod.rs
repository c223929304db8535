#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use core_actions::{BufferMotionResolver, EditResult, Engine, MotionResolver};
use core_config::Config;
use core_model::{Document, EditorModel};
use core_state::{Argument, MotionKind, UndoBoundary};
use core_text::{Buffer, TextRange};

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn engine() -> Engine {
    init_tracing();
    Engine::new(Config::default())
}

pub fn engine_with_indent(tab_width: usize, use_tabs: bool) -> Engine {
    init_tracing();
    Engine::new(Config::with_indent(tab_width, use_tabs))
}

pub fn doc(text: &str, cursor: usize) -> EditorModel {
    EditorModel::from_text(text).with_cursor(cursor)
}

/// Type `text` char by char through the engine's capture path.
pub fn type_str(engine: &mut Engine, doc: &mut EditorModel, text: &str) {
    for ch in text.chars() {
        assert!(engine.capture_char(doc, ch), "char {ch:?} refused");
    }
}

/// Scenario step.
pub enum Step<'a> {
    /// Typed text (inside or outside a session).
    Type(&'a str),
    /// Escape: close the open session.
    Esc,
    /// Drain the deferred slot, as the dispatch loop does after a command.
    Deferred,
    /// Any engine operation.
    Run(fn(&mut Engine, &mut EditorModel) -> EditResult),
}

/// Run `steps` against `initial` with the caret at `cursor` and return the
/// resulting document. Every step must succeed.
pub fn run_scenario(engine: &mut Engine, initial: &str, cursor: usize, steps: &[Step<'_>]) -> EditorModel {
    let mut model = doc(initial, cursor);
    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Type(text) => type_str(engine, &mut model, text),
            Step::Esc => engine
                .end_session(&mut model)
                .unwrap_or_else(|e| panic!("step {i}: end_session failed: {e}")),
            Step::Deferred => engine
                .run_deferred(&mut model)
                .unwrap_or_else(|e| panic!("step {i}: run_deferred failed: {e}")),
            Step::Run(op) => op(engine, &mut model).unwrap_or_else(|e| panic!("step {i}: {e}")),
        }
    }
    model
}

/// Resolver answering every motion with one fixed range. Word targets still
/// come from the buffer resolver so `cw` probing behaves normally.
pub struct FixedRange {
    pub range: TextRange,
    fallback: BufferMotionResolver,
}

impl FixedRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            range: TextRange::new(start, end),
            fallback: BufferMotionResolver::new(),
        }
    }
}

impl MotionResolver for FixedRange {
    fn resolve(
        &mut self,
        _doc: &dyn Document,
        _count: u32,
        _raw_count: u32,
        _argument: &mut Argument,
    ) -> Option<TextRange> {
        Some(self.range.clone())
    }

    fn target(&mut self, doc: &dyn Document, from: usize, count: usize, kind: MotionKind) -> Option<usize> {
        self.fallback.target(doc, from, count, kind)
    }
}

/// Undo boundary that only counts brackets. Clones share the counters so the
/// test keeps a handle after the engine takes ownership.
#[derive(Clone, Default)]
pub struct BracketProbe {
    depth: Arc<AtomicI64>,
    opened: Arc<AtomicU64>,
}

impl BracketProbe {
    /// Brackets currently open.
    pub fn depth(&self) -> i64 {
        self.depth.load(Ordering::SeqCst)
    }

    /// Outermost brackets opened so far.
    pub fn units(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }
}

impl UndoBoundary for BracketProbe {
    fn begin(&mut self, _buffer: &Buffer, _cursor: usize) {
        if self.depth.fetch_add(1, Ordering::SeqCst) == 0 {
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn end(&mut self, _buffer: &Buffer) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
