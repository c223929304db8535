//! Engine events, observers and the deferred follow-on slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use core_state::Mode;
use tracing::warn;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters; inspected by tests and embedders that want cheap session statistics
// without installing an observer.
// -------------------------------------------------------------------------------------------------
pub static SESSIONS_STARTED: AtomicU64 = AtomicU64::new(0);
pub static SESSIONS_REPLAYED: AtomicU64 = AtomicU64::new(0);
pub static DEFERRED_REJECTED: AtomicU64 = AtomicU64::new(0);

/// Notifications emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ModeChanged { from: Mode, to: Mode },
    SessionStarted { mode: Mode, anchor: usize },
    /// An insert session closed; `replays` counts the extra repetitions run
    /// on exit.
    SessionEnded { mode: Mode, replays: u32 },
    /// The last session's strokes were re-run by a repeat.
    SessionReplayed { strokes: usize },
    OverwriteToggled(bool),
    /// Cursor shape request: block for command modes, bar for insert.
    CursorShape { block: bool },
    StrokesCleared,
}

/// Observers see every engine event synchronously. They must not block.
pub trait EngineObserver: Send + Sync + 'static {
    fn on_event(&self, _event: &EngineEvent) {}
}

/// Default no-op observer.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}

/// Observer that keeps every event; handy for embedders that poll and for
/// tests.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return the recorded events.
    pub fn take(&self) -> Vec<EngineEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EngineObserver for EventLog {
    fn on_event(&self, event: &EngineEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

pub fn note_session_started() {
    SESSIONS_STARTED.fetch_add(1, Ordering::Relaxed);
}

pub fn note_session_replayed() {
    SESSIONS_REPLAYED.fetch_add(1, Ordering::Relaxed);
}

// -------------------------------------------------------------------------------------------------
// Deferred slot
// -------------------------------------------------------------------------------------------------
// Some follow-on work (the newline of `o`/`O`) has to run after the command that scheduled it has
// returned to the dispatch loop. The slot holds at most one such action; the host drains it once
// the in-flight command completes.
// -------------------------------------------------------------------------------------------------

/// Single-slot queue for one pending follow-on action.
#[derive(Debug)]
pub struct DeferredSlot<T> {
    pending: Option<T>,
}

impl<T> Default for DeferredSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> DeferredSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `action`. A busy slot hands the action back untouched.
    pub fn schedule(&mut self, action: T) -> Result<(), T> {
        if self.pending.is_some() {
            DEFERRED_REJECTED.fetch_add(1, Ordering::Relaxed);
            warn!(target: "actions.session", "deferred_slot_busy");
            return Err(action);
        }
        self.pending = Some(action);
        Ok(())
    }

    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
