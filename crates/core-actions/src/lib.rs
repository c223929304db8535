//! Change engine: the part of a modal editor that turns already-parsed
//! commands into text edits.
//!
//! Layers (bottom to top):
//! * Mutation primitives (`insert_text`, `delete_text`, `replace_text`,
//!   `delete_range`) capture into registers, keep the change marks and
//!   group their work into undo units.
//! * Transformers (case, indent, replace-character, join) and the operator
//!   composers (`delete_motion`, `change_motion`, ...) built on them. Motion
//!   ranges come from a [`MotionResolver`]; the reference implementation is
//!   [`BufferMotionResolver`].
//! * Insert sessions: entering and leaving insert/replace mode, recording the
//!   strokes typed meanwhile and replaying them for counts and repeats.
//!
//! The engine never owns text. Every operation takes the host document as a
//! [`core_model::Document`] and reaches host editor actions (newline,
//! overwrite toggle, help) through an [`ActionInvoker`].
//!
//! Logging targets: `actions.session`, `actions.repeat`, `actions.resolve`,
//! `actions.operator`, `actions.mutate`, `actions.transform`.

pub mod engine;
pub mod error;
pub mod host;
pub mod span_resolver;

pub use engine::{CaseMode, DeferredAction, Engine, EngineBuilder, IndentDirection};
pub use error::{EditError, EditResult};
pub use host::{ActionInvoker, BuiltinActions, MotionResolver};
pub use span_resolver::BufferMotionResolver;
