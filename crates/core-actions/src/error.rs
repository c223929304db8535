use core_state::RegisterError;
use thiserror::Error;

/// Why an engine operation refused to act. Every failure leaves the document
/// as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("motion produced no range")]
    NoRange,
    #[error("register refused the capture: {0}")]
    RegisterDenied(#[from] RegisterError),
    #[error("count {requested} exceeds the {available} available")]
    CountOverrun { requested: usize, available: usize },
    #[error("register '{0}' is empty")]
    RegisterEmpty(char),
    #[error("offset {0} has no counterpart on the neighbouring line")]
    OutOfBounds(usize),
    #[error("a deferred action is already pending")]
    DeferredSlotBusy,
    #[error("stroke replay nested deeper than {0}")]
    ReplayDepthExceeded(u32),
}

pub type EditResult = Result<(), EditError>;
