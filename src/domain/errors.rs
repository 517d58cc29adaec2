use crate::domain::action::ActionKind;

/// Error taxonomy for session operations.
///
/// Submit-side validation failures are reported only to the offending caller.
/// `UnsupportedActionKind` during resolution is a programming-error class:
/// logged with full context and the session treated as unhealthy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown participant '{0}'")]
    UnknownParticipant(String),
    #[error("player2 is not in the session")]
    MissingParticipant,
    #[error("invalid action '{kind:?}': {reason}")]
    InvalidAction { kind: ActionKind, reason: String },
    #[error("action kind not supported during resolution")]
    UnsupportedActionKind,
    #[error("coordinate is out of range")]
    OutOfRange,
    #[error("session '{0}' not found")]
    SessionNotFound(String),
    #[error("session '{0}' already exists")]
    SessionAlreadyExists(String),
    #[error("session '{0}' already has two players")]
    SessionFull(String),
    #[error("session '{0}' already started")]
    SessionAlreadyStarted(String),
}
