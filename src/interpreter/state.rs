use crate::error::TransportError;
use crate::service::SubmitReceipt;
use crate::value::FormErrors;
use std::fmt;

/// Lifecycle of a form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Restoring the draft; only observable while the session is being started.
    Idle,
    Editing,
    /// A validated payload has been handed out and awaits `complete_submit`.
    Submitting,
    /// Terminal: the application was accepted and the draft removed.
    Submitted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Editing => "editing",
            SessionState::Submitting => "submitting",
            SessionState::Submitted => "submitted",
        };
        write!(f, "{}", name)
    }
}

/// A user-facing notification raised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// How a submit attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(SubmitReceipt),
    /// Validation failed; the errors are also stored on the session.
    Invalid(FormErrors),
    /// The collaborator failed; values are kept and the session is editable again.
    Failed(TransportError),
}
