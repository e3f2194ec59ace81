use thiserror::Error;

use crate::messages::Messages;

/// Network or decoding failure. The detail is for logs, never for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response (status {status}): {detail}")]
    Malformed { status: u16, detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected locally before any request was made.
    Validation,
    /// The backend answered `success: false`.
    Backend,
    /// Network failure or an unreadable response.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Selected file is not an image: {media_type}")]
    InvalidFileType { media_type: String },
    #[error("No file staged for submission")]
    NoFileStaged,
    #[error("A prediction request is already in flight")]
    SubmissionInFlight,
    #[error("No review to confirm")]
    NoActiveReview,
    #[error("No prediction selected")]
    EmptySelection,
    #[error("A save request is already in flight")]
    SaveInFlight,
    #[error("Unknown prediction: {0}")]
    UnknownLabel(String),
    #[error("Unknown history record: {0}")]
    UnknownRecord(String),
    #[error("Backend rejected the request: {0}")]
    Backend(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Backend(_) => ErrorKind::Backend,
            WorkflowError::Transport(_) => ErrorKind::Transport,
            _ => ErrorKind::Validation,
        }
    }

    /// Text shown to the user. Backend messages are passed through verbatim.
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            WorkflowError::InvalidFileType { .. } => messages.invalid_file_type.clone(),
            WorkflowError::NoFileStaged => messages.no_file_selected.clone(),
            WorkflowError::EmptySelection => messages.select_at_least_one.clone(),
            WorkflowError::Backend(message) if !message.trim().is_empty() => message.clone(),
            _ => messages.generic_retry.clone(),
        }
    }
}
