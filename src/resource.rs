use std::fmt::Display;

use serde::Serialize;

/// State of a value the UI is waiting on.
///
/// One generic wrapper replaces the per-screen loading/error/data holders:
/// screens render a spinner for `Pending`, inline error text with a retry
/// action for `Failed`, and the payload (or an empty-state message) for `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum Resource<T> {
    Pending,
    Failed { message: String },
    Ready(T),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Pending
    }
}

impl<T> Resource<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Resource::Failed {
            message: message.into(),
        }
    }

    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Resource::Ready(value),
            Err(e) => Resource::failed(e.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resource::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Resource::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Resource::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resource<U> {
        match self {
            Resource::Pending => Resource::Pending,
            Resource::Failed { message } => Resource::Failed { message },
            Resource::Ready(value) => Resource::Ready(f(value)),
        }
    }
}
