//! Error taxonomy of the sync layer.
//!
//! Remote and storage failures are typed here; whether a failure is fatal is
//! decided by the step that hit it, not by the error itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use galeria_auth::AuthzError;
use galeria_catalog::{EntityKind, ParseError};
use galeria_core::{DomainError, RemoteId};

/// A business-rule failure reported inside a normal remote response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network failure: connect, timeout, TLS.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote platform responded with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Top-level GraphQL `errors` array.
    #[error("{}", .0.join(", "))]
    Graphql(Vec<String>),

    /// Non-empty `userErrors`; displayed as the joined messages.
    #[error("{}", join_messages(.0))]
    UserErrors(Vec<UserError>),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RemoteError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MirrorError {
    #[error("mirror store unavailable: {0}")]
    Unavailable(String),

    #[error("mirror record rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("no active inventory location found")]
    Unresolvable,

    #[error("location lookup failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Fatal outcome of a create/update/delete.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: RemoteId },

    #[error(transparent)]
    LocationUnresolvable(#[from] LocationError),

    #[error("invalid remote payload: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

impl SyncError {
    pub fn not_found(kind: EntityKind, id: RemoteId) -> Self {
        Self::NotFound { kind, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_display_as_joined_messages() {
        let err = RemoteError::UserErrors(vec![
            UserError::new("Title can't be blank"),
            UserError::new("Handle has already been taken"),
        ]);
        assert_eq!(
            err.to_string(),
            "Title can't be blank, Handle has already been taken"
        );

        // Fatal errors bubble with the same message.
        let sync: SyncError = err.into();
        assert_eq!(
            sync.to_string(),
            "Title can't be blank, Handle has already been taken"
        );
    }

    #[test]
    fn user_error_field_is_optional_on_the_wire() {
        let parsed: UserError =
            serde_json::from_value(serde_json::json!({ "message": "bad" })).unwrap();
        assert_eq!(parsed, UserError::new("bad"));
    }
}
