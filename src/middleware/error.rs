use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Authentication errors for the middleware layer.
///
/// Ordinary authentication failures never appear here — those resolve
/// inside the flow to a redirect. These are violations and faults.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Callback `state` did not match the stored login state.
    #[error("suspicious authorization response: state mismatch")]
    StateMismatch,

    /// Defensive logout left the session still bound to a principal.
    #[error("session termination did not take effect")]
    Termination,

    /// Session store operation failed.
    #[error("session store error: {0}")]
    Store(String),

    /// Authentication backend fault (not a rejection).
    #[error("authentication backend error: {0}")]
    Backend(String),

    /// Provider interaction failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::StateMismatch => {
                tracing::warn!(error = %self, "rejecting suspicious authorization response");
                (StatusCode::FORBIDDEN, "Suspicious authorization response").into_response()
            }
            Self::Termination
            | Self::Store(_)
            | Self::Backend(_)
            | Self::Provider(_)
            | Self::Config(_) => {
                tracing::error!(error = %self, "auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<Error> for AuthError {
    fn from(e: Error) -> Self {
        match e {
            Error::Config(msg) => Self::Config(msg),
            Error::StateMismatch => Self::StateMismatch,
            Error::Termination => Self::Termination,
            Error::Store(e) => Self::Store(e.to_string()),
            Error::Backend(e) => Self::Backend(e.to_string()),
            Error::Http(e) => Self::Provider(e.to_string()),
            e @ Error::Provider { .. } => Self::Provider(e.to_string()),
        }
    }
}
