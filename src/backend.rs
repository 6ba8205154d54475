use std::future::Future;

use crate::error::BoxError;
use crate::flow::RequestContext;

/// An authenticated identity as the external backend resolved it.
///
/// The flow only inspects `active`; everything else about the account stays
/// in the consumer's domain.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Backend-specific identifier, stored in the session on success.
    pub id: String,
    /// Inactive principals never get a session.
    pub active: bool,
}

impl Principal {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: true,
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Consumer-provided authentication backend.
///
/// Called exactly once per callback that passes state verification. The
/// backend performs the authorization-code exchange, verifies the issued
/// tokens (including the `nonce` binding when one is given), and resolves
/// the principal.
///
/// Return `Ok(None)` when the provider rejects the code or no account
/// matches — that is an ordinary authentication failure. Return `Err` only
/// for faults (network, storage); those propagate instead of turning into a
/// failure redirect.
pub trait AuthenticationBackend: Send + Sync + 'static {
    fn authenticate(
        &self,
        code: &str,
        nonce: Option<&str>,
        request: &RequestContext<'_>,
    ) -> impl Future<Output = Result<Option<Principal>, BoxError>> + Send;
}
