use std::future::Future;

use serde_json::Value;

use crate::error::BoxError;

/// Logical keys this crate writes into the session.
///
/// External machinery (e.g. a token-renewal layer) may read them; nothing
/// else should write them.
pub mod keys {
    /// Anti-CSRF token stored at login initiation. Single-use.
    pub const STATE: &str = "oidc_state";
    /// Anti-replay token stored at login initiation. Single-use.
    pub const NONCE: &str = "oidc_nonce";
    /// Pre-validated post-login redirect target, or null.
    pub const LOGIN_NEXT: &str = "oidc_login_next";
    /// Epoch seconds after which the upstream token counts as stale.
    pub const ID_TOKEN_EXPIRATION: &str = "oidc_id_token_expiration";
}

/// Consumer-provided server-side session persistence.
///
/// Sessions are keyed by an opaque identifier held by the user agent. One
/// session carries the per-login authentication context (see [`keys`]) and
/// at most one bound principal.
///
/// # Example
///
/// ```rust,ignore
/// impl SessionStore for MyAppState {
///     async fn get(&self, sid: &str, key: &str) -> Result<Option<Value>, BoxError> {
///         self.db.session_value(sid, key).await
///     }
///
///     async fn take(&self, sid: &str, key: &str) -> Result<Option<Value>, BoxError> {
///         self.db.remove_session_value(sid, key).await
///     }
///     // ...
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Read one value from the session.
    fn get(
        &self,
        session_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, BoxError>> + Send;

    /// Write one value into the session, replacing any previous value.
    fn insert(
        &self,
        session_id: &str,
        key: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Remove and return one value. Single-use artifacts go through here so
    /// consumption is a single store round-trip.
    fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, BoxError>> + Send;

    /// Bind an authenticated principal to the session.
    fn establish(
        &self,
        session_id: &str,
        principal_id: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Identifier of the principal bound to the session, if any.
    fn principal(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<String>, BoxError>> + Send;

    /// Drop the authenticated binding (local logout).
    fn terminate(&self, session_id: &str) -> impl Future<Output = Result<(), BoxError>> + Send;
}
