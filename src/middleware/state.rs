use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::AuthSettings;
use crate::backend::AuthenticationBackend;
use crate::flow::AuthFlow;
use crate::session::SessionStore;

/// Shared state for auth route handlers.
pub(super) struct AuthState<S, B> {
    pub(super) flow: Arc<AuthFlow<S, B>>,
    pub(super) settings: AuthSettings,
}

// Manual Clone: avoid derive adding `S: Clone, B: Clone` bounds.
impl<S, B> Clone for AuthState<S, B> {
    fn clone(&self) -> Self {
        Self {
            flow: self.flow.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<S: SessionStore, B: AuthenticationBackend> FromRef<AuthState<S, B>> for Key {
    fn from_ref(state: &AuthState<S, B>) -> Self {
        state.settings.cookie_key.clone()
    }
}
