//! The relying-party flows: request initiation, callback validation, and
//! session termination.
//!
//! Everything here is framework-free. Handlers extract the transport facts
//! into a [`RequestContext`] and the callback query into [`CallbackParams`],
//! then delegate; outcomes come back as redirect targets.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::backend::AuthenticationBackend;
use crate::error::Error;
use crate::provider::ProviderConfig;
use crate::random::random_token;
use crate::redirect::is_safe_redirect;
use crate::session::{keys, SessionStore};

/// Transport facts about the inbound request that the flows depend on.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Externally visible host, e.g. `app.example.com`.
    pub host: &'a str,
    /// Whether the request arrived over TLS.
    pub secure: bool,
}

impl RequestContext<'_> {
    pub(crate) fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }
}

/// Query parameters the OP may send to the callback route.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Where a finished callback sends the user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Principal authenticated and bound to the session.
    Success { redirect: String },
    /// Authentication denied, context missing, or response malformed.
    /// No detail about the cause reaches the client.
    Failure { redirect: String },
}

/// Extension point for extra authorization-request parameters.
pub trait ExtraAuthParams: Send + Sync + 'static {
    fn extra_params(&self, request: &RequestContext<'_>) -> Vec<(String, String)>;
}

/// Computes an OP-side logout URL for the current request, so logging out
/// locally can also end the session at the provider.
pub trait ProviderLogoutUrl: Send + Sync + 'static {
    fn logout_url(&self, request: &RequestContext<'_>) -> String;
}

/// Tunable flow behavior. Field defaults match the documented configuration
/// surface; the middleware builder populates this from `with_*` calls.
#[derive(Clone)]
pub struct FlowOptions {
    pub state_length: usize,
    pub nonce_length: usize,
    pub use_nonce: bool,
    /// Hosts a post-login redirect may point at, in addition to the
    /// current request's own host.
    pub allowed_redirect_hosts: Vec<String>,
    /// `None` follows the inbound request's transport security.
    pub require_https_redirect: Option<bool>,
    pub success_url: String,
    pub failure_url: String,
    pub logout_redirect: String,
    /// How long an established session's upstream token stays fresh.
    pub renew_interval: Duration,
    /// Route the OP redirects back to, absolute-path form.
    pub callback_path: String,
    pub extra_params: Vec<(String, String)>,
    pub extra_params_hook: Option<Arc<dyn ExtraAuthParams>>,
    pub provider_logout: Option<Arc<dyn ProviderLogoutUrl>>,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            state_length: 32,
            nonce_length: 32,
            use_nonce: true,
            allowed_redirect_hosts: Vec::new(),
            require_https_redirect: None,
            success_url: "/".into(),
            failure_url: "/".into(),
            logout_redirect: "/".into(),
            renew_interval: Duration::seconds(900),
            callback_path: "/oidc/callback".into(),
            extra_params: Vec::new(),
            extra_params_hook: None,
            provider_logout: None,
        }
    }
}

/// The three relying-party flows over a session store and an
/// authentication backend.
pub struct AuthFlow<S, B> {
    sessions: Arc<S>,
    backend: Arc<B>,
    provider: ProviderConfig,
    options: FlowOptions,
}

impl<S: SessionStore, B: AuthenticationBackend> AuthFlow<S, B> {
    #[must_use]
    pub fn new(
        provider: ProviderConfig,
        options: FlowOptions,
        sessions: Arc<S>,
        backend: Arc<B>,
    ) -> Self {
        Self {
            sessions,
            backend,
            provider,
            options,
        }
    }

    /// Initiate authentication: derive `state`/`nonce`, vet and stash the
    /// post-login target, and return the authorization URL to redirect to.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when no authorization endpoint resolves;
    /// [`Error::Store`] when the session store fails.
    pub async fn begin(
        &self,
        session_id: &str,
        request: &RequestContext<'_>,
        next: Option<&str>,
    ) -> Result<String, Error> {
        let state = random_token(self.options.state_length);

        // The target is vetted exactly once, here. Everything downstream
        // trusts `oidc_login_next` as already safe.
        let require_https = self
            .options
            .require_https_redirect
            .unwrap_or(request.secure);
        let mut hosts: Vec<&str> = self
            .options
            .allowed_redirect_hosts
            .iter()
            .map(String::as_str)
            .collect();
        hosts.push(request.host);
        let login_next = next
            .filter(|candidate| is_safe_redirect(candidate, &hosts, require_https))
            .map(str::to_owned);

        let nonce = self
            .options
            .use_nonce
            .then(|| random_token(self.options.nonce_length));

        let redirect_uri = format!("{}{}", request.base_url(), self.options.callback_path);
        let mut extra = self.options.extra_params.clone();
        if let Some(hook) = &self.options.extra_params_hook {
            extra.extend(hook.extra_params(request));
        }
        let url = self
            .provider
            .authorization_url(&redirect_uri, &state, nonce.as_deref(), &extra)?;

        self.sessions
            .insert(session_id, keys::STATE, Value::String(state))
            .await
            .map_err(Error::Store)?;
        if let Some(nonce) = nonce {
            self.sessions
                .insert(session_id, keys::NONCE, Value::String(nonce))
                .await
                .map_err(Error::Store)?;
        }
        // Written even when absent, so a target left over from an earlier
        // attempt cannot leak into this one.
        self.sessions
            .insert(
                session_id,
                keys::LOGIN_NEXT,
                login_next.map_or(Value::Null, Value::String),
            )
            .await
            .map_err(Error::Store)?;

        Ok(url)
    }

    /// Validate an authorization response and decide the outcome.
    ///
    /// The stored nonce is consumed before any validation: a captured
    /// response spends it on arrival, whatever happens afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::StateMismatch`] when the callback `state` differs from the
    /// stored one — a security violation, not an ordinary failure.
    /// [`Error::Termination`] when a defensive logout does not take effect.
    /// [`Error::Store`]/[`Error::Backend`] propagate external faults.
    pub async fn callback(
        &self,
        session_id: Option<&str>,
        request: &RequestContext<'_>,
        params: &CallbackParams,
    ) -> Result<CallbackOutcome, Error> {
        let nonce = match session_id {
            Some(sid) => self
                .sessions
                .take(sid, keys::NONCE)
                .await
                .map_err(Error::Store)?
                .and_then(into_string),
            None => None,
        };

        if let Some(error) = params.error.as_deref() {
            tracing::warn!(
                error,
                description = params.error_description.as_deref().unwrap_or(""),
                "provider reported an authorization error"
            );
            // A stale session left active here would be re-validated and
            // kept alive by the renewal machinery. Log it out, and treat a
            // binding that survives termination as a fault.
            if let Some(sid) = session_id {
                if self
                    .sessions
                    .principal(sid)
                    .await
                    .map_err(Error::Store)?
                    .is_some()
                {
                    self.sessions.terminate(sid).await.map_err(Error::Store)?;
                    if self
                        .sessions
                        .principal(sid)
                        .await
                        .map_err(Error::Store)?
                        .is_some()
                    {
                        return Err(Error::Termination);
                    }
                }
            }
            return Ok(self.failure());
        }

        if let (Some(code), Some(callback_state)) =
            (params.code.as_deref(), params.state.as_deref())
        {
            let Some(sid) = session_id else {
                return Ok(self.failure());
            };
            // Single-use: taking the state here is what makes a replayed
            // callback fail instead of reaching the backend twice.
            let stored_state = self
                .sessions
                .take(sid, keys::STATE)
                .await
                .map_err(Error::Store)?
                .and_then(into_string);
            let Some(stored_state) = stored_state else {
                return Ok(self.failure());
            };
            if callback_state != stored_state {
                tracing::warn!("callback state does not match the stored login state");
                return Err(Error::StateMismatch);
            }

            let principal = self
                .backend
                .authenticate(code, nonce.as_deref(), request)
                .await
                .map_err(Error::Backend)?;

            if let Some(principal) = principal.filter(|p| p.active) {
                self.sessions
                    .establish(sid, &principal.id)
                    .await
                    .map_err(Error::Store)?;
                let expires_at =
                    (OffsetDateTime::now_utc() + self.options.renew_interval).unix_timestamp();
                self.sessions
                    .insert(sid, keys::ID_TOKEN_EXPIRATION, Value::from(expires_at))
                    .await
                    .map_err(Error::Store)?;
                let login_next = self
                    .sessions
                    .get(sid, keys::LOGIN_NEXT)
                    .await
                    .map_err(Error::Store)?
                    .and_then(into_string);
                let redirect = login_next.unwrap_or_else(|| self.options.success_url.clone());
                tracing::debug!(principal = %principal.id, "authorization callback accepted");
                return Ok(CallbackOutcome::Success { redirect });
            }
            return Ok(self.failure());
        }

        Ok(self.failure())
    }

    /// Log the local session out, routing through the OP-side logout URL
    /// when a [`ProviderLogoutUrl`] capability is configured. Logging out an
    /// already-logged-out agent is not an error.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] when the session store fails.
    pub async fn logout(
        &self,
        session_id: Option<&str>,
        request: &RequestContext<'_>,
    ) -> Result<String, Error> {
        let mut redirect = self.options.logout_redirect.clone();
        if let Some(sid) = session_id {
            if self
                .sessions
                .principal(sid)
                .await
                .map_err(Error::Store)?
                .is_some()
            {
                if let Some(hook) = &self.options.provider_logout {
                    redirect = hook.logout_url(request);
                }
                self.sessions.terminate(sid).await.map_err(Error::Store)?;
            }
        }
        Ok(redirect)
    }

    fn failure(&self) -> CallbackOutcome {
        CallbackOutcome::Failure {
            redirect: self.options.failure_url.clone(),
        }
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}
