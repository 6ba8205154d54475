use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use time::Duration;
use url::Url;

use super::error::AuthError;
use crate::flow::{ExtraAuthParams, FlowOptions, ProviderLogoutUrl};
use crate::provider::ProviderConfig;

/// HTTP-layer settings shared by config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) redirect_field: String,
    pub(crate) public_base_url: Option<Url>,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__oidc_session".into(),
            session_ttl_days: 30,
            secure_cookies: true,
            auth_path: "/oidc".into(),
            redirect_field: "next".into(),
            public_base_url: None,
        }
    }
}

/// Relying-party authentication configuration.
///
/// The required provider settings are constructor parameters — no runtime
/// "missing field" errors for them. Everything else defaults sensibly and is
/// overridable with `with_*` methods, or comes from the environment via
/// [`from_env()`](OidcAuthConfig::from_env).
pub struct OidcAuthConfig {
    pub(super) provider: ProviderConfig,
    pub(super) settings: AuthSettings,
    pub(super) options: FlowOptions,
}

impl OidcAuthConfig {
    /// Create config around a [`ProviderConfig`].
    #[must_use]
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            settings: AuthSettings::defaults(),
            options: FlowOptions::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OIDC_CLIENT_ID`: OAuth2 client ID registered at the provider
    ///
    /// # Optional env vars
    /// - `OIDC_AUTHORIZATION_ENDPOINT`: provider authorization endpoint URL
    /// - `OIDC_SCOPES`: comma-separated requested scopes
    /// - `OIDC_ALLOWED_REDIRECT_HOSTS`: comma-separated redirect allow-list
    /// - `COOKIE_KEY`: cookie encryption key bytes
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or
    /// values fail to parse.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = std::env::var("OIDC_CLIENT_ID")
            .map_err(|_| AuthError::Config("OIDC_CLIENT_ID is required".into()))?;

        let mut provider = ProviderConfig::new(client_id);
        if let Ok(url_str) = std::env::var("OIDC_AUTHORIZATION_ENDPOINT") {
            let url: Url = url_str
                .parse()
                .map_err(|e| AuthError::Config(format!("OIDC_AUTHORIZATION_ENDPOINT: {e}")))?;
            provider = provider.with_authorization_endpoint(url);
        }
        if let Ok(scopes) = std::env::var("OIDC_SCOPES") {
            provider =
                provider.with_scopes(scopes.split(',').map(|s| s.trim().to_string()).collect());
        }

        let mut config = Self::new(provider);
        if let Ok(hosts) = std::env::var("OIDC_ALLOWED_REDIRECT_HOSTS") {
            config = config.with_allowed_redirect_hosts(
                hosts.split(',').map(|s| s.trim().to_string()).collect(),
            );
        }
        if let Ok(key) = std::env::var("COOKIE_KEY") {
            let key = Key::try_from(key.as_bytes()).map_err(|_| {
                AuthError::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        }
        Ok(config)
    }

    // ── HTTP-layer settings ────────────────────────────────────────

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Path prefix the login/callback/logout routes mount under.
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    /// Query parameter carrying the post-login target (default `next`).
    #[must_use]
    pub fn with_redirect_field(mut self, name: impl Into<String>) -> Self {
        self.settings.redirect_field = name.into();
        self
    }

    /// Externally visible base URL, for deployments where forwarded headers
    /// cannot be trusted to reconstruct it.
    #[must_use]
    pub fn with_public_base_url(mut self, url: Url) -> Self {
        self.settings.public_base_url = Some(url);
        self
    }

    // ── Flow settings ──────────────────────────────────────────────

    #[must_use]
    pub fn with_state_length(mut self, length: usize) -> Self {
        self.options.state_length = length;
        self
    }

    #[must_use]
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.options.nonce_length = length;
        self
    }

    /// Toggle nonce mode (default: enabled).
    #[must_use]
    pub fn with_use_nonce(mut self, use_nonce: bool) -> Self {
        self.options.use_nonce = use_nonce;
        self
    }

    /// Hosts a post-login redirect may point at, in addition to the current
    /// request's own host.
    #[must_use]
    pub fn with_allowed_redirect_hosts(mut self, hosts: Vec<String>) -> Self {
        self.options.allowed_redirect_hosts = hosts;
        self
    }

    /// Pin the HTTPS requirement for redirect targets instead of following
    /// the inbound request's transport.
    #[must_use]
    pub fn with_require_https_redirect(mut self, require: bool) -> Self {
        self.options.require_https_redirect = Some(require);
        self
    }

    #[must_use]
    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.options.success_url = url.into();
        self
    }

    #[must_use]
    pub fn with_failure_url(mut self, url: impl Into<String>) -> Self {
        self.options.failure_url = url.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, url: impl Into<String>) -> Self {
        self.options.logout_redirect = url.into();
        self
    }

    /// How long an established session's upstream token stays fresh
    /// (default 900 seconds).
    #[must_use]
    pub fn with_renew_interval(mut self, interval: Duration) -> Self {
        self.options.renew_interval = interval;
        self
    }

    /// Static extra authorization-request parameters.
    #[must_use]
    pub fn with_extra_params(mut self, params: Vec<(String, String)>) -> Self {
        self.options.extra_params = params;
        self
    }

    /// Per-request extra authorization-request parameters.
    #[must_use]
    pub fn with_extra_params_hook(mut self, hook: impl ExtraAuthParams) -> Self {
        self.options.extra_params_hook = Some(Arc::new(hook));
        self
    }

    /// Capability computing an OP-side logout URL, consulted at logout when
    /// the agent holds an authenticated session.
    #[must_use]
    pub fn with_provider_logout(mut self, hook: impl ProviderLogoutUrl) -> Self {
        self.options.provider_logout = Some(Arc::new(hook));
        self
    }
}
