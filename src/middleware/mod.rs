//! Mountable relying-party authentication routes for axum.
//!
//! This module wires the flows in [`crate::flow`] to HTTP: three routes
//! under a configurable path prefix, an encrypted session-identifier
//! cookie, and redirect responses.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oidc_gate::middleware::{auth_routes, OidcAuthConfig};
//! use oidc_gate::ProviderConfig;
//!
//! // 1. Implement SessionStore and AuthenticationBackend for your app
//! // 2. Configure the provider
//! let provider = ProviderConfig::new("my-client-id")
//!     .with_authorization_endpoint("https://op.example.com/authorize".parse()?);
//! let config = OidcAuthConfig::new(provider)
//!     .with_allowed_redirect_hosts(vec!["example.com".into()]);
//!
//! // 3. Mount the routes
//! let app = axum::Router::new()
//!     .merge(auth_routes(config, session_store, backend));
//! ```

mod config;
mod cookies;
mod error;
mod routes;
mod state;

pub use config::OidcAuthConfig;
pub use error::AuthError;
pub use routes::auth_routes;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
