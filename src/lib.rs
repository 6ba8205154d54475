#![doc = include_str!("../README.md")]

pub mod backend;
pub mod error;
pub mod flow;
pub mod middleware;
pub mod provider;
pub mod random;
pub mod redirect;
pub mod session;

// Re-exports for convenient access
pub use backend::{AuthenticationBackend, Principal};
pub use error::{BoxError, Error};
pub use flow::{
    AuthFlow, CallbackOutcome, CallbackParams, ExtraAuthParams, FlowOptions, ProviderLogoutUrl,
    RequestContext,
};
pub use middleware::{auth_routes, AuthError, OidcAuthConfig};
pub use provider::{ProviderConfig, ProviderMetadata};
pub use random::random_token;
pub use redirect::is_safe_redirect;
pub use session::{keys, SessionStore};
