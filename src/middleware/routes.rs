use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header::HOST, HeaderMap};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::PrivateCookieJar;

use super::config::{AuthSettings, OidcAuthConfig};
use super::cookies;
use super::error::AuthError;
use super::state::AuthState;
use crate::backend::AuthenticationBackend;
use crate::flow::{AuthFlow, CallbackOutcome, CallbackParams, RequestContext};
use crate::session::SessionStore;

/// Create the authentication router: login, callback, and logout under the
/// configured auth path.
pub fn auth_routes<S, B>(config: OidcAuthConfig, sessions: S, backend: B) -> Router
where
    S: SessionStore,
    B: AuthenticationBackend,
{
    let OidcAuthConfig {
        provider,
        settings,
        mut options,
    } = config;

    let auth_path = settings.auth_path.clone();
    options.callback_path = format!("{auth_path}/callback");

    let flow = AuthFlow::new(provider, options, Arc::new(sessions), Arc::new(backend));
    let state = AuthState {
        flow: Arc::new(flow),
        settings,
    };

    Router::new()
        .route(&format!("{auth_path}/login"), get(login::<S, B>))
        .route(&format!("{auth_path}/callback"), get(callback::<S, B>))
        .route(
            &format!("{auth_path}/logout"),
            get(logout::<S, B>).post(logout::<S, B>),
        )
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<S: SessionStore, B: AuthenticationBackend>(
    State(state): State<AuthState<S, B>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let (host, secure) = request_origin(&headers, &state.settings);
    let ctx = RequestContext {
        host: &host,
        secure,
    };

    let (session_id, jar) = match cookies::session_id(&jar, &state.settings.session_cookie_name) {
        Some(sid) => (sid, jar),
        None => {
            let sid = cookies::mint_session_id();
            let cookie = cookies::session_cookie(
                &state.settings.session_cookie_name,
                &sid,
                state.settings.session_ttl_days,
                state.settings.secure_cookies,
            );
            (sid, jar.add(cookie))
        }
    };

    let next = query.get(&state.settings.redirect_field).map(String::as_str);
    let url = state.flow.begin(&session_id, &ctx, next).await?;

    Ok((jar, Redirect::to(&url)))
}

// ── Callback ───────────────────────────────────────────────────────

async fn callback<S: SessionStore, B: AuthenticationBackend>(
    State(state): State<AuthState<S, B>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
    jar: PrivateCookieJar,
) -> Result<Redirect, AuthError> {
    let (host, secure) = request_origin(&headers, &state.settings);
    let ctx = RequestContext {
        host: &host,
        secure,
    };
    let session_id = cookies::session_id(&jar, &state.settings.session_cookie_name);

    match state
        .flow
        .callback(session_id.as_deref(), &ctx, &params)
        .await?
    {
        CallbackOutcome::Success { redirect } => {
            tracing::info!("login callback accepted");
            Ok(Redirect::to(&redirect))
        }
        CallbackOutcome::Failure { redirect } => Ok(Redirect::to(&redirect)),
    }
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<S: SessionStore, B: AuthenticationBackend>(
    State(state): State<AuthState<S, B>>,
    headers: HeaderMap,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let (host, secure) = request_origin(&headers, &state.settings);
    let ctx = RequestContext {
        host: &host,
        secure,
    };
    let session_id = cookies::session_id(&jar, &state.settings.session_cookie_name);

    let redirect = state.flow.logout(session_id.as_deref(), &ctx).await?;

    let clear = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    Ok((jar.remove(clear), Redirect::to(&redirect)))
}

// ── Helpers ────────────────────────────────────────────────────────

/// Externally visible host and transport security for this request.
///
/// A configured public base URL wins; otherwise forwarded headers, then the
/// Host header.
fn request_origin(headers: &HeaderMap, settings: &AuthSettings) -> (String, bool) {
    if let Some(base) = &settings.public_base_url {
        let host = match (base.host_str(), base.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        return (host, base.scheme() == "https");
    }

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(HOST))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let secure = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    (host, secure)
}
