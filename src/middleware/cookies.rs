use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::PrivateCookieJar;
use time::Duration;

use crate::random::random_token;

const SESSION_ID_LENGTH: usize = 32;

/// Mint a fresh opaque session identifier.
pub(super) fn mint_session_id() -> String {
    random_token(SESSION_ID_LENGTH)
}

/// Create the session-identifier cookie.
pub(super) fn session_cookie(
    name: &str,
    session_id: &str,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Create the removal cookie for the session identifier.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Get the session identifier from cookies.
pub(super) fn session_id(jar: &PrivateCookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|c| c.value().to_string())
}
