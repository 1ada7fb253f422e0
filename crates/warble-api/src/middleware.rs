use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use jsonwebtoken::{DecodingKey, Validation, decode};

use warble_types::api::Claims;

use crate::auth::AppState;

pub const SESSION_COOKIE: &str = "warble_session";
pub const FLASH_COOKIE: &str = "warble_flash";

/// Decode the session cookie into claims, if present and still valid.
pub fn session_user(state: &AppState, jar: &CookieJar) -> Option<Claims> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();

    decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.secret_key.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Reject with 401 unless the request carries a valid session cookie. On
/// success the claims are inserted into request extensions for handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let jar = CookieJar::from_headers(req.headers());
    let claims = session_user(&state, &jar).ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// -- Flash messages --

/// Queue a one-shot notice for the next rendered page. The value is
/// base64-encoded so arbitrary text survives cookie value rules.
pub fn set_flash(jar: CookieJar, message: &str) -> CookieJar {
    let mut cookie = Cookie::new(FLASH_COOKIE, B64.encode(message));
    cookie.set_path("/");
    jar.add(cookie)
}

/// Take the pending flash message, clearing its cookie.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let message = B64
        .decode(cookie.value())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());

    let mut removal = Cookie::new(FLASH_COOKIE, "");
    removal.set_path("/");
    (jar.remove(removal), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::AppStateInner;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: warble_db::Database::open_in_memory().unwrap(),
            secret_key: "test-secret".into(),
            per_page: 30,
        })
    }

    #[test]
    fn session_round_trips_through_the_cookie() {
        let state = test_state();
        let token = crate::auth::create_session_token(&state.secret_key, 7, "alice").unwrap();

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        let claims = session_user(&state, &jar).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn tampered_session_is_rejected() {
        let state = test_state();
        let token = crate::auth::create_session_token("other-secret", 7, "alice").unwrap();

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert!(session_user(&state, &jar).is_none());

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-a-jwt"));
        assert!(session_user(&state, &jar).is_none());
    }

    #[test]
    fn flash_survives_arbitrary_text_and_clears() {
        let message = "You are no longer following \"alice\"";
        let jar = set_flash(CookieJar::new(), message);

        let (jar, taken) = take_flash(jar);
        assert_eq!(taken.as_deref(), Some(message));

        // The returned jar carries the removal; a fresh read sees nothing.
        let (_, again) = take_flash(CookieJar::new());
        assert_eq!(again, None);
        let _ = jar;
    }
}
