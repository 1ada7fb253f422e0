use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{EncodingKey, Header, encode};

use warble_db::Database;
use warble_types::api::{Claims, LoginForm, RegisterForm};

use crate::internal_error;
use crate::middleware::{SESSION_COOKIE, session_user, set_flash, take_flash};
use crate::render;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub secret_key: String,
    pub per_page: u32,
}

pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }

    let (jar, flash) = take_flash(jar);
    (jar, Html(render::login_page(None, flash.as_deref()))).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, StatusCode> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let user = state
        .db
        .get_user_by_username(&form.username)
        .map_err(internal_error)?;

    let error = match user {
        None => "Invalid username",
        Some(user) => {
            let parsed_hash = PasswordHash::new(&user.pw_hash)
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

            if Argon2::default()
                .verify_password(form.password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                let token = create_session_token(&state.secret_key, user.user_id, &user.username)
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

                let jar = set_flash(jar.add(session_cookie(token)), "You were logged in");
                return Ok((jar, Redirect::to("/")).into_response());
            }
            "Invalid password"
        }
    };

    Ok(Html(render::login_page(Some(error), None)).into_response())
}

pub async fn register_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }

    let (jar, flash) = take_flash(jar);
    (jar, Html(render::register_page(None, flash.as_deref()))).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, StatusCode> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let error = if form.username.is_empty() {
        "You have to enter a username"
    } else if form.email.is_empty() || !form.email.contains('@') {
        "You have to enter a valid email address"
    } else if form.password.is_empty() {
        "You have to enter a password"
    } else if form.password != form.password2 {
        "The two passwords do not match"
    } else if state
        .db
        .user_id_by_username(&form.username)
        .map_err(internal_error)?
        .is_some()
    {
        "The username is already taken"
    } else if form.pubkey.is_empty() {
        "The public key is not filled in."
    } else {
        // Hash with Argon2id, stored as a PHC string.
        let salt = SaltString::generate(&mut OsRng);
        let pw_hash = Argon2::default()
            .hash_password(form.password.as_bytes(), &salt)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .to_string();

        state
            .db
            .create_user(&form.username, &form.email, &pw_hash, &form.pubkey)
            .map_err(internal_error)?;

        let jar = set_flash(jar, "You were successfully registered and can login now");
        return Ok((jar, Redirect::to("/login")).into_response());
    };

    Ok(Html(render::register_page(Some(error), None)).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");

    let jar = set_flash(jar.remove(removal), "You were logged out");
    (jar, Redirect::to("/public"))
}

pub(crate) fn create_session_token(
    secret: &str,
    user_id: i64,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}
