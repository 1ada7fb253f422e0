use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use warble_types::api::{Claims, MessageForm};

use crate::auth::AppState;
use crate::internal_error;
use crate::middleware::set_flash;

/// Record a new message stamped with the current server time and the opaque
/// token from the posting form. Empty text silently redirects home.
pub async fn add_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<MessageForm>,
) -> Result<Response, StatusCode> {
    if form.text.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let pub_date = chrono::Utc::now().timestamp();
    state
        .db
        .insert_message(claims.sub, &form.text, pub_date, &form.token)
        .map_err(internal_error)?;

    let jar = set_flash(jar, "Your message was recorded");
    Ok((jar, Redirect::to("/")).into_response())
}
