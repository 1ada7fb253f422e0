use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::AppState;
use crate::internal_error;
use crate::middleware::{session_user, take_flash};
use crate::render;

/// The logged-in user's feed: own messages plus token-matched messages from
/// followed users. Anonymous visitors land on the public timeline instead.
pub async fn timeline(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let Some(claims) = session_user(&state, &jar) else {
        return Ok(Redirect::to("/public").into_response());
    };

    let messages = state
        .db
        .own_timeline(claims.sub, state.per_page)
        .map_err(internal_error)?;
    let follow_requests = state
        .db
        .follow_requests_for(claims.sub)
        .map_err(internal_error)?;
    let approved_grants = state
        .db
        .approved_grants_for(claims.sub)
        .map_err(internal_error)?;

    let (jar, flash) = take_flash(jar);
    let page = render::own_timeline_page(
        &claims,
        flash.as_deref(),
        &messages,
        &follow_requests,
        &approved_grants,
    );
    Ok((jar, Html(page)).into_response())
}

/// The latest messages of all users, identical for every caller.
pub async fn public_timeline(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let viewer = session_user(&state, &jar);
    let messages = state
        .db
        .public_timeline(state.per_page)
        .map_err(internal_error)?;

    let (jar, flash) = take_flash(jar);
    let page = render::public_timeline_page(viewer.as_ref(), flash.as_deref(), &messages);
    Ok((jar, Html(page)).into_response())
}

/// One user's messages, 404 when the username is unknown.
pub async fn user_timeline(
    State(state): State<AppState>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let profile = state
        .db
        .get_user_by_username(&username)
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let viewer = session_user(&state, &jar);
    let followed = match &viewer {
        Some(claims) => state
            .db
            .is_following(claims.sub, profile.user_id)
            .map_err(internal_error)?,
        None => false,
    };

    let messages = state
        .db
        .user_timeline(profile.user_id, state.per_page)
        .map_err(internal_error)?;

    let (jar, flash) = take_flash(jar);
    let page = render::user_timeline_page(
        &profile.username,
        viewer.as_ref(),
        followed,
        flash.as_deref(),
        &messages,
    );
    Ok((jar, Html(page)).into_response())
}
