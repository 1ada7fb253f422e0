use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use warble_types::api::{
    AcceptTokenQuery, ApproveTokenQuery, Claims, FollowForm, HandshakeResponse, PublicKeyQuery,
    PublicKeyResponse,
};

use crate::auth::AppState;
use crate::internal_error;
use crate::middleware::{set_flash, take_flash};
use crate::render;

/// Render the follow-request form for the given user.
pub async fn follow_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    if state
        .db
        .user_id_by_username(&username)
        .map_err(internal_error)?
        .is_none()
    {
        return Err(StatusCode::NOT_FOUND);
    }

    let (jar, flash) = take_flash(jar);
    let page = render::follow_page(&username, &claims, None, flash.as_deref());
    Ok((jar, Html(page)).into_response())
}

/// Submit a follow request: validates the form fields inline, then inserts
/// a fresh REQUESTED edge carrying the client-generated token.
pub async fn follow_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
    jar: CookieJar,
    Form(form): Form<FollowForm>,
) -> Result<Response, StatusCode> {
    let Some(whom_id) = state
        .db
        .user_id_by_username(&username)
        .map_err(internal_error)?
    else {
        return Err(StatusCode::NOT_FOUND);
    };

    let error = if form.username.is_empty() {
        "You must enter a user to follow."
    } else if form.hashtag.is_empty() {
        "You must enter a valid hashtag."
    } else if form.token.is_empty() {
        "You must generate a valid token from your hashtag."
    } else {
        state
            .db
            .request_follow(claims.sub, whom_id, &form.token)
            .map_err(internal_error)?;

        let jar = set_flash(
            jar,
            &format!(
                "You successfully submitted a follow request to {}.",
                form.username
            ),
        );
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let page = render::follow_page(&username, &claims, Some(error), None);
    Ok(Html(page).into_response())
}

/// Remove the current user as a follower of the given user. Every edge for
/// the pair goes, whatever its handshake state.
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let Some(whom_id) = state
        .db
        .user_id_by_username(&username)
        .map_err(internal_error)?
    else {
        return Err(StatusCode::NOT_FOUND);
    };

    state
        .db
        .unfollow(claims.sub, whom_id)
        .map_err(internal_error)?;

    let jar = set_flash(jar, &format!("You are no longer following \"{username}\""));
    Ok((jar, Redirect::to(&format!("/{username}"))).into_response())
}

// -- AJAX endpoints --

/// Look up a user's stored public key.
pub async fn get_public_key(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Query(query): Query<PublicKeyQuery>,
) -> Result<Json<PublicKeyResponse>, StatusCode> {
    let username = query
        .username
        .filter(|u| !u.is_empty())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let user = state
        .db
        .get_user_by_username(&username)
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(PublicKeyResponse {
        pub_key: user.pub_key,
    }))
}

/// The followee approves an incoming request, granting a token. An unknown
/// username or a missing edge is a silent no-op; the call still succeeds.
pub async fn approve_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ApproveTokenQuery>,
) -> Result<Json<HandshakeResponse>, StatusCode> {
    let (username, token) = match (query.approved_username, query.approved_token) {
        (Some(u), Some(t)) if !u.is_empty() && !t.is_empty() => (u, t),
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    if let Some(who_id) = state
        .db
        .user_id_by_username(&username)
        .map_err(internal_error)?
    {
        state
            .db
            .approve_follow(who_id, claims.sub, &token)
            .map_err(internal_error)?;
    }

    Ok(Json(HandshakeResponse::success()))
}

/// The original follower stores the final token, completing the handshake.
/// Same silent no-op contract as approval.
pub async fn accept_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AcceptTokenQuery>,
) -> Result<Json<HandshakeResponse>, StatusCode> {
    let (username, token) = match (query.username, query.token) {
        (Some(u), Some(t)) if !u.is_empty() && !t.is_empty() => (u, t),
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    if let Some(whom_id) = state
        .db
        .user_id_by_username(&username)
        .map_err(internal_error)?
    {
        state
            .db
            .accept_follow(claims.sub, whom_id, &token)
            .map_err(internal_error)?;
    }

    Ok(Json(HandshakeResponse::success()))
}
