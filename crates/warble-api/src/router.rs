use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::follow;
use crate::messages;
use crate::middleware::require_auth;
use crate::timeline;

/// Build the complete router. Static segments are registered alongside the
/// `/{username}` captures; the router gives the static ones priority.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(timeline::timeline))
        .route("/public", get(timeline::public_timeline))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/{username}", get(timeline::user_timeline));

    let protected = Router::new()
        .route("/add_message", post(messages::add_message))
        .route("/_get_public_key", get(follow::get_public_key))
        .route("/_approve_token", get(follow::approve_token))
        .route("/_accept_token", get(follow::accept_token))
        .route(
            "/{username}/follow",
            get(follow::follow_page).post(follow::follow_submit),
        )
        .route("/{username}/unfollow", get(follow::unfollow))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
