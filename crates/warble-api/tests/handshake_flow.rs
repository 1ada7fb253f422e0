//! End-to-end tests against the full router: register, log in, post,
//! run the follow-token handshake, and observe timeline visibility.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use warble_api::auth::AppStateInner;
use warble_api::router::build_router;
use warble_db::Database;

fn test_app() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        secret_key: "integration-secret".into(),
        per_page: 30,
    });
    build_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> Response<axum::body::Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn form_post(uri: &str, body: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn session_cookie(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("warble_session="))
        .map(|value| value.split(';').next().unwrap().to_string())
        .expect("no session cookie in response")
}

async fn body_text(response: Response<axum::body::Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn register(app: &Router, username: &str) {
    let body = format!(
        "username={username}&email={username}%40example.com&password=secret\
         &password2=secret&pubkey={username}-pub-key"
    );
    let response = send(app, form_post("/register", &body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

async fn login(app: &Router, username: &str) -> String {
    let body = format!("username={username}&password=secret");
    let response = send(app, form_post("/login", &body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

#[tokio::test]
async fn follow_token_handshake_gates_timeline_visibility() {
    let app = test_app();

    register(&app, "alice").await;
    register(&app, "bob").await;

    let bob = login(&app, "bob").await;
    let alice = login(&app, "alice").await;

    // Bob posts a message addressed with token "tok1".
    let response = send(&app, form_post("/add_message", "text=hello&token=tok1", Some(&bob))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Alice requests to follow bob.
    let response = send(
        &app,
        form_post(
            "/bob/follow",
            "username=bob&hashtag=h&token=pending",
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The pending edge token does not match the message token yet.
    let timeline = body_text(send(&app, get("/", Some(&alice))).await).await;
    assert!(!timeline.contains("hello"));

    // Bob sees the incoming request on his timeline.
    let bobs_page = body_text(send(&app, get("/", Some(&bob))).await).await;
    assert!(bobs_page.contains("data-username=\"alice\""));

    // Bob approves with the token his message was addressed with.
    let response = send(
        &app,
        get(
            "/_approve_token?approved_username=alice&approved_token=tok1",
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"result\":\"success\"}");

    let timeline = body_text(send(&app, get("/", Some(&alice))).await).await;
    assert!(timeline.contains("hello"));

    // Accepting with the same token keeps the message visible.
    let response = send(
        &app,
        get("/_accept_token?username=bob&token=tok1", Some(&alice)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let timeline = body_text(send(&app, get("/", Some(&alice))).await).await;
    assert!(timeline.contains("hello"));

    // A mismatched grant hides it again.
    send(
        &app,
        get(
            "/_approve_token?approved_username=alice&approved_token=tok2",
            Some(&bob),
        ),
    )
    .await;
    let timeline = body_text(send(&app, get("/", Some(&alice))).await).await;
    assert!(!timeline.contains("hello"));

    // The public timeline never cared about tokens.
    let public = body_text(send(&app, get("/public", None)).await).await;
    assert!(public.contains("hello"));

    // Unfollow drops the edge entirely.
    let response = send(&app, get("/bob/unfollow", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let profile = body_text(send(&app, get("/bob", Some(&alice))).await).await;
    assert!(profile.contains("/bob/follow"));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = test_app();

    for uri in [
        "/_get_public_key?username=bob",
        "/_approve_token?approved_username=a&approved_token=t",
        "/_accept_token?username=a&token=t",
        "/alice/follow",
        "/alice/unfollow",
    ] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = send(&app, form_post("/add_message", "text=hi&token=t", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ajax_endpoints_validate_their_parameters() {
    let app = test_app();
    register(&app, "alice").await;
    register(&app, "bob").await;
    let alice = login(&app, "alice").await;

    for uri in [
        "/_get_public_key",
        "/_get_public_key?username=",
        "/_approve_token?approved_username=bob",
        "/_approve_token?approved_token=t",
        "/_accept_token?token=t",
        "/_accept_token?username=bob",
    ] {
        let response = send(&app, get(uri, Some(&alice))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let response = send(&app, get("/_get_public_key?username=bob", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"pub_key\":\"bob-pub-key\"}");

    let response = send(&app, get("/_get_public_key?username=ghost", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown counterpart usernames are a silent no-op, not an error.
    let response = send(
        &app,
        get(
            "/_approve_token?approved_username=ghost&approved_token=t",
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"result\":\"success\"}");
}

#[tokio::test]
async fn anonymous_root_redirects_to_public() {
    let app = test_app();

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/public"
    );
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let app = test_app();

    let response = send(&app, get("/nobody", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    register(&app, "alice").await;
    let alice = login(&app, "alice").await;
    let response = send(&app, get("/nobody/follow", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_message_text_is_silently_dropped() {
    let app = test_app();
    register(&app, "alice").await;
    let alice = login(&app, "alice").await;

    let response = send(&app, form_post("/add_message", "text=&token=t", Some(&alice))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let public = body_text(send(&app, get("/public", None)).await).await;
    assert!(public.contains("There's nothing here so far."));
}
