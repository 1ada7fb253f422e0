use serde::{Deserialize, Serialize};

// -- Session claims --

/// Session claims shared by the auth handlers (which mint the cookie) and
/// the session middleware (which validates it). Canonical definition lives
/// here in warble-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth forms --

/// Missing form fields decode as empty strings so handlers can answer with
/// an inline validation message instead of a framework-level rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
    #[serde(default)]
    pub pubkey: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Posting --

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub token: String,
}

// -- Follow handshake --

#[derive(Debug, Deserialize)]
pub struct FollowForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub hashtag: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PublicKeyQuery {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveTokenQuery {
    pub approved_username: Option<String>,
    pub approved_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptTokenQuery {
    pub username: Option<String>,
    pub token: Option<String>,
}

// -- AJAX responses --

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub pub_key: String,
}

#[derive(Debug, Serialize)]
pub struct HandshakeResponse {
    pub result: &'static str,
}

impl HandshakeResponse {
    pub fn success() -> Self {
        Self { result: "success" }
    }
}
