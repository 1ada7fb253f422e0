//! Database row types mapped straight from SQLite rows. Kept separate from
//! the warble-types API payloads so the storage layer stays independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub pw_hash: String,
    pub pub_key: String,
}

/// A `message` row joined with its author, ready for timeline rendering.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub message_id: i64,
    pub author_id: i64,
    pub username: String,
    pub email: String,
    pub text: String,
    pub pub_date: i64,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct FollowerRow {
    pub who_id: i64,
    pub whom_id: i64,
    pub token_status: i64,
    pub token: String,
}

/// A handshake edge joined with the counterpart's username, as listed on
/// the timeline page (incoming requests, approved grants).
#[derive(Debug, Clone)]
pub struct HandshakeRow {
    pub username: String,
    pub token: String,
}
