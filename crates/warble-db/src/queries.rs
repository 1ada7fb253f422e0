use rusqlite::{Connection, OptionalExtension, params};

use warble_types::follow::TokenStatus;

use crate::Database;
use crate::Result;
use crate::models::{FollowerRow, HandshakeRow, MessageRow, UserRow};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        pw_hash: &str,
        pub_key: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user (username, email, pw_hash, pub_key) VALUES (?1, ?2, ?3, ?4)",
                params![username, email, pw_hash, pub_key],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &[&username]))
    }

    pub fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "user_id = ?1", &[&user_id]))
    }

    pub fn user_id_by_username(&self, username: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT user_id FROM user WHERE username = ?1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        author_id: i64,
        text: &str,
        pub_date: i64,
        token: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message (author_id, text, pub_date, token) VALUES (?1, ?2, ?3, ?4)",
                params![author_id, text, pub_date, token],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// The user's own messages, plus messages from any followed author whose
    /// follower-edge token equals the message's stored token. Visibility is
    /// gated per edge by exact token equality, not by edge existence.
    pub fn own_timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.message_id, m.author_id, u.username, u.email, m.text, m.pub_date, m.token
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE u.user_id = ?1
                    OR u.user_id IN (SELECT whom_id FROM follower
                                     WHERE token = m.token AND who_id = ?1)
                 ORDER BY m.pub_date DESC
                 LIMIT ?2",
            )?;
            collect_messages(stmt.query_map(params![user_id, limit], map_message_row)?)
        })
    }

    /// The latest messages of all users, identical for every caller.
    pub fn public_timeline(&self, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.message_id, m.author_id, u.username, u.email, m.text, m.pub_date, m.token
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 ORDER BY m.pub_date DESC
                 LIMIT ?1",
            )?;
            collect_messages(stmt.query_map(params![limit], map_message_row)?)
        })
    }

    /// One author's messages, token-independent.
    pub fn user_timeline(&self, author_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.message_id, m.author_id, u.username, u.email, m.text, m.pub_date, m.token
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE u.user_id = ?1
                 ORDER BY m.pub_date DESC
                 LIMIT ?2",
            )?;
            collect_messages(stmt.query_map(params![author_id, limit], map_message_row)?)
        })
    }

    // -- Follow handshake --

    /// The follower inserts a new edge in REQUESTED state. No duplicate
    /// guard: re-requesting stacks another row.
    pub fn request_follow(&self, who_id: i64, whom_id: i64, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO follower (who_id, whom_id, token_status, token)
                 VALUES (?1, ?2, ?3, ?4)",
                params![who_id, whom_id, TokenStatus::Requested.as_i64(), token],
            )?;
            Ok(())
        })
    }

    /// The followee marks the edge APPROVED and records the granted token.
    /// Returns the number of rows touched; zero (no such edge) is not an
    /// error.
    pub fn approve_follow(&self, who_id: i64, whom_id: i64, token: &str) -> Result<usize> {
        self.set_edge_status(who_id, whom_id, TokenStatus::Approved, token)
    }

    /// The original follower records the final token, completing the
    /// handshake. Same silent no-op contract as `approve_follow`.
    pub fn accept_follow(&self, who_id: i64, whom_id: i64, token: &str) -> Result<usize> {
        self.set_edge_status(who_id, whom_id, TokenStatus::Accepted, token)
    }

    fn set_edge_status(
        &self,
        who_id: i64,
        whom_id: i64,
        status: TokenStatus,
        token: &str,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE follower SET token_status = ?1, token = ?2
                 WHERE who_id = ?3 AND whom_id = ?4",
                params![status.as_i64(), token, who_id, whom_id],
            )?;
            Ok(affected)
        })
    }

    /// Deletes every row for the pair, whatever its state.
    pub fn unfollow(&self, who_id: i64, whom_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM follower WHERE who_id = ?1 AND whom_id = ?2",
                params![who_id, whom_id],
            )?;
            Ok(affected)
        })
    }

    /// Any edge for the pair counts, regardless of handshake state.
    pub fn is_following(&self, who_id: i64, whom_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM follower WHERE who_id = ?1 AND whom_id = ?2",
                    params![who_id, whom_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Incoming edges awaiting the caller's approval.
    pub fn follow_requests_for(&self, whom_id: i64) -> Result<Vec<HandshakeRow>> {
        self.with_conn(|conn| {
            query_handshakes(
                conn,
                "SELECT u.username, f.token
                 FROM follower f
                 JOIN user u ON f.who_id = u.user_id
                 WHERE f.whom_id = ?1 AND f.token_status = ?2",
                whom_id,
                TokenStatus::Requested,
            )
        })
    }

    /// Edges the caller requested that the followee has approved, awaiting
    /// the caller's final acceptance.
    pub fn approved_grants_for(&self, who_id: i64) -> Result<Vec<HandshakeRow>> {
        self.with_conn(|conn| {
            query_handshakes(
                conn,
                "SELECT u.username, f.token
                 FROM follower f
                 JOIN user u ON f.whom_id = u.user_id
                 WHERE f.who_id = ?1 AND f.token_status = ?2",
                who_id,
                TokenStatus::Approved,
            )
        })
    }

    /// All raw edges for a pair, in insertion order.
    pub fn edges_between(&self, who_id: i64, whom_id: i64) -> Result<Vec<FollowerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT who_id, whom_id, token_status, token
                 FROM follower
                 WHERE who_id = ?1 AND whom_id = ?2
                 ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map(params![who_id, whom_id], |row| {
                    Ok(FollowerRow {
                        who_id: row.get(0)?,
                        whom_id: row.get(1)?,
                        token_status: row.get(2)?,
                        token: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT user_id, username, email, pw_hash, pub_key FROM user WHERE {filter}"
    );
    let row = conn
        .query_row(&sql, args, |row| {
            Ok(UserRow {
                user_id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                pw_hash: row.get(3)?,
                pub_key: row.get(4)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn query_handshakes(
    conn: &Connection,
    sql: &str,
    user_id: i64,
    status: TokenStatus,
) -> Result<Vec<HandshakeRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![user_id, status.as_i64()], |row| {
            Ok(HandshakeRow {
                username: row.get(0)?,
                token: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: row.get(0)?,
        author_id: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        text: row.get(4)?,
        pub_date: row.get(5)?,
        token: row.get(6)?,
    })
}

fn collect_messages(
    rows: impl Iterator<Item = rusqlite::Result<MessageRow>>,
) -> Result<Vec<MessageRow>> {
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
