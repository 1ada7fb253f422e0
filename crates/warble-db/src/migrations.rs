use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user (
            user_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            username  TEXT NOT NULL UNIQUE,
            email     TEXT NOT NULL,
            pw_hash   TEXT NOT NULL,
            pub_key   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS message (
            message_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id   INTEGER NOT NULL REFERENCES user(user_id),
            text        TEXT NOT NULL,
            pub_date    INTEGER NOT NULL,
            token       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_message_pub_date
            ON message(pub_date);

        -- No uniqueness on (who_id, whom_id): re-requesting a follow stacks
        -- rows, and unfollow deletes them all.
        CREATE TABLE IF NOT EXISTS follower (
            who_id        INTEGER NOT NULL REFERENCES user(user_id),
            whom_id       INTEGER NOT NULL REFERENCES user(user_id),
            token_status  INTEGER NOT NULL,
            token         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_follower_pair
            ON follower(who_id, whom_id);
        ",
    )?;

    info!("database migrations complete");
    Ok(())
}
