use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Idempotent schema creation. Safe to run on every startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        -- Deferred so a user and its bookings can be removed in either
        -- order inside one transaction.
        CREATE TABLE IF NOT EXISTS bookings (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL
                        REFERENCES users(id) DEFERRABLE INITIALLY DEFERRED,
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL,
            comment     TEXT,
            CHECK (end_time > start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_user
            ON bookings(user_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
