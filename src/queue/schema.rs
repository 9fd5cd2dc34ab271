//! Queue table definition

use rusqlite::Connection;

/// SQL schema for the queue
pub const SCHEMA_SQL: &str = r#"
-- One row per message that has not been acknowledged
CREATE TABLE IF NOT EXISTS queue_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue TEXT NOT NULL,
    payload BLOB NOT NULL,
    state TEXT NOT NULL,
    consumer TEXT,
    lease_expires_at INTEGER,
    delivery_count INTEGER NOT NULL DEFAULT 0,
    published_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_queue_messages_claim ON queue_messages(queue, state, id);
"#;

/// Creates the queue table if it does not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
