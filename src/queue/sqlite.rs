//! SQLite-backed durable work queue
//!
//! Any number of processes may open the same database file. A message row is
//! claimed inside an IMMEDIATE transaction, which takes SQLite's write lock
//! before the SELECT, so two consumers can never claim the same row.

use crate::config::QueueConfig;
use crate::queue::schema::initialize_schema;
use crate::queue::traits::{Delivery, QueueDepth, QueueError, QueueResult, WorkQueue};
use crate::state::MessageState;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn lease_millis(lease_timeout: Duration) -> i64 {
    i64::try_from(lease_timeout.as_millis()).unwrap_or(i64::MAX)
}

/// Durable queue stored in a SQLite database file
pub struct SqliteQueue {
    conn: Mutex<Connection>,
    name: String,
    /// Lease length in milliseconds, saturated to what the column holds
    lease_ms: i64,
}

impl SqliteQueue {
    /// Opens (or creates) the named queue in the database at `path`
    ///
    /// An unacknowledged delivery becomes deliverable again once
    /// `lease_timeout` has passed without an ack or reject.
    pub fn open(path: &Path, name: &str, lease_timeout: Duration) -> QueueResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            QueueError::Connection(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::configure(conn, name, lease_timeout)
    }

    /// Opens the queue described by the configuration
    pub fn from_config(config: &QueueConfig) -> QueueResult<Self> {
        Self::open(&config.database_path, &config.name, config.lease_timeout())
    }

    fn configure(conn: Connection, name: &str, lease_timeout: Duration) -> QueueResult<Self> {
        conn.busy_timeout(Duration::from_secs(10))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            name: name.to_string(),
            lease_ms: lease_millis(lease_timeout),
        })
    }

    /// Creates an in-memory queue (for testing)
    #[cfg(test)]
    pub fn new_in_memory(lease_timeout: Duration) -> QueueResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            name: "test_queue".to_string(),
            lease_ms: lease_millis(lease_timeout),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| QueueError::Poisoned)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl WorkQueue for SqliteQueue {
    async fn publish(&self, payload: &[u8]) -> QueueResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO queue_messages (queue, payload, state, published_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                self.name,
                payload,
                MessageState::Ready.to_db_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    async fn try_receive(&self, consumer: &str) -> QueueResult<Option<Delivery>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_millis();

        let claimable = tx
            .query_row(
                "SELECT id, payload, delivery_count FROM queue_messages
                 WHERE queue = ?1
                   AND (state = ?2 OR (state = ?3 AND lease_expires_at <= ?4))
                 ORDER BY id
                 LIMIT 1",
                params![
                    self.name,
                    MessageState::Ready.to_db_string(),
                    MessageState::Unacked.to_db_string(),
                    now
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, payload, delivery_count)) = claimable else {
            tx.commit()?;
            return Ok(None);
        };

        let lease_expires_at = now.saturating_add(self.lease_ms);
        tx.execute(
            "UPDATE queue_messages
             SET state = ?1, consumer = ?2, lease_expires_at = ?3, delivery_count = delivery_count + 1
             WHERE id = ?4",
            params![
                MessageState::Unacked.to_db_string(),
                consumer,
                lease_expires_at,
                id
            ],
        )?;
        tx.commit()?;

        Ok(Some(Delivery {
            tag: id,
            payload,
            consumer: consumer.to_string(),
            redelivered: delivery_count > 0,
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM queue_messages WHERE id = ?1 AND consumer = ?2 AND state = ?3",
            params![
                delivery.tag,
                delivery.consumer,
                MessageState::Unacked.to_db_string()
            ],
        )?;

        if deleted == 0 {
            return Err(QueueError::UnknownDelivery(delivery.tag));
        }
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery, requeue: bool) -> QueueResult<()> {
        let conn = self.lock()?;
        let changed = if requeue {
            conn.execute(
                "UPDATE queue_messages
                 SET state = ?1, consumer = NULL, lease_expires_at = NULL
                 WHERE id = ?2 AND consumer = ?3 AND state = ?4",
                params![
                    MessageState::Ready.to_db_string(),
                    delivery.tag,
                    delivery.consumer,
                    MessageState::Unacked.to_db_string()
                ],
            )?
        } else {
            conn.execute(
                "DELETE FROM queue_messages WHERE id = ?1 AND consumer = ?2 AND state = ?3",
                params![
                    delivery.tag,
                    delivery.consumer,
                    MessageState::Unacked.to_db_string()
                ],
            )?
        };

        if changed == 0 {
            return Err(QueueError::UnknownDelivery(delivery.tag));
        }
        Ok(())
    }

    async fn depth(&self) -> QueueResult<QueueDepth> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT state, COUNT(*) FROM queue_messages WHERE queue = ?1 GROUP BY state")?;
        let rows = stmt.query_map(params![self.name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut depth = QueueDepth::default();
        for row in rows {
            let (state, count) = row?;
            match MessageState::from_db_string(&state) {
                Some(MessageState::Ready) => depth.ready = count as u64,
                Some(MessageState::Unacked) => depth.unacked = count as u64,
                None => tracing::warn!("Ignoring {} queue rows in unknown state {:?}", count, state),
            }
        }
        Ok(depth)
    }
}
