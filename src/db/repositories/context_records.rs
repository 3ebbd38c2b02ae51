use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::db::Database;
use crate::models::ContextRecord;

impl Database {
    /// Replace the record for `user_id` in a single statement.
    pub async fn upsert_context_record(&self, user_id: &str, record: &ContextRecord) -> Result<()> {
        let user_id = user_id.to_string();
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO context_records (user_id, movement, heart_rate, timestamp)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     movement = excluded.movement,
                     heart_rate = excluded.heart_rate,
                     timestamp = excluded.timestamp",
                params![user_id, record.movement, record.heart_rate, record.timestamp],
            )
            .with_context(|| "failed to upsert context record")?;
            Ok(())
        })
        .await
    }

    pub async fn get_context_record(&self, user_id: &str) -> Result<Option<ContextRecord>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            conn.query_row(
                "SELECT user_id, movement, heart_rate, timestamp
                 FROM context_records
                 WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(ContextRecord {
                        user_id: row.get(0)?,
                        movement: row.get(1)?,
                        heart_rate: row.get(2)?,
                        timestamp: row.get(3)?,
                    })
                },
            )
            .optional()
            .with_context(|| "failed to read context record")
        })
        .await
    }
}
