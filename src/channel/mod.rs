//! Hand-off point between the sensing side and the playback side.
//!
//! A single overwrite-only record per user identity. Writers replace the whole
//! record; readers get whatever was written last, possibly stale. There is no
//! history, no version number and no locking across the two sides.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ContextRecord;

pub use memory::InMemoryContextStore;

#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Storage name for logging
    fn name(&self) -> &'static str;

    /// Latest record for `user_id`, or `None` if nothing was ever written.
    async fn get(&self, user_id: &str) -> Result<Option<ContextRecord>>;

    /// Atomically replace the record for `user_id`.
    async fn put(&self, user_id: &str, record: ContextRecord) -> Result<()>;
}
