use anyhow::Result;
use async_trait::async_trait;

use crate::db::Database;
use crate::models::ContextRecord;

use super::ContextStore;

#[async_trait]
impl ContextStore for Database {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, user_id: &str) -> Result<Option<ContextRecord>> {
        self.get_context_record(user_id).await
    }

    async fn put(&self, user_id: &str, record: ContextRecord) -> Result<()> {
        self.upsert_context_record(user_id, &record).await
    }
}
