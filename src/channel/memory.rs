use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::ContextRecord;

use super::ContextStore;

/// Process-local store for tests and single-process runs.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    records: RwLock<HashMap<String, ContextRecord>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, user_id: &str) -> Result<Option<ContextRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|_| anyhow!("context store lock poisoned"))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: ContextRecord) -> Result<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| anyhow!("context store lock poisoned"))?;
        guard.insert(user_id.to_string(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContextLabel;

    #[tokio::test]
    async fn missing_user_reads_as_none() {
        let store = InMemoryContextStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryContextStore::new();
        store
            .put("u", ContextRecord::new("u", ContextLabel::Resting, 60, 1))
            .await
            .unwrap();
        store
            .put("u", ContextRecord::new("u", ContextLabel::Workout, 140, 2))
            .await
            .unwrap();

        let record = store.get("u").await.unwrap().unwrap();
        assert_eq!(record.label(), Some(ContextLabel::Workout));
        assert_eq!(record.timestamp, 2);
    }
}
