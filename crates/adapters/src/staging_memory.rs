//! In-memory staging slot for testing and offline mode

use async_trait::async_trait;
use dreampost_domain::{PendingContent, StagingError, StagingStore};
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStagingStore {
    slot: RwLock<Option<PendingContent>>,
}

impl InMemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `record`
    pub fn with_record(record: PendingContent) -> Self {
        Self {
            slot: RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn put(&self, record: &PendingContent) -> Result<(), StagingError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| StagingError::Corrupt(e.to_string()))?;
        *slot = Some(record.clone());
        Ok(())
    }

    async fn get(&self) -> Result<Option<PendingContent>, StagingError> {
        let slot = self
            .slot
            .read()
            .map_err(|e| StagingError::Corrupt(e.to_string()))?;
        Ok(slot.clone())
    }
}
