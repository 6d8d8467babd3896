// libs/progress-cell/src/store/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ProgressError, ProgressRecord};
use crate::store::ProgressStore;

#[derive(Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<Uuid, Vec<ProgressRecord>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn query_progress_records(
        &self,
        customer_id: Uuid,
        from_date: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, ProgressError> {
        let mut records: Vec<ProgressRecord> = self
            .records
            .read()
            .await
            .get(&customer_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.date >= from_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        records.sort_by_key(|record| record.date);
        Ok(records)
    }

    async fn insert_progress_record(&self, record: ProgressRecord) -> Result<ProgressRecord, ProgressError> {
        self.records
            .write()
            .await
            .entry(record.customer_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }
}
