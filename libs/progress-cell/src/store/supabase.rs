// libs/progress-cell/src/store/supabase.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{ProgressError, ProgressRecord};
use crate::store::ProgressStore;

/// `ProgressStore` over the PostgREST `progress_records` table.
pub struct SupabaseProgressStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseProgressStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ProgressStore for SupabaseProgressStore {
    async fn query_progress_records(
        &self,
        customer_id: Uuid,
        from_date: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, ProgressError> {
        let path = format!(
            "/rest/v1/progress_records?customer_id=eq.{}&date=gte.{}&order=date.asc",
            customer_id,
            from_date.format("%Y-%m-%d")
        );
        debug!("Fetching progress records: {}", path);

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ProgressError::DatabaseError(format!("Failed to fetch progress records: {}", e)))
    }

    async fn insert_progress_record(&self, record: ProgressRecord) -> Result<ProgressRecord, ProgressError> {
        let body = serde_json::to_value(&record)
            .map_err(|e| ProgressError::DatabaseError(format!("Failed to encode progress record: {}", e)))?;

        let created: Vec<ProgressRecord> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/progress_records",
                Some(body),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ProgressError::DatabaseError(format!("Failed to insert progress record: {}", e)))?;

        created.into_iter().next().ok_or_else(|| {
            ProgressError::DatabaseError("Progress insert returned no rows".to_string())
        })
    }
}
