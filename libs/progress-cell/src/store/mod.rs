// libs/progress-cell/src/store/mod.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{ProgressError, ProgressRecord};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryProgressStore;
pub use supabase::SupabaseProgressStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All records for `customer_id` dated on or after `from_date`, oldest first.
    async fn query_progress_records(
        &self,
        customer_id: Uuid,
        from_date: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, ProgressError>;

    async fn insert_progress_record(&self, record: ProgressRecord) -> Result<ProgressRecord, ProgressError>;
}
