// libs/progress-cell/src/services/progress.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::models::{CheckInRequest, ProgressError, ProgressRecord, ProgressSummary, MAX_PAIN_LEVEL};
use crate::services::aggregator::{self, summarize};
use crate::store::ProgressStore;

pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Trend summary for the six weeks ending with `today`.
    #[instrument(skip(self))]
    pub async fn summary(&self, customer_id: Uuid, today: NaiveDate) -> Result<ProgressSummary, ProgressError> {
        let from_date = aggregator::window_start(today);
        let records = self.store.query_progress_records(customer_id, from_date).await?;

        debug!("Summarizing {} progress record(s) since {}", records.len(), from_date);
        Ok(summarize(&records, today))
    }

    #[instrument(skip(self, request))]
    pub async fn record_check_in(
        &self,
        customer_id: Uuid,
        request: CheckInRequest,
        today: NaiveDate,
    ) -> Result<ProgressRecord, ProgressError> {
        let pain_level = match request.pain_level {
            Some(level) => Some(Self::validate_pain_level(level)?),
            None => None,
        };

        let date = request.date.unwrap_or(today);
        if date > today {
            warn!("Rejected check-in dated {} (today is {})", date, today);
            return Err(ProgressError::ValidationError(
                "Check-ins cannot be recorded for a future date".to_string(),
            ));
        }

        let record = ProgressRecord {
            id: Uuid::new_v4(),
            customer_id,
            exercise_id: request.exercise_id,
            date,
            is_completed: request.is_completed,
            pain_level,
        };

        let created = self.store.insert_progress_record(record).await?;
        info!("Recorded check-in {} for customer {} on {}", created.id, customer_id, created.date);
        Ok(created)
    }

    fn validate_pain_level(level: i32) -> Result<u8, ProgressError> {
        if !(0..=MAX_PAIN_LEVEL).contains(&level) {
            return Err(ProgressError::InvalidPainLevel(level));
        }
        u8::try_from(level).map_err(|_| ProgressError::InvalidPainLevel(level))
    }
}
