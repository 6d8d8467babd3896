// libs/progress-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MAX_PAIN_LEVEL: i32 = 10;

// ==============================================================================
// CORE PROGRESS MODELS
// ==============================================================================

/// One check-in for one customer on one calendar day. A day may hold several
/// records, one per exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub exercise_id: Option<Uuid>,
    pub date: NaiveDate,
    pub is_completed: bool,
    pub pain_level: Option<u8>,
}

/// Trend numbers derived from progress records. Recomputed on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    /// Average pain per day, oldest first, ending today. Days without data are 0.
    pub daily_pain: [f64; 7],
    /// Completion percentage per ISO week, oldest first, ending with the current week.
    pub weekly_adherence: [u32; 6],
    pub weekly_adherence_percent: u32,
    pub pain_delta_percent: i64,
    pub average_pain: f64,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    pub exercise_id: Option<Uuid>,
    pub is_completed: bool,
    pub pain_level: Option<i32>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressError {
    #[error("Pain level must be between 0 and 10, got {0}")]
    InvalidPainLevel(i32),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ProgressError> for shared_models::error::AppError {
    fn from(err: ProgressError) -> Self {
        use shared_models::error::AppError;

        let message = err.to_string();
        match err {
            ProgressError::InvalidPainLevel(_) | ProgressError::ValidationError(_) => {
                AppError::ValidationError(message)
            }
            ProgressError::DatabaseError(_) => AppError::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::error::AppError;

    #[test]
    fn test_record_deserializes_without_pain() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "customer_id": Uuid::nil(),
            "exercise_id": null,
            "date": "2024-05-06",
            "is_completed": true,
            "pain_level": null
        });

        let record: ProgressRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(record.pain_level, None);
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AppError::from(ProgressError::InvalidPainLevel(11)),
            AppError::ValidationError(_)
        ));
        assert!(matches!(
            AppError::from(ProgressError::DatabaseError("down".into())),
            AppError::Database(_)
        ));
    }
}
