// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A provider-defined bookable window. `is_booked` only ever flips to true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub slot_id: Uuid,
    pub service_mode: ServiceMode,
    pub address_text: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    /// Snapshot of the slot window taken at booking time. Older rows may lack it.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ACTIVE: [AppointmentStatus; 2] = [AppointmentStatus::Booked, AppointmentStatus::Confirmed];

    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Booked | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMode {
    #[serde(alias = "clinic")]
    InClinic,
    #[serde(alias = "home_visit")]
    Home,
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceMode::InClinic => write!(f, "in_clinic"),
            ServiceMode::Home => write!(f, "home"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
}

/// An appointment as returned by list queries, with the referenced slot and
/// provider embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentJoinRow {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub slot: Option<Slot>,
    pub provider: Option<ProviderSummary>,
}

impl AppointmentJoinRow {
    /// Start time used for every "future/past" decision: the booking-time
    /// snapshot, then the live slot, then the creation time.
    pub fn effective_start_time(&self) -> DateTime<Utc> {
        self.appointment
            .start_time
            .or_else(|| self.slot.as_ref().map(|slot| slot.start_time))
            .unwrap_or(self.appointment.created_at)
    }

    pub fn effective_end_time(&self) -> Option<DateTime<Utc>> {
        self.appointment
            .end_time
            .or_else(|| self.slot.as_ref().map(|slot| slot.end_time))
    }
}

// ==============================================================================
// QUERY MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter handed to `AppointmentStore::query_appointments`. Rows are ordered by
/// the appointment start time.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentQuery {
    pub customer_id: Uuid,
    pub statuses: Vec<AppointmentStatus>,
    pub starts_at_or_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub direction: SortDirection,
    pub limit: Option<usize>,
}

impl AppointmentQuery {
    pub fn for_customer(customer_id: Uuid, statuses: &[AppointmentStatus]) -> Self {
        Self {
            customer_id,
            statuses: statuses.to_vec(),
            starts_at_or_after: None,
            starts_before: None,
            direction: SortDirection::Descending,
            limit: None,
        }
    }

    pub fn starting_at_or_after(mut self, time: DateTime<Utc>) -> Self {
        self.starts_at_or_after = Some(time);
        self
    }

    pub fn starting_before(mut self, time: DateTime<Utc>) -> Self {
        self.starts_before = Some(time);
        self
    }

    pub fn ordered(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub slot_id: Uuid,
    pub service_mode: ServiceMode,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// One row of the history list. `status` is the display status: overdue
/// active appointments show as completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub provider_name: Option<String>,
    pub service_mode: ServiceMode,
    pub address_text: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
}

impl AppointmentSummary {
    pub fn from_row(row: &AppointmentJoinRow, status: AppointmentStatus) -> Self {
        Self {
            id: row.appointment.id,
            provider_id: row.appointment.provider_id,
            provider_name: row.provider.as_ref().and_then(|p| p.full_name.clone()),
            service_mode: row.appointment.service_mode,
            address_text: row.appointment.address_text.clone(),
            start_time: row.effective_start_time(),
            end_time: row.effective_end_time(),
            status,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Coarse classification callers use to pick a recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    InvalidState,
    Validation,
    PersistenceFailure,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Slot not found")]
    SlotNotFound,

    #[error("Slot has already been booked")]
    SlotAlreadyBooked,

    #[error("Slot start time has already passed")]
    SlotInPast,

    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::SlotAlreadyBooked => ErrorKind::Conflict,
            AppointmentError::SlotNotFound | AppointmentError::NotFound => ErrorKind::NotFound,
            AppointmentError::SlotInPast | AppointmentError::InvalidStatusTransition { .. } => {
                ErrorKind::InvalidState
            }
            AppointmentError::ValidationError(_) => ErrorKind::Validation,
            AppointmentError::DatabaseError(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<AppointmentError> for shared_models::error::AppError {
    fn from(err: AppointmentError) -> Self {
        use shared_models::error::AppError;

        let message = err.to_string();
        match err.kind() {
            ErrorKind::Conflict => AppError::Conflict(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::InvalidState => AppError::BadRequest(message),
            ErrorKind::Validation => AppError::ValidationError(message),
            ErrorKind::PersistenceFailure => AppError::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn row(start: Option<DateTime<Utc>>, slot_start: Option<DateTime<Utc>>) -> AppointmentJoinRow {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let provider_id = Uuid::new_v4();
        AppointmentJoinRow {
            appointment: Appointment {
                id: Uuid::new_v4(),
                customer_id: Uuid::new_v4(),
                provider_id,
                slot_id: Uuid::new_v4(),
                service_mode: ServiceMode::InClinic,
                address_text: None,
                phone: None,
                notes: None,
                status: AppointmentStatus::Booked,
                created_at,
                start_time: start,
                end_time: None,
            },
            slot: slot_start.map(|s| Slot {
                id: Uuid::new_v4(),
                provider_id,
                start_time: s,
                end_time: s + Duration::minutes(45),
                is_booked: true,
            }),
            provider: None,
        }
    }

    #[test]
    fn test_effective_start_prefers_snapshot() {
        let snapshot = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let moved = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();

        assert_eq!(row(Some(snapshot), Some(moved)).effective_start_time(), snapshot);
    }

    #[test]
    fn test_effective_start_falls_back_to_slot_then_created_at() {
        let slot_start = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(row(None, Some(slot_start)).effective_start_time(), slot_start);

        let bare = row(None, None);
        assert_eq!(bare.effective_start_time(), bare.appointment.created_at);
        assert_eq!(bare.effective_end_time(), None);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::Booked).unwrap(), "\"booked\"");
        assert_eq!(
            serde_json::from_str::<AppointmentStatus>("\"cancelled\"").unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!(AppointmentStatus::Confirmed.is_active());
        assert!(AppointmentStatus::Completed.is_terminal());
    }

    #[test]
    fn test_join_row_deserializes_embedded_slot() {
        let json = serde_json::json!({
            "id": "6f1c5a3e-7b33-4a4d-9a53-2f0b9a0c6a11",
            "customer_id": "0b5e7b5e-8c1e-4a8c-a5c5-3d2b1c0e9f10",
            "provider_id": "a3d1e6f2-1234-4c5d-8e9f-0a1b2c3d4e5f",
            "slot_id": "c0ffee00-1234-4c5d-8e9f-0a1b2c3d4e5f",
            "service_mode": "home",
            "address_text": "12 Main St",
            "phone": null,
            "notes": null,
            "status": "confirmed",
            "created_at": "2024-01-01T00:00:00Z",
            "start_time": null,
            "end_time": null,
            "slot": {
                "id": "c0ffee00-1234-4c5d-8e9f-0a1b2c3d4e5f",
                "provider_id": "a3d1e6f2-1234-4c5d-8e9f-0a1b2c3d4e5f",
                "start_time": "2024-02-01T10:00:00Z",
                "end_time": "2024-02-01T10:45:00Z",
                "is_booked": true
            },
            "provider": { "id": "a3d1e6f2-1234-4c5d-8e9f-0a1b2c3d4e5f", "full_name": "Dr. Physio" }
        });

        let row: AppointmentJoinRow = serde_json::from_value(json).unwrap();
        assert_eq!(row.appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(row.appointment.service_mode, ServiceMode::Home);
        assert_eq!(
            row.effective_start_time(),
            Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(AppointmentError::SlotAlreadyBooked.kind(), ErrorKind::Conflict);
        assert_eq!(AppointmentError::SlotInPast.kind(), ErrorKind::InvalidState);
        assert_eq!(AppointmentError::SlotNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            AppointmentError::DatabaseError("boom".into()).kind(),
            ErrorKind::PersistenceFailure
        );
    }
}
