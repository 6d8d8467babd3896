// libs/appointment-cell/src/store/mod.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentError, AppointmentJoinRow, AppointmentQuery, AppointmentStatus, Slot,
};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

/// Persistence for slots and appointments. Implementations own all durable
/// state; services re-read through this trait on every call and never cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get_slot(&self, slot_id: Uuid) -> Result<Option<Slot>, AppointmentError>;

    /// Unbooked slots for a provider starting strictly after `from`, earliest first.
    async fn list_open_slots(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AppointmentError>;

    /// Conditional write: flips `is_booked` to true only if it is currently false.
    /// Returns false when another writer got there first.
    async fn try_set_slot_booked(&self, slot_id: Uuid) -> Result<bool, AppointmentError>;

    /// Undo a won `try_set_slot_booked` whose appointment insert then failed.
    async fn release_slot(&self, slot_id: Uuid) -> Result<(), AppointmentError>;

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    async fn query_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<AppointmentJoinRow>, AppointmentError>;

    /// Set `new_status` on every id whose current status is in `expected`.
    /// Returns the number of rows changed.
    async fn update_appointment_statuses(
        &self,
        ids: &[Uuid],
        expected: &[AppointmentStatus],
        new_status: AppointmentStatus,
    ) -> Result<usize, AppointmentError>;
}
