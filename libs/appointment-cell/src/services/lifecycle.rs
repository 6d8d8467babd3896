// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentJoinRow, AppointmentStatus};
use crate::store::AppointmentStore;

/// Owns the appointment status machine:
/// booked|confirmed -> cancelled (explicit), booked|confirmed -> completed (overdue sweep).
/// Completed and cancelled are terminal.
pub struct AppointmentLifecycleService {
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub fn valid_transitions(current_status: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current_status {
            AppointmentStatus::Booked | AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn validate_status_transition(
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if Self::valid_transitions(current_status).contains(&new_status) {
            Ok(())
        } else {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            })
        }
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Cancel an appointment owned by `customer_id`. Cancelling twice is a
    /// no-op; cancelling a completed appointment is rejected. The slot stays booked.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        customer_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        if appointment.customer_id != customer_id {
            return Err(AppointmentError::NotFound);
        }

        if appointment.status == AppointmentStatus::Cancelled {
            debug!("Appointment {} already cancelled", appointment_id);
            return Ok(appointment);
        }
        Self::validate_status_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let changed = self.store
            .update_appointment_statuses(
                &[appointment_id],
                &AppointmentStatus::ACTIVE,
                AppointmentStatus::Cancelled,
            )
            .await?;

        if changed == 0 {
            // Status moved between our read and the guarded write.
            let current = self.get_appointment(appointment_id).await?;
            if current.status == AppointmentStatus::Cancelled {
                return Ok(current);
            }
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: AppointmentStatus::Cancelled,
            });
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(Appointment {
            status: AppointmentStatus::Cancelled,
            ..appointment
        })
    }

    /// Ids of rows that are still active but whose start time is strictly before `now`.
    pub fn resolve_overdue_ids(rows: &[AppointmentJoinRow], now: DateTime<Utc>) -> Vec<Uuid> {
        rows.iter()
            .filter(|row| row.appointment.status.is_active() && row.effective_start_time() < now)
            .map(|row| row.appointment.id)
            .collect()
    }

    /// Mark the given overdue ids completed. Only rows still active are touched,
    /// so repeating the sweep is harmless.
    #[instrument(skip(self, overdue_ids), fields(count = overdue_ids.len()))]
    pub async fn sweep_overdue(&self, overdue_ids: &[Uuid]) -> Result<usize, AppointmentError> {
        if overdue_ids.is_empty() {
            return Ok(0);
        }

        let changed = self.store
            .update_appointment_statuses(
                overdue_ids,
                &AppointmentStatus::ACTIVE,
                AppointmentStatus::Completed,
            )
            .await?;

        info!("Overdue sweep completed {} of {} appointment(s)", changed, overdue_ids.len());
        Ok(changed)
    }
}
