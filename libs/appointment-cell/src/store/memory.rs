// libs/appointment-cell/src/store/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentError, AppointmentJoinRow, AppointmentQuery, AppointmentStatus,
    ProviderSummary, Slot, SortDirection,
};
use crate::store::AppointmentStore;

/// Process-local store. The slot compare-and-swap runs under a single write
/// guard, so concurrent bookers in one process serialize on it.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    providers: RwLock<HashMap<Uuid, ProviderSummary>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_slot(&self, slot: Slot) {
        self.slots.write().await.insert(slot.id, slot);
    }

    pub async fn put_appointment(&self, appointment: Appointment) {
        self.appointments.write().await.insert(appointment.id, appointment);
    }

    pub async fn put_provider(&self, provider: ProviderSummary) {
        self.providers.write().await.insert(provider.id, provider);
    }

    fn matches(query: &AppointmentQuery, row: &AppointmentJoinRow) -> bool {
        let appointment = &row.appointment;
        if appointment.customer_id != query.customer_id {
            return false;
        }
        if !query.statuses.is_empty() && !query.statuses.contains(&appointment.status) {
            return false;
        }

        let start = row.effective_start_time();
        if let Some(lower) = query.starts_at_or_after {
            if start < lower {
                return false;
            }
        }
        if let Some(upper) = query.starts_before {
            if start >= upper {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get_slot(&self, slot_id: Uuid) -> Result<Option<Slot>, AppointmentError> {
        Ok(self.slots.read().await.get(&slot_id).cloned())
    }

    async fn list_open_slots(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AppointmentError> {
        let mut open: Vec<Slot> = self
            .slots
            .read()
            .await
            .values()
            .filter(|slot| slot.provider_id == provider_id && !slot.is_booked && slot.start_time > from)
            .cloned()
            .collect();
        open.sort_by_key(|slot| slot.start_time);
        Ok(open)
    }

    async fn try_set_slot_booked(&self, slot_id: Uuid) -> Result<bool, AppointmentError> {
        let mut slots = self.slots.write().await;
        match slots.get_mut(&slot_id) {
            Some(slot) if !slot.is_booked => {
                slot.is_booked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_slot(&self, slot_id: Uuid) -> Result<(), AppointmentError> {
        if let Some(slot) = self.slots.write().await.get_mut(&slot_id) {
            slot.is_booked = false;
        }
        Ok(())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.write().await;
        if appointments.contains_key(&appointment.id) {
            return Err(AppointmentError::DatabaseError(format!(
                "duplicate appointment id {}",
                appointment.id
            )));
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.appointments.read().await.get(&appointment_id).cloned())
    }

    async fn query_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<AppointmentJoinRow>, AppointmentError> {
        let appointments = self.appointments.read().await;
        let slots = self.slots.read().await;
        let providers = self.providers.read().await;

        let mut rows: Vec<AppointmentJoinRow> = appointments
            .values()
            .map(|appointment| AppointmentJoinRow {
                slot: slots.get(&appointment.slot_id).cloned(),
                provider: providers.get(&appointment.provider_id).cloned(),
                appointment: appointment.clone(),
            })
            .filter(|row| Self::matches(query, row))
            .collect();

        rows.sort_by_key(|row| row.effective_start_time());
        if query.direction == SortDirection::Descending {
            rows.reverse();
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn update_appointment_statuses(
        &self,
        ids: &[Uuid],
        expected: &[AppointmentStatus],
        new_status: AppointmentStatus,
    ) -> Result<usize, AppointmentError> {
        let mut appointments = self.appointments.write().await;
        let mut changed = 0;
        for id in ids {
            if let Some(appointment) = appointments.get_mut(id) {
                if expected.contains(&appointment.status) {
                    appointment.status = new_status;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }
}
