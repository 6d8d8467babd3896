#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentStatus, BookSlotRequest, ProviderSummary, ServiceMode, Slot,
};
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};

pub struct Fixture {
    pub store: Arc<InMemoryAppointmentStore>,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let provider_id = Uuid::new_v4();
        store
            .put_provider(ProviderSummary {
                id: provider_id,
                full_name: Some("Dr. Aoife Byrne".to_string()),
            })
            .await;

        Self {
            store,
            provider_id,
            customer_id: Uuid::new_v4(),
        }
    }

    pub fn dyn_store(&self) -> Arc<dyn AppointmentStore> {
        self.store.clone()
    }

    pub async fn add_slot(&self, start: DateTime<Utc>, is_booked: bool) -> Slot {
        let slot = Slot {
            id: Uuid::new_v4(),
            provider_id: self.provider_id,
            start_time: start,
            end_time: start + Duration::minutes(45),
            is_booked,
        };
        self.store.put_slot(slot.clone()).await;
        slot
    }

    /// Seed a slot plus an appointment on it, bypassing the booking flow.
    pub async fn add_appointment(&self, start: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        let slot = self.add_slot(start, true).await;
        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            provider_id: self.provider_id,
            slot_id: slot.id,
            service_mode: ServiceMode::InClinic,
            address_text: None,
            phone: Some("555-0100".to_string()),
            notes: None,
            status,
            created_at: start - Duration::days(3),
            start_time: Some(start),
            end_time: Some(slot.end_time),
        };
        self.store.put_appointment(appointment.clone()).await;
        appointment
    }
}

pub fn clinic_request(slot_id: Uuid) -> BookSlotRequest {
    BookSlotRequest {
        slot_id,
        service_mode: ServiceMode::InClinic,
        address: None,
        phone: Some("555-0100".to_string()),
        notes: Some("Lower back pain".to_string()),
    }
}
