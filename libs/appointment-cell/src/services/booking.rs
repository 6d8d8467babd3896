// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookSlotRequest, ServiceMode, Slot,
};
use crate::store::AppointmentStore;

/// Turns a free slot into a booked appointment. The slot flag is claimed with
/// a conditional write before the appointment row exists, so two callers racing
/// for one slot cannot both get through.
pub struct SlotBookingService {
    store: Arc<dyn AppointmentStore>,
}

impl SlotBookingService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Open slots for a provider that start after `now`, earliest first.
    pub async fn available_slots(
        &self,
        provider_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AppointmentError> {
        debug!("Listing open slots for provider {}", provider_id);
        self.store.list_open_slots(provider_id, now).await
    }

    /// Book `request.slot_id` for `customer_id`. Losing a race yields
    /// `SlotAlreadyBooked`; nothing here retries.
    #[instrument(skip(self, request), fields(slot_id = %request.slot_id))]
    pub async fn book(
        &self,
        customer_id: Uuid,
        request: BookSlotRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        let request = Self::normalize_request(request)?;

        let slot = self.store
            .get_slot(request.slot_id)
            .await?
            .ok_or(AppointmentError::SlotNotFound)?;

        if slot.is_booked {
            warn!("Slot {} is already booked", slot.id);
            return Err(AppointmentError::SlotAlreadyBooked);
        }
        if slot.start_time <= now {
            warn!("Slot {} started at {}, refusing booking at {}", slot.id, slot.start_time, now);
            return Err(AppointmentError::SlotInPast);
        }

        if !self.store.try_set_slot_booked(slot.id).await? {
            warn!("Slot {} was claimed by a concurrent booking", slot.id);
            return Err(AppointmentError::SlotAlreadyBooked);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id,
            provider_id: slot.provider_id,
            slot_id: slot.id,
            service_mode: request.service_mode,
            address_text: request.address,
            phone: request.phone,
            notes: request.notes,
            status: AppointmentStatus::Booked,
            created_at: now,
            start_time: Some(slot.start_time),
            end_time: Some(slot.end_time),
        };

        match self.store.insert_appointment(appointment).await {
            Ok(created) => {
                info!("Appointment {} booked on slot {} for customer {}", created.id, slot.id, customer_id);
                Ok(created)
            }
            Err(e) => {
                error!("Appointment insert failed after claiming slot {}: {}", slot.id, e);
                if let Err(release_err) = self.store.release_slot(slot.id).await {
                    error!("Could not release slot {} after failed insert: {}", slot.id, release_err);
                }
                Err(e)
            }
        }
    }

    fn normalize_request(request: BookSlotRequest) -> Result<BookSlotRequest, AppointmentError> {
        let address = non_blank(request.address);
        if request.service_mode == ServiceMode::Home && address.is_none() {
            return Err(AppointmentError::ValidationError(
                "Home visits require an address".to_string(),
            ));
        }

        Ok(BookSlotRequest {
            slot_id: request.slot_id,
            service_mode: request.service_mode,
            address,
            phone: non_blank(request.phone),
            notes: non_blank(request.notes),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
