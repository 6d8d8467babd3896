// libs/appointment-cell/tests/query_test.rs
mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentError, AppointmentJoinRow, AppointmentQuery, AppointmentStatus, Slot,
};
use appointment_cell::services::{AppointmentLifecycleService, AppointmentQueryService, HistoryOptions};
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};

use common::Fixture;

/// Delegating store that can imitate a backend which silently drops rows from
/// time-filtered queries, or rejects status writes.
struct DegradedStore {
    inner: Arc<InMemoryAppointmentStore>,
    ignore_time_filtered_queries: bool,
    fail_status_updates: bool,
}

#[async_trait]
impl AppointmentStore for DegradedStore {
    async fn get_slot(&self, slot_id: Uuid) -> Result<Option<Slot>, AppointmentError> {
        self.inner.get_slot(slot_id).await
    }

    async fn list_open_slots(&self, provider_id: Uuid, from: DateTime<Utc>) -> Result<Vec<Slot>, AppointmentError> {
        self.inner.list_open_slots(provider_id, from).await
    }

    async fn try_set_slot_booked(&self, slot_id: Uuid) -> Result<bool, AppointmentError> {
        self.inner.try_set_slot_booked(slot_id).await
    }

    async fn release_slot(&self, slot_id: Uuid) -> Result<(), AppointmentError> {
        self.inner.release_slot(slot_id).await
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        self.inner.insert_appointment(appointment).await
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        self.inner.get_appointment(appointment_id).await
    }

    async fn query_appointments(&self, query: &AppointmentQuery) -> Result<Vec<AppointmentJoinRow>, AppointmentError> {
        if self.ignore_time_filtered_queries && query.starts_at_or_after.is_some() {
            return Ok(Vec::new());
        }
        self.inner.query_appointments(query).await
    }

    async fn update_appointment_statuses(
        &self,
        ids: &[Uuid],
        expected: &[AppointmentStatus],
        new_status: AppointmentStatus,
    ) -> Result<usize, AppointmentError> {
        if self.fail_status_updates {
            return Err(AppointmentError::DatabaseError("write rejected".to_string()));
        }
        self.inner.update_appointment_statuses(ids, expected, new_status).await
    }
}

// ==============================================================================
// NEXT UPCOMING
// ==============================================================================

#[tokio::test]
async fn test_next_upcoming_returns_nearest_active() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    fixture.add_appointment(now + Duration::days(5), AppointmentStatus::Booked).await;
    let nearest = fixture.add_appointment(now + Duration::days(1), AppointmentStatus::Confirmed).await;
    fixture.add_appointment(now + Duration::hours(3), AppointmentStatus::Cancelled).await;
    fixture.add_appointment(now - Duration::hours(3), AppointmentStatus::Booked).await;

    let service = AppointmentQueryService::new(fixture.dyn_store());
    let upcoming = service.next_upcoming(fixture.customer_id, now).await.unwrap().unwrap();

    assert_eq!(upcoming.appointment.id, nearest.id);
    assert_eq!(
        upcoming.provider.and_then(|p| p.full_name).as_deref(),
        Some("Dr. Aoife Byrne")
    );
}

#[tokio::test]
async fn test_next_upcoming_none_when_only_past_or_terminal() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    fixture.add_appointment(now - Duration::days(1), AppointmentStatus::Booked).await;
    fixture.add_appointment(now + Duration::days(1), AppointmentStatus::Cancelled).await;
    fixture.add_appointment(now + Duration::days(2), AppointmentStatus::Completed).await;

    let service = AppointmentQueryService::new(fixture.dyn_store());

    assert!(service.next_upcoming(fixture.customer_id, now).await.unwrap().is_none());
    assert!(service.next_upcoming(Uuid::new_v4(), now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_next_upcoming_found_through_fallback() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    let future = fixture.add_appointment(now + Duration::days(2), AppointmentStatus::Booked).await;
    let store = Arc::new(DegradedStore {
        inner: Arc::clone(&fixture.store),
        ignore_time_filtered_queries: true,
        fail_status_updates: false,
    });

    let service = AppointmentQueryService::new(store);
    let upcoming = service.next_upcoming(fixture.customer_id, now).await.unwrap();

    assert_eq!(upcoming.map(|row| row.appointment.id), Some(future.id));
}

#[tokio::test]
async fn test_fallback_still_rejects_past_appointments() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    fixture.add_appointment(now - Duration::minutes(10), AppointmentStatus::Booked).await;
    let store = Arc::new(DegradedStore {
        inner: Arc::clone(&fixture.store),
        ignore_time_filtered_queries: true,
        fail_status_updates: false,
    });

    let service = AppointmentQueryService::new(store);

    assert!(service.next_upcoming(fixture.customer_id, now).await.unwrap().is_none());
}

// ==============================================================================
// HISTORY
// ==============================================================================

#[tokio::test]
async fn test_history_promotes_overdue_booking() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    let yesterday = fixture.add_appointment(now - Duration::days(1), AppointmentStatus::Booked).await;

    let service = AppointmentQueryService::new(fixture.dyn_store());
    let history = service.history(fixture.customer_id, now).await.unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, yesterday.id);
    assert_eq!(history[0].status, AppointmentStatus::Completed);

    let stored = AppointmentLifecycleService::new(fixture.dyn_store())
        .get_appointment(yesterday.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_history_merges_sets_newest_first() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    let completed = fixture.add_appointment(now - Duration::days(10), AppointmentStatus::Completed).await;
    let cancelled = fixture.add_appointment(now - Duration::days(2), AppointmentStatus::Cancelled).await;
    let overdue = fixture.add_appointment(now - Duration::days(5), AppointmentStatus::Confirmed).await;
    let cancelled_future = fixture.add_appointment(now + Duration::days(4), AppointmentStatus::Cancelled).await;
    fixture.add_appointment(now + Duration::days(1), AppointmentStatus::Booked).await;

    let service = AppointmentQueryService::new(fixture.dyn_store());
    let history = service.history(fixture.customer_id, now).await.unwrap();

    let ids: Vec<Uuid> = history.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![cancelled_future.id, cancelled.id, overdue.id, completed.id]);

    let statuses: Vec<AppointmentStatus> = history.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![
            AppointmentStatus::Cancelled,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::Completed,
        ]
    );
    assert!(history.iter().all(|entry| entry.provider_name.as_deref() == Some("Dr. Aoife Byrne")));
}

#[tokio::test]
async fn test_history_without_sweep_leaves_storage_untouched() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    let overdue = fixture.add_appointment(now - Duration::days(1), AppointmentStatus::Booked).await;

    let service = AppointmentQueryService::new(fixture.dyn_store());
    let history = service
        .history_with(fixture.customer_id, now, HistoryOptions { sweep: false })
        .await
        .unwrap();

    assert_eq!(history[0].status, AppointmentStatus::Completed);
    let stored = AppointmentLifecycleService::new(fixture.dyn_store())
        .get_appointment(overdue.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Booked);
}

#[tokio::test]
async fn test_history_returned_when_sweep_write_fails() {
    let fixture = Fixture::new().await;
    let now = Utc::now();
    let overdue = fixture.add_appointment(now - Duration::days(1), AppointmentStatus::Booked).await;
    let store = Arc::new(DegradedStore {
        inner: Arc::clone(&fixture.store),
        ignore_time_filtered_queries: false,
        fail_status_updates: true,
    });

    let history = AppointmentQueryService::new(store)
        .history(fixture.customer_id, now)
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, AppointmentStatus::Completed);

    // Stale status is left for a later sweep.
    let stored = AppointmentLifecycleService::new(fixture.dyn_store())
        .get_appointment(overdue.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Booked);

    let retried = AppointmentQueryService::new(fixture.dyn_store())
        .history(fixture.customer_id, now)
        .await
        .unwrap();
    assert_eq!(retried[0].status, AppointmentStatus::Completed);
    let stored = AppointmentLifecycleService::new(fixture.dyn_store())
        .get_appointment(overdue.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
}
