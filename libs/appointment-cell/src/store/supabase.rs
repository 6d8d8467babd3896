// libs/appointment-cell/src/store/supabase.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{
    Appointment, AppointmentError, AppointmentJoinRow, AppointmentQuery, AppointmentStatus, Slot,
    SortDirection,
};
use crate::store::AppointmentStore;

const APPOINTMENT_SELECT: &str = "*,slot:slots(*),provider:providers(id,full_name)";

/// `AppointmentStore` over the PostgREST `slots`, `appointments` and
/// `providers` tables.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn encode_time(time: DateTime<Utc>) -> String {
        urlencoding::encode(&time.to_rfc3339()).into_owned()
    }

    fn status_list(statuses: &[AppointmentStatus]) -> String {
        statuses
            .iter()
            .map(AppointmentStatus::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn id_list(ids: &[Uuid]) -> String {
        ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",")
    }

    pub(crate) fn appointment_query_path(query: &AppointmentQuery) -> String {
        let mut query_parts = vec![
            format!("select={}", APPOINTMENT_SELECT),
            format!("customer_id=eq.{}", query.customer_id),
        ];

        if !query.statuses.is_empty() {
            query_parts.push(format!("status=in.({})", Self::status_list(&query.statuses)));
        }

        // Rows without a start snapshot fall back to the slot time, which the
        // caller checks after the fetch, so the bounds must let them through.
        let mut time_bounds = Vec::new();
        if let Some(lower) = query.starts_at_or_after {
            time_bounds.push(format!("or(start_time.gte.{},start_time.is.null)", Self::encode_time(lower)));
        }
        if let Some(upper) = query.starts_before {
            time_bounds.push(format!("or(start_time.lt.{},start_time.is.null)", Self::encode_time(upper)));
        }
        match time_bounds.as_slice() {
            [] => {}
            [single] => query_parts.push(single.replacen("or(", "or=(", 1)),
            _ => query_parts.push(format!("and=({})", time_bounds.join(","))),
        }

        let order = match query.direction {
            SortDirection::Ascending => "start_time.asc.nullslast",
            SortDirection::Descending => "start_time.desc.nullslast",
        };
        query_parts.push(format!("order={}", order));

        if let Some(limit) = query.limit {
            query_parts.push(format!("limit={}", limit));
        }

        format!("/rest/v1/appointments?{}", query_parts.join("&"))
    }

    fn db_error(context: &str) -> impl Fn(anyhow::Error) -> AppointmentError + '_ {
        move |e| AppointmentError::DatabaseError(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn get_slot(&self, slot_id: Uuid) -> Result<Option<Slot>, AppointmentError> {
        let path = format!("/rest/v1/slots?id=eq.{}", slot_id);
        let result: Vec<Slot> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(Self::db_error("Failed to fetch slot"))?;

        Ok(result.into_iter().next())
    }

    async fn list_open_slots(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AppointmentError> {
        let path = format!(
            "/rest/v1/slots?provider_id=eq.{}&is_booked=eq.false&start_time=gt.{}&order=start_time.asc",
            provider_id,
            Self::encode_time(from)
        );

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(Self::db_error("Failed to list open slots"))
    }

    #[instrument(skip(self))]
    async fn try_set_slot_booked(&self, slot_id: Uuid) -> Result<bool, AppointmentError> {
        // The is_booked filter makes the PATCH a compare-and-swap: a lost race
        // matches zero rows and comes back as an empty representation.
        let path = format!("/rest/v1/slots?id=eq.{}&is_booked=eq.false", slot_id);
        let updated: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "is_booked": true })),
                Some(return_representation()),
            )
            .await
            .map_err(Self::db_error("Failed to mark slot booked"))?;

        debug!("Conditional slot update for {} matched {} row(s)", slot_id, updated.len());
        Ok(!updated.is_empty())
    }

    async fn release_slot(&self, slot_id: Uuid) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/slots?id=eq.{}&is_booked=eq.true", slot_id);
        let _: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "is_booked": false })),
                Some(return_representation()),
            )
            .await
            .map_err(Self::db_error("Failed to release slot"))?;
        Ok(())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let body = serde_json::to_value(&appointment)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to encode appointment: {}", e)))?;

        let created: Vec<Appointment> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(return_representation()),
            )
            .await
            .map_err(Self::db_error("Failed to insert appointment"))?;

        created.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Appointment insert returned no rows".to_string())
        })
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(Self::db_error("Failed to fetch appointment"))?;

        Ok(result.into_iter().next())
    }

    async fn query_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<AppointmentJoinRow>, AppointmentError> {
        let path = Self::appointment_query_path(query);
        debug!("Querying appointments: {}", path);

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(Self::db_error("Failed to query appointments"))
    }

    #[instrument(skip(self))]
    async fn update_appointment_statuses(
        &self,
        ids: &[Uuid],
        expected: &[AppointmentStatus],
        new_status: AppointmentStatus,
    ) -> Result<usize, AppointmentError> {
        if ids.is_empty() || expected.is_empty() {
            return Ok(0);
        }

        let path = format!(
            "/rest/v1/appointments?id=in.({})&status=in.({})",
            Self::id_list(ids),
            Self::status_list(expected)
        );
        let updated: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "status": new_status })),
                Some(return_representation()),
            )
            .await
            .map_err(Self::db_error("Failed to update appointment statuses"))?;

        Ok(updated.len())
    }
}
