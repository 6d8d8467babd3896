// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{IdentityProvider, User};
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookSlotRequest};
use crate::router::AppointmentCellState;
use crate::services::{
    AppointmentLifecycleService, AppointmentQueryService, HistoryOptions, SlotBookingService,
};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenSlotsQuery {
    pub provider_id: Uuid,
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_open_slots(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = SlotBookingService::new(Arc::clone(&state.store));
    let slots = booking_service.available_slots(query.provider_id, Utc::now()).await?;

    Ok(Json(json!({
        "slots": slots,
        "count": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let customer_id = user.current_user_id()?;
    let booking_service = SlotBookingService::new(Arc::clone(&state.store));

    let appointment = booking_service
        .book(customer_id, request, Utc::now())
        .await
        .map_err(|e| match e {
            AppointmentError::SlotAlreadyBooked => {
                AppError::Conflict("This slot was just booked by someone else, please pick another".to_string())
            }
            AppointmentError::SlotInPast => {
                AppError::BadRequest("This slot has expired, please pick another".to_string())
            }
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment
        })),
    ))
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let customer_id = user.current_user_id()?;
    let lifecycle_service = AppointmentLifecycleService::new(Arc::clone(&state.store));

    let appointment = lifecycle_service.get_appointment(appointment_id).await?;
    if appointment.customer_id != customer_id {
        return Err(AppointmentError::NotFound.into());
    }

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let customer_id = user.current_user_id()?;
    let lifecycle_service = AppointmentLifecycleService::new(Arc::clone(&state.store));

    let appointment = lifecycle_service.cancel(customer_id, appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_next_upcoming(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let customer_id = user.current_user_id()?;
    let query_service = AppointmentQueryService::new(Arc::clone(&state.store));

    let upcoming = query_service.next_upcoming(customer_id, Utc::now()).await?;

    Ok(Json(json!({ "appointment": upcoming })))
}

#[axum::debug_handler]
pub async fn get_history(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let customer_id = user.current_user_id()?;
    let query_service = AppointmentQueryService::new(Arc::clone(&state.store))
        .with_history_options(HistoryOptions {
            sweep: state.config.history_sweep_enabled,
        });

    let history = query_service.history(customer_id, Utc::now()).await?;

    Ok(Json(json!({
        "appointments": history,
        "count": history.len()
    })))
}
