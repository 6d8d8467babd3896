// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::store::AppointmentStore;

pub struct AppointmentCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
}

impl AppointmentCellState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AppointmentStore>) -> Self {
        Self { config, store }
    }
}

pub fn appointment_routes(state: Arc<AppointmentCellState>) -> Router {
    // All appointment operations are scoped to the authenticated customer
    Router::new()
        .route("/slots", get(handlers::list_open_slots))
        .route("/book", post(handlers::book_slot))
        .route("/upcoming", get(handlers::get_next_upcoming))
        .route("/history", get(handlers::get_history))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(Arc::clone(&state.config), auth_middleware))
        .with_state(state)
}
