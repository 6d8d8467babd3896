use std::sync::Arc;

use axum::{
    Json, Router,
    routing::get,
};
use serde_json::{json, Value};

use appointment_cell::router::{appointment_routes, AppointmentCellState};
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use progress_cell::router::{progress_routes, ProgressCellState};
use progress_cell::store::{InMemoryProgressStore, ProgressStore, SupabaseProgressStore};
use shared_config::{AppConfig, StoreBackend};

/// Stores shared by every request, picked once from `APP_STORE_BACKEND`.
pub struct Stores {
    pub appointments: Arc<dyn AppointmentStore>,
    pub progress: Arc<dyn ProgressStore>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Supabase => Self {
                appointments: Arc::new(SupabaseAppointmentStore::new(config)),
                progress: Arc::new(SupabaseProgressStore::new(config)),
            },
            StoreBackend::Memory => Self {
                appointments: Arc::new(InMemoryAppointmentStore::new()),
                progress: Arc::new(InMemoryProgressStore::new()),
            },
        }
    }
}

pub fn create_router(config: Arc<AppConfig>, stores: Stores) -> Router {
    let appointment_state = Arc::new(AppointmentCellState::new(Arc::clone(&config), stores.appointments));
    let progress_state = Arc::new(ProgressCellState::new(Arc::clone(&config), stores.progress));

    Router::new()
        .route("/", get(|| async { "Physio booking API is running!" }))
        .route("/health", get(health_check))
        .nest("/appointments", appointment_routes(appointment_state))
        .nest("/progress", progress_routes(progress_state))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    fn router() -> Router {
        let config = TestConfig::default().to_app_config();
        let stores = Stores::from_config(&config);
        create_router(Arc::new(config), stores)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cell_routes_are_nested_and_protected() {
        for uri in ["/appointments/upcoming", "/appointments/history", "/progress/summary"] {
            let response = router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }
}
