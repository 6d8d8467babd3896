// libs/progress-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::store::ProgressStore;

pub struct ProgressCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ProgressStore>,
}

impl ProgressCellState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn ProgressStore>) -> Self {
        Self { config, store }
    }
}

pub fn progress_routes(state: Arc<ProgressCellState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/check-ins", post(handlers::record_check_in))
        .layer(middleware::from_fn_with_state(Arc::clone(&state.config), auth_middleware))
        .with_state(state)
}
