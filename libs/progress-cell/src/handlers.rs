// libs/progress-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::auth::{IdentityProvider, User};
use shared_models::error::AppError;

use crate::models::CheckInRequest;
use crate::router::ProgressCellState;
use crate::services::ProgressService;

/// Anchors "today" to the client's local calendar day; the server's UTC date
/// when omitted.
#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

impl TodayQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[axum::debug_handler]
pub async fn get_summary(
    State(state): State<Arc<ProgressCellState>>,
    Extension(user): Extension<User>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<Value>, AppError> {
    let customer_id = user.current_user_id()?;
    let today = query.resolve();

    let summary = ProgressService::new(Arc::clone(&state.store))
        .summary(customer_id, today)
        .await?;

    Ok(Json(json!({ "summary": summary })))
}

#[axum::debug_handler]
pub async fn record_check_in(
    State(state): State<Arc<ProgressCellState>>,
    Extension(user): Extension<User>,
    Query(query): Query<TodayQuery>,
    Json(request): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let customer_id = user.current_user_id()?;

    let record = ProgressService::new(Arc::clone(&state.store))
        .record_check_in(customer_id, request, query.resolve())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "record": record
        })),
    ))
}
