// libs/appointment-cell/src/services/query.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::models::{
    AppointmentError, AppointmentJoinRow, AppointmentQuery, AppointmentStatus, AppointmentSummary,
    SortDirection,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::store::AppointmentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Promote overdue active appointments to completed as part of the read.
    pub sweep: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self { sweep: true }
    }
}

/// Resolves the "next upcoming" appointment and the history list for a customer.
pub struct AppointmentQueryService {
    store: Arc<dyn AppointmentStore>,
    lifecycle: AppointmentLifecycleService,
    default_options: HistoryOptions,
}

impl AppointmentQueryService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            lifecycle: AppointmentLifecycleService::new(Arc::clone(&store)),
            store,
            default_options: HistoryOptions::default(),
        }
    }

    pub fn with_history_options(mut self, options: HistoryOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Nearest active appointment that starts strictly after `now`.
    ///
    /// The ascending, time-filtered query is tried first. If it yields nothing
    /// usable, the active set is re-read newest first and the head is accepted
    /// only if it passes the same future check.
    #[instrument(skip(self))]
    pub async fn next_upcoming(
        &self,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<AppointmentJoinRow>, AppointmentError> {
        let primary = AppointmentQuery::for_customer(customer_id, &AppointmentStatus::ACTIVE)
            .starting_at_or_after(now)
            .ordered(SortDirection::Ascending)
            .limit(1);

        let rows = self.store.query_appointments(&primary).await?;
        if let Some(row) = rows.into_iter().find(|row| Self::is_future(row, now)) {
            return Ok(Some(row));
        }

        debug!("Primary upcoming query empty for customer {}, using fallback", customer_id);
        let fallback = AppointmentQuery::for_customer(customer_id, &AppointmentStatus::ACTIVE)
            .ordered(SortDirection::Descending)
            .limit(1);

        let rows = self.store.query_appointments(&fallback).await?;
        Ok(rows.into_iter().next().filter(|row| Self::is_future(row, now)))
    }

    /// History using the service's configured options.
    pub async fn history(
        &self,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        self.history_with(customer_id, now, self.default_options).await
    }

    /// Completed, cancelled and overdue appointments, newest first.
    ///
    /// Overdue rows are shown as completed. With `options.sweep` they are also
    /// written back as completed; a failed write is logged and the list is
    /// returned regardless.
    #[instrument(skip(self))]
    pub async fn history_with(
        &self,
        customer_id: Uuid,
        now: DateTime<Utc>,
        options: HistoryOptions,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        let completed_query = AppointmentQuery::for_customer(customer_id, &[AppointmentStatus::Completed]);
        let cancelled_query = AppointmentQuery::for_customer(customer_id, &[AppointmentStatus::Cancelled]);
        let overdue_query = AppointmentQuery::for_customer(customer_id, &AppointmentStatus::ACTIVE)
            .starting_before(now);

        let (completed, cancelled, overdue) = futures::try_join!(
            self.store.query_appointments(&completed_query),
            self.store.query_appointments(&cancelled_query),
            self.store.query_appointments(&overdue_query),
        )?;

        let overdue: Vec<AppointmentJoinRow> = overdue
            .into_iter()
            .filter(|row| row.effective_start_time() < now)
            .collect();

        if options.sweep {
            let overdue_ids = AppointmentLifecycleService::resolve_overdue_ids(&overdue, now);
            if let Err(e) = self.lifecycle.sweep_overdue(&overdue_ids).await {
                warn!(
                    "Overdue sweep failed for customer {} ({} id(s)), will retry on next read: {}",
                    customer_id,
                    overdue_ids.len(),
                    e
                );
            }
        }

        let mut summaries: Vec<AppointmentSummary> = Vec::with_capacity(
            completed.len() + cancelled.len() + overdue.len(),
        );
        summaries.extend(completed.iter().map(|row| AppointmentSummary::from_row(row, row.appointment.status)));
        summaries.extend(cancelled.iter().map(|row| AppointmentSummary::from_row(row, row.appointment.status)));
        summaries.extend(
            overdue
                .iter()
                .map(|row| AppointmentSummary::from_row(row, Self::display_status(row.appointment.status))),
        );

        summaries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        debug!("History for customer {} has {} entries", customer_id, summaries.len());
        Ok(summaries)
    }

    fn is_future(row: &AppointmentJoinRow, now: DateTime<Utc>) -> bool {
        row.effective_start_time() > now
    }

    fn display_status(status: AppointmentStatus) -> AppointmentStatus {
        match status {
            AppointmentStatus::Cancelled => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Completed,
        }
    }
}
