//! Async query service over the invoice store.
//!
//! # Responsibility
//! - Expose the dashboard's read/write operations as `async fn`s.
//! - Return every result inside an `ApiResponse` envelope.
//!
//! # Invariants
//! - Record-not-found is returned as `success = false` data, never as `Err`.
//! - `Err(ServiceError)` is reserved for unexpected storage failures.
//! - Each operation sleeps for its configured latency before touching the
//!   store, so the store is always read at resolve time.
//! - Status updates and creations append a feed entry linked by `invoice_id`,
//!   committed together with the invoice write or not at all.

use crate::config::LatencyProfile;
use crate::model::activity::{Activity, ActivityType, NewActivity};
use crate::model::envelope::{ApiResponse, INVOICE_NOT_FOUND};
use crate::model::invoice::{Invoice, InvoiceId, InvoiceStatus, NewInvoice};
use crate::model::stats::DashboardStats;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::invoice_repo::InvoiceRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Actor recorded for changes made through this service.
pub const CURRENT_USER_LABEL: &str = "You";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Unexpected failure while serving a query.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// A write succeeded but its read-back did not find the record.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// API-shaped facade over invoice and activity repositories.
pub struct QueryService<I, A> {
    invoices: I,
    activities: A,
    latency: LatencyProfile,
}

impl<I: InvoiceRepository, A: ActivityRepository> QueryService<I, A> {
    pub fn new(invoices: I, activities: A, latency: LatencyProfile) -> Self {
        Self {
            invoices,
            activities,
            latency,
        }
    }

    /// All invoices in id order.
    pub async fn get_invoices(&self) -> ServiceResult<ApiResponse<Vec<Invoice>>> {
        simulate_latency(self.latency.get_invoices).await;
        let invoices = self.invoices.list_invoices()?;
        debug!(
            "event=query module=service op=get_invoices status=ok count={}",
            invoices.len()
        );
        Ok(ApiResponse::ok(invoices))
    }

    /// One invoice, or a `success = false` envelope with `None` data.
    pub async fn get_invoice_by_id(
        &self,
        id: InvoiceId,
    ) -> ServiceResult<ApiResponse<Option<Invoice>>> {
        simulate_latency(self.latency.get_invoice_by_id).await;
        let invoice = self.invoices.get_invoice(id)?;
        if invoice.is_none() {
            debug!("event=query module=service op=get_invoice_by_id status=not_found id={id}");
        }
        Ok(ApiResponse::found_or(invoice, INVOICE_NOT_FOUND))
    }

    /// Recomputes the four dashboard buckets from the full collection.
    pub async fn get_dashboard_stats(&self) -> ServiceResult<ApiResponse<DashboardStats>> {
        simulate_latency(self.latency.get_dashboard_stats).await;
        let invoices = self.invoices.list_invoices()?;
        Ok(ApiResponse::ok(DashboardStats::from_invoices(&invoices)))
    }

    /// The whole activity feed, oldest first.
    pub async fn get_recent_activities(&self) -> ServiceResult<ApiResponse<Vec<Activity>>> {
        simulate_latency(self.latency.get_recent_activities).await;
        let activities = self.activities.list_activities()?;
        debug!(
            "event=query module=service op=get_recent_activities status=ok count={}",
            activities.len()
        );
        Ok(ApiResponse::ok(activities))
    }

    /// Feed entries linked to `id`; empty for unknown invoices.
    pub async fn get_activities_for_invoice(
        &self,
        id: InvoiceId,
    ) -> ServiceResult<ApiResponse<Vec<Activity>>> {
        simulate_latency(self.latency.get_recent_activities).await;
        Ok(ApiResponse::ok(
            self.activities.list_activities_for_invoice(id)?,
        ))
    }

    /// Sets `status` on invoice `id`. Any transition is allowed.
    ///
    /// Unknown ids yield `success = false`, `None` data and
    /// `"Invoice not found"`. On success `updated_at` is strictly newer than
    /// before the call.
    pub async fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> ServiceResult<ApiResponse<Option<Invoice>>> {
        simulate_latency(self.latency.update_invoice_status).await;

        let Some(previous) = self.invoices.get_invoice(id)? else {
            warn!("event=update_status module=service status=not_found id={id}");
            return Ok(ApiResponse::failure(None, INVOICE_NOT_FOUND));
        };

        let scope = self.invoices.begin_write()?;
        match self.invoices.update_invoice_status(id, status, Utc::now()) {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => {
                return Ok(ApiResponse::failure(None, INVOICE_NOT_FOUND));
            }
            Err(err) => return Err(err.into()),
        }

        let updated = self
            .invoices
            .get_invoice(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated invoice not found in read-back",
            ))?;

        self.activities.record_activity(
            &NewActivity::new(
                ActivityType::StatusChanged,
                "Status changed",
                CURRENT_USER_LABEL,
                updated.updated_at,
            )
            .with_details(format!(
                "Changed invoice {} status from {} to {}",
                updated.invoice_number, previous.status, updated.status
            ))
            .for_invoice(id),
        )?;
        scope.commit()?;

        debug!(
            "event=update_status module=service status=ok id={id} from={} to={}",
            previous.status, updated.status
        );
        Ok(ApiResponse::ok(Some(updated)))
    }

    /// Appends a new invoice with a fresh id and current timestamps.
    pub async fn create_invoice(&self, invoice: NewInvoice) -> ServiceResult<ApiResponse<Invoice>> {
        simulate_latency(self.latency.create_invoice).await;

        let now = Utc::now();
        let scope = self.invoices.begin_write()?;
        let id = self.invoices.create_invoice(&invoice, now, now)?;
        let created = self
            .invoices
            .get_invoice(id)?
            .ok_or(ServiceError::InconsistentState(
                "created invoice not found in read-back",
            ))?;

        self.activities.record_activity(
            &NewActivity::new(
                ActivityType::Created,
                "Invoice creation",
                CURRENT_USER_LABEL,
                created.created_at,
            )
            .with_details(format!(
                "Created invoice {}/{}",
                created.invoice_number, created.customer_name
            ))
            .for_invoice(id),
        )?;
        scope.commit()?;

        debug!("event=create_invoice module=service status=ok id={id}");
        Ok(ApiResponse::ok(created))
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
