//! Page-level loads for the dashboard and invoice detail views.
//!
//! # Responsibility
//! - Fan out the queries a page needs concurrently.
//! - Map unexpected failures to a generic, retryable user message.
//!
//! # Invariants
//! - Retrying is a caller-initiated re-invocation; nothing retries here.

use crate::model::activity::Activity;
use crate::model::envelope::INVOICE_NOT_FOUND;
use crate::model::invoice::{Invoice, InvoiceId};
use crate::model::stats::DashboardStats;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::invoice_repo::InvoiceRepository;
use crate::service::correlation::correlate_activities;
use crate::service::query_service::{QueryService, ServiceError};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invoices shown in the dashboard's recent list.
pub const DASHBOARD_RECENT_INVOICES: usize = 10;

pub const DASHBOARD_LOAD_FAILED: &str = "Failed to load dashboard data";
pub const INVOICE_DETAILS_LOAD_FAILED: &str = "Failed to load invoice details";

/// Page load failure shown to the user with a retry prompt.
#[derive(Debug)]
pub enum LoadError {
    /// The requested invoice does not exist.
    NotFound(String),
    /// Unexpected failure; `message` is the generic user-facing text.
    Failed {
        message: &'static str,
        source: ServiceError,
    },
}

impl LoadError {
    /// Text shown next to the retry action.
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotFound(message) => message.as_str(),
            Self::Failed { message, .. } => message,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Failed { source, .. } => Some(source),
        }
    }
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    /// At most `DASHBOARD_RECENT_INVOICES`, in id order.
    pub recent_invoices: Vec<Invoice>,
    pub activities: Vec<Activity>,
}

/// Everything the invoice detail page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetailView {
    pub invoice: Invoice,
    pub activities: Vec<Activity>,
}

/// Loads stats, invoices and activities concurrently.
pub async fn load_dashboard<I, A>(service: &QueryService<I, A>) -> Result<DashboardView, LoadError>
where
    I: InvoiceRepository,
    A: ActivityRepository,
{
    let (stats, invoices, activities) = tokio::join!(
        service.get_dashboard_stats(),
        service.get_invoices(),
        service.get_recent_activities()
    );

    let failed = |source: ServiceError| {
        error!("event=page_load module=pages page=dashboard status=error error={source}");
        LoadError::Failed {
            message: DASHBOARD_LOAD_FAILED,
            source,
        }
    };
    let stats = stats.map_err(failed)?;
    let invoices = invoices.map_err(failed)?;
    let activities = activities.map_err(failed)?;

    let mut recent_invoices = if invoices.success {
        invoices.data
    } else {
        Vec::new()
    };
    recent_invoices.truncate(DASHBOARD_RECENT_INVOICES);

    Ok(DashboardView {
        stats: if stats.success {
            stats.data
        } else {
            DashboardStats::default()
        },
        recent_invoices,
        activities: if activities.success {
            activities.data
        } else {
            Vec::new()
        },
    })
}

/// Loads one invoice and its correlated activities concurrently.
pub async fn load_invoice_detail<I, A>(
    service: &QueryService<I, A>,
    id: InvoiceId,
) -> Result<InvoiceDetailView, LoadError>
where
    I: InvoiceRepository,
    A: ActivityRepository,
{
    let (invoice, activities) = tokio::join!(
        service.get_invoice_by_id(id),
        service.get_recent_activities()
    );

    let failed = |source: ServiceError| {
        error!("event=page_load module=pages page=invoice_detail status=error id={id} error={source}");
        LoadError::Failed {
            message: INVOICE_DETAILS_LOAD_FAILED,
            source,
        }
    };
    let invoice = invoice.map_err(failed)?;
    let activities = activities.map_err(failed)?;

    let found = invoice.success;
    let message = invoice.message;
    let invoice = match invoice.data {
        Some(invoice) if found => invoice,
        _ => {
            return Err(LoadError::NotFound(
                message.unwrap_or_else(|| INVOICE_NOT_FOUND.to_string()),
            ));
        }
    };

    let activities = if activities.success {
        correlate_activities(&activities.data, invoice.id, &invoice.invoice_number)
    } else {
        Vec::new()
    };

    Ok(InvoiceDetailView {
        invoice,
        activities,
    })
}
