//! Core of the InvoiceDesk dashboard.
//! This crate owns the invoice store, the async query service and the
//! page-level loads the presentation layer consumes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod view;

pub use config::{AppConfig, ConfigError, LatencyProfile};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityId, ActivityType, NewActivity};
pub use model::envelope::{ApiResponse, INVOICE_NOT_FOUND};
pub use model::invoice::{
    Invoice, InvoiceId, InvoiceItem, InvoiceStatus, NewInvoice, PaymentInfo, Reminder, Sender,
    TotalsIssue,
};
pub use model::stats::{DashboardStats, StatBucket};
pub use repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
pub use repo::invoice_repo::{InvoiceRepository, RepoError, RepoResult, SqliteInvoiceRepository};
pub use repo::WriteScope;
pub use seed::{open_seeded_in_memory, seed_demo_data, SeedSummary};
pub use service::pages::{
    load_dashboard, load_invoice_detail, DashboardView, InvoiceDetailView, LoadError,
};
pub use service::query_service::{QueryService, ServiceError, ServiceResult};

/// Query service wired to the SQLite repositories.
pub type SqliteQueryService<'conn> =
    QueryService<SqliteInvoiceRepository<'conn>, SqliteActivityRepository<'conn>>;

/// Builds a query service over a migrated connection.
pub fn sqlite_query_service(
    conn: &rusqlite::Connection,
    latency: LatencyProfile,
) -> RepoResult<SqliteQueryService<'_>> {
    Ok(QueryService::new(
        SqliteInvoiceRepository::try_new(conn)?,
        SqliteActivityRepository::try_new(conn)?,
        latency,
    ))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
