use chrono::{DateTime, Utc};
use invoicedesk_core::service::audit::{audit_invoices, AuditFinding};
use invoicedesk_core::service::correlation::match_activities_by_details;
use invoicedesk_core::service::pages::{
    DASHBOARD_LOAD_FAILED, DASHBOARD_RECENT_INVOICES, INVOICE_DETAILS_LOAD_FAILED,
};
use invoicedesk_core::view::grouping::group_invoices_by_date;
use invoicedesk_core::{
    load_dashboard, load_invoice_detail, open_seeded_in_memory, sqlite_query_service,
    ActivityRepository, ActivityType, Invoice, InvoiceId, InvoiceRepository, InvoiceStatus,
    LatencyProfile, LoadError, NewInvoice, QueryService, RepoError, RepoResult,
    SqliteActivityRepository, TotalsIssue, INVOICE_NOT_FOUND,
};

/// Invoice repository whose every call fails like a broken store.
struct BrokenInvoices;

impl InvoiceRepository for BrokenInvoices {
    fn create_invoice(
        &self,
        _invoice: &NewInvoice,
        _created_at: DateTime<Utc>,
        _updated_at: DateTime<Utc>,
    ) -> RepoResult<InvoiceId> {
        Err(broken())
    }

    fn get_invoice(&self, _id: InvoiceId) -> RepoResult<Option<Invoice>> {
        Err(broken())
    }

    fn list_invoices(&self) -> RepoResult<Vec<Invoice>> {
        Err(broken())
    }

    fn update_invoice_status(
        &self,
        _id: InvoiceId,
        _status: InvoiceStatus,
        _now: DateTime<Utc>,
    ) -> RepoResult<()> {
        Err(broken())
    }

    fn count_invoices(&self) -> RepoResult<u64> {
        Err(broken())
    }
}

fn broken() -> RepoError {
    RepoError::InvalidData("store unavailable".to_string())
}

#[tokio::test]
async fn dashboard_loads_stats_invoices_and_feed() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let view = load_dashboard(&service).await.unwrap();
    assert_eq!(view.stats.total_paid.count, 1);
    assert_eq!(view.recent_invoices.len(), 3);
    assert_eq!(view.activities.len(), 4);
}

#[tokio::test]
async fn dashboard_keeps_at_most_ten_recent_invoices() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();
    let template = service.get_invoice_by_id(3).await.unwrap().data.unwrap();

    for index in 0..9 {
        let mut invoice = new_from(&template);
        invoice.invoice_number = format!("BULK-{index}");
        service.create_invoice(invoice).await.unwrap();
    }

    let view = load_dashboard(&service).await.unwrap();
    assert_eq!(view.recent_invoices.len(), DASHBOARD_RECENT_INVOICES);
    assert_eq!(view.recent_invoices[0].id, 1);
    assert_eq!(view.stats.total_draft.count, 10);
}

#[tokio::test]
async fn dashboard_failure_maps_to_generic_message() {
    let conn = open_seeded_in_memory().unwrap();
    let service = QueryService::new(
        BrokenInvoices,
        SqliteActivityRepository::try_new(&conn).unwrap(),
        LatencyProfile::none(),
    );

    let err = load_dashboard(&service).await.unwrap_err();
    assert_eq!(err.user_message(), DASHBOARD_LOAD_FAILED);
    assert!(matches!(err, LoadError::Failed { .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn invoice_detail_uses_linked_activities() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let view = load_invoice_detail(&service, 1).await.unwrap();
    assert_eq!(view.invoice.invoice_number, "1023494-2304");
    assert_eq!(view.activities.len(), 4);

    let other = load_invoice_detail(&service, 2).await.unwrap();
    assert!(other.activities.is_empty());

    let draft = load_invoice_detail(&service, 3).await.unwrap();
    assert!(draft.activities.is_empty());
}

#[tokio::test]
async fn new_invoice_detail_shows_only_its_own_activity() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();
    let template = service.get_invoice_by_id(3).await.unwrap().data.unwrap();

    let mut invoice = new_from(&template);
    invoice.invoice_number = "1023497-2307".to_string();
    let created = service.create_invoice(invoice).await.unwrap().data;
    assert_eq!(created.id, 4);

    let view = load_invoice_detail(&service, created.id).await.unwrap();
    let linked: Vec<(ActivityType, Option<InvoiceId>)> = view
        .activities
        .iter()
        .map(|activity| (activity.kind, activity.invoice_id))
        .collect();
    assert_eq!(linked, vec![(ActivityType::Created, Some(4))]);
}

#[tokio::test]
async fn legacy_detail_matching_finds_nothing_on_seed() {
    let conn = open_seeded_in_memory().unwrap();
    let feed = SqliteActivityRepository::try_new(&conn)
        .unwrap()
        .list_activities()
        .unwrap();

    assert!(match_activities_by_details(&feed, 1, "1023494-2304").is_empty());
    assert_eq!(match_activities_by_details(&feed, 7, "00239434").len(), 2);
}

#[tokio::test]
async fn invoice_detail_for_unknown_id_is_not_found() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let err = load_invoice_detail(&service, 404).await.unwrap_err();
    assert!(matches!(&err, LoadError::NotFound(message) if message == INVOICE_NOT_FOUND));
    assert_eq!(err.to_string(), INVOICE_NOT_FOUND);
}

#[tokio::test]
async fn invoice_detail_failure_maps_to_generic_message() {
    let conn = open_seeded_in_memory().unwrap();
    let service = QueryService::new(
        BrokenInvoices,
        SqliteActivityRepository::try_new(&conn).unwrap(),
        LatencyProfile::none(),
    );

    let err = load_invoice_detail(&service, 1).await.unwrap_err();
    assert_eq!(err.user_message(), INVOICE_DETAILS_LOAD_FAILED);
}

#[tokio::test(start_paused = true)]
async fn dashboard_queries_run_concurrently() {
    let conn = open_seeded_in_memory().unwrap();
    let service = sqlite_query_service(&conn, LatencyProfile::demo()).unwrap();

    let started = tokio::time::Instant::now();
    load_dashboard(&service).await.unwrap();
    let elapsed = started.elapsed();

    // Bounded by the slowest query (1000 ms), not the 2100 ms sum.
    assert!(elapsed >= std::time::Duration::from_millis(1000));
    assert!(elapsed < std::time::Duration::from_millis(2100));
}

#[test]
fn audit_reports_only_the_seed_subtotal_drift() {
    let conn = open_seeded_in_memory().unwrap();
    let invoices = invoicedesk_core::SqliteInvoiceRepository::try_new(&conn)
        .unwrap()
        .list_invoices()
        .unwrap();

    let audits = audit_invoices(&invoices);
    assert_eq!(
        audits[0].findings,
        vec![AuditFinding::Totals(TotalsIssue::SubtotalMismatch {
            items_sum: 669_725_000,
            subtotal: 669_720_000,
        })]
    );
    assert!(audits[1].is_clean());
    assert!(audits[2].is_clean());
}

#[test]
fn seed_groups_by_creation_day() {
    let conn = open_seeded_in_memory().unwrap();
    let invoices = invoicedesk_core::SqliteInvoiceRepository::try_new(&conn)
        .unwrap()
        .list_invoices()
        .unwrap();

    let groups = group_invoices_by_date(&invoices);
    let labels: Vec<&str> = groups.iter().map(|group| group.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Sunday, November 27, 2022",
            "Tuesday, November 15, 2022",
            "Thursday, December 8, 2022",
        ]
    );
}

fn new_from(invoice: &Invoice) -> NewInvoice {
    NewInvoice {
        invoice_number: invoice.invoice_number.clone(),
        customer_name: invoice.customer_name.clone(),
        customer_email: invoice.customer_email.clone(),
        customer_phone: invoice.customer_phone.clone(),
        status: invoice.status,
        issue_date: invoice.issue_date.clone(),
        due_date: invoice.due_date.clone(),
        subtotal: invoice.subtotal,
        discount: invoice.discount,
        discount_basis_points: invoice.discount_basis_points,
        total_amount: invoice.total_amount,
        currency: invoice.currency.clone(),
        billing_currency: invoice.billing_currency.clone(),
        sender: invoice.sender.clone(),
        items: invoice.items.clone(),
        payment_info: invoice.payment_info.clone(),
        note: invoice.note.clone(),
        reminders: invoice.reminders.clone(),
    }
}
