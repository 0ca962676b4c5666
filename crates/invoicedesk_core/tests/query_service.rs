use invoicedesk_core::{
    open_seeded_in_memory, sqlite_query_service, Activity, ActivityId, ActivityRepository,
    ActivityType, ApiResponse, InvoiceId, InvoiceItem, InvoiceRepository, InvoiceStatus,
    LatencyProfile, NewActivity, NewInvoice, QueryService, RepoError, RepoResult,
    SqliteInvoiceRepository, StatBucket, INVOICE_NOT_FOUND,
};
use rusqlite::Connection;

fn seeded() -> Connection {
    open_seeded_in_memory().expect("seeded store")
}

/// Activity feed that refuses every append.
struct RejectingFeed;

impl ActivityRepository for RejectingFeed {
    fn record_activity(&self, _activity: &NewActivity) -> RepoResult<ActivityId> {
        Err(RepoError::InvalidData("feed unavailable".to_string()))
    }

    fn get_activity(&self, _id: ActivityId) -> RepoResult<Option<Activity>> {
        Ok(None)
    }

    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        Ok(Vec::new())
    }

    fn list_activities_for_invoice(&self, _invoice_id: InvoiceId) -> RepoResult<Vec<Activity>> {
        Ok(Vec::new())
    }
}

fn new_invoice(number: &str, status: InvoiceStatus, total: i64) -> NewInvoice {
    NewInvoice {
        invoice_number: number.to_string(),
        customer_name: "Ada Obi".to_string(),
        customer_email: "ada@example.com".to_string(),
        customer_phone: "+234 800 000 0000".to_string(),
        status,
        issue_date: "January 2nd, 2023".to_string(),
        due_date: "February 2nd, 2023".to_string(),
        subtotal: total,
        discount: 0,
        discount_basis_points: 0,
        total_amount: total,
        currency: "USD".to_string(),
        billing_currency: "USD ($)".to_string(),
        sender: invoicedesk_core::Sender {
            name: "Ada Studio".to_string(),
            phone: "+234 800 000 0001".to_string(),
            email: "studio@example.com".to_string(),
            address: "1 Marina, Lagos".to_string(),
            logo: None,
        },
        items: vec![InvoiceItem::priced(1, "Consulting", 1, total)],
        payment_info: invoicedesk_core::PaymentInfo {
            account_name: "Ada Studio".to_string(),
            account_number: "0000000001".to_string(),
            ach_routing_no: "000000001".to_string(),
            bank_name: "Lagos Bank".to_string(),
            bank_address: "2 Marina, Lagos".to_string(),
        },
        note: None,
        reminders: Vec::new(),
    }
}

#[tokio::test]
async fn get_invoices_returns_seed_in_id_order() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let response = service.get_invoices().await.unwrap();
    assert!(response.success);
    assert!(response.message.is_none());
    let numbers: Vec<&str> = response
        .data
        .iter()
        .map(|invoice| invoice.invoice_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["1023494-2304", "1023495-2305", "1023496-2306"]);
}

#[tokio::test]
async fn get_invoice_by_id_found_and_missing() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let found = service.get_invoice_by_id(2).await.unwrap();
    assert!(found.success);
    assert_eq!(
        found.data.as_ref().map(|invoice| invoice.customer_name.as_str()),
        Some("John Doe")
    );

    let missing = service.get_invoice_by_id(999).await.unwrap();
    assert_eq!(
        missing,
        ApiResponse {
            data: None,
            success: false,
            message: Some(INVOICE_NOT_FOUND.to_string()),
        }
    );
}

#[tokio::test]
async fn dashboard_stats_for_seed() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let stats = service.get_dashboard_stats().await.unwrap().data;
    assert_eq!(
        stats.total_paid,
        StatBucket {
            count: 1,
            amount: 652_977_000
        }
    );
    assert_eq!(
        stats.total_overdue,
        StatBucket {
            count: 1,
            amount: 500_000
        }
    );
    assert_eq!(
        stats.total_draft,
        StatBucket {
            count: 1,
            amount: 237_500
        }
    );
    assert_eq!(stats.total_unpaid, StatBucket::default());
}

#[tokio::test]
async fn status_update_moves_invoice_between_buckets() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();
    let before = service.get_invoice_by_id(3).await.unwrap().data.unwrap();

    let response = service
        .update_invoice_status(3, InvoiceStatus::PendingPayment)
        .await
        .unwrap();
    assert!(response.success);
    let updated = response.data.unwrap();
    assert_eq!(updated.status, InvoiceStatus::PendingPayment);
    assert!(updated.updated_at > before.updated_at);
    assert_eq!(updated.created_at, before.created_at);

    let stats = service.get_dashboard_stats().await.unwrap().data;
    assert_eq!(stats.total_draft, StatBucket::default());
    assert_eq!(
        stats.total_unpaid,
        StatBucket {
            count: 1,
            amount: 237_500
        }
    );

    let reread = service.get_invoice_by_id(3).await.unwrap().data.unwrap();
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn partial_payment_is_counted_in_no_bucket() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    service
        .update_invoice_status(2, InvoiceStatus::PartialPayment)
        .await
        .unwrap();
    let stats = service.get_dashboard_stats().await.unwrap().data;
    let counted = stats.total_paid.count
        + stats.total_overdue.count
        + stats.total_draft.count
        + stats.total_unpaid.count;
    assert_eq!(counted, 2);
    assert_eq!(stats.total_overdue, StatBucket::default());
}

#[tokio::test]
async fn status_update_on_missing_invoice_leaves_store_untouched() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();
    let before = service.get_invoices().await.unwrap().data;
    let feed_before = service.get_recent_activities().await.unwrap().data;

    let response = service
        .update_invoice_status(42, InvoiceStatus::Paid)
        .await
        .unwrap();
    assert!(!response.success);
    assert!(response.data.is_none());
    assert_eq!(response.message.as_deref(), Some(INVOICE_NOT_FOUND));

    assert_eq!(service.get_invoices().await.unwrap().data, before);
    assert_eq!(service.get_recent_activities().await.unwrap().data, feed_before);
}

#[tokio::test]
async fn status_update_appends_linked_activity() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    service
        .update_invoice_status(2, InvoiceStatus::Paid)
        .await
        .unwrap();

    let linked = service.get_activities_for_invoice(2).await.unwrap().data;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].kind, ActivityType::StatusChanged);
    assert_eq!(linked[0].user, "You");
    assert_eq!(
        linked[0].details.as_deref(),
        Some("Changed invoice 1023495-2305 status from OVERDUE to PAID")
    );

    let feed = service.get_recent_activities().await.unwrap().data;
    assert_eq!(feed.len(), 5);
}

#[tokio::test]
async fn same_status_update_still_bumps_updated_at() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let first = service
        .update_invoice_status(1, InvoiceStatus::Paid)
        .await
        .unwrap()
        .data
        .unwrap();
    let second = service
        .update_invoice_status(1, InvoiceStatus::Paid)
        .await
        .unwrap()
        .data
        .unwrap();
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn create_invoice_assigns_next_id_and_appends() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let response = service
        .create_invoice(new_invoice("1023497-2307", InvoiceStatus::PendingPayment, 120_000))
        .await
        .unwrap();
    assert!(response.success);
    let created = response.data;
    assert_eq!(created.id, 4);
    assert_eq!(created.created_at, created.updated_at);

    let invoices = service.get_invoices().await.unwrap().data;
    assert_eq!(invoices.len(), 4);
    assert_eq!(invoices.last(), Some(&created));

    let stats = service.get_dashboard_stats().await.unwrap().data;
    assert_eq!(
        stats.total_unpaid,
        StatBucket {
            count: 1,
            amount: 120_000
        }
    );

    let linked = service.get_activities_for_invoice(4).await.unwrap().data;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].kind, ActivityType::Created);
    assert_eq!(
        linked[0].details.as_deref(),
        Some("Created invoice 1023497-2307/Ada Obi")
    );
}

#[tokio::test]
async fn created_ids_are_never_reused() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let first = service
        .create_invoice(new_invoice("A-1", InvoiceStatus::Draft, 1_000))
        .await
        .unwrap()
        .data;
    let second = service
        .create_invoice(new_invoice("A-2", InvoiceStatus::Draft, 2_000))
        .await
        .unwrap()
        .data;
    assert!(second.id > first.id);
}

#[tokio::test]
async fn recent_activities_are_oldest_first() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let feed = service.get_recent_activities().await.unwrap();
    assert!(feed.success);
    let kinds: Vec<ActivityType> = feed.data.iter().map(|activity| activity.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActivityType::Created,
            ActivityType::Sent,
            ActivityType::PaymentConfirmed,
            ActivityType::PaymentConfirmed,
        ]
    );
}

#[tokio::test]
async fn envelope_serializes_without_absent_message() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let stats = service.get_dashboard_stats().await.unwrap();
    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["success"], serde_json::json!(true));
    assert!(value.get("message").is_none());
    assert_eq!(
        value["data"]["totalPaid"],
        serde_json::json!({ "count": 1, "amount": 652_977_000 })
    );

    let missing = service.get_invoice_by_id(77).await.unwrap();
    let value = serde_json::to_value(&missing).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "data": null, "success": false, "message": "Invoice not found" })
    );

    let invoice = service.get_invoice_by_id(1).await.unwrap();
    let value = serde_json::to_value(&invoice).unwrap();
    assert_eq!(value["data"]["status"], serde_json::json!("PAID"));
    assert_eq!(value["data"]["invoiceNumber"], serde_json::json!("1023494-2304"));
}

#[tokio::test(start_paused = true)]
async fn demo_latency_delays_each_query() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::demo()).unwrap();

    let started = tokio::time::Instant::now();
    service.get_invoices().await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(1000));

    let started = tokio::time::Instant::now();
    service.get_dashboard_stats().await.unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= std::time::Duration::from_millis(600));
    assert!(elapsed < std::time::Duration::from_millis(1000));
}

#[tokio::test]
async fn create_invoice_accepts_repeated_child_ids() {
    let conn = seeded();
    let service = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();

    let mut invoice = new_invoice("DUP-1", InvoiceStatus::Draft, 3_000);
    invoice.items = vec![
        InvoiceItem::priced(1, "Design", 1, 1_000),
        InvoiceItem::priced(1, "Build", 2, 1_000),
    ];
    invoice.reminders = vec![
        invoicedesk_core::Reminder {
            id: 1,
            label: "7 days before due date".to_string(),
            days_before_due: 7,
            is_active: true,
        },
        invoicedesk_core::Reminder {
            id: 1,
            label: "On the due date".to_string(),
            days_before_due: 0,
            is_active: false,
        },
    ];

    let created = service.create_invoice(invoice).await.unwrap();
    assert!(created.success);
    let descriptions: Vec<&str> = created
        .data
        .items
        .iter()
        .map(|item| item.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Design", "Build"]);
    assert_eq!(created.data.reminders.len(), 2);
    assert_eq!(created.data.reminders[1].days_before_due, 0);
}

#[tokio::test]
async fn failed_feed_append_rolls_back_status_update() {
    let conn = seeded();
    let service = QueryService::new(
        SqliteInvoiceRepository::try_new(&conn).unwrap(),
        RejectingFeed,
        LatencyProfile::none(),
    );
    let before = SqliteInvoiceRepository::try_new(&conn)
        .unwrap()
        .get_invoice(2)
        .unwrap()
        .unwrap();

    assert!(service
        .update_invoice_status(2, InvoiceStatus::Paid)
        .await
        .is_err());

    let after = SqliteInvoiceRepository::try_new(&conn)
        .unwrap()
        .get_invoice(2)
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
    assert!(conn.is_autocommit());
}

#[tokio::test]
async fn failed_feed_append_rolls_back_creation() {
    let conn = seeded();
    let service = QueryService::new(
        SqliteInvoiceRepository::try_new(&conn).unwrap(),
        RejectingFeed,
        LatencyProfile::none(),
    );

    assert!(service
        .create_invoice(new_invoice("LOST-1", InvoiceStatus::Draft, 500))
        .await
        .is_err());

    let repo = SqliteInvoiceRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_invoices().unwrap(), 3);
    assert!(conn.is_autocommit());

    let healthy = sqlite_query_service(&conn, LatencyProfile::none()).unwrap();
    let created = healthy
        .create_invoice(new_invoice("KEPT-1", InvoiceStatus::Draft, 500))
        .await
        .unwrap();
    assert_eq!(repo.count_invoices().unwrap(), 4);
    assert!(created.data.id > 3);
}
