//! Demo data set loaded into a fresh store.
//!
//! # Responsibility
//! - Insert the three demo invoices and four activity entries once.
//!
//! # Invariants
//! - Seeding is a no-op when the store already holds invoices.
//! - The whole set is committed at once or not at all.
//! - Records are inserted in id order so ids are `1..=3` on a fresh store.
//! - Hand-authored inconsistencies are kept as-is (invoice 1's line items do
//!   not add up to its subtotal; activity details cite `00239434`).

use crate::db::open_db_in_memory;
use crate::model::activity::{ActivityType, NewActivity};
use crate::model::invoice::{InvoiceItem, InvoiceStatus, NewInvoice, PaymentInfo, Reminder, Sender};
use crate::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use crate::repo::invoice_repo::{InvoiceRepository, SqliteInvoiceRepository};
use crate::repo::{parse_timestamp, RepoResult};
use log::info;
use rusqlite::Connection;

/// Counts of records inserted by `seed_demo_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub invoices: usize,
    pub activities: usize,
}

/// Seeds the demo data set into an empty store.
///
/// Returns zero counts when invoices already exist.
pub fn seed_demo_data(conn: &Connection) -> RepoResult<SeedSummary> {
    let invoice_repo = SqliteInvoiceRepository::try_new(conn)?;
    if invoice_repo.count_invoices()? > 0 {
        info!("event=seed module=seed status=skipped reason=store_not_empty");
        return Ok(SeedSummary::default());
    }
    let activity_repo = SqliteActivityRepository::try_new(conn)?;

    let scope = invoice_repo.begin_write()?;
    let mut summary = SeedSummary::default();

    let mut first_invoice_id = None;
    for (invoice, created_at, updated_at) in demo_invoices() {
        let id = invoice_repo.create_invoice(
            &invoice,
            parse_timestamp(created_at, "seed.created_at")?,
            parse_timestamp(updated_at, "seed.updated_at")?,
        )?;
        first_invoice_id.get_or_insert(id);
        summary.invoices += 1;
    }

    for activity in demo_activities()? {
        let activity = match first_invoice_id {
            Some(invoice_id) => activity.for_invoice(invoice_id),
            None => activity,
        };
        activity_repo.record_activity(&activity)?;
        summary.activities += 1;
    }
    scope.commit()?;

    info!(
        "event=seed module=seed status=ok invoices={} activities={}",
        summary.invoices, summary.activities
    );
    Ok(summary)
}

/// Opens a fresh in-memory store with the demo data set loaded.
pub fn open_seeded_in_memory() -> RepoResult<Connection> {
    let conn = open_db_in_memory()?;
    seed_demo_data(&conn)?;
    Ok(conn)
}

fn fabulous_sender() -> Sender {
    Sender {
        name: "Fabulous Enterprise".to_string(),
        phone: "+386 989 271 3115".to_string(),
        email: "info@fabulousenterise.co".to_string(),
        address: "1331 Hart Ridge Road 48436 Gaines, MI".to_string(),
        logo: None,
    }
}

fn fabulous_payment_info() -> PaymentInfo {
    PaymentInfo {
        account_name: "Fabulous Enterprise".to_string(),
        account_number: "1234567890".to_string(),
        ach_routing_no: "987654321".to_string(),
        bank_name: "First National Bank".to_string(),
        bank_address: "123 Bank Street, City, State 12345".to_string(),
    }
}

/// Standard reminder ladder; `active` flags map to 14/7/3/1/0 days.
fn reminder_ladder(active: [bool; 5]) -> Vec<Reminder> {
    const LADDER: [(&str, u32); 5] = [
        ("14 days before due date", 14),
        ("7 days before due date", 7),
        ("3 days before due date", 3),
        ("24 hrs before due date", 1),
        ("On the due date", 0),
    ];
    LADDER
        .iter()
        .zip(active)
        .zip(1_u32..)
        .map(|(((label, days), is_active), id)| Reminder {
            id,
            label: (*label).to_string(),
            days_before_due: *days,
            is_active,
        })
        .collect()
}

fn demo_invoices() -> Vec<(NewInvoice, &'static str, &'static str)> {
    vec![
        (
            NewInvoice {
                invoice_number: "1023494-2304".to_string(),
                customer_name: "Olaniyi Ojo Adewale".to_string(),
                customer_email: "olaniyi@example.com".to_string(),
                customer_phone: "+386 989 271 3115".to_string(),
                status: InvoiceStatus::Paid,
                issue_date: "March 30th, 2023".to_string(),
                due_date: "May 19th, 2023".to_string(),
                subtotal: 669_720_000,
                discount: 16_743_000,
                discount_basis_points: 250,
                total_amount: 652_977_000,
                currency: "USD".to_string(),
                billing_currency: "USD ($)".to_string(),
                sender: fabulous_sender(),
                items: vec![
                    InvoiceItem::priced(
                        1,
                        "Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium",
                        10,
                        150_000,
                    ),
                    InvoiceItem::priced(2, "Video looping effect", 6, 111_050_000),
                    InvoiceItem::priced(3, "Tsit voluptatem accusantium", 7, 275_000),
                ],
                payment_info: fabulous_payment_info(),
                note: Some("Thank you for your patronage".to_string()),
                reminders: reminder_ladder([true, true, false, false, false]),
            },
            "2022-11-27T10:00:00Z",
            "2022-11-27T10:00:00Z",
        ),
        (
            NewInvoice {
                invoice_number: "1023495-2305".to_string(),
                customer_name: "John Doe".to_string(),
                customer_email: "john@example.com".to_string(),
                customer_phone: "+1 555 123 4567".to_string(),
                status: InvoiceStatus::Overdue,
                issue_date: "November 15th, 2022".to_string(),
                due_date: "December 15th, 2022".to_string(),
                subtotal: 500_000,
                discount: 0,
                discount_basis_points: 0,
                total_amount: 500_000,
                currency: "USD".to_string(),
                billing_currency: "USD ($)".to_string(),
                sender: fabulous_sender(),
                items: vec![InvoiceItem::priced(1, "Web Development Services", 1, 500_000)],
                payment_info: fabulous_payment_info(),
                note: None,
                reminders: reminder_ladder([true, false, false, false, false]),
            },
            "2022-11-15T10:00:00Z",
            "2022-12-08T10:00:00Z",
        ),
        (
            NewInvoice {
                invoice_number: "1023496-2306".to_string(),
                customer_name: "Jane Smith".to_string(),
                customer_email: "jane@example.com".to_string(),
                customer_phone: "+1 555 987 6543".to_string(),
                status: InvoiceStatus::Draft,
                issue_date: "December 8th, 2022".to_string(),
                due_date: "January 8th, 2023".to_string(),
                subtotal: 250_000,
                discount: 12_500,
                discount_basis_points: 500,
                total_amount: 237_500,
                currency: "USD".to_string(),
                billing_currency: "USD ($)".to_string(),
                sender: fabulous_sender(),
                items: vec![InvoiceItem::priced(1, "Design Services", 5, 50_000)],
                payment_info: fabulous_payment_info(),
                note: None,
                reminders: reminder_ladder([false; 5]),
            },
            "2022-12-08T10:00:00Z",
            "2022-12-08T10:00:00Z",
        ),
    ]
}

fn demo_activities() -> RepoResult<Vec<NewActivity>> {
    Ok(vec![
        NewActivity::new(
            ActivityType::Created,
            "Invoice creation",
            "You",
            parse_timestamp("2022-11-26T12:05:00Z", "seed.timestamp")?,
        )
        .with_details("Created invoice 00239434/Olaniyi Ojo Adewale"),
        NewActivity::new(
            ActivityType::Sent,
            "Invoice sent",
            "You",
            parse_timestamp("2022-11-27T10:20:00Z", "seed.timestamp")?,
        )
        .with_details("Sent invoice 00239434/Olaniyi Ojo Adewale to Olaniyi Ojo Adewale"),
        NewActivity::new(
            ActivityType::PaymentConfirmed,
            "Payment Confirmed",
            "You",
            parse_timestamp("2022-11-27T12:20:00Z", "seed.timestamp")?,
        )
        .with_amount(50_300_000)
        .with_details("Manually confirmed a partial payment of $503,000.00"),
        NewActivity::new(
            ActivityType::PaymentConfirmed,
            "Payment Confirmed",
            "You",
            parse_timestamp("2022-11-27T14:20:00Z", "seed.timestamp")?,
        )
        .with_amount(600_000_000)
        .with_details("Manually confirmed a full payment of $6,000,000.00"),
    ])
}
