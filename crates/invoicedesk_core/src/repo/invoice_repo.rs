//! Invoice repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/list/status-update APIs over the `invoices` table and
//!   its ordered child tables (`invoice_items`, `invoice_reminders`).
//!
//! # Invariants
//! - An invoice and its children are written in one transaction, joining the
//!   caller's `WriteScope` when one is open.
//! - Ids come from `AUTOINCREMENT`, so a deleted or failed id is never reused.
//! - `update_invoice_status` always moves `updated_at` strictly forward.

use crate::db::DbError;
use crate::model::invoice::{
    Invoice, InvoiceId, InvoiceItem, InvoiceStatus, NewInvoice, PaymentInfo, Reminder, Sender,
};
use crate::repo::{
    ensure_connection_ready, parse_timestamp, store_precision, timestamp_to_db, WriteScope,
};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INVOICE_SELECT_SQL: &str = "SELECT
    id,
    invoice_number,
    customer_name,
    customer_email,
    customer_phone,
    status,
    issue_date,
    due_date,
    subtotal,
    discount,
    discount_basis_points,
    total_amount,
    currency,
    billing_currency,
    sender_name,
    sender_phone,
    sender_email,
    sender_address,
    sender_logo,
    payment_account_name,
    payment_account_number,
    payment_ach_routing_no,
    payment_bank_name,
    payment_bank_address,
    note,
    created_at,
    updated_at
FROM invoices";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for store persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(InvoiceId),
    InvalidData(String),
    SchemaNotReady { found: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "invoice not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "store schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for invoice operations.
pub trait InvoiceRepository {
    /// Inserts an invoice with explicit timestamps and returns its new id.
    fn create_invoice(
        &self,
        invoice: &NewInvoice,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<InvoiceId>;
    fn get_invoice(&self, id: InvoiceId) -> RepoResult<Option<Invoice>>;
    /// Lists all invoices ordered by id.
    fn list_invoices(&self) -> RepoResult<Vec<Invoice>>;
    /// Sets status and bumps `updated_at`; `NotFound` when `id` is unknown.
    fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;
    fn count_invoices(&self) -> RepoResult<u64>;

    /// Opens a write scope spanning this repository and any other on the same
    /// store. Stores without transactions hand back a detached scope.
    fn begin_write(&self) -> RepoResult<WriteScope<'_>> {
        Ok(WriteScope::detached())
    }
}

/// SQLite-backed invoice repository.
pub struct SqliteInvoiceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInvoiceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl InvoiceRepository for SqliteInvoiceRepository<'_> {
    fn create_invoice(
        &self,
        invoice: &NewInvoice,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<InvoiceId> {
        let scope = WriteScope::begin(self.conn)?;

        self.conn.execute(
            "INSERT INTO invoices (
                invoice_number,
                customer_name,
                customer_email,
                customer_phone,
                status,
                issue_date,
                due_date,
                subtotal,
                discount,
                discount_basis_points,
                total_amount,
                currency,
                billing_currency,
                sender_name,
                sender_phone,
                sender_email,
                sender_address,
                sender_logo,
                payment_account_name,
                payment_account_number,
                payment_ach_routing_no,
                payment_bank_name,
                payment_bank_address,
                note,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26
            );",
            params![
                invoice.invoice_number.as_str(),
                invoice.customer_name.as_str(),
                invoice.customer_email.as_str(),
                invoice.customer_phone.as_str(),
                status_to_db(invoice.status),
                invoice.issue_date.as_str(),
                invoice.due_date.as_str(),
                invoice.subtotal,
                invoice.discount,
                invoice.discount_basis_points,
                invoice.total_amount,
                invoice.currency.as_str(),
                invoice.billing_currency.as_str(),
                invoice.sender.name.as_str(),
                invoice.sender.phone.as_str(),
                invoice.sender.email.as_str(),
                invoice.sender.address.as_str(),
                invoice.sender.logo.as_deref(),
                invoice.payment_info.account_name.as_str(),
                invoice.payment_info.account_number.as_str(),
                invoice.payment_info.ach_routing_no.as_str(),
                invoice.payment_info.bank_name.as_str(),
                invoice.payment_info.bank_address.as_str(),
                invoice.note.as_deref(),
                timestamp_to_db(&store_precision(created_at)),
                timestamp_to_db(&store_precision(updated_at)),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        for (position, item) in invoice.items.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO invoice_items (
                    invoice_id, item_id, position, description, quantity, unit_price, total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id,
                    item.id,
                    position_to_db(position)?,
                    item.description.as_str(),
                    item.quantity,
                    item.unit_price,
                    item.total,
                ],
            )?;
        }

        for (position, reminder) in invoice.reminders.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO invoice_reminders (
                    invoice_id, reminder_id, position, label, days_before_due, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    id,
                    reminder.id,
                    position_to_db(position)?,
                    reminder.label.as_str(),
                    reminder.days_before_due,
                    bool_to_int(reminder.is_active),
                ],
            )?;
        }

        scope.commit()?;
        Ok(id)
    }

    fn get_invoice(&self, id: InvoiceId) -> RepoResult<Option<Invoice>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INVOICE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let mut invoice = parse_invoice_row(row)?;
                self.load_children(&mut invoice)?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    fn list_invoices(&self) -> RepoResult<Vec<Invoice>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INVOICE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut invoices = Vec::new();
        while let Some(row) = rows.next()? {
            invoices.push(parse_invoice_row(row)?);
        }

        for invoice in &mut invoices {
            self.load_children(invoice)?;
        }
        Ok(invoices)
    }

    fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let scope = WriteScope::begin(self.conn)?;

        let previous_text: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM invoices WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(previous_text) = previous_text else {
            return Err(RepoError::NotFound(id));
        };
        let previous = parse_timestamp(&previous_text, "invoices.updated_at")?;
        let updated_at = next_updated_at(previous, now);

        self.conn.execute(
            "UPDATE invoices
             SET
                status = ?1,
                updated_at = ?2
             WHERE id = ?3;",
            params![status_to_db(status), timestamp_to_db(&updated_at), id],
        )?;
        scope.commit()?;
        Ok(())
    }

    fn count_invoices(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM invoices;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative invoice count `{count}`")))
    }

    fn begin_write(&self) -> RepoResult<WriteScope<'_>> {
        WriteScope::begin(self.conn)
    }
}

impl SqliteInvoiceRepository<'_> {
    fn load_children(&self, invoice: &mut Invoice) -> RepoResult<()> {
        let mut items_stmt = self.conn.prepare(
            "SELECT item_id, description, quantity, unit_price, total
             FROM invoice_items
             WHERE invoice_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = items_stmt.query([invoice.id])?;
        while let Some(row) = rows.next()? {
            invoice.items.push(InvoiceItem {
                id: row.get("item_id")?,
                description: row.get("description")?,
                quantity: row.get("quantity")?,
                unit_price: row.get("unit_price")?,
                total: row.get("total")?,
            });
        }

        let mut reminders_stmt = self.conn.prepare(
            "SELECT reminder_id, label, days_before_due, is_active
             FROM invoice_reminders
             WHERE invoice_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = reminders_stmt.query([invoice.id])?;
        while let Some(row) = rows.next()? {
            let is_active = match row.get::<_, i64>("is_active")? {
                0 => false,
                1 => true,
                other => {
                    return Err(RepoError::InvalidData(format!(
                        "invalid is_active value `{other}` in invoice_reminders.is_active"
                    )));
                }
            };
            invoice.reminders.push(Reminder {
                id: row.get("reminder_id")?,
                label: row.get("label")?,
                days_before_due: row.get("days_before_due")?,
                is_active,
            });
        }

        Ok(())
    }
}

/// Picks the new `updated_at`: `now` at store precision, or one millisecond
/// past `previous` when the clock has not advanced beyond it.
fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = store_precision(now);
    if candidate > previous {
        candidate
    } else {
        previous + Duration::milliseconds(1)
    }
}

fn parse_invoice_row(row: &Row<'_>) -> RepoResult<Invoice> {
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in invoices.status"))
    })?;

    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Invoice {
        id: row.get("id")?,
        invoice_number: row.get("invoice_number")?,
        customer_name: row.get("customer_name")?,
        customer_email: row.get("customer_email")?,
        customer_phone: row.get("customer_phone")?,
        status,
        issue_date: row.get("issue_date")?,
        due_date: row.get("due_date")?,
        subtotal: row.get("subtotal")?,
        discount: row.get("discount")?,
        discount_basis_points: row.get("discount_basis_points")?,
        total_amount: row.get("total_amount")?,
        currency: row.get("currency")?,
        billing_currency: row.get("billing_currency")?,
        sender: Sender {
            name: row.get("sender_name")?,
            phone: row.get("sender_phone")?,
            email: row.get("sender_email")?,
            address: row.get("sender_address")?,
            logo: row.get("sender_logo")?,
        },
        items: Vec::new(),
        payment_info: PaymentInfo {
            account_name: row.get("payment_account_name")?,
            account_number: row.get("payment_account_number")?,
            ach_routing_no: row.get("payment_ach_routing_no")?,
            bank_name: row.get("payment_bank_name")?,
            bank_address: row.get("payment_bank_address")?,
        },
        note: row.get("note")?,
        reminders: Vec::new(),
        created_at: parse_timestamp(&created_at, "invoices.created_at")?,
        updated_at: parse_timestamp(&updated_at, "invoices.updated_at")?,
    })
}

fn status_to_db(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Paid => "paid",
        InvoiceStatus::Overdue => "overdue",
        InvoiceStatus::Draft => "draft",
        InvoiceStatus::PendingPayment => "pending_payment",
        InvoiceStatus::PartialPayment => "partial_payment",
    }
}

fn parse_status(value: &str) -> Option<InvoiceStatus> {
    match value {
        "paid" => Some(InvoiceStatus::Paid),
        "overdue" => Some(InvoiceStatus::Overdue),
        "draft" => Some(InvoiceStatus::Draft),
        "pending_payment" => Some(InvoiceStatus::PendingPayment),
        "partial_payment" => Some(InvoiceStatus::PartialPayment),
        _ => None,
    }
}

fn position_to_db(position: usize) -> RepoResult<i64> {
    i64::try_from(position)
        .map_err(|_| RepoError::InvalidData(format!("child position `{position}` overflows")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
