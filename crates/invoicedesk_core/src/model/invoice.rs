//! Invoice domain model.
//!
//! # Responsibility
//! - Define the invoice record with its line items, reminders and routing data.
//! - Provide totals consistency checks used by audits.
//!
//! # Invariants
//! - `total_amount = subtotal - discount`.
//! - `discount = subtotal * discount_basis_points / 10_000` (rounded to cents).
//! - Neither invariant is enforced on write; seed data is hand-authored and
//!   `check_totals` reports drift instead of rejecting it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned invoice identifier.
///
/// Kept as a type alias so signatures read in domain terms.
pub type InvoiceId = i64;

/// Basis points per 100%.
pub const BASIS_POINTS_PER_UNIT: u32 = 10_000;

/// Invoice status. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "PAID")]
    Paid,
    #[serde(rename = "OVERDUE")]
    Overdue,
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "PENDING PAYMENT")]
    PendingPayment,
    #[serde(rename = "PARTIAL PAYMENT")]
    PartialPayment,
}

impl InvoiceStatus {
    /// All statuses in display order.
    pub const ALL: [InvoiceStatus; 5] = [
        Self::Paid,
        Self::Overdue,
        Self::Draft,
        Self::PendingPayment,
        Self::PartialPayment,
    ];

    /// Display label shown on status badges.
    pub fn label(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Draft => "DRAFT",
            Self::PendingPayment => "PENDING PAYMENT",
            Self::PartialPayment => "PARTIAL PAYMENT",
        }
    }

    /// Parses a status from a display label or a CLI-friendly spelling.
    ///
    /// Case-insensitive; spaces, `-` and `_` are interchangeable, so
    /// `pending-payment` and `PENDING PAYMENT` both parse.
    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_ascii_uppercase()
            .replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Issuer block printed on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub logo: Option<String>,
}

/// One billed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    /// Caller-supplied line id; not required to be unique.
    pub id: u32,
    pub description: String,
    pub quantity: u32,
    /// Minor units.
    pub unit_price: i64,
    /// Minor units. Expected to equal `quantity * unit_price`.
    pub total: i64,
}

impl InvoiceItem {
    /// Builds a line whose total is derived from quantity and unit price.
    pub fn priced(id: u32, description: impl Into<String>, quantity: u32, unit_price: i64) -> Self {
        Self {
            id,
            description: description.into(),
            quantity,
            unit_price,
            total: i64::from(quantity) * unit_price,
        }
    }
}

/// Bank routing details for payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub account_name: String,
    pub account_number: String,
    pub ach_routing_no: String,
    pub bank_name: String,
    pub bank_address: String,
}

/// Notification scheduled relative to the due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Caller-supplied reminder id; not required to be unique.
    pub id: u32,
    pub label: String,
    pub days_before_due: u32,
    pub is_active: bool,
}

/// Invoice payload accepted by `create_invoice`.
///
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: InvoiceStatus,
    /// Human-readable label, e.g. `March 30th, 2023`.
    pub issue_date: String,
    /// Human-readable label, e.g. `May 19th, 2023`.
    pub due_date: String,
    pub subtotal: i64,
    pub discount: i64,
    /// `250` means 2.5%.
    pub discount_basis_points: u32,
    pub total_amount: i64,
    /// ISO 4217 code, e.g. `USD`.
    pub currency: String,
    /// Display label, e.g. `USD ($)`.
    pub billing_currency: String,
    pub sender: Sender,
    pub items: Vec<InvoiceItem>,
    pub payment_info: PaymentInfo,
    pub note: Option<String>,
    pub reminders: Vec<Reminder>,
}

/// Canonical invoice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: InvoiceStatus,
    pub issue_date: String,
    pub due_date: String,
    pub subtotal: i64,
    pub discount: i64,
    pub discount_basis_points: u32,
    pub total_amount: i64,
    pub currency: String,
    pub billing_currency: String,
    pub sender: Sender,
    pub items: Vec<InvoiceItem>,
    pub payment_info: PaymentInfo,
    pub note: Option<String>,
    pub reminders: Vec<Reminder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One totals inconsistency found by `Invoice::check_totals`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalsIssue {
    /// `total_amount != subtotal - discount`.
    TotalMismatch { expected: i64, actual: i64 },
    /// `discount` does not match `discount_basis_points` of `subtotal`.
    DiscountMismatch { expected: i64, actual: i64 },
    /// A line total differs from `quantity * unit_price`.
    ItemTotalMismatch { item_id: u32, expected: i64, actual: i64 },
    /// Line totals do not add up to `subtotal`.
    SubtotalMismatch { items_sum: i64, subtotal: i64 },
}

impl Display for TotalsIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalMismatch { expected, actual } => {
                write!(f, "total {actual} != subtotal - discount {expected}")
            }
            Self::DiscountMismatch { expected, actual } => {
                write!(f, "discount {actual} != percentage-derived {expected}")
            }
            Self::ItemTotalMismatch {
                item_id,
                expected,
                actual,
            } => write!(
                f,
                "item {item_id} total {actual} != quantity * unit price {expected}"
            ),
            Self::SubtotalMismatch {
                items_sum,
                subtotal,
            } => write!(f, "items sum {items_sum} != subtotal {subtotal}"),
        }
    }
}

impl Invoice {
    /// Discount percentage as a float, for display only.
    pub fn discount_percentage(&self) -> f64 {
        f64::from(self.discount_basis_points) / 100.0
    }

    /// Reports every totals inconsistency on this invoice.
    ///
    /// Returns an empty list for a consistent invoice.
    pub fn check_totals(&self) -> Vec<TotalsIssue> {
        let mut issues = Vec::new();

        let expected_total = self.subtotal - self.discount;
        if self.total_amount != expected_total {
            issues.push(TotalsIssue::TotalMismatch {
                expected: expected_total,
                actual: self.total_amount,
            });
        }

        let expected_discount = discount_for(self.subtotal, self.discount_basis_points);
        if self.discount != expected_discount {
            issues.push(TotalsIssue::DiscountMismatch {
                expected: expected_discount,
                actual: self.discount,
            });
        }

        for item in &self.items {
            let expected = i64::from(item.quantity) * item.unit_price;
            if item.total != expected {
                issues.push(TotalsIssue::ItemTotalMismatch {
                    item_id: item.id,
                    expected,
                    actual: item.total,
                });
            }
        }

        if !self.items.is_empty() {
            let items_sum: i64 = self.items.iter().map(|item| item.total).sum();
            if items_sum != self.subtotal {
                issues.push(TotalsIssue::SubtotalMismatch {
                    items_sum,
                    subtotal: self.subtotal,
                });
            }
        }

        issues
    }
}

/// Discount in minor units for `subtotal` at `basis_points`, rounded half up.
pub fn discount_for(subtotal: i64, basis_points: u32) -> i64 {
    let scaled = i128::from(subtotal) * i128::from(basis_points);
    let unit = i128::from(BASIS_POINTS_PER_UNIT);
    let rounded = if scaled >= 0 {
        (scaled + unit / 2) / unit
    } else {
        (scaled - unit / 2) / unit
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}
