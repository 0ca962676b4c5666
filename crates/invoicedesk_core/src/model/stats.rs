//! Dashboard aggregates derived from the invoice collection.

use crate::model::invoice::{Invoice, InvoiceStatus};
use serde::{Deserialize, Serialize};

/// Count and summed `total_amount` for one status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    pub count: u32,
    /// Minor units.
    pub amount: i64,
}

impl StatBucket {
    /// Counts one invoice; both fields stop at their maximum instead of
    /// wrapping.
    fn add(&mut self, total_amount: i64) {
        self.count = self.count.saturating_add(1);
        self.amount = self.amount.saturating_add(total_amount);
    }
}

/// The four dashboard cards.
///
/// `PARTIAL PAYMENT` invoices are counted in no bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_paid: StatBucket,
    pub total_overdue: StatBucket,
    pub total_draft: StatBucket,
    /// `PENDING PAYMENT` only.
    pub total_unpaid: StatBucket,
}

impl DashboardStats {
    /// Recomputes all buckets from the full collection.
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let mut stats = Self::default();
        for invoice in invoices {
            match invoice.status {
                InvoiceStatus::Paid => stats.total_paid.add(invoice.total_amount),
                InvoiceStatus::Overdue => stats.total_overdue.add(invoice.total_amount),
                InvoiceStatus::Draft => stats.total_draft.add(invoice.total_amount),
                InvoiceStatus::PendingPayment => stats.total_unpaid.add(invoice.total_amount),
                InvoiceStatus::PartialPayment => {}
            }
        }
        stats
    }
}
