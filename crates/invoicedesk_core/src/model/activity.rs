//! Activity feed model.
//!
//! # Invariants
//! - `invoice_id` is the only supported link between an activity and an
//!   invoice. `details` is free text for display.

use crate::model::invoice::InvoiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned activity identifier.
pub type ActivityId = i64;

/// Kind of feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Created,
    Sent,
    PaymentConfirmed,
    StatusChanged,
}

/// One entry in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: String,
    /// Actor display name (`You` for the signed-in user).
    pub user: String,
    pub timestamp: DateTime<Utc>,
    /// Minor units, for payment entries.
    pub amount: Option<i64>,
    pub details: Option<String>,
    pub invoice_id: Option<InvoiceId>,
}

/// Activity payload accepted by the repository; id is store-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityType,
    pub description: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub amount: Option<i64>,
    pub details: Option<String>,
    pub invoice_id: Option<InvoiceId>,
}

impl NewActivity {
    /// Creates an activity with no amount, details or invoice link.
    pub fn new(
        kind: ActivityType,
        description: impl Into<String>,
        user: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            user: user.into(),
            timestamp,
            amount: None,
            details: None,
            invoice_id: None,
        }
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn for_invoice(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    /// Materializes the record with a store-assigned id.
    pub fn into_activity(self, id: ActivityId) -> Activity {
        Activity {
            id,
            kind: self.kind,
            description: self.description,
            user: self.user,
            timestamp: self.timestamp,
            amount: self.amount,
            details: self.details,
            invoice_id: self.invoice_id,
        }
    }
}
