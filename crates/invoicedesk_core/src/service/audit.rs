//! Consistency audit over invoice records.
//!
//! Totals are not enforced on write, so this is where drift in hand-authored
//! or imported data becomes visible.

use crate::model::invoice::{Invoice, InvoiceId, TotalsIssue};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// One problem found on an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    Totals(TotalsIssue),
    InvalidCustomerEmail(String),
}

impl Display for AuditFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Totals(issue) => write!(f, "{issue}"),
            Self::InvalidCustomerEmail(email) => write!(f, "invalid customer email `{email}`"),
        }
    }
}

/// Audit result for one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceAudit {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub findings: Vec<AuditFinding>,
}

impl InvoiceAudit {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Simple shape check: something `@` something `.` something, no spaces.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn audit_invoice(invoice: &Invoice) -> InvoiceAudit {
    let mut findings: Vec<AuditFinding> = invoice
        .check_totals()
        .into_iter()
        .map(AuditFinding::Totals)
        .collect();
    if !is_valid_email(&invoice.customer_email) {
        findings.push(AuditFinding::InvalidCustomerEmail(
            invoice.customer_email.clone(),
        ));
    }

    InvoiceAudit {
        invoice_id: invoice.id,
        invoice_number: invoice.invoice_number.clone(),
        findings,
    }
}

pub fn audit_invoices(invoices: &[Invoice]) -> Vec<InvoiceAudit> {
    invoices.iter().map(audit_invoice).collect()
}
