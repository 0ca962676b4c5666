//! Invoice list grouping by creation day.

use crate::model::invoice::Invoice;
use crate::view::format::format_weekday_date;

/// Invoices sharing one rendered creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceGroup<'a> {
    /// e.g. `Sunday, November 27, 2022`.
    pub label: String,
    pub invoices: Vec<&'a Invoice>,
}

/// Groups invoices by rendered `created_at` date.
///
/// Groups appear in order of first occurrence; invoices keep input order
/// within a group.
pub fn group_invoices_by_date(invoices: &[Invoice]) -> Vec<InvoiceGroup<'_>> {
    let mut groups: Vec<InvoiceGroup<'_>> = Vec::new();
    for invoice in invoices {
        let label = format_weekday_date(&invoice.created_at);
        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.invoices.push(invoice),
            None => groups.push(InvoiceGroup {
                label,
                invoices: vec![invoice],
            }),
        }
    }
    groups
}
