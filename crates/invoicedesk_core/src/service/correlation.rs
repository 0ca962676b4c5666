//! Activity-to-invoice correlation.
//!
//! The `invoice_id` foreign key is authoritative. The substring rule below is
//! kept for feed entries that predate the link and is best-effort only: it
//! can match unrelated entries by coincidence and, on the demo data, matches
//! nothing because the details cite `00239434` rather than the invoice number.

use crate::model::activity::Activity;
use crate::model::invoice::InvoiceId;
use std::collections::BTreeSet;

/// Legacy rule: activities whose `details` contain the invoice id or number.
///
/// Entries without details never match; an empty `invoice_number` is ignored
/// rather than matching everything.
pub fn match_activities_by_details(
    activities: &[Activity],
    invoice_id: InvoiceId,
    invoice_number: &str,
) -> Vec<Activity> {
    let id_text = invoice_id.to_string();
    let needles: Vec<&str> = [id_text.as_str(), invoice_number.trim()]
        .into_iter()
        .filter(|needle| !needle.is_empty())
        .collect();

    activities
        .iter()
        .filter(|activity| {
            activity
                .details
                .as_deref()
                .is_some_and(|details| needles.iter().any(|needle| details.contains(needle)))
        })
        .cloned()
        .collect()
}

/// Activities linked to `invoice_id` through the foreign key.
pub fn linked_activities(activities: &[Activity], invoice_id: InvoiceId) -> Vec<Activity> {
    activities
        .iter()
        .filter(|activity| activity.invoice_id == Some(invoice_id))
        .cloned()
        .collect()
}

/// Linked activities plus legacy matches among unlinked ones, deduplicated by
/// id, ordered by timestamp then id.
///
/// An activity linked to another invoice never shows up here, whatever its
/// details say.
pub fn correlate_activities(
    activities: &[Activity],
    invoice_id: InvoiceId,
    invoice_number: &str,
) -> Vec<Activity> {
    let unlinked: Vec<Activity> = activities
        .iter()
        .filter(|activity| activity.invoice_id.is_none())
        .cloned()
        .collect();

    let mut merged = linked_activities(activities, invoice_id);
    let mut seen: BTreeSet<_> = merged.iter().map(|activity| activity.id).collect();
    for activity in match_activities_by_details(&unlinked, invoice_id, invoice_number) {
        if seen.insert(activity.id) {
            merged.push(activity);
        }
    }
    merged.sort_by(|left, right| {
        left.timestamp
            .cmp(&right.timestamp)
            .then(left.id.cmp(&right.id))
    });
    merged
}
