//! Domain model for the invoice dashboard.
//!
//! # Responsibility
//! - Define canonical invoice/activity records served by the query service.
//! - Derive dashboard aggregates without persisting them.
//!
//! # Invariants
//! - Money is always integer minor units (cents) in a single currency.
//! - Invoice ids are assigned by the store and never reused.
//! - `ApiResponse` is the only envelope shape handed to presentation code.

pub mod activity;
pub mod envelope;
pub mod invoice;
pub mod stats;
