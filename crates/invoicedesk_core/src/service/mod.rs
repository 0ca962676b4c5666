//! Query service and the use-cases built on top of it.
//!
//! # Responsibility
//! - Wrap repository calls in async, latency-simulating, envelope-returning
//!   operations.
//! - Compose page-level loads (dashboard, invoice detail) from those queries.
//! - Keep the CLI decoupled from storage details.

pub mod audit;
pub mod correlation;
pub mod pages;
pub mod query_service;
