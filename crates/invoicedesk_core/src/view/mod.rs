//! Presentation helpers shared by text renderers.
//!
//! All date rendering is in UTC.

pub mod format;
pub mod grouping;
