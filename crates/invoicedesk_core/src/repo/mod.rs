//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for invoices/activities.
//! - Isolate SQL details from the query service.
//!
//! # Invariants
//! - Repositories borrow a migrated connection; they never open their own.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Timestamps are persisted as RFC 3339 UTC text with millisecond precision.

pub mod activity_repo;
pub mod invoice_repo;

use crate::db::migrations::{current_user_version, latest_version};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, Transaction};

pub use invoice_repo::{RepoError, RepoResult};

/// Groups writes from every repository sharing one connection into a single
/// commit.
///
/// Dropping an uncommitted scope rolls back. Beginning a scope while one is
/// already open joins it, and only the outermost scope commits.
pub struct WriteScope<'conn> {
    tx: Option<Transaction<'conn>>,
}

impl<'conn> WriteScope<'conn> {
    pub(crate) fn begin(conn: &'conn Connection) -> RepoResult<Self> {
        if !conn.is_autocommit() {
            return Ok(Self::detached());
        }
        Ok(Self {
            tx: Some(conn.unchecked_transaction()?),
        })
    }

    /// Scope with nothing to commit, for stores without transactions.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn commit(self) -> RepoResult<()> {
        if let Some(tx) = self.tx {
            tx.commit()?;
        }
        Ok(())
    }
}

/// Normalizes a timestamp to the precision the store keeps.
pub fn store_precision(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

pub(crate) fn timestamp_to_db(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let found = current_user_version(conn)?;
    let expected = latest_version();
    if found != expected {
        return Err(RepoError::SchemaNotReady { found, expected });
    }
    Ok(())
}
