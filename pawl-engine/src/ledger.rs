//! The persisted ledger of applied change files.
//!
//! One row per applied file, keyed by path and content fingerprint.
//! Append-only: this module never updates or deletes rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Transaction};
use tracing::debug;

use crate::error::EngineResult;
use crate::file::ChangeFile;

/// Namespace holding the ledger table.
pub const LEDGER_SCHEMA: &str = "pawl";

/// Table recording applied change files.
pub const LEDGER_TABLE: &str = "ledger";

/// SQL for creating the ledger namespace.
pub const CREATE_SCHEMA_SQL: &str = "create schema pawl;";

/// SQL for creating the ledger table.
pub const CREATE_TABLE_SQL: &str = "create table pawl.ledger (path text not null, \
     fingerprint text not null, created timestamptz not null default now());";

const SCHEMA_EXISTS_SQL: &str = "select count(1) from pg_namespace where nspname = $1 limit 1;";
const TABLE_EXISTS_SQL: &str =
    "select count(1) from pg_tables where schemaname = $1 and tablename = $2 limit 1;";
const LOAD_SQL: &str = "select path, fingerprint, created from pawl.ledger;";

pub(crate) const APPEND_SQL: &str =
    "insert into pawl.ledger (path, fingerprint) values ($1, $2);";

/// One applied change file, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Path the file was applied from.
    pub path: String,
    /// Content fingerprint at the time it was applied.
    pub fingerprint: String,
    /// When it was applied.
    pub applied_at: DateTime<Utc>,
}

/// Whether the ledger table can actually be read this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// The table exists (or was just created) and can be queried.
    Ready,
    /// Dry run withheld creation; the ledger is legitimately empty.
    Deferred,
}

/// Verify the ledger namespace and table exist, creating whichever is missing.
///
/// Idempotent. Under dry-run nothing is created; a missing table yields
/// [`LedgerState::Deferred`] so [`load`] knows not to query it.
pub async fn ensure(client: &Client, dry_run: bool) -> EngineResult<LedgerState> {
    let row = client
        .query_one(SCHEMA_EXISTS_SQL, &[&LEDGER_SCHEMA])
        .await?;
    if row.get::<_, i64>(0) == 0 {
        debug!(sql = CREATE_SCHEMA_SQL, "ledger namespace missing");
        if !dry_run {
            client.batch_execute(CREATE_SCHEMA_SQL).await?;
        }
    }

    let row = client
        .query_one(TABLE_EXISTS_SQL, &[&LEDGER_SCHEMA, &LEDGER_TABLE])
        .await?;
    if row.get::<_, i64>(0) == 0 {
        debug!(sql = CREATE_TABLE_SQL, "ledger table missing");
        if dry_run {
            return Ok(LedgerState::Deferred);
        }
        client.batch_execute(CREATE_TABLE_SQL).await?;
    }

    Ok(LedgerState::Ready)
}

/// Load every applied record.
///
/// Returns an empty set without error when the table was only hypothetically
/// created by a dry run.
pub async fn load(client: &Client, state: LedgerState) -> EngineResult<Vec<LedgerRecord>> {
    if state == LedgerState::Deferred {
        return Ok(Vec::new());
    }

    let rows = client.query(LOAD_SQL, &[]).await?;
    let records: Vec<LedgerRecord> = rows
        .into_iter()
        .map(|row| LedgerRecord {
            path: row.get(0),
            fingerprint: row.get(1),
            applied_at: row.get(2),
        })
        .collect();

    debug!(count = records.len(), "loaded ledger records");
    Ok(records)
}

/// Record one applied change file inside the caller's transaction.
pub async fn append(tx: &Transaction<'_>, file: &ChangeFile) -> EngineResult<()> {
    tx.execute(APPEND_SQL, &[&file.ledger_path(), &file.fingerprint])
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql_shape() {
        assert!(CREATE_TABLE_SQL.contains("pawl.ledger"));
        assert!(CREATE_TABLE_SQL.contains("fingerprint text not null"));
        assert!(CREATE_TABLE_SQL.contains("timestamptz"));
    }

    #[test]
    fn test_append_is_parameterized() {
        assert!(APPEND_SQL.contains("$1"));
        assert!(APPEND_SQL.contains("$2"));
    }

    #[test]
    fn test_ledger_record() {
        let record = LedgerRecord {
            path: "sql/0000000001_users.sql".to_string(),
            fingerprint: "abc123".to_string(),
            applied_at: Utc::now(),
        };
        assert_eq!(record.path, "sql/0000000001_users.sql");
        assert_eq!(record, record.clone());
    }

    #[test]
    fn test_ledger_state() {
        assert_eq!(LedgerState::Ready, LedgerState::Ready);
        assert_ne!(LedgerState::Ready, LedgerState::Deferred);
    }
}
