//! Reconciliation of discovered change files against the ledger.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::file::{ChangeFile, order_key};
use crate::ledger::LedgerRecord;

/// Ordered set of change files selected for application this invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Files to apply, in execution order.
    pub pending: Vec<ChangeFile>,
}

impl RunPlan {
    /// Check whether there is anything to apply.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of files selected for application.
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Classify every discovered file against the ledger.
///
/// Produces a plan that is either complete and consistent or fails outright:
/// a fingerprint mismatch for a known path (drift) or known content under a
/// new path (duplicate) aborts the whole run before anything executes.
/// Reconciliation never mutates the database.
pub fn reconcile(
    mut discovered: Vec<ChangeFile>,
    applied: &[LedgerRecord],
) -> EngineResult<RunPlan> {
    let by_path: HashMap<&str, &LedgerRecord> =
        applied.iter().map(|r| (r.path.as_str(), r)).collect();
    let by_fingerprint: HashMap<&str, &LedgerRecord> = applied
        .iter()
        .map(|r| (r.fingerprint.as_str(), r))
        .collect();

    discovered.sort_by(|a, b| order_key(a).cmp(&order_key(b)));

    let mut pending = Vec::new();

    for file in discovered {
        let path = file.ledger_path();

        if let Some(record) = by_path.get(path.as_str()) {
            if record.fingerprint == file.fingerprint {
                // Applied earlier, content unchanged.
                continue;
            }
            return Err(EngineError::Drift {
                path,
                expected: record.fingerprint.clone(),
                actual: file.fingerprint,
            });
        }

        if let Some(record) = by_fingerprint.get(file.fingerprint.as_str()) {
            return Err(EngineError::DuplicateContent {
                path,
                original: record.path.clone(),
            });
        }

        pending.push(file);
    }

    debug!(pending = pending.len(), known = applied.len(), "reconciled");
    Ok(RunPlan { pending })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn change(path: &str, fingerprint: &str) -> ChangeFile {
        ChangeFile {
            path: PathBuf::from(path),
            fingerprint: fingerprint.to_string(),
        }
    }

    fn record(path: &str, fingerprint: &str) -> LedgerRecord {
        LedgerRecord {
            path: path.to_string(),
            fingerprint: fingerprint.to_string(),
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_files_are_planned_in_order() {
        let discovered = vec![
            change("sql/0000000002_b.sql", "f2"),
            change("sql/setup.sql", "f0"),
            change("sql/0000000001_a.sql", "f1"),
        ];

        let plan = reconcile(discovered, &[]).unwrap();
        let order: Vec<_> = plan
            .pending
            .iter()
            .map(|f| f.path.to_str().unwrap())
            .collect();
        assert_eq!(
            order,
            vec![
                "sql/setup.sql",
                "sql/0000000001_a.sql",
                "sql/0000000002_b.sql",
            ]
        );
    }

    #[test]
    fn test_already_applied_files_are_skipped_not_planned() {
        let discovered = vec![
            change("sql/0000000001_a.sql", "f1"),
            change("sql/0000000002_b.sql", "f2"),
        ];
        let applied = vec![record("sql/0000000001_a.sql", "f1")];

        let plan = reconcile(discovered, &applied).unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan.pending[0].path.ends_with("0000000002_b.sql"));
    }

    #[test]
    fn test_fully_applied_set_yields_empty_plan() {
        let discovered = vec![
            change("sql/0000000001_a.sql", "f1"),
            change("sql/0000000002_b.sql", "f2"),
        ];
        let applied = vec![
            record("sql/0000000001_a.sql", "f1"),
            record("sql/0000000002_b.sql", "f2"),
        ];

        // Reconciling an already-updated ledger is idempotent.
        let plan = reconcile(discovered.clone(), &applied).unwrap();
        assert!(plan.is_empty());
        let again = reconcile(discovered, &applied).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_modified_file_is_drift() {
        let discovered = vec![change("sql/0000000001_a.sql", "f1-changed")];
        let applied = vec![record("sql/0000000001_a.sql", "f1")];

        let err = reconcile(discovered, &applied).unwrap_err();
        match err {
            EngineError::Drift {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, "sql/0000000001_a.sql");
                assert_eq!(expected, "f1");
                assert_eq!(actual, "f1-changed");
            }
            other => panic!("expected drift, got {other:?}"),
        }
    }

    #[test]
    fn test_known_content_under_new_path_is_duplicate() {
        let discovered = vec![change("sql/0000000009_copy.sql", "f1")];
        let applied = vec![record("sql/0000000001_a.sql", "f1")];

        let err = reconcile(discovered, &applied).unwrap_err();
        match err {
            EngineError::DuplicateContent { path, original } => {
                assert_eq!(path, "sql/0000000009_copy.sql");
                assert_eq!(original, "sql/0000000001_a.sql");
            }
            other => panic!("expected duplicate content, got {other:?}"),
        }
    }

    #[test]
    fn test_drift_aborts_before_later_files_are_considered() {
        // The drifted file sorts first, so the clean file after it never
        // makes it into a partial plan.
        let discovered = vec![
            change("sql/0000000001_a.sql", "f1-changed"),
            change("sql/0000000002_b.sql", "f2"),
        ];
        let applied = vec![record("sql/0000000001_a.sql", "f1")];

        assert!(matches!(
            reconcile(discovered, &applied),
            Err(EngineError::Drift { .. })
        ));
    }
}
