//! End-to-end reconciliation runs.

use std::path::PathBuf;

use bytes::BytesMut;
use tokio_postgres::types::{Format, IsNull, ToSql, Type};
use tokio_postgres::{Client, Transaction};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::file::{self, ChangeFile};
use crate::ledger::{self, APPEND_SQL};
use crate::plan::{self, RunPlan};
use crate::render;
use crate::translate::{self, Translation};

/// Configuration for a reconciliation run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Root directory searched for change files.
    pub search_root: PathBuf,
    /// Plan and validate without executing anything.
    pub dry_run: bool,
    /// Render each statement for display before it runs.
    pub verbose: bool,
}

impl Options {
    /// Create options for a search root, with real execution and no
    /// statement rendering.
    pub fn new(search_root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: search_root.into(),
            dry_run: false,
            verbose: false,
        }
    }

    /// Set dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set verbose statement rendering.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Change files discovered under the search root.
    pub discovered: usize,
    /// Files applied this run (or that would have been, under dry-run).
    pub applied: usize,
}

/// Reconcile the search root against the ledger and apply what is missing.
///
/// The pipeline runs identically under dry-run, including drift and
/// duplicate-content checks, so a dry run previews exactly the decisions a
/// real run would make; only statement execution, ledger writes and the
/// final commit are withheld.
///
/// Concurrent invocations against the same database are not guarded: two
/// racing runs can both plan the same file and collide at commit time.
pub async fn run(client: &mut Client, options: &Options) -> EngineResult<Stats> {
    let state = ledger::ensure(client, options.dry_run).await?;
    let applied = ledger::load(client, state).await?;
    let discovered = file::discover(&options.search_root).await?;

    let mut stats = Stats {
        discovered: discovered.len(),
        applied: 0,
    };

    let run_plan = plan::reconcile(discovered, &applied)?;
    stats.applied = apply(client, &run_plan, options).await?;

    Ok(stats)
}

/// Apply a run plan inside one transaction.
///
/// An empty plan is a no-op. Any failure returns early and drops the
/// transaction, rolling back every statement and ledger row from this
/// invocation; a commit is only issued after the whole plan succeeds.
pub async fn apply(
    client: &mut Client,
    run_plan: &RunPlan,
    options: &Options,
) -> EngineResult<usize> {
    if run_plan.is_empty() {
        debug!("nothing to apply");
        return Ok(0);
    }

    if options.dry_run {
        return preview(run_plan, options).await;
    }

    let tx = client.transaction().await?;
    let mut applied = 0;

    for change in &run_plan.pending {
        info!(path = %change.path.display(), "applying change file");
        let translation = translate::translate(change).await?;
        execute(&tx, change, &translation, options.verbose).await?;
        ledger::append(&tx, change).await?;
        if options.verbose {
            render_append(change);
        }
        applied += 1;
    }

    tx.commit().await?;
    Ok(applied)
}

/// Dry-run: translate (and optionally render) the plan without a
/// transaction, so the same validation runs and nothing is staged.
async fn preview(run_plan: &RunPlan, options: &Options) -> EngineResult<usize> {
    let mut applied = 0;

    for change in &run_plan.pending {
        info!(path = %change.path.display(), "would apply change file");
        let translation = translate::translate(change).await?;
        if options.verbose {
            render_translation(&translation);
            render_append(change);
        }
        applied += 1;
    }

    Ok(applied)
}

async fn execute(
    tx: &Transaction<'_>,
    change: &ChangeFile,
    translation: &Translation,
    verbose: bool,
) -> EngineResult<()> {
    if verbose {
        render_translation(translation);
    }

    match translation {
        Translation::Script(sql) => {
            tx.batch_execute(sql)
                .await
                .map_err(|e| EngineError::execution(&change.path, e))?;
        }
        Translation::Inserts(batch) => {
            for row in &batch.rows {
                let values: Vec<TextValue> = row.iter().cloned().map(TextValue).collect();
                let params: Vec<&(dyn ToSql + Sync)> =
                    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
                tx.execute(batch.sql.as_str(), &params)
                    .await
                    .map_err(|e| EngineError::execution(&change.path, e))?;
            }
        }
    }

    Ok(())
}

fn render_translation(translation: &Translation) {
    match translation {
        Translation::Script(sql) => info!(target: "pawl::sql", "{sql}"),
        Translation::Inserts(batch) => {
            for row in &batch.rows {
                info!(target: "pawl::sql", "{}", render::substitute(&batch.sql, row));
            }
        }
    }
}

fn render_append(change: &ChangeFile) {
    let args = [
        Some(change.ledger_path()),
        Some(change.fingerprint.clone()),
    ];
    info!(target: "pawl::sql", "{}", render::substitute(APPEND_SQL, &args));
}

/// A CSV value bound in the text wire format.
///
/// The parameter type is left to the server, which coerces the text with
/// the destination column's own input conversion, exactly as it would a
/// quoted literal. `None` binds NULL.
#[derive(Debug, Clone)]
struct TextValue(Option<String>);

impl ToSql for TextValue {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            Some(value) => {
                out.extend_from_slice(value.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    // Every type is accepted, so the checked form is the unchecked one.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        self.to_sql(ty, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = Options::new("./sql").dry_run(true).verbose(true);
        assert_eq!(options.search_root, PathBuf::from("./sql"));
        assert!(options.dry_run);
        assert!(options.verbose);

        let defaults = Options::new("./sql");
        assert!(!defaults.dry_run);
        assert!(!defaults.verbose);
    }

    #[test]
    fn test_stats_default() {
        let stats = Stats::default();
        assert_eq!(stats.discovered, 0);
        assert_eq!(stats.applied, 0);
    }

    #[test]
    fn test_text_value_encodes_raw_text() {
        let mut out = BytesMut::new();
        let value = TextValue(Some("Alice".to_string()));
        let is_null = value.to_sql(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(&out[..], b"Alice");
        assert!(matches!(value.encode_format(&Type::INT4), Format::Text));
    }

    #[test]
    fn test_text_value_none_is_null() {
        let mut out = BytesMut::new();
        let value = TextValue(None);
        let is_null = value.to_sql(&Type::INT4, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(out.is_empty());
    }

    #[test]
    fn test_text_value_accepts_any_column_type() {
        assert!(TextValue::accepts(&Type::INT4));
        assert!(TextValue::accepts(&Type::TIMESTAMPTZ));
        assert!(TextValue::accepts(&Type::TEXT));
    }

    // Paths that need a live PostgreSQL server (apply, run) are exercised
    // against a real database, not mocked here.
}
