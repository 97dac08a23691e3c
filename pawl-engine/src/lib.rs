//! # pawl-engine
//!
//! Reconciliation and execution engine for pawl change files.
//!
//! The engine walks a search root for `.sql` and `.csv` change files,
//! fingerprints each one, reconciles the set against a persisted ledger of
//! previously applied files, and applies the outstanding ones in a single
//! transaction, in a deterministic order, exactly once. A previously applied
//! file whose content changed (drift), or content that reappears under a new
//! path, aborts the run before anything executes.
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌──────────┐
//! │ Discovery │────▶│ Reconciler │────▶│ Executor │
//! └───────────┘     └────────────┘     └──────────┘
//!                         │                 │  │
//!                         ▼                 │  ▼
//!                   ┌────────────┐          │ ┌────────────┐
//!                   │   Ledger   │◀─────────┘ │ Translator │
//!                   └────────────┘            └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use pawl_engine::{Options, run};
//!
//! async fn migrate(client: &mut tokio_postgres::Client) -> pawl_engine::EngineResult<()> {
//!     let options = Options::new("./sql").verbose(true);
//!     let stats = run(client, &options).await?;
//!     println!("{} files, {} applied", stats.discovered, stats.applied);
//!     Ok(())
//! }
//! ```
//!
//! ## Change files
//!
//! ```text
//! sql/
//! ├── 0000000001_create_users.sql
//! ├── 0000000002_create_posts.sql
//! └── users/
//!     └── 0000000003_seed.csv      # inserts into "users"
//! ```
//!
//! A `.sql` file is executed as written. A `.csv` file becomes one
//! parameterized insert per data row into the table named by its parent
//! directory, with the first row as the column header and empty values
//! bound as NULL.

pub mod engine;
pub mod error;
pub mod file;
pub mod ledger;
pub mod plan;
pub mod render;
pub mod translate;

// Re-exports
pub use engine::{Options, Stats, apply, run};
pub use error::{EngineError, EngineResult};
pub use file::{ChangeFile, discover, fingerprint};
pub use ledger::{LedgerRecord, LedgerState};
pub use plan::{RunPlan, reconcile};
pub use translate::{InsertBatch, Translation};
