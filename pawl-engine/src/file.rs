//! Change file discovery and fingerprinting.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Matches a 10-digit sequence id bounded by non-digits on both sides.
static SEQUENCE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D(\d{10})\D").unwrap());

/// A change file discovered under the search root.
///
/// Immutable once discovered within a run; rebuilt from disk on every
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFile {
    /// Path to the file, as discovered.
    pub path: PathBuf,
    /// Hex content digest.
    pub fingerprint: String,
}

impl ChangeFile {
    /// Path in the form it is recorded in the ledger.
    pub fn ledger_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Compute the content digest of a file.
pub async fn fingerprint(path: &Path) -> EngineResult<String> {
    let raw = tokio::fs::read(path).await?;
    Ok(hex::encode(Sha256::digest(&raw)))
}

/// Extract the embedded 10-digit sequence id from a path, if present.
pub fn sequence_id(path: &Path) -> Option<u64> {
    let text = path.to_string_lossy();
    SEQUENCE_ID
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Total ordering key for change files.
///
/// Files without a sequence id run first, in lexical path order; id-carrying
/// files follow in ascending numeric order, ties broken by path.
pub fn order_key(file: &ChangeFile) -> (bool, Option<u64>, &Path) {
    let id = sequence_id(&file.path);
    (id.is_some(), id, file.path.as_path())
}

fn is_change_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("sql") | Some("csv")
    )
}

/// Recursively collect and fingerprint every change file under `root`.
///
/// Matches `*.sql` and `*.csv` at any depth. An empty match set is an error:
/// it almost always means the search root is wrong. No ordering is
/// guaranteed here; the reconciler imposes it.
pub async fn discover(root: &Path) -> EngineResult<Vec<ChangeFile>> {
    let mut found = Vec::new();
    let mut dirs = vec![root.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                dirs.push(path);
            } else if is_change_file(&path) {
                let fingerprint = fingerprint(&path).await?;
                found.push(ChangeFile { path, fingerprint });
            }
        }
    }

    if found.is_empty() {
        return Err(EngineError::NoChangeFiles(root.to_path_buf()));
    }

    debug!(count = found.len(), root = %root.display(), "discovered change files");
    Ok(found)
}
