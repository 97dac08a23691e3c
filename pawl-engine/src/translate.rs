//! Translation of change files into executable statements.

use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::file::ChangeFile;

/// Executable form of a change file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// A SQL script, executed verbatim.
    Script(String),
    /// A parameterized insert template with one set of bound values per row.
    Inserts(InsertBatch),
}

/// Insert template produced from a CSV change file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertBatch {
    /// The parameterized insert statement, built once from the header row.
    pub sql: String,
    /// Bound values, one vec per CSV data row. `None` binds SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Translate a change file into its executable form, by extension.
pub async fn translate(file: &ChangeFile) -> EngineResult<Translation> {
    match file.path.extension().and_then(|e| e.to_str()) {
        Some("csv") => translate_csv(&file.path).map(Translation::Inserts),
        _ => translate_sql(&file.path).await.map(Translation::Script),
    }
}

/// The trimmed raw text of a SQL change file is the statement to execute.
async fn translate_sql(path: &Path) -> EngineResult<String> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(raw.trim().to_string())
}

/// Build one parameterized insert per data row of a CSV change file.
///
/// The target table is the immediate parent directory of the file; the
/// first CSV record is the column header. Empty values bind NULL.
fn translate_csv(path: &Path) -> EngineResult<InsertBatch> {
    let table = table_from_path(path)?;

    let mut reader =
        csv::Reader::from_path(path).map_err(|e| EngineError::translation(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| EngineError::translation(path, e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(EngineError::translation(path, "no columns in first row"));
    }

    let columns: Vec<&str> = headers.iter().collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    let sql = format!(
        "insert into {} ({}) values ({});",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| EngineError::translation(path, e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    }
                })
                .collect(),
        );
    }

    debug!(table = %table, rows = rows.len(), "translated csv change file");
    Ok(InsertBatch { sql, rows })
}

/// Infer the target table from the file's immediate parent directory.
fn table_from_path(path: &Path) -> EngineResult<String> {
    path.parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| EngineError::translation(path, "no parent directory to infer a table from"))
}
