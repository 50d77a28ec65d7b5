//! CSV result sink.
//!
//! Rows are appended, never rewritten: a retry pass adds new rows for the
//! retried domains after the original ones.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};

use crate::probe::DomainCheckResult;

use super::row::ResultRow;

/// Appends one row per result to the CSV file at `path`.
///
/// With `write_header`, a header row is written when the file is new or empty.
///
/// # Returns
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn append_results(
    path: &Path,
    results: &[DomainCheckResult],
    write_header: bool,
) -> Result<usize> {
    let is_empty = std::fs::metadata(path)
        .map(|meta| meta.len() == 0)
        .unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header && is_empty)
        .from_writer(file);

    let checked_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    for result in results {
        writer
            .serialize(ResultRow::new(result, &checked_at))
            .with_context(|| format!("Failed to write row for {}", result.domain))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file {}", path.display()))?;

    log::debug!("Appended {} row(s) to {}", results.len(), path.display());
    Ok(results.len())
}
