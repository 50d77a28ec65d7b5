//! Domain list input.
//!
//! Reads the first column of a delimited file (or stdin when the path is `-`).
//! Blank lines, `#` comments and a leading `domain` header row are skipped;
//! further columns are ignored so exported spreadsheets can be used as-is.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

const HEADER_NAME: &str = "domain";

/// Reads the domain list at `path` (`-` for stdin).
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn read_domains(path: &Path) -> Result<Vec<String>> {
    let domains = if path.as_os_str() == "-" {
        info!("Reading domains from stdin");
        parse_domains(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        parse_domains(file)
    };
    info!("Total domains in input: {}", domains.len());
    Ok(domains)
}

/// Extracts the first column of every data row of `reader`.
///
/// Unreadable rows are logged and skipped.
pub fn parse_domains<R: Read>(reader: R) -> Vec<String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut domains = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to read input row {}: {e}", index + 1);
                continue;
            }
        };
        let Some(first) = record.get(0).map(str::trim) else {
            continue;
        };
        if first.is_empty() {
            continue;
        }
        if domains.is_empty() && first.eq_ignore_ascii_case(HEADER_NAME) {
            continue;
        }
        domains.push(first.to_string());
    }
    domains
}
