//! Result export.
//!
//! Flattens `DomainCheckResult`s into CSV rows appended to the output file.

mod csv;
mod row;

pub use csv::append_results;
