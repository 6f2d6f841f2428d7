//! Errors raised while building the in-memory puzzle model.

use thiserror::Error;

/// Malformed structural input. These are precondition failures caught before any solving starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Ragged grid: row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}
