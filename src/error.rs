//! Error types for the bulk user import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - stream-level CSV reading errors
//! - [`ImportError`] - whole-operation import failures
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Everything in this module is the fatal tier: it aborts the operation and
//! no partial results are returned. Row-level validation failures are NOT
//! errors in this sense — they are data, collected as
//! [`crate::models::RowError`] inside a successful
//! [`crate::models::ImportReport`].

use thiserror::Error;

// =============================================================================
// CSV Stream Errors
// =============================================================================

/// Errors while reading and tokenizing the CSV stream.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the underlying file or stream.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the byte content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Malformed CSV syntax (unterminated quote, bad record).
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Empty file: not even a header line.
    #[error("CSV file is empty")]
    EmptyFile,
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        CsvError::ParseError(e.to_string())
    }
}

// =============================================================================
// Import Errors (whole-operation tier)
// =============================================================================

/// Whole-operation import failures.
///
/// This is the main error type returned by [`crate::import::parse_users`]
/// and friends. A value of this type means the batch produced nothing:
/// the caller gets either a full [`crate::models::ImportReport`] or one of
/// these, never both.
#[derive(Debug, Error)]
pub enum ImportError {
    /// CSV stream error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// One or more required header columns are absent.
    ///
    /// The message is fixed operator-facing text: it always enumerates the
    /// full required column set, not just the missing ones.
    #[error("El archivo CSV debe contener las siguientes columnas: first_name, last_name, email, role.")]
    MissingColumns,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV stream operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
