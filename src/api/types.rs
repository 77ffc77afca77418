//! REST API types for the admin frontend.
//!
//! The response carries the full partitioned report: accepted users for the
//! preview table, row errors as "fix these specific rows" messages, advisory
//! warnings, and the CSV metadata the importer detected. Committing the
//! accepted users to the identity backend is the caller's next request, not
//! this one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::import::ImportOutcome;
use crate::models::{ImportSummary, RowError, RowWarning, UserRecord};

/// Response sent to the frontend after a CSV upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" when every row was accepted, "warning" otherwise
    pub status: String,

    /// Accepted users, in input order
    pub users: Vec<UserRecord>,

    /// Row-level failures, in input order
    pub errors: Vec<RowError>,

    /// Advisory findings on accepted rows
    pub warnings: Vec<RowWarning>,

    /// Aggregate counts
    pub summary: ImportSummary,

    /// What the importer detected about the file
    pub metadata: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<ImportOutcome> for ImportResponse {
    fn from(outcome: ImportOutcome) -> Self {
        let summary = outcome.report.summary();

        ImportResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if outcome.report.errors.is_empty() {
                "ready"
            } else {
                "warning"
            }
            .to_string(),
            metadata: CsvMetadata {
                encoding: outcome.encoding,
                delimiter: outcome.delimiter.to_string(),
                row_count: summary.total,
                columns: outcome.headers,
            },
            users: outcome.report.users,
            errors: outcome.report.errors,
            warnings: outcome.report.warnings,
            summary,
        }
    }
}

/// Create an error response for fatal (whole-operation) failures.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "users": [],
        "errors": [],
        "warnings": [],
        "summary": {
            "total": 0,
            "valid": 0,
            "invalid": 0,
            "withWarnings": 0
        }
    })
}
