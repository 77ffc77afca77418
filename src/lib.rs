//! # Altamasiva - Bulk user CSV ingestion and validation
//!
//! Altamasiva ingests CSV files of prospective user accounts for a school
//! network, validates the header and every row, and partitions rows into
//! accepted users and row-level errors instead of failing the whole batch on
//! one bad line.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Importer   │────▶│ ImportReport│
//! │ (any enc.)  │     │ (auto-enc)  │     │ (partition)  │     │ users/errors│
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use altamasiva::import::parse_str;
//!
//! let csv = "first_name,last_name,email,role\nJohn,Doe,john.doe@example.com,docente";
//! let report = parse_str(csv)?;
//! assert_eq!(report.users.len(), 1);
//! assert!(report.errors.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types (fatal tier)
//! - [`models`] - Domain models (UserRecord, RowError, ImportReport, UserRole)
//! - [`parser`] - Encoding and delimiter auto-detection
//! - [`import`] - Header validation and row partitioning
//! - [`rut`] - Chilean RUT validation and formatting
//! - [`password`] - Provisioning password generation
//! - [`export`] - Sanitized CSV export, tables, sample data
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Import pipeline
pub mod import;

// Utilities
pub mod export;
pub mod password;
pub mod rut;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, CsvResult, ImportError, ImportResult, ServerError, ServerResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ImportReport, ImportSummary, RowError, RowWarning, UserRecord, UserRole};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_content, detect_delimiter, detect_encoding};

// =============================================================================
// Re-exports - Import
// =============================================================================

pub use import::{parse_bytes_auto, parse_file_auto, parse_str, parse_users, ImportOutcome};

// =============================================================================
// Re-exports - Utilities
// =============================================================================

pub use export::{format_table, sample_csv, sanitize_cell, users_to_csv};
pub use password::{generate_memorable_password, generate_password};
pub use rut::{format_rut, validate_rut};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CsvMetadata, ImportResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
