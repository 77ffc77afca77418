//! Domain models for the bulk user import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`UserRecord`] - a fully validated user row, ready for provisioning
//! - [`RowError`] - a row-level validation failure (row number + message)
//! - [`RowWarning`] - an advisory finding that does not reject the row
//! - [`ImportReport`] - the partitioned outcome of one parse invocation
//! - [`UserRole`] - the role vocabulary of the school network

use serde::{Deserialize, Serialize};

// =============================================================================
// User Record
// =============================================================================

/// A validated user row.
///
/// All four fields are guaranteed non-empty after trimming. Values are copied
/// verbatim from the CSV — no casing normalization, no reformatting. The
/// `role` stays a plain string here because the partition is presence-only;
/// see [`UserRole`] for the advisory vocabulary check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact / login email.
    pub email: String,
    /// Role code, as written in the file.
    pub role: String,
}

// =============================================================================
// Row Error
// =============================================================================

/// A row-level validation failure.
///
/// Does not abort the batch: the row is recorded here and processing
/// continues. Row numbers are 1-based file lines with the header counted as
/// row 1, so the first data row is row 2.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowError {
    /// 1-based file line of the offending row (header = 1).
    pub row: u64,
    /// Operator-facing Spanish message, e.g. `"Falta el email en la fila 2"`.
    pub message: String,
}

// =============================================================================
// Row Warning
// =============================================================================

/// An advisory finding on an accepted row.
///
/// Warnings never move a row out of the users list. They flag things the
/// operator probably wants to review before committing the batch: an email
/// that does not look like an email, a role code outside the known
/// vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowWarning {
    /// 1-based file line of the row (header = 1).
    pub row: u64,
    /// Operator-facing Spanish message.
    pub message: String,
}

// =============================================================================
// Import Report
// =============================================================================

/// The partitioned outcome of one parse invocation.
///
/// Invariant: every data row of the input contributes to exactly one of
/// `users` or `errors`, never both, never neither. Both lists preserve input
/// order. A header-only file yields two empty lists — that is a success, not
/// an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportReport {
    /// Accepted rows, in input order.
    pub users: Vec<UserRecord>,
    /// Rejected rows, in input order.
    pub errors: Vec<RowError>,
    /// Advisory findings on accepted rows, in input order.
    pub warnings: Vec<RowWarning>,
}

/// Aggregate counts for operator display and API responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub with_warnings: usize,
}

impl ImportReport {
    /// Compute the summary block.
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            total: self.users.len() + self.errors.len(),
            valid: self.users.len(),
            invalid: self.errors.len(),
            with_warnings: self.warnings.len(),
        }
    }

    /// True when every data row was accepted.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Role of a user in the school network.
///
/// This is the known vocabulary used for advisory checks and sample data.
/// The core partition keeps roles as verbatim strings; an unknown code is a
/// warning, not a rejection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Pedagogical consultant.
    Consultor,
    /// Teacher.
    Docente,
    /// School leadership team member.
    EquipoDirectivo,
    /// Generation leader.
    LiderGeneracion,
    /// Community leader.
    LiderComunidad,
}

impl UserRole {
    /// Parse a role from its code string, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase();
        match normalized.as_str() {
            "admin" => Some(Self::Admin),
            "consultor" => Some(Self::Consultor),
            "docente" => Some(Self::Docente),
            "equipo_directivo" => Some(Self::EquipoDirectivo),
            "lider_generacion" => Some(Self::LiderGeneracion),
            "lider_comunidad" => Some(Self::LiderComunidad),
            _ => None,
        }
    }

    /// The canonical code string.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Consultor => "consultor",
            Self::Docente => "docente",
            Self::EquipoDirectivo => "equipo_directivo",
            Self::LiderGeneracion => "lider_generacion",
            Self::LiderComunidad => "lider_comunidad",
        }
    }

    /// All known role codes, for messages and samples.
    pub fn all_codes() -> &'static [&'static str] {
        &[
            "admin",
            "consultor",
            "docente",
            "equipo_directivo",
            "lider_generacion",
            "lider_comunidad",
        ]
    }

    /// Guess a role from an email address pattern.
    ///
    /// Looks at both the local part and the domain. Returns `None` when no
    /// pattern matches or the address has no domain.
    pub fn detect_from_email(email: &str) -> Option<Self> {
        let lower = email.to_lowercase();
        let (_, domain) = lower.split_once('@')?;
        if domain.is_empty() {
            return None;
        }

        if lower.contains("admin") {
            Some(Self::Admin)
        } else if lower.contains("consultant") || lower.contains("consultor") {
            Some(Self::Consultor)
        } else if lower.contains("director") {
            Some(Self::EquipoDirectivo)
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_code() {
        assert_eq!(UserRole::from_code("docente"), Some(UserRole::Docente));
        assert_eq!(UserRole::from_code("ADMIN"), Some(UserRole::Admin));
        assert_eq!(
            UserRole::from_code(" equipo_directivo "),
            Some(UserRole::EquipoDirectivo)
        );
        assert_eq!(UserRole::from_code("invalid_role"), None);
    }

    #[test]
    fn test_role_roundtrip() {
        for code in UserRole::all_codes() {
            let role = UserRole::from_code(code).unwrap();
            assert_eq!(role.as_code(), *code);
        }
    }

    #[test]
    fn test_detect_role_from_email() {
        assert_eq!(
            UserRole::detect_from_email("user@admin.com"),
            Some(UserRole::Admin)
        );
        assert_eq!(
            UserRole::detect_from_email("admin@company.com"),
            Some(UserRole::Admin)
        );
        assert_eq!(
            UserRole::detect_from_email("user@consultor.cl"),
            Some(UserRole::Consultor)
        );
        assert_eq!(
            UserRole::detect_from_email("user@director.edu"),
            Some(UserRole::EquipoDirectivo)
        );
        assert_eq!(UserRole::detect_from_email("user@company.com"), None);
        assert_eq!(UserRole::detect_from_email("invalid-email"), None);
    }

    #[test]
    fn test_report_summary() {
        let report = ImportReport {
            users: vec![UserRecord {
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john@test.com".into(),
                role: "docente".into(),
            }],
            errors: vec![RowError {
                row: 3,
                message: "Falta el email en la fila 3".into(),
            }],
            warnings: vec![],
        };

        let summary = report.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.with_warnings, 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_user_record_serialization() {
        let user = UserRecord {
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            email: "jane.smith@example.com".into(),
            role: "consultor".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("jane.smith@example.com"));
        assert!(json.contains("consultor"));
    }
}
