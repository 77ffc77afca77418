//! Bulk user CSV parsing: header validation and row partitioning.
//!
//! The central design decision of the importer lives here: partial success is
//! the normal mode. A data row missing a required field becomes a
//! [`RowError`] and processing continues, so one bad line never sinks a
//! 400-row upload. Structural problems are all-or-nothing: a header missing
//! any required column, an I/O failure or malformed CSV syntax abort the
//! whole operation with an [`ImportError`] and no partial results.
//!
//! Row numbers in messages are 1-based file lines with the header counted as
//! row 1, so the first data row is "la fila 2".
//!
//! # Example
//!
//! ```rust,ignore
//! use altamasiva::import::parse_str;
//!
//! let csv = "first_name,last_name,email,role\nJohn,Doe,john.doe@example.com,docente";
//! let report = parse_str(csv)?;
//! assert_eq!(report.users.len(), 1);
//! assert!(report.errors.is_empty());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, ImportError, ImportResult};
use crate::models::{ImportReport, RowError, RowWarning, UserRecord, UserRole};
use crate::parser::{decode_content, detect_delimiter, detect_encoding};

/// Required columns with their Spanish display labels, in check order.
///
/// The order is load-bearing: when a row is missing several fields, only the
/// first one in this table is reported. Adding a required field is a one-line
/// edit here plus the fixed header message in `error.rs`.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("email", "email"),
    ("last_name", "apellido"),
    ("first_name", "nombre"),
    ("role", "rol"),
];

/// Lenient format check, advisory only: something @ something . something.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

/// A parse with the auto-detection metadata the caller may want to echo back.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The partitioned rows.
    pub report: ImportReport,
    /// Detected encoding of the input bytes.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
    /// Column headers as found in the file.
    pub headers: Vec<String>,
}

// =============================================================================
// Header Validator
// =============================================================================

/// Map each required field to its column position, or fail the whole import.
///
/// Pure function of the header row. Header names are matched after trimming
/// surrounding whitespace and stray quotes; extra columns are ignored. The
/// error message is the fixed full-list text regardless of which columns are
/// actually missing.
fn validate_headers(headers: &csv::StringRecord) -> ImportResult<HashMap<&'static str, usize>> {
    let mut columns = HashMap::new();

    for (field, _) in REQUIRED_FIELDS {
        let position = headers
            .iter()
            .position(|h| h.trim().trim_matches('"') == *field);
        match position {
            Some(idx) => {
                columns.insert(*field, idx);
            }
            None => return Err(ImportError::MissingColumns),
        }
    }

    Ok(columns)
}

// =============================================================================
// Row Validator / Partitioner
// =============================================================================

/// Classify one data row: a `UserRecord`, or a `RowError` naming the first
/// missing field in [`REQUIRED_FIELDS`] order.
fn classify_row(
    record: &csv::StringRecord,
    columns: &HashMap<&'static str, usize>,
    row: u64,
) -> Result<UserRecord, RowError> {
    for (field, label) in REQUIRED_FIELDS {
        let value = record.get(columns[field]).unwrap_or("").trim();
        if value.is_empty() {
            return Err(RowError {
                row,
                message: format!("Falta el {} en la fila {}", label, row),
            });
        }
    }

    let get = |field: &str| record.get(columns[field]).unwrap_or("").trim().to_string();

    Ok(UserRecord {
        first_name: get("first_name"),
        last_name: get("last_name"),
        email: get("email"),
        role: get("role"),
    })
}

/// Advisory checks on an accepted row. Never rejects.
fn row_warnings(user: &UserRecord, row: u64, warnings: &mut Vec<RowWarning>) {
    if !EMAIL_RE.is_match(&user.email) {
        warnings.push(RowWarning {
            row,
            message: format!("Email inválido en la fila {}: '{}'", row, user.email),
        });
    }
    if UserRole::from_code(&user.role).is_none() {
        warnings.push(RowWarning {
            row,
            message: format!("Rol desconocido en la fila {}: '{}'", row, user.role),
        });
    }
}

/// Single-pass partition of an already-built CSV reader.
///
/// Returns the report plus the header row. Row numbers come from the
/// reader's byte positions, so blank lines skipped by the tokenizer do not
/// shift the numbering of later rows.
fn parse_reader<R: Read>(
    mut rdr: csv::Reader<R>,
) -> ImportResult<(ImportReport, Vec<String>)> {
    let headers = rdr.headers().map_err(CsvError::from)?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Err(CsvError::EmptyFile.into());
    }

    let columns = validate_headers(&headers)?;

    let mut report = ImportReport::default();

    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(CsvError::from)?;

        // Fallback covers readers that carry no position info
        let row = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        // Tokenizer already skips fully empty lines; a lone delimiter-less
        // blank field can still slip through as a one-column record
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        match classify_row(&record, &columns, row) {
            Ok(user) => {
                row_warnings(&user, row, &mut report.warnings);
                report.users.push(user);
            }
            Err(error) => report.errors.push(error),
        }
    }

    Ok((report, headers.iter().map(|h| h.trim().to_string()).collect()))
}

fn build_reader<R: Read>(reader: R, delimiter: char) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader)
}

// =============================================================================
// Entry Points
// =============================================================================

/// Parse a bulk user CSV from any reader, with an explicit delimiter.
///
/// This is the core transformation: single-threaded, single-pass, no global
/// state. The same bytes always yield a structurally identical report.
pub fn parse_users<R: Read>(reader: R, delimiter: char) -> ImportResult<ImportReport> {
    let (report, _) = parse_reader(build_reader(reader, delimiter))?;
    Ok(report)
}

/// Parse a bulk user CSV from a string, auto-detecting the delimiter.
pub fn parse_str(content: &str) -> ImportResult<ImportReport> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile.into());
    }
    let delimiter = detect_delimiter(content);
    parse_users(content.as_bytes(), delimiter)
}

/// Parse raw uploaded bytes with encoding and delimiter auto-detection.
pub fn parse_bytes_auto(bytes: &[u8]) -> ImportResult<ImportOutcome> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile.into());
    }

    let delimiter = detect_delimiter(&content);
    let (report, headers) = parse_reader(build_reader(content.as_bytes(), delimiter))?;

    Ok(ImportOutcome {
        report,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse a CSV file with encoding and delimiter auto-detection.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> ImportResult<ImportOutcome> {
    let bytes = std::fs::read(path.as_ref()).map_err(CsvError::from)?;
    parse_bytes_auto(&bytes)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_COLUMNS_MSG: &str =
        "El archivo CSV debe contener las siguientes columnas: first_name, last_name, email, role.";

    #[test]
    fn test_well_formed_rows_all_accepted() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,john.doe@example.com,docente\n\
                   Jane,Smith,jane.smith@example.com,consultor";

        let report = parse_str(csv).unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.users.len(), 2);
        assert_eq!(
            report.users[0],
            UserRecord {
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john.doe@example.com".into(),
                role: "docente".into(),
            }
        );
        assert_eq!(
            report.users[1],
            UserRecord {
                first_name: "Jane".into(),
                last_name: "Smith".into(),
                email: "jane.smith@example.com".into(),
                role: "consultor".into(),
            }
        );
    }

    #[test]
    fn test_missing_header_column_rejects_whole_file() {
        let csv = "first_name,email\nJohn,john.doe@example.com";

        let err = parse_str(csv).unwrap_err();
        assert_eq!(err.to_string(), MISSING_COLUMNS_MSG);
    }

    #[test]
    fn test_missing_header_message_lists_full_set() {
        // Only `role` is absent, but the message still names all four
        let csv = "first_name,last_name,email\nJohn,Doe,j@x.com";

        let err = parse_str(csv).unwrap_err();
        assert_eq!(err.to_string(), MISSING_COLUMNS_MSG);
    }

    #[test]
    fn test_header_only_is_empty_success() {
        let report = parse_str("first_name,last_name,email,role\n").unwrap();
        assert!(report.users.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_missing_fields_become_row_errors() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,,docente\n\
                   Jane,,jane.smith@example.com,consultor";

        let report = parse_str(csv).unwrap();

        assert!(report.users.is_empty());
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("Falta el email en la fila 2"));
        assert!(report.errors[1].message.contains("Falta el apellido en la fila 3"));
    }

    #[test]
    fn test_bad_row_does_not_sink_the_batch() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,john@x.com,docente\n\
                   Jane,,jane@x.com,consultor\n\
                   Ana,Silva,ana@x.com,admin";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.users[1].first_name, "Ana");
    }

    #[test]
    fn test_first_missing_field_wins() {
        // Both email and last_name blank: email is first in check order
        let csv = "first_name,last_name,email,role\nJohn,,,docente";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("Falta el email en la fila 2"));
    }

    #[test]
    fn test_missing_first_name_and_role_labels() {
        let csv = "first_name,last_name,email,role\n\
                   ,Doe,john@x.com,docente\n\
                   Jane,Smith,jane@x.com,";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("Falta el nombre en la fila 2"));
        assert!(report.errors[1].message.contains("Falta el rol en la fila 3"));
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let csv = "first_name,last_name,email,role\nJohn,Doe,   ,docente";

        let report = parse_str(csv).unwrap();

        assert!(report.users.is_empty());
        assert!(report.errors[0].message.contains("Falta el email en la fila 2"));
    }

    #[test]
    fn test_values_are_trimmed_but_otherwise_verbatim() {
        let csv = "first_name,last_name,email,role\n  John , Doe , JOHN@X.COM , ADMIN ";

        let report = parse_str(csv).unwrap();

        let user = &report.users[0];
        assert_eq!(user.first_name, "John");
        assert_eq!(user.email, "JOHN@X.COM"); // no casing normalization
        assert_eq!(user.role, "ADMIN");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "role,email,first_name,last_name\ndocente,j@x.com,John,Doe";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users[0].first_name, "John");
        assert_eq!(report.users[0].role, "docente");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "first_name,last_name,email,role,rut\nJohn,Doe,j@x.com,docente,12.345.678-5";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users.len(), 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_quoted_values() {
        let csv = "first_name,last_name,email,role\n\"John \"\"JD\"\" Doe\",\"Smith, Jr.\",j@x.com,admin";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users[0].first_name, "John \"JD\" Doe");
        assert_eq!(report.users[0].last_name, "Smith, Jr.");
    }

    #[test]
    fn test_semicolon_delimiter_auto_detected() {
        let csv = "first_name;last_name;email;role\nJuan;Pérez;juan@colegio.cl;docente";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users[0].last_name, "Pérez");
    }

    #[test]
    fn test_blank_interior_line_does_not_shift_row_numbers() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,john@x.com,docente\n\
                   \n\
                   Jane,,jane@x.com,consultor";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users.len(), 1);
        assert_eq!(report.errors.len(), 1);
        // Jane is on file line 4, not data-index 3
        assert!(report.errors[0].message.contains("la fila 4"));
    }

    #[test]
    fn test_short_row_counts_as_missing_fields() {
        let csv = "first_name,last_name,email,role\nJohn,Doe";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("Falta el email en la fila 2"));
    }

    #[test]
    fn test_malformed_stream_is_fatal() {
        // Invalid UTF-8 mid-record aborts the whole batch, it is not a row error
        let mut bytes = b"first_name,last_name,email,role\nJohn,Doe,j@x.com,docente\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, b',', b'X', b',', b'j', b'@', b'x', b',', b'a']);

        let result = parse_users(&bytes[..], ',');
        assert!(matches!(
            result,
            Err(ImportError::Csv(CsvError::ParseError(_)))
        ));
    }

    #[test]
    fn test_empty_input_is_fatal() {
        assert!(matches!(
            parse_str(""),
            Err(ImportError::Csv(CsvError::EmptyFile))
        ));
        assert!(matches!(
            parse_str("   \n  "),
            Err(ImportError::Csv(CsvError::EmptyFile))
        ));
    }

    #[test]
    fn test_idempotent_parse() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,,docente\n\
                   Jane,Smith,jane@x.com,consultor";

        let first = parse_str(csv).unwrap();
        let second = parse_str(csv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_advisory_warnings_do_not_reject() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,not-an-email,docente\n\
                   Jane,Smith,jane@x.com,astronauta";

        let report = parse_str(csv).unwrap();

        assert_eq!(report.users.len(), 2);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].message.contains("Email inválido"));
        assert!(report.warnings[1].message.contains("Rol desconocido"));
    }

    #[test]
    fn test_parse_bytes_auto_metadata() {
        let csv = "first_name;last_name;email;role\nJuan;Perez;juan@colegio.cl;docente";

        let outcome = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(outcome.delimiter, ';');
        assert_eq!(outcome.encoding, "utf-8");
        assert_eq!(
            outcome.headers,
            vec!["first_name", "last_name", "email", "role"]
        );
        assert_eq!(outcome.report.users.len(), 1);
    }

    #[test]
    fn test_parse_file_auto() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "first_name,last_name,email,role\nJohn,Doe,john@x.com,docente"
        )
        .unwrap();

        let outcome = parse_file_auto(file.path()).unwrap();
        assert_eq!(outcome.report.users.len(), 1);
        assert_eq!(outcome.delimiter, ',');
    }

    #[test]
    fn test_summary_counts() {
        let csv = "first_name,last_name,email,role\n\
                   John,Doe,john@x.com,docente\n\
                   Jane,,jane@x.com,consultor";

        let report = parse_str(csv).unwrap();
        let summary = report.summary();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 1);
    }
}
