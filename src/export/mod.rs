//! CSV export, display formatting and sample data generation.
//!
//! Accepted users can be written back out as CSV (for the operator to keep,
//! or to feed the provisioning step). Exported cells pass through a formula
//! sanitizer first: spreadsheet apps execute cells starting with `=`, `+`,
//! `-` or `@`, which turns a hostile "name" in an upload into code execution
//! on the admin's machine when they open the export.

use crate::error::{CsvError, CsvResult};
use crate::models::UserRecord;

/// Neutralize spreadsheet formula injection in one cell.
///
/// Cells starting with `=`, `+`, `-`, `@`, tab or CR get a leading `'`,
/// which spreadsheet apps render as literal text. Embedded line breaks are
/// collapsed to spaces so a cell cannot fabricate extra rows.
pub fn sanitize_cell(value: &str) -> String {
    if matches!(
        value.chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@') | Some('\t') | Some('\r')
    ) {
        return format!("'{}", value);
    }

    if value.contains('\n') || value.contains('\r') {
        let mut out = String::with_capacity(value.len());
        let mut last_was_break = false;
        for c in value.chars() {
            if c == '\n' || c == '\r' {
                if !last_was_break {
                    out.push(' ');
                }
                last_was_break = true;
            } else {
                out.push(c);
                last_was_break = false;
            }
        }
        return out;
    }

    value.to_string()
}

/// Serialize accepted users back to CSV, sanitized, with the canonical
/// header line.
pub fn users_to_csv(users: &[UserRecord]) -> CsvResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["first_name", "last_name", "email", "role"])?;
    for user in users {
        wtr.write_record([
            sanitize_cell(&user.first_name),
            sanitize_cell(&user.last_name),
            sanitize_cell(&user.email),
            sanitize_cell(&user.role),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| CsvError::ParseError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::EncodingError(e.to_string()))
}

/// Render users as a padded text table for terminal display.
pub fn format_table(users: &[UserRecord]) -> String {
    const HEADERS: [&str; 4] = ["Nombre", "Apellido", "Email", "Rol"];
    const MAX_WIDTH: usize = 30;

    let rows: Vec<[&str; 4]> = users
        .iter()
        .map(|u| {
            [
                u.first_name.as_str(),
                u.last_name.as_str(),
                u.email.as_str(),
                u.role.as_str(),
            ]
        })
        .collect();

    let widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let cell_max = rows.iter().map(|r| r[i].chars().count()).max().unwrap_or(0);
            (h.chars().count().max(cell_max) + 2).min(MAX_WIDTH)
        })
        .collect();

    let pad = |s: &str, w: usize| {
        let len = s.chars().count();
        if len >= w {
            s.to_string()
        } else {
            format!("{}{}", s, " ".repeat(w - len))
        }
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        HEADERS
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect::<Vec<_>>()
            .join("|"),
    );
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("|"),
    );
    for row in &rows {
        lines.push(
            row.iter()
                .zip(&widths)
                .map(|(c, w)| pad(c, *w))
                .collect::<Vec<_>>()
                .join("|"),
        );
    }

    lines.join("\n")
}

/// Generate a sample CSV for operator testing.
///
/// The first user is an admin, the rest are teachers; the first three rows
/// carry valid test RUTs in an extra column (extra columns are ignored by the
/// importer).
pub fn sample_csv(count: usize) -> String {
    const TEST_RUTS: [&str; 3] = ["11.111.111-1", "12.345.678-5", "5.126.663-3"];

    let mut rows = vec!["first_name,last_name,email,role,rut".to_string()];

    for i in 1..=count {
        let role = if i == 1 { "admin" } else { "docente" };
        let rut = TEST_RUTS.get(i - 1).copied().unwrap_or("");
        rows.push(format!(
            "Nombre{i},Apellido{i},usuario{i}@ejemplo.cl,{role},{rut}"
        ));
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rut;

    fn user(first: &str, last: &str, email: &str, role: &str) -> UserRecord {
        UserRecord {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    #[test]
    fn test_sanitize_formula_prefixes() {
        assert_eq!(sanitize_cell("=SUM(A1:A10)"), "'=SUM(A1:A10)");
        assert_eq!(sanitize_cell("+cmd"), "'+cmd");
        assert_eq!(sanitize_cell("-2+5"), "'-2+5");
        assert_eq!(sanitize_cell("@SUM(A1:A10)"), "'@SUM(A1:A10)");
        assert_eq!(sanitize_cell("\tSUM(A1:A10)"), "'\tSUM(A1:A10)");
        assert_eq!(sanitize_cell("\rSUM(A1:A10)"), "'\rSUM(A1:A10)");
    }

    #[test]
    fn test_sanitize_complex_formula_attack() {
        assert_eq!(sanitize_cell("=cmd|'/c calc'!A0"), "'=cmd|'/c calc'!A0");
    }

    #[test]
    fn test_sanitize_collapses_embedded_newlines() {
        assert_eq!(sanitize_cell("línea1\nlínea2"), "línea1 línea2");
        assert_eq!(sanitize_cell("a\r\n\r\nb"), "a b");
    }

    #[test]
    fn test_sanitize_leaves_normal_values_alone() {
        assert_eq!(sanitize_cell("María José"), "María José");
        assert_eq!(sanitize_cell("juan@colegio.cl"), "juan@colegio.cl");
    }

    #[test]
    fn test_users_to_csv_roundtrips_through_importer() {
        let users = vec![
            user("John", "Doe", "john@test.com", "admin"),
            user("Jane", "Smith, Jr.", "jane@test.com", "docente"),
        ];

        let csv = users_to_csv(&users).unwrap();
        assert!(csv.starts_with("first_name,last_name,email,role"));
        // The comma-bearing surname must come back quoted
        assert!(csv.contains("\"Smith, Jr.\""));

        let report = crate::import::parse_str(&csv).unwrap();
        assert_eq!(report.users, users);
    }

    #[test]
    fn test_exported_formula_cells_are_sanitized() {
        let users = vec![user("=SUM(A1:A10)", "Normal", "x@y.com", "docente")];
        let csv = users_to_csv(&users).unwrap();
        assert!(csv.contains("'=SUM(A1:A10)"));
    }

    #[test]
    fn test_format_table_has_all_rows() {
        let users = vec![
            user("John", "Doe", "john@test.com", "admin"),
            user("Jane", "Smith", "jane@test.com", "docente"),
        ];

        let table = format_table(&users);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4); // header + separator + 2 rows
        assert!(lines[0].contains("Email"));
        assert!(lines[2].contains("john@test.com"));
    }

    #[test]
    fn test_sample_csv_is_importable() {
        let sample = sample_csv(5);
        let report = crate::import::parse_str(&sample).unwrap();

        assert_eq!(report.users.len(), 5);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.users[0].role, "admin");
        assert_eq!(report.users[4].role, "docente");
    }

    #[test]
    fn test_sample_ruts_are_valid() {
        let sample = sample_csv(3);
        for line in sample.lines().skip(1) {
            let rut = line.rsplit(',').next().unwrap();
            assert!(rut::validate_rut(rut), "invalid sample rut: {}", rut);
        }
    }

    #[test]
    fn test_sample_zero_is_header_only() {
        let sample = sample_csv(0);
        let report = crate::import::parse_str(&sample).unwrap();
        assert!(report.users.is_empty());
        assert!(report.errors.is_empty());
    }
}
