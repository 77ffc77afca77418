//! Encoding and delimiter auto-detection for uploaded CSV files.
//!
//! School administrations export user lists from whatever tool they have at
//! hand, so files arrive as UTF-8, Latin-1 or Windows-1252, delimited by
//! commas, semicolons, tabs or pipes. This module normalizes all of that to a
//! UTF-8 string plus a delimiter before any row is read. No user-import logic
//! here.

use crate::error::{CsvError, CsvResult};

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .or_else(|_| Ok(String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: try UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
    .map_err(|e: std::string::FromUtf8Error| CsvError::EncodingError(e.to_string()))
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Candidates are comma, semicolon, tab and pipe. Falls back to comma when
/// nothing wins, matching what every upload we see defaults to.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_comma() {
        let content = "first_name,last_name,email,role\nJohn,Doe,j@x.com,docente";
        assert_eq!(detect_delimiter(content), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        let content = "first_name;last_name;email;role\nJohn;Doe;j@x.com;docente";
        assert_eq!(detect_delimiter(content), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        let content = "a\tb\tc\n1\t2\t3";
        assert_eq!(detect_delimiter(content), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        let content = "a|b|c\n1|2|3";
        assert_eq!(detect_delimiter(content), '|');
    }

    #[test]
    fn test_detect_delimiter_defaults_to_comma() {
        let content = "justonecolumn\nvalue";
        assert_eq!(detect_delimiter(content), ',');
    }

    #[test]
    fn test_detect_encoding_ascii_normalizes_to_utf8() {
        let encoding = detect_encoding(b"first_name,last_name\nJohn,Doe");
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Muñoz" in ISO-8859-1
        let bytes: &[u8] = &[0x4D, 0x75, 0xF1, 0x6F, 0x7A];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Mu"));
        assert!(decoded.ends_with("oz"));
    }

    #[test]
    fn test_lossy_fallback_for_unknown_encoding() {
        let decoded = decode_content(b"plain ascii", "koi8-r").unwrap();
        assert_eq!(decoded, "plain ascii");
    }
}
