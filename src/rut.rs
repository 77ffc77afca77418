//! Chilean RUT validation and formatting.
//!
//! A RUT is a national identification number of the form `12.345.678-5`: a
//! body of digits plus a modulus-11 check digit (`0`-`9` or `K`). Imported
//! files carry them in every imaginable shape (with and without dots, lower
//! or upper case `k`), so validation normalizes first.

/// Compute the check digit for a RUT body.
///
/// Standard modulus 11: digits are weighted 2..7 cycling from the rightmost.
fn check_digit(body: u64) -> char {
    let mut sum: u64 = 0;
    let mut weight: u64 = 2;
    let mut rest = body;

    while rest > 0 {
        sum += (rest % 10) * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
        rest /= 10;
    }

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d as u32, 10).unwrap_or('0'),
    }
}

/// Split a raw RUT into its numeric body and verifier character.
///
/// Accepts `12.345.678-5`, `12345678-5` and `123456785`; dots and dashes are
/// cosmetic. Returns `None` when the shape is unusable.
fn split(raw: &str) -> Option<(u64, char)> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect();

    if cleaned.len() < 2 {
        return None;
    }

    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    let body: u64 = body.parse().ok()?;
    let dv = dv.chars().next()?.to_ascii_uppercase();

    if !dv.is_ascii_digit() && dv != 'K' {
        return None;
    }

    Some((body, dv))
}

/// Check that a RUT's verifier matches its body.
pub fn validate_rut(raw: &str) -> bool {
    match split(raw) {
        Some((body, dv)) => check_digit(body) == dv,
        None => false,
    }
}

/// Format a RUT canonically: thousands dots plus dash, `12.345.678-5`.
///
/// Returns the input trimmed and unchanged when it cannot be split.
pub fn format_rut(raw: &str) -> String {
    let Some((body, dv)) = split(raw) else {
        return raw.trim().to_string();
    };

    let digits = body.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        let remaining = digits.len() - i;
        grouped.push(c);
        if remaining > 1 && (remaining - 1) % 3 == 0 {
            grouped.push('.');
        }
    }

    format!("{}-{}", grouped, dv)
}
