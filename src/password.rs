//! Provisioning password generation.
//!
//! Imported users get an initial password when the file does not carry one.
//! Two flavors: a fully random password, and a "memorable" one seeded from
//! the person's name so support staff can read it over the phone. Both are
//! at least 8 characters and meant to be rotated on first login.

use rand::seq::SliceRandom;
use rand::Rng;

const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!#$%&*+-?";

/// Generate a random 12-character password with at least one character from
/// each class. Ambiguous glyphs (`l`, `I`, `O`, `0`, `1`) are excluded.
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();

    let mut chars: Vec<u8> = vec![
        *LOWER.choose(&mut rng).unwrap_or(&b'a'),
        *UPPER.choose(&mut rng).unwrap_or(&b'A'),
        *DIGITS.choose(&mut rng).unwrap_or(&b'2'),
        *SYMBOLS.choose(&mut rng).unwrap_or(&b'!'),
    ];

    let all: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
    while chars.len() < 12 {
        chars.push(*all.choose(&mut rng).unwrap_or(&b'x'));
    }
    chars.shuffle(&mut rng);

    String::from_utf8(chars).unwrap_or_else(|_| "Cambiar-Ahora-2024".to_string())
}

/// Generate a memorable password from a person's name.
///
/// Shape: `Nombre.Apellido.NNNN` with capitalized alphabetic fragments and a
/// 4-digit suffix. Falls back to [`generate_password`] when the names carry
/// no usable characters.
pub fn generate_memorable_password(first_name: &str, last_name: &str) -> String {
    let first = name_fragment(first_name);
    let last = name_fragment(last_name);

    if first.is_empty() && last.is_empty() {
        return generate_password();
    }

    let mut rng = rand::thread_rng();
    let suffix: u16 = rng.gen_range(1000..10000);

    let base = match (first.is_empty(), last.is_empty()) {
        (false, false) => format!("{}.{}", first, last),
        (false, true) => first,
        (true, false) => last,
        (true, true) => unreachable!(),
    };

    let password = format!("{}.{}", base, suffix);
    if password.len() >= 8 {
        password
    } else {
        // Very short names still need the length floor
        format!("{}.{}", password, rng.gen_range(1000..10000))
    }
}

/// Keep the leading alphabetic run of a name, capitalized, ASCII-folded.
fn name_fragment(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
