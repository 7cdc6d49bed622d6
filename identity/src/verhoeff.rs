//! Verhoeff checksum over decimal digit strings.
//!
//! Built on the dihedral group D5: `D` is its multiplication table, `P` the
//! position-dependent permutation (applied `i mod 8` times), `INV` the
//! inverse of each element.

const D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

const P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 0, 7, 8, 6],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

const INV: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

/// Walk the tables over `digits` (least-significant first), starting the
/// permutation index at `offset`.
fn walk(digits: &[u8], offset: usize) -> u8 {
    digits
        .iter()
        .rev()
        .enumerate()
        .fold(0u8, |c, (i, &d)| {
            D[c as usize][P[(i + offset) % 8][d as usize] as usize]
        })
}

/// Whether a string of ASCII digits carries a valid trailing Verhoeff digit.
///
/// Returns `false` for empty input or any non-digit byte, so callers that
/// skipped format checks cannot index out of range.
pub fn verhoeff_valid(number: &str) -> bool {
    match to_digits(number) {
        Some(digits) if !digits.is_empty() => walk(&digits, 0) == 0,
        _ => false,
    }
}

/// Compute the Verhoeff check digit to append to `prefix`.
pub fn check_digit(prefix: &str) -> Option<u8> {
    let digits = to_digits(prefix)?;
    Some(INV[walk(&digits, 1) as usize])
}

fn to_digits(s: &str) -> Option<Vec<u8>> {
    s.bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}
