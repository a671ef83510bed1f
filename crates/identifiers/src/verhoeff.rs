//! Verhoeff check digits.
//!
//! The scheme works in the dihedral group D5. Digits are consumed from the least significant
//! end; the digit at position `i` is first permuted by `PERMUTATION[i % 8]` and then combined
//! into the running check with `DIHEDRAL`.
//!
//! - Computing a check digit counts positions from 1, because the digit about to be appended
//!   will occupy position 0.
//! - Verifying counts from 0 over the whole string, check digit included, and succeeds when the
//!   running check ends at 0.

use crate::{IdentifierError, IdentifierResult};

/// Multiplication table of D5.
const DIHEDRAL: [[u8; 10]; 10] = [
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

/// Position-dependent permutations; row `i` is row 1 applied `i` times.
const PERMUTATION: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Inverse of each element of D5.
const INVERSE: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

/// Computes the check digit to append to `digits`.
///
/// # Errors
///
/// Returns [`IdentifierError::InvalidInput`] if `digits` is empty or contains anything other
/// than ASCII decimal digits.
pub fn compute_check_digit(digits: &str) -> IdentifierResult<u8> {
    let values = decimal_digits(digits)?;
    Ok(INVERSE[usize::from(accumulate(&values, 1))])
}

/// Returns `digits` with its check digit appended.
///
/// # Errors
///
/// Returns [`IdentifierError::InvalidInput`] under the same conditions as
/// [`compute_check_digit`].
pub fn append_check_digit(digits: &str) -> IdentifierResult<String> {
    let check = compute_check_digit(digits)?;
    Ok(format!("{}{}", digits, check))
}

/// Returns `true` if the last digit of `digits` is the correct check digit for the rest.
///
/// Empty or non-decimal input is reported as invalid rather than as an error.
pub fn verify(digits: &str) -> bool {
    match decimal_digits(digits) {
        Ok(values) => accumulate(&values, 0) == 0,
        Err(_) => false,
    }
}

fn accumulate(values: &[u8], first_position: usize) -> u8 {
    values
        .iter()
        .rev()
        .enumerate()
        .fold(0u8, |check, (i, &digit)| {
            let permuted = PERMUTATION[(i + first_position) % 8][usize::from(digit)];
            DIHEDRAL[usize::from(check)][usize::from(permuted)]
        })
}

fn decimal_digits(text: &str) -> IdentifierResult<Vec<u8>> {
    if text.is_empty() {
        return Err(IdentifierError::InvalidInput(
            "check digit input cannot be empty".into(),
        ));
    }
    text.bytes()
        .map(|b| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(IdentifierError::InvalidInput(format!(
                    "check digit input must be decimal digits, got: '{}'",
                    text
                )))
            }
        })
        .collect()
}
