// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Pitch rate telemetry.
//!
//! A sign byte followed by the decimal digits of the rate in hundredths
//! of a percent. Rates beyond the display range are shown with a fixed
//! saturation pattern.

use super::{
    numeric::{SIGN_NEGATIVE, SIGN_POSITIVE},
    DecodeError,
};

/// Largest displayable rate in hundredths of a percent.
pub const MAX_RATE_HUNDREDTHS: i32 = 1590;

const NUM_DIGITS: usize = 5;

/// Encoded length including the sign byte.
pub const RATE_LEN: usize = NUM_DIGITS + 1;

const SATURATED_DIGITS: [u8; NUM_DIGITS] = [0x0f, 0x0f, 0x0f, 0x0f, 0x0d];

/// Encode the rate in hundredths of a percent.
///
/// Every magnitude of at least [`MAX_RATE_HUNDREDTHS`] saturates to the
/// 15.9% pattern, even though 5 digits could represent up to 99999.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_rate(rate_hundredths: i32) -> [u8; RATE_LEN] {
    let mut bytes = [0; RATE_LEN];
    bytes[0] = if rate_hundredths < 0 {
        SIGN_NEGATIVE
    } else {
        SIGN_POSITIVE
    };
    let magnitude = rate_hundredths.unsigned_abs();
    if magnitude >= MAX_RATE_HUNDREDTHS.unsigned_abs() {
        bytes[1..].copy_from_slice(&SATURATED_DIGITS);
        return bytes;
    }
    let mut remainder = magnitude;
    for digit in bytes[1..].iter_mut().rev() {
        *digit = (remainder % 10) as u8;
        remainder /= 10;
    }
    bytes
}

/// Decode the rate in hundredths of a percent.
pub fn decode_rate_hundredths(bytes: &[u8]) -> Result<i32, DecodeError> {
    let Some((sign, digits)) = bytes.split_first().filter(|_| bytes.len() == RATE_LEN) else {
        return Err(DecodeError::LengthMismatch {
            expected: RATE_LEN,
            actual: bytes.len(),
        });
    };
    let negative = match *sign {
        SIGN_NEGATIVE => true,
        SIGN_POSITIVE => false,
        found => return Err(DecodeError::MissingSignMarker { found }),
    };
    let magnitude = if digits == SATURATED_DIGITS {
        MAX_RATE_HUNDREDTHS
    } else {
        let mut magnitude = 0;
        for (index, &value) in digits.iter().enumerate() {
            if value > 9 {
                return Err(DecodeError::InvalidDigit {
                    index: index + 1,
                    value,
                });
            }
            magnitude = magnitude * 10 + i32::from(value);
        }
        magnitude
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// Decode the rate as a percentage.
pub fn decode_rate(bytes: &[u8]) -> Result<f64, DecodeError> {
    decode_rate_hundredths(bytes).map(|hundredths| f64::from(hundredths) / 100.0)
}
