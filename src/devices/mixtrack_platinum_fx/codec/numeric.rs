// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Nibble layout of numbers shown on the jog wheel displays.
//!
//! The magnitude is split into 8 nibbles, most significant first. Leading
//! nibbles might be dropped and the first remaining byte might be replaced
//! by a sign marker. The sign is never encoded as two's complement.

use super::{DecodeError, EncodeError};

/// Largest magnitude with 7 nibbles.
pub const MAX_MAGNITUDE: i64 = 0x0fff_ffff;

pub(super) const SIGN_NEGATIVE: u8 = 0x07;
pub(super) const SIGN_POSITIVE: u8 = 0x08;

const NUM_NIBBLES: usize = 8;
const MAX_NIBBLE: u8 = 0x0f;

/// Parameters of the nibble layout.
///
/// Decoding requires the same layout that has been used for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Number of leading nibbles that are omitted.
    pub drop: u8,
    /// Omit the sign marker.
    pub unsigned: bool,
}

/// BPM display: 6 unsigned nibbles
pub const BPM_LAYOUT: Layout = Layout {
    drop: 2,
    unsigned: true,
};

/// Time and duration displays: sign marker followed by 7 nibbles
pub const TIME_LAYOUT: Layout = Layout {
    drop: 0,
    unsigned: false,
};

impl Layout {
    /// Number of encoded bytes.
    #[must_use]
    pub fn len(self) -> usize {
        NUM_NIBBLES - usize::from(self.drop).min(NUM_NIBBLES)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Largest magnitude that survives encoding with this layout.
    #[must_use]
    pub fn max_magnitude(self) -> i64 {
        let num_data_nibbles = if self.unsigned {
            self.len()
        } else {
            self.len().saturating_sub(1)
        };
        // At most 7 nibbles
        let bits = 4 * num_data_nibbles.min(NUM_NIBBLES - 1);
        (1_i64 << bits) - 1
    }

    #[must_use]
    pub fn encode(self, value: i64) -> Vec<u8> {
        encode(value, self.drop, self.unsigned)
    }

    pub fn decode(self, bytes: &[u8]) -> Result<i64, DecodeError> {
        decode(bytes, self.drop, self.unsigned)
    }
}

/// Encode a number.
///
/// The magnitude saturates at [`MAX_MAGNITUDE`]. Nibbles that are dropped
/// or overwritten by the sign marker are lost silently, use
/// [`encode_checked()`] for detecting this.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode(value: i64, drop: u8, unsigned: bool) -> Vec<u8> {
    let magnitude = value.unsigned_abs();
    let clamped = magnitude.min(MAX_MAGNITUDE.unsigned_abs());
    if clamped < magnitude {
        log::debug!("Clamping {value} to the maximum display magnitude {MAX_MAGNITUDE}");
    }
    let drop = usize::from(drop).min(NUM_NIBBLES);
    let mut bytes = (0..NUM_NIBBLES)
        .skip(drop)
        .map(|index| {
            let shift = 4 * (NUM_NIBBLES - 1 - index);
            ((clamped >> shift) & u64::from(MAX_NIBBLE)) as u8
        })
        .collect::<Vec<_>>();
    if !unsigned {
        if let Some(first) = bytes.first_mut() {
            *first = if value < 0 {
                SIGN_NEGATIVE
            } else {
                SIGN_POSITIVE
            };
        }
    }
    for byte in &mut bytes {
        *byte &= 0x7f;
    }
    bytes
}

/// Encode a number without losing information.
pub fn encode_checked(value: i64, drop: u8, unsigned: bool) -> Result<Vec<u8>, EncodeError> {
    let layout = Layout { drop, unsigned };
    let max = layout.max_magnitude();
    if value.unsigned_abs() > max.unsigned_abs() || (unsigned && value < 0) {
        return Err(EncodeError::OutOfRange { value, max });
    }
    Ok(encode(value, drop, unsigned))
}

/// Decode a number.
///
/// `drop` and `unsigned` must match the parameters used for encoding.
/// Magnitudes above [`MAX_MAGNITUDE`] are rejected, a non-zero leading
/// nibble can only occur for unsigned layouts without dropped nibbles.
pub fn decode(bytes: &[u8], drop: u8, unsigned: bool) -> Result<i64, DecodeError> {
    let layout = Layout { drop, unsigned };
    let expected = layout.len();
    if bytes.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    let (negative, data_start) = match (unsigned, bytes.first()) {
        (true, _) | (false, None) => (false, 0),
        (false, Some(&SIGN_NEGATIVE)) => (true, 1),
        (false, Some(&SIGN_POSITIVE)) => (false, 1),
        (false, Some(&found)) => return Err(DecodeError::MissingSignMarker { found }),
    };
    let mut magnitude = 0_i64;
    for (index, &value) in bytes.iter().enumerate().skip(data_start) {
        if value > MAX_NIBBLE {
            return Err(DecodeError::InvalidNibble { index, value });
        }
        magnitude = (magnitude << 4) | i64::from(value);
    }
    if magnitude > MAX_MAGNITUDE {
        return Err(DecodeError::Overflow {
            magnitude,
            max: MAX_MAGNITUDE,
        });
    }
    Ok(if negative { -magnitude } else { magnitude })
}
