// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Payload codecs of the jog wheel displays.

use strum::{Display, EnumIter};
use thiserror::Error;

use super::{Deck, SYSEX_MANUFACTURER_ID};
use crate::MidiMessage;

mod numeric;
pub use self::numeric::{
    decode, encode, encode_checked, Layout, BPM_LAYOUT, MAX_MAGNITUDE, TIME_LAYOUT,
};

mod rate;
pub use self::rate::{
    decode_rate, decode_rate_hundredths, encode_rate, MAX_RATE_HUNDREDTHS, RATE_LEN,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("magnitude of {value} exceeds {max}")]
    OutOfRange { value: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} bytes, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("expected sign marker, found {found:#04x}")]
    MissingSignMarker { found: u8 },
    #[error("invalid nibble {value:#04x} at index {index}")]
    InvalidNibble { index: usize, value: u8 },
    #[error("invalid decimal digit {value:#04x} at index {index}")]
    InvalidDigit { index: usize, value: u8 },
    #[error("magnitude {magnitude:#x} exceeds {max:#x}")]
    Overflow { magnitude: i64, max: i64 },
}

/// Type of a jog wheel display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum DisplayKind {
    Bpm = 0x01,
    Rate = 0x02,
    Duration = 0x03,
    Time = 0x04,
}

impl DisplayKind {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Value for a display field before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayValue {
    pub deck: Deck,
    pub kind: DisplayKind,
    /// BPM and rate in hundredths, time and duration in milliseconds.
    pub raw: i64,
}

impl DisplayValue {
    /// Fractions of hundredths are truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bpm(deck: Deck, bpm: f64) -> Self {
        Self {
            deck,
            kind: DisplayKind::Bpm,
            // Saturating cast
            raw: (bpm * 100.0).trunc() as i64,
        }
    }

    /// Rounded to hundredths of a percent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rate(deck: Deck, percent: f64) -> Self {
        Self {
            deck,
            kind: DisplayKind::Rate,
            raw: (percent * 100.0).round() as i64,
        }
    }

    #[must_use]
    pub const fn time(deck: Deck, millis: i64) -> Self {
        Self {
            deck,
            kind: DisplayKind::Time,
            raw: millis,
        }
    }

    #[must_use]
    pub const fn duration(deck: Deck, millis: i64) -> Self {
        Self {
            deck,
            kind: DisplayKind::Duration,
            raw: millis,
        }
    }

    /// Encoded data bytes of the field.
    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        match self.kind {
            DisplayKind::Bpm => BPM_LAYOUT.encode(self.raw),
            DisplayKind::Time | DisplayKind::Duration => TIME_LAYOUT.encode(self.raw),
            DisplayKind::Rate => {
                #[allow(clippy::cast_possible_truncation)]
                let hundredths = self
                    .raw
                    .clamp(i64::from(i32::MIN), i64::from(i32::MAX))
                    as i32;
                encode_rate(hundredths).to_vec()
            }
        }
    }

    /// The complete display update.
    #[must_use]
    pub fn to_message(&self) -> MidiMessage {
        let payload = self.payload();
        let mut data = Vec::with_capacity(SYSEX_MANUFACTURER_ID.len() + 2 + payload.len());
        data.extend_from_slice(&SYSEX_MANUFACTURER_ID);
        data.push(self.deck.number());
        data.push(self.kind.code());
        data.extend(payload);
        MidiMessage::SysEx(data)
    }
}
