// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Framing of outbound and parsing of inbound MIDI messages.

use crate::{MidiSink, OutputResult};

pub(crate) const STATUS_NOTE_OFF: u8 = 0x80;
pub(crate) const STATUS_NOTE_ON: u8 = 0x90;
pub(crate) const STATUS_CONTROL_CHANGE: u8 = 0xb0;

pub(crate) const SYSEX_START: u8 = 0xf0;
pub(crate) const SYSEX_END: u8 = 0xf7;

const MAX_CHANNEL: u8 = 0x0f;
const MAX_U7: u8 = 0x7f;

/// Saturate a data byte at 127.
#[must_use]
pub const fn clamp_u7(value: u8) -> u8 {
    if value > MAX_U7 {
        MAX_U7
    } else {
        value
    }
}

/// Convert an arbitrary integer into a data byte by saturating at 0 and 127.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturating_u7(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_U7)) as u8
}

const fn clamp_channel(channel: u8) -> u8 {
    if channel > MAX_CHANNEL {
        MAX_CHANNEL
    } else {
        channel
    }
}

/// Outbound MIDI message
///
/// All values are clamped into their valid ranges when the message is
/// framed, i.e. channels saturate at 15 and data bytes at 127.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    /// The release velocity is always sent as 0.
    NoteOff {
        channel: u8,
        note: u8,
    },
    ControlChange {
        channel: u8,
        control: u8,
        value: u8,
    },
    /// System exclusive payload without the framing bytes `F0` and `F7`.
    SysEx(Vec<u8>),
}

impl MidiMessage {
    #[must_use]
    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::NoteOn {
            channel,
            note,
            velocity,
        }
    }

    #[must_use]
    pub const fn note_off(channel: u8, note: u8) -> Self {
        Self::NoteOff { channel, note }
    }

    #[must_use]
    pub const fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::ControlChange {
            channel,
            control,
            value,
        }
    }

    #[must_use]
    pub fn sysex(payload: impl Into<Vec<u8>>) -> Self {
        Self::SysEx(payload.into())
    }

    /// Status byte and data bytes of a channel message.
    ///
    /// Returns `None` for system exclusive messages.
    #[must_use]
    pub const fn short_bytes(&self) -> Option<[u8; 3]> {
        let bytes = match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => [
                STATUS_NOTE_ON | clamp_channel(channel),
                clamp_u7(note),
                clamp_u7(velocity),
            ],
            Self::NoteOff { channel, note } => {
                [STATUS_NOTE_OFF | clamp_channel(channel), clamp_u7(note), 0]
            }
            Self::ControlChange {
                channel,
                control,
                value,
            } => [
                STATUS_CONTROL_CHANGE | clamp_channel(channel),
                clamp_u7(control),
                clamp_u7(value),
            ],
            Self::SysEx(_) => return None,
        };
        Some(bytes)
    }

    /// The complete message as it appears on the wire.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::SysEx(payload) => sysex_frame(payload),
            _ => self.short_bytes().map(Vec::from).unwrap_or_default(),
        }
    }

    pub fn send_to<S>(&self, sink: &mut S) -> OutputResult<()>
    where
        S: MidiSink + ?Sized,
    {
        if let Some([status, data1, data2]) = self.short_bytes() {
            log::trace!("Sending MIDI output: {:02x?}", [status, data1, data2]);
            return sink.send_short(status, data1, data2);
        }
        let frame = self.to_bytes();
        log::trace!("Sending MIDI output: {frame:02x?}");
        sink.send_sysex(&frame)
    }
}

fn sysex_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.push(SYSEX_START);
    frame.extend(payload.iter().map(|byte| byte & MAX_U7));
    frame.push(SYSEX_END);
    frame
}

/// Inbound channel message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    ControlChange {
        channel: u8,
        control: u8,
        value: u8,
    },
}

impl ShortMessage {
    /// Parse a 3-byte channel message.
    ///
    /// Returns `None` for all other messages, including running status.
    #[must_use]
    pub fn try_from_bytes(input: &[u8]) -> Option<Self> {
        let [status, data1, data2] = *input else {
            return None;
        };
        if data1 > MAX_U7 || data2 > MAX_U7 {
            return None;
        }
        let channel = status & MAX_CHANNEL;
        let parsed = match status & 0xf0 {
            STATUS_NOTE_OFF => Self::NoteOff {
                channel,
                note: data1,
                velocity: data2,
            },
            STATUS_NOTE_ON => Self::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            STATUS_CONTROL_CHANGE => Self::ControlChange {
                channel,
                control: data1,
                value: data2,
            },
            _ => return None,
        };
        Some(parsed)
    }

    #[must_use]
    pub const fn channel(self) -> u8 {
        match self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. } => channel,
        }
    }
}
