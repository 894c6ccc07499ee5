// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Numark Mixtrack Platinum FX
//!
//! Two physical decks that could be switched between four virtual decks,
//! 8 performance pads per deck in two banks, and two effect units.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator as _};

use crate::{ControllerDescriptor, DeviceDescriptor, MidiDeviceDescriptor};

pub mod codec;
pub use self::codec::{
    decode, decode_rate, decode_rate_hundredths, encode, encode_checked, encode_rate,
    DecodeError, DisplayKind, DisplayValue, EncodeError, Layout, BPM_LAYOUT, MAX_MAGNITUDE,
    MAX_RATE_HUNDREDTHS, RATE_LEN, TIME_LAYOUT,
};

mod control;
pub use self::control::{ControlKind, LogicalControl, UnknownControlError};

mod mapping;
pub use self::mapping::{
    ChannelMap, ChannelNoteBinding, MapError, ShiftBinding, ShiftBindings, ShiftableControl,
    Target, TargetBinding,
};

mod leds;
pub use self::leds::{LedState, LedTable};

mod output;
pub use self::output::{FaderCutMode, OutputGateway, RingType};

mod input;
pub use self::input::{decode_midi_input, Input, InputGateway};

mod controller;
pub use self::controller::MixtrackPlatinumFx;

pub const MIDI_DEVICE_DESCRIPTOR: &MidiDeviceDescriptor = &MidiDeviceDescriptor {
    device: DeviceDescriptor {
        vendor_name: Cow::Borrowed("Numark"),
        product_name: Cow::Borrowed("Mixtrack Platinum FX"),
    },
    port_name_prefix: "Mixtrack Platinum FX",
};

pub const DEVICE_DESCRIPTOR: &DeviceDescriptor = &MIDI_DEVICE_DESCRIPTOR.device;

#[allow(clippy::cast_possible_truncation)]
pub const CONTROLLER_DESCRIPTOR: &ControllerDescriptor = &ControllerDescriptor {
    num_decks: 2,
    num_virtual_decks: Deck::COUNT as u8,
    num_pads_per_deck: control::NUM_PADS,
    num_effect_units: control::NUM_EFFECT_UNITS,
};

/// Lit LED
pub const VELOCITY_ON: u8 = 0x7f;

/// Unlit LED that is still tracked by the device.
///
/// The device does not reliably turn off LEDs on Note-Off, i.e. LEDs
/// are turned off by a Note-On with this velocity.
pub const VELOCITY_OFF: u8 = 0x01;

/// No feedback at all.
pub const VELOCITY_EXTINGUISHED: u8 = 0x00;

const SYSEX_MANUFACTURER_ID: [u8; 3] = [0x00, 0x20, 0x7f];

const SYSEX_SHUTDOWN: u8 = 0x02;
const SYSEX_FADER_CUT_EIGHT: u8 = 0x03;
const SYSEX_FADER_CUT_FOUR: u8 = 0x13;

// Universal non-realtime message
const SYSEX_DEMO_MODE: [u8; 3] = [0x7e, 0x00, 0x06];
const DEMO_MODE_ENTER: u8 = 0x00;
const DEMO_MODE_EXIT: u8 = 0x01;

const MIDI_CHANNEL_EFFECT_UNIT_ONE: u8 = 0x08;
const MIDI_CHANNEL_EFFECT_UNIT_TWO: u8 = 0x09;

// Added to the deck number, not the deck index
const MIDI_CHANNEL_PAD_MODE_BASE: u8 = 0x03;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    Serialize,
    Deserialize,
)]
pub enum Deck {
    /// Left physical deck
    One,
    /// Right physical deck
    Two,
    /// Left virtual deck
    Three,
    /// Right virtual deck
    Four,
}

impl Deck {
    pub const PHYSICAL: [Self; 2] = [Self::One, Self::Two];

    /// 1-based number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.index() + 1
    }

    /// 0-based index
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::Four => 3,
        }
    }

    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        let deck = match number {
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::Four,
            _ => return None,
        };
        Some(deck)
    }

    /// The deck that sends on the given input channel.
    #[must_use]
    pub fn from_input_channel(channel: u8) -> Option<Self> {
        Self::iter().find(|deck| deck.input_channel() == channel)
    }

    /// Decks with LEDs on the device.
    #[must_use]
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::One | Self::Two)
    }

    /// Channel of the deck's buttons, rings, and displays.
    #[must_use]
    pub const fn input_channel(self) -> u8 {
        self.index()
    }

    /// Mixer group of the deck.
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::One => "[Channel1]",
            Self::Two => "[Channel2]",
            Self::Three => "[Channel3]",
            Self::Four => "[Channel4]",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PadMode {
    Hotcue,
    Autoloop,
    Fadercuts,
    Sample1,
    Sample2,
    Hotcue2,
    Beatjump,
    Autoloop2,
    Keyplay,
    Fadercuts2,
    Fadercuts3,
    Autoloop3,
    Stems,
}

impl PadMode {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Factory note of the mode button.
    #[must_use]
    pub const fn default_note(self) -> u8 {
        match self {
            Self::Hotcue => 0x00,
            Self::Beatjump => 0x01,
            Self::Hotcue2 => 0x02,
            Self::Fadercuts2 => 0x03,
            Self::Fadercuts3 => 0x04,
            Self::Autoloop3 => 0x05,
            Self::Stems => 0x06,
            Self::Fadercuts => 0x07,
            Self::Sample1 => 0x0b,
            Self::Keyplay => 0x0c,
            Self::Autoloop => 0x0d,
            Self::Autoloop2 => 0x0e,
            Self::Sample2 => 0x0f,
        }
    }
}

#[cfg(test)]
mod tests;
