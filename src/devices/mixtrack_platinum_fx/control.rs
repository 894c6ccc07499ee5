// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use strum::IntoEnumIterator as _;
use thiserror::Error;

use super::{Deck, PadMode};

pub(super) const NUM_HOTCUES: u8 = 8;
pub(super) const NUM_AUTOLOOPS: u8 = 8;
pub(super) const NUM_LOOPS: u8 = 6;
pub(super) const NUM_PADS: u8 = 16;
pub(super) const NUM_EFFECT_UNITS: u8 = 2;
pub(super) const NUM_EFFECT_BUTTONS_PER_UNIT: u8 = 3;

/// Addressable button or LED, independent of the wire encoding.
///
/// Numbering of hot cues, loops, pads, effect units and their buttons
/// is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlKind {
    Play,
    Sync,
    Cue,
    Hotcue(u8),
    AutoLoop(u8),
    Loop(u8),
    PadModeButton(PadMode),
    EffectUnitButton { unit: u8, button: u8 },
    BpmUp,
    BpmDown,
    Keylock,
    WheelButton,
    Slip,
    PflCue,
    DeckActive,
    RateIndicator,
    Pad(u8),
}

impl ControlKind {
    /// Controls with a single LED per deck.
    pub const BASIC: [Self; 11] = [
        Self::Play,
        Self::Sync,
        Self::Cue,
        Self::BpmUp,
        Self::BpmDown,
        Self::Keylock,
        Self::WheelButton,
        Self::Slip,
        Self::PflCue,
        Self::DeckActive,
        Self::RateIndicator,
    ];

    #[must_use]
    pub const fn is_valid(self) -> bool {
        match self {
            Self::Hotcue(number) => in_range(number, NUM_HOTCUES),
            Self::AutoLoop(number) => in_range(number, NUM_AUTOLOOPS),
            Self::Loop(number) => in_range(number, NUM_LOOPS),
            Self::Pad(number) => in_range(number, NUM_PADS),
            Self::EffectUnitButton { unit, button } => {
                in_range(unit, NUM_EFFECT_UNITS) && in_range(button, NUM_EFFECT_BUTTONS_PER_UNIT)
            }
            Self::Play
            | Self::Sync
            | Self::Cue
            | Self::PadModeButton(_)
            | Self::BpmUp
            | Self::BpmDown
            | Self::Keylock
            | Self::WheelButton
            | Self::Slip
            | Self::PflCue
            | Self::DeckActive
            | Self::RateIndicator => true,
        }
    }

    /// All valid kinds, effect unit buttons included.
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::BASIC
            .into_iter()
            .chain((1..=NUM_HOTCUES).map(Self::Hotcue))
            .chain((1..=NUM_AUTOLOOPS).map(Self::AutoLoop))
            .chain((1..=NUM_LOOPS).map(Self::Loop))
            .chain(PadMode::iter().map(Self::PadModeButton))
            .chain((1..=NUM_PADS).map(Self::Pad))
            .chain(effect_unit_buttons())
    }
}

const fn in_range(number: u8, count: u8) -> bool {
    number >= 1 && number <= count
}

fn effect_unit_buttons() -> impl Iterator<Item = ControlKind> {
    (1..=NUM_EFFECT_UNITS).flat_map(|unit| {
        (1..=NUM_EFFECT_BUTTONS_PER_UNIT)
            .map(move |button| ControlKind::EffectUnitButton { unit, button })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown control {kind:?} on deck {deck}")]
pub struct UnknownControlError {
    pub deck: Deck,
    pub kind: ControlKind,
}

/// Stable lookup key of a control.
///
/// Effect units are not bound to a deck. Their buttons are keyed by the
/// deck with the same number as the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalControl {
    deck: Deck,
    kind: ControlKind,
}

impl LogicalControl {
    pub fn new(deck: Deck, kind: ControlKind) -> Result<Self, UnknownControlError> {
        if !kind.is_valid() {
            return Err(UnknownControlError { deck, kind });
        }
        let deck = match kind {
            ControlKind::EffectUnitButton { unit, .. } => {
                Deck::from_number(unit).ok_or(UnknownControlError { deck, kind })?
            }
            _ => deck,
        };
        Ok(Self { deck, kind })
    }

    pub fn effect_unit_button(unit: u8, button: u8) -> Result<Self, UnknownControlError> {
        Self::new(Deck::One, ControlKind::EffectUnitButton { unit, button })
    }

    #[must_use]
    pub const fn deck(self) -> Deck {
        self.deck
    }

    #[must_use]
    pub const fn kind(self) -> ControlKind {
        self.kind
    }

    /// All controls of a deck, excluding effect unit buttons.
    pub fn iter_deck(deck: Deck) -> impl Iterator<Item = Self> {
        ControlKind::iter()
            .filter(|kind| !matches!(kind, ControlKind::EffectUnitButton { .. }))
            .map(move |kind| Self { deck, kind })
    }

    pub fn iter_effect_unit_buttons() -> impl Iterator<Item = Self> {
        effect_unit_buttons().filter_map(|kind| Self::new(Deck::One, kind).ok())
    }
}
