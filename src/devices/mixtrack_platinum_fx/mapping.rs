// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::collections::HashMap;

use strum::{EnumCount as _, IntoEnumIterator as _};
use thiserror::Error;

use super::{
    control::NUM_EFFECT_BUTTONS_PER_UNIT, ControlKind, Deck, LogicalControl, PadMode,
    MIDI_CHANNEL_EFFECT_UNIT_ONE, MIDI_CHANNEL_EFFECT_UNIT_TWO, MIDI_CHANNEL_PAD_MODE_BASE,
};
use crate::{
    config::{
        NUM_AUTOLOOP_NOTES, NUM_EFFECT_NOTES, NUM_HOTCUE_NOTES, NUM_LOOP_NOTES, NUM_PAD_NOTES,
    },
    Config, ConfigError, MixerConfig,
};

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("expected {expected} {name}, found {actual}")]
    NoteCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("missing note for pad mode {0}")]
    MissingPadMode(PadMode),
}

/// Wire address of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelNoteBinding {
    /// Channel of button presses.
    pub input_channel: u8,
    /// Channel of LED updates.
    pub output_channel: u8,
    pub note: u8,
}

fn note_array<const N: usize>(name: &'static str, notes: &[u8]) -> Result<[u8; N], MapError> {
    notes.try_into().map_err(|_| MapError::NoteCount {
        name,
        expected: N,
        actual: notes.len(),
    })
}

const fn nth_note(notes: &[u8], number: u8) -> u8 {
    // Numbers of valid controls start at 1
    notes[(number - 1) as usize]
}

/// Translates between controls and their wire addresses.
///
/// Immutable after construction and shared by all actors.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    channel_offset: u8,
    play: u8,
    sync: u8,
    cue: u8,
    bpm_up: u8,
    bpm_down: u8,
    keylock: u8,
    pfl_cue: u8,
    wheel_button: u8,
    slip: u8,
    deck_active: u8,
    rate_indicator: u8,
    shift: u8,
    hotcues: [u8; NUM_HOTCUE_NOTES],
    autoloops: [u8; NUM_AUTOLOOP_NOTES],
    loops: [u8; NUM_LOOP_NOTES],
    pad_modes: [u8; PadMode::COUNT],
    pads: [u8; NUM_PAD_NOTES],
    effects: [u8; NUM_EFFECT_NOTES],
    mixer: MixerConfig,
    // (input channel, note) -> control
    reverse: HashMap<(u8, u8), LogicalControl>,
}

impl ChannelMap {
    pub fn new(config: &Config) -> Result<Self, MapError> {
        config.validate()?;
        let led = &config.led;
        let mut pad_modes = [0; PadMode::COUNT];
        for mode in PadMode::iter() {
            let note = led
                .pad_mode_notes
                .get(&mode)
                .ok_or(MapError::MissingPadMode(mode))?;
            pad_modes[mode.index()] = *note;
        }
        let mut map = Self {
            channel_offset: led.channel_offset,
            play: led.play_note,
            sync: led.sync_note,
            cue: led.cue_note,
            bpm_up: led.bpm_up_note,
            bpm_down: led.bpm_down_note,
            keylock: led.keylock_note,
            pfl_cue: led.pfl_cue_note,
            wheel_button: led.wheel_button_note,
            slip: led.slip_note,
            deck_active: led.deck_active_note,
            rate_indicator: led.rate_display_note,
            shift: led.shift_note,
            hotcues: note_array("hotcue notes", &led.hotcue_notes)?,
            autoloops: note_array("autoloop notes", &led.autoloop_notes)?,
            loops: note_array("loop notes", &led.loop_notes)?,
            pad_modes,
            pads: note_array("pad notes", &led.pad_notes)?,
            effects: note_array("effect notes", &led.effect_notes)?,
            mixer: config.mixer.clone(),
            reverse: HashMap::new(),
        };
        map.reverse = map.build_reverse_lookup();
        Ok(map)
    }

    /// Physical decks take precedence over virtual decks on shared
    /// addresses, and earlier controls over later ones.
    fn build_reverse_lookup(&self) -> HashMap<(u8, u8), LogicalControl> {
        let mut reverse = HashMap::new();
        let controls = Deck::iter()
            .flat_map(LogicalControl::iter_deck)
            .chain(LogicalControl::iter_effect_unit_buttons());
        for control in controls {
            let ChannelNoteBinding {
                input_channel,
                note,
                ..
            } = self.resolve(control);
            match reverse.entry((input_channel, note)) {
                std::collections::hash_map::Entry::Occupied(entry) => {
                    log::debug!(
                        "{control:?} is shadowed by {shadowing:?} on channel {input_channel} note \
                         {note}",
                        shadowing = entry.get()
                    );
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(control);
                }
            }
        }
        reverse
    }

    #[must_use]
    pub const fn channel_offset(&self) -> u8 {
        self.channel_offset
    }

    /// Note of the shift button on the deck channels.
    #[must_use]
    pub const fn shift_note(&self) -> u8 {
        self.shift
    }

    #[must_use]
    pub const fn mixer(&self) -> &MixerConfig {
        &self.mixer
    }

    #[must_use]
    pub fn resolve(&self, control: LogicalControl) -> ChannelNoteBinding {
        let deck = control.deck();
        let kind = control.kind();
        let note = self.note(kind);
        match kind {
            // Fixed channels without an offset
            ControlKind::EffectUnitButton { unit, .. } => {
                let channel = if unit == 1 {
                    MIDI_CHANNEL_EFFECT_UNIT_ONE
                } else {
                    MIDI_CHANNEL_EFFECT_UNIT_TWO
                };
                ChannelNoteBinding {
                    input_channel: channel,
                    output_channel: channel,
                    note,
                }
            }
            ControlKind::PadModeButton(_) => {
                let channel = MIDI_CHANNEL_PAD_MODE_BASE + deck.number();
                ChannelNoteBinding {
                    input_channel: channel,
                    output_channel: channel,
                    note,
                }
            }
            // Pads send and receive on the LED channel
            ControlKind::Pad(_) => {
                let channel = deck.input_channel() + self.channel_offset;
                ChannelNoteBinding {
                    input_channel: channel,
                    output_channel: channel,
                    note,
                }
            }
            _ => {
                let input_channel = deck.input_channel();
                ChannelNoteBinding {
                    input_channel,
                    output_channel: input_channel + self.channel_offset,
                    note,
                }
            }
        }
    }

    const fn note(&self, kind: ControlKind) -> u8 {
        match kind {
            ControlKind::Play => self.play,
            ControlKind::Sync => self.sync,
            ControlKind::Cue => self.cue,
            ControlKind::BpmUp => self.bpm_up,
            ControlKind::BpmDown => self.bpm_down,
            ControlKind::Keylock => self.keylock,
            ControlKind::WheelButton => self.wheel_button,
            ControlKind::Slip => self.slip,
            ControlKind::PflCue => self.pfl_cue,
            ControlKind::DeckActive => self.deck_active,
            ControlKind::RateIndicator => self.rate_indicator,
            ControlKind::Hotcue(number) => nth_note(&self.hotcues, number),
            ControlKind::AutoLoop(number) => nth_note(&self.autoloops, number),
            ControlKind::Loop(number) => nth_note(&self.loops, number),
            ControlKind::PadModeButton(mode) => self.pad_modes[mode.index()],
            ControlKind::Pad(number) => nth_note(&self.pads, number),
            ControlKind::EffectUnitButton { unit, button } => {
                nth_note(
                    &self.effects,
                    (unit - 1) * NUM_EFFECT_BUTTONS_PER_UNIT + button,
                )
            }
        }
    }

    /// Find the control that sends on the given address.
    #[must_use]
    pub fn lookup(&self, input_channel: u8, note: u8) -> Option<LogicalControl> {
        self.reverse.get(&(input_channel, note)).copied()
    }

    /// The deck of a shift button.
    #[must_use]
    pub fn shift_deck(&self, input_channel: u8, note: u8) -> Option<Deck> {
        if note != self.shift {
            return None;
        }
        Deck::from_input_channel(input_channel)
    }

    /// Initial bindings of all shiftable controls.
    #[must_use]
    pub fn shift_bindings(&self) -> ShiftBindings {
        let cue_gain = ShiftBinding::new(
            TargetBinding {
                channel: self.mixer.channel,
                control: self.mixer.cue_gain_control,
                target: Target::HeadphoneGain,
            },
            TargetBinding {
                channel: self.mixer.channel,
                control: self.mixer.cue_mix_control,
                target: Target::HeadphoneMix,
            },
        );
        let pfl = [Deck::One, Deck::Two, Deck::Three, Deck::Four].map(|deck| {
            let channel = deck.input_channel();
            ShiftBinding::new(
                TargetBinding {
                    channel,
                    control: self.pfl_cue,
                    target: Target::Pfl(deck),
                },
                TargetBinding {
                    channel,
                    control: self.pfl_cue,
                    target: Target::SlipEnabled(deck),
                },
            )
        });
        ShiftBindings {
            cue_gain,
            pfl,
            shifted: [false; Deck::COUNT],
        }
    }
}

/// Mixer parameter that is controlled by a shiftable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    HeadphoneGain,
    HeadphoneMix,
    Pfl(Deck),
    SlipEnabled(Deck),
}

impl Target {
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::HeadphoneGain | Self::HeadphoneMix => "[Master]",
            Self::Pfl(deck) | Self::SlipEnabled(deck) => deck.group(),
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::HeadphoneGain => "headGain",
            Self::HeadphoneMix => "headMix",
            Self::Pfl(_) => "pfl",
            Self::SlipEnabled(_) => "slip_enabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBinding {
    pub channel: u8,
    /// Note or control number.
    pub control: u8,
    pub target: Target,
}

/// Two alternative bindings of the same control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftBinding {
    pub base: TargetBinding,
    pub shifted: TargetBinding,
    active: bool,
}

impl ShiftBinding {
    #[must_use]
    pub const fn new(base: TargetBinding, shifted: TargetBinding) -> Self {
        Self {
            base,
            shifted,
            active: false,
        }
    }

    /// `true` while the shifted binding is selected.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn current(&self) -> TargetBinding {
        if self.active {
            self.shifted
        } else {
            self.base
        }
    }

    /// Returns `true` if the selection changed.
    pub fn set_active(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }

    /// Matches both bindings.
    #[must_use]
    pub fn matches(&self, channel: u8, control: u8) -> bool {
        [self.base, self.shifted]
            .iter()
            .any(|binding| binding.channel == channel && binding.control == control)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftableControl {
    /// Shared by all decks.
    CueGainKnob,
    PflButton(Deck),
}

/// Current selection of all shiftable controls.
///
/// Owned by the input actor.
#[derive(Debug, Clone)]
pub struct ShiftBindings {
    cue_gain: ShiftBinding,
    pfl: [ShiftBinding; Deck::COUNT],
    shifted: [bool; Deck::COUNT],
}

impl ShiftBindings {
    /// Update the shift state of a deck.
    ///
    /// The cue gain knob is shifted while shift is held on any deck.
    pub fn set_shift(&mut self, deck: Deck, pressed: bool) {
        let index = usize::from(deck.index());
        self.shifted[index] = pressed;
        if self.pfl[index].set_active(pressed) {
            log::debug!(
                "PFL button of deck {deck} bound to {key}",
                key = self.pfl[index].current().target.key()
            );
        }
        let any_shifted = self.shifted.iter().any(|shifted| *shifted);
        if self.cue_gain.set_active(any_shifted) {
            log::debug!(
                "Cue gain knob bound to {key}",
                key = self.cue_gain.current().target.key()
            );
        }
    }

    #[must_use]
    pub fn is_shifted(&self, deck: Deck) -> bool {
        self.shifted[usize::from(deck.index())]
    }

    #[must_use]
    pub fn binding(&self, control: ShiftableControl) -> &ShiftBinding {
        match control {
            ShiftableControl::CueGainKnob => &self.cue_gain,
            ShiftableControl::PflButton(deck) => &self.pfl[usize::from(deck.index())],
        }
    }

    /// The currently selected binding.
    #[must_use]
    pub fn resolve(&self, control: ShiftableControl) -> TargetBinding {
        self.binding(control).current()
    }

    /// Find the shiftable control at the given address.
    #[must_use]
    pub fn lookup(&self, channel: u8, control: u8) -> Option<ShiftableControl> {
        if self.cue_gain.matches(channel, control) {
            return Some(ShiftableControl::CueGainKnob);
        }
        Deck::iter()
            .find(|deck| self.pfl[usize::from(deck.index())].matches(channel, control))
            .map(ShiftableControl::PflButton)
    }
}
