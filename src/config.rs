// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! JSON configuration
//!
//! All fields are optional. Missing fields keep their defaults, i.e. a
//! partial file only overrides what it names.

use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator as _;
use thiserror::Error;

use crate::devices::mixtrack_platinum_fx::PadMode;

const MAX_U7: u8 = 0x7f;
const MAX_CHANNEL: u8 = 0x0f;

// Deck channels 0..=3 are shifted by the offset
const MAX_CHANNEL_OFFSET: u8 = MAX_CHANNEL - 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "leds")]
    pub led: LedConfig,
    #[serde(alias = "rings")]
    pub ring: RingConfig,
    pub display: DisplayConfig,
    pub midi: MidiConfig,
    pub blink: BlinkConfig,
    pub mixer: MixerConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Fall back to the defaults if the file could not be loaded.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::debug!("Loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                log::debug!(
                    "Using default configuration instead of {}: {err}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            led,
            ring,
            display,
            midi: _,
            blink,
            mixer,
        } = self;
        led.validate()?;
        ring.validate()?;
        display.validate()?;
        blink.validate()?;
        mixer.validate()?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn check_u7(name: &str, value: u8) -> Result<(), ConfigError> {
    if value > MAX_U7 {
        return Err(invalid(format!("{name} {value} exceeds {MAX_U7}")));
    }
    Ok(())
}

fn check_notes(name: &str, notes: &[u8], expected_len: usize) -> Result<(), ConfigError> {
    if notes.len() != expected_len {
        return Err(invalid(format!(
            "expected {expected_len} {name}, found {}",
            notes.len()
        )));
    }
    notes.iter().try_for_each(|note| check_u7(name, *note))
}

/// Note numbers of the LEDs.
///
/// The same notes are used on the input channel of each deck and on
/// its LED output channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    /// Offset from the deck input channel to its LED channel.
    pub channel_offset: u8,
    pub play_note: u8,
    pub sync_note: u8,
    pub cue_note: u8,
    pub bpm_up_note: u8,
    pub bpm_down_note: u8,
    pub keylock_note: u8,
    pub pfl_cue_note: u8,
    pub wheel_button_note: u8,
    pub slip_note: u8,
    pub deck_active_note: u8,
    pub rate_display_note: u8,
    pub shift_note: u8,
    pub hotcue_notes: Vec<u8>,
    pub autoloop_notes: Vec<u8>,
    pub loop_notes: Vec<u8>,
    /// Partial maps are merged into the defaults.
    #[serde(deserialize_with = "deserialize_pad_mode_notes")]
    pub pad_mode_notes: BTreeMap<PadMode, u8>,
    pub pad_notes: Vec<u8>,
    pub effect_notes: Vec<u8>,
}

pub(crate) const NUM_HOTCUE_NOTES: usize = 8;
pub(crate) const NUM_AUTOLOOP_NOTES: usize = 8;
pub(crate) const NUM_LOOP_NOTES: usize = 6;
pub(crate) const NUM_PAD_NOTES: usize = 16;
pub(crate) const NUM_EFFECT_NOTES: usize = 6;

fn default_pad_mode_notes() -> BTreeMap<PadMode, u8> {
    PadMode::iter()
        .map(|mode| (mode, mode.default_note()))
        .collect()
}

fn deserialize_pad_mode_notes<'de, D>(deserializer: D) -> Result<BTreeMap<PadMode, u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<PadMode, u8>::deserialize(deserializer)?;
    let mut notes = default_pad_mode_notes();
    notes.extend(overrides);
    Ok(notes)
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            channel_offset: 4,
            play_note: 0x00,
            sync_note: 0x02,
            cue_note: 0x05,
            bpm_up_note: 0x0b,
            bpm_down_note: 0x0c,
            keylock_note: 0x0d,
            pfl_cue_note: 0x1b,
            wheel_button_note: 0x07,
            slip_note: 0x0f,
            deck_active_note: 0x08,
            rate_display_note: 0x0e,
            shift_note: 0x20,
            hotcue_notes: vec![24, 25, 26, 27, 32, 33, 34, 35],
            autoloop_notes: vec![20, 21, 22, 23, 28, 29, 30, 31],
            loop_notes: vec![50, 51, 52, 53, 56, 57],
            pad_mode_notes: default_pad_mode_notes(),
            pad_notes: (20..=35).collect(),
            effect_notes: (0..=5).collect(),
        }
    }
}

impl LedConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_offset > MAX_CHANNEL_OFFSET {
            return Err(invalid(format!(
                "channel offset {} exceeds {MAX_CHANNEL_OFFSET}",
                self.channel_offset
            )));
        }
        for (name, note) in [
            ("play note", self.play_note),
            ("sync note", self.sync_note),
            ("cue note", self.cue_note),
            ("bpm up note", self.bpm_up_note),
            ("bpm down note", self.bpm_down_note),
            ("keylock note", self.keylock_note),
            ("pfl cue note", self.pfl_cue_note),
            ("wheel button note", self.wheel_button_note),
            ("slip note", self.slip_note),
            ("deck active note", self.deck_active_note),
            ("rate display note", self.rate_display_note),
            ("shift note", self.shift_note),
        ] {
            check_u7(name, note)?;
        }
        check_notes("hotcue notes", &self.hotcue_notes, NUM_HOTCUE_NOTES)?;
        check_notes("autoloop notes", &self.autoloop_notes, NUM_AUTOLOOP_NOTES)?;
        check_notes("loop notes", &self.loop_notes, NUM_LOOP_NOTES)?;
        check_notes("pad notes", &self.pad_notes, NUM_PAD_NOTES)?;
        check_notes("effect notes", &self.effect_notes, NUM_EFFECT_NOTES)?;
        for mode in PadMode::iter() {
            let Some(note) = self.pad_mode_notes.get(&mode) else {
                return Err(invalid(format!("missing note for pad mode {mode}")));
            };
            check_u7("pad mode note", *note)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Control number of the red spinner ring.
    pub spinner_control: u8,
    /// Control number of the white position ring.
    pub position_control: u8,
    /// Added to the position of the spinner ring.
    pub spinner_offset: u8,
    pub max_position: u8,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            spinner_control: 0x06,
            position_control: 0x3f,
            spinner_offset: 64,
            max_position: 52,
        }
    }
}

impl RingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_u7("spinner control", self.spinner_control)?;
        check_u7("position control", self.position_control)?;
        if u16::from(self.spinner_offset) + u16::from(self.max_position) > u16::from(MAX_U7) {
            return Err(invalid(format!(
                "spinner offset {} plus maximum position {} exceeds {MAX_U7}",
                self.spinner_offset, self.max_position
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub vu_meter_control: u8,
    /// Value of a fully lit VU meter.
    pub vu_meter_max: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            vu_meter_control: 0x1f,
            vu_meter_max: 90,
        }
    }
}

impl DisplayConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_u7("VU meter control", self.vu_meter_control)?;
        check_u7("VU meter maximum", self.vu_meter_max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Exact name of the input port, detected by prefix if missing.
    pub input_port: Option<String>,
    /// Exact name of the output port, detected by prefix if missing.
    pub output_port: Option<String>,
    pub port_name_prefix: String,
    /// Light the LED of a button while it is pressed.
    pub button_led_feedback: bool,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            input_port: None,
            output_port: None,
            port_name_prefix: "Mixtrack Platinum FX".to_owned(),
            button_led_feedback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub period_millis: u64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self { period_millis: 700 }
    }
}

impl BlinkConfig {
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.period_millis == 0 {
            return Err(invalid("blink period must not be zero"));
        }
        Ok(())
    }
}

/// Mixer section controls that are re-bound while shift is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub channel: u8,
    /// Headphone gain.
    pub cue_gain_control: u8,
    /// Headphone mix, while shift is held.
    pub cue_mix_control: u8,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            channel: 0x0f,
            cue_gain_control: 0x0c,
            cue_mix_control: 0x0c,
        }
    }
}

impl MixerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > MAX_CHANNEL {
            return Err(invalid(format!(
                "mixer channel {} exceeds {MAX_CHANNEL}",
                self.channel
            )));
        }
        check_u7("cue gain control", self.cue_gain_control)?;
        check_u7("cue mix control", self.cue_mix_control)
    }
}
