// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{collections::HashMap, sync::Arc};

use super::{ChannelMap, LogicalControl, VELOCITY_EXTINGUISHED, VELOCITY_OFF, VELOCITY_ON};
use crate::{BlinkSpeed, MidiMessage, MidiSink, OutputError, OutputResult};

/// What the device currently shows for an LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedState {
    /// Last velocity sent to the device.
    pub velocity: u8,
    /// Velocity of the lit phase while blinking and after blinking stopped.
    pub lit_velocity: u8,
    pub blink: Option<BlinkSpeed>,
}

impl Default for LedState {
    fn default() -> Self {
        Self {
            velocity: VELOCITY_EXTINGUISHED,
            lit_velocity: VELOCITY_ON,
            blink: None,
        }
    }
}

impl LedState {
    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.velocity > VELOCITY_OFF
    }

    #[must_use]
    pub const fn is_blinking(&self) -> bool {
        self.blink.is_some()
    }
}

/// Mirror of the LED states on the device and the sink for updating them.
///
/// There is no read-back from the device. Updates are recorded before
/// they are sent, i.e. the table reflects the intended state even if
/// sending failed.
#[derive(Debug)]
pub struct LedTable<S> {
    map: Arc<ChannelMap>,
    sink: Option<S>,
    leds: HashMap<LogicalControl, LedState>,
}

impl<S> LedTable<S> {
    #[must_use]
    pub fn new(map: Arc<ChannelMap>) -> Self {
        Self {
            map,
            sink: None,
            leds: HashMap::new(),
        }
    }

    #[must_use]
    pub fn map(&self) -> &ChannelMap {
        &self.map
    }

    /// Returns the previously attached sink.
    pub fn attach(&mut self, sink: S) -> Option<S> {
        self.sink.replace(sink)
    }

    pub fn detach(&mut self) -> Option<S> {
        self.sink.take()
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    #[must_use]
    pub fn state(&self, control: LogicalControl) -> Option<LedState> {
        self.leds.get(&control).copied()
    }

    /// Created on first access.
    pub fn entry(&mut self, control: LogicalControl) -> &mut LedState {
        self.leds.entry(control).or_default()
    }

    /// All controls that have been accessed.
    pub fn controls(&self) -> impl Iterator<Item = LogicalControl> + '_ {
        self.leds.keys().copied()
    }

    /// Forget what is shown on the device.
    ///
    /// All entries are extinguished and blinking stops. Nothing is sent.
    pub fn reset(&mut self) {
        for state in self.leds.values_mut() {
            state.velocity = VELOCITY_EXTINGUISHED;
            state.blink = None;
        }
    }
}

impl<S> LedTable<S>
where
    S: MidiSink,
{
    pub fn send(&mut self, message: &MidiMessage) -> OutputResult<()> {
        let sink = self.sink.as_mut().ok_or(OutputError::Disconnected)?;
        message.send_to(sink)
    }

    /// Send the velocity without recording it.
    pub fn emit_velocity(&mut self, control: LogicalControl, velocity: u8) -> OutputResult<()> {
        let binding = self.map.resolve(control);
        // Always Note-On, even for turning off
        let message = MidiMessage::note_on(binding.output_channel, binding.note, velocity);
        self.send(&message)
    }

    /// Record and send the velocity.
    ///
    /// Doesn't affect blinking.
    pub fn write_velocity(&mut self, control: LogicalControl, velocity: u8) -> OutputResult<()> {
        self.entry(control).velocity = velocity;
        self.emit_velocity(control, velocity)
    }
}
