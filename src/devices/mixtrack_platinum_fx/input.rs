// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{fmt, sync::Arc};

use super::{
    ChannelMap, Deck, LogicalControl, OutputGateway, ShiftBindings, ShiftableControl, Target,
};
use crate::{
    ButtonInput, EmitInputEvent, InputEvent, MidiInputHandler, MidiSink, ShortMessage,
    SliderInput, TimeStamp,
};

/// Decoded input of the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Button {
        control: LogicalControl,
        input: ButtonInput,
        /// Mixer parameter of shiftable buttons, depending on the
        /// shift state when pressed.
        target: Option<Target>,
    },
    Shift {
        deck: Deck,
        input: ButtonInput,
    },
    Knob {
        target: Target,
        input: SliderInput,
    },
    /// Channel message without a mapping, e.g. faders and jog wheels.
    Unmapped(ShortMessage),
}

/// Decode a single MIDI message.
///
/// The shift bindings are only read, shift state changes are returned
/// as [`Input::Shift`]. Returns `None` if the input is not a 3-byte
/// channel message.
#[must_use]
pub fn decode_midi_input(map: &ChannelMap, shift: &ShiftBindings, input: &[u8]) -> Option<Input> {
    let message = ShortMessage::try_from_bytes(input)?;
    let decoded = match message {
        ShortMessage::NoteOn {
            channel,
            note,
            velocity,
        } => decode_button(map, shift, channel, note, ButtonInput::from_velocity(velocity)),
        ShortMessage::NoteOff { channel, note, .. } => {
            decode_button(map, shift, channel, note, ButtonInput::Released)
        }
        ShortMessage::ControlChange {
            channel,
            control,
            value,
        } => match shift.lookup(channel, control) {
            Some(knob @ ShiftableControl::CueGainKnob) => Some(Input::Knob {
                target: shift.resolve(knob).target,
                input: SliderInput::from_u7(value),
            }),
            _ => None,
        },
    };
    Some(decoded.unwrap_or(Input::Unmapped(message)))
}

fn decode_button(
    map: &ChannelMap,
    shift: &ShiftBindings,
    channel: u8,
    note: u8,
    input: ButtonInput,
) -> Option<Input> {
    // Shift is checked first, it shadows other controls on the deck channels
    if let Some(deck) = map.shift_deck(channel, note) {
        return Some(Input::Shift { deck, input });
    }
    let control = map.lookup(channel, note)?;
    let target = match shift.lookup(channel, note) {
        Some(button @ ShiftableControl::PflButton(_)) => Some(shift.resolve(button).target),
        _ => None,
    };
    Some(Input::Button {
        control,
        input,
        target,
    })
}

/// Decodes input, maintains the shift state, and lights the LEDs of
/// pressed buttons.
///
/// Button LED feedback turns the LED on while pressed and off when
/// released. It stops blinking of the LED.
pub struct InputGateway<S, E> {
    output: Arc<OutputGateway<S>>,
    shift: ShiftBindings,
    button_led_feedback: bool,
    emit_input_event: E,
}

impl<S, E> fmt::Debug for InputGateway<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputGateway")
            .field("shift", &self.shift)
            .field("button_led_feedback", &self.button_led_feedback)
            .finish_non_exhaustive()
    }
}

impl<S, E> InputGateway<S, E>
where
    S: MidiSink + 'static,
    E: EmitInputEvent<Input>,
{
    #[must_use]
    pub fn new(output: Arc<OutputGateway<S>>, button_led_feedback: bool, emit_input_event: E) -> Self {
        let shift = output.map().shift_bindings();
        Self {
            output,
            shift,
            button_led_feedback,
            emit_input_event,
        }
    }

    #[must_use]
    pub const fn shift_bindings(&self) -> &ShiftBindings {
        &self.shift
    }

    fn led_feedback(&self, control: LogicalControl, input: ButtonInput) {
        if let Err(err) = self.output.set(control, input.is_pressed()) {
            log::warn!("Failed to send LED feedback for {control:?}: {err}");
        }
    }
}

impl<S, E> MidiInputHandler for InputGateway<S, E>
where
    S: MidiSink + 'static,
    E: EmitInputEvent<Input> + Send,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        let Some(decoded) = decode_midi_input(self.output.map(), &self.shift, input) else {
            if input.first().map_or(true, |status| status & 0x80 == 0) {
                log::warn!("Undecodable MIDI input {ts} {input:02x?}");
            } else {
                log::debug!("Unsupported MIDI input {ts} {input:02x?}");
            }
            return false;
        };
        match decoded {
            Input::Shift { deck, input } => {
                self.shift.set_shift(deck, input.is_pressed());
            }
            Input::Button { control, input, .. } => {
                if self.button_led_feedback {
                    self.led_feedback(control, input);
                }
            }
            Input::Knob { .. } => (),
            Input::Unmapped(message) => {
                log::trace!("Unmapped MIDI input {ts} {message:?}");
            }
        }
        self.emit_input_event.emit_input_event(InputEvent {
            ts,
            input: decoded,
        });
        true
    }
}
