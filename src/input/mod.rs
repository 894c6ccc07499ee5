// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{fmt, thread::JoinHandle};

use crate::{CancelReceive, MidiInputHandler, MidiSource, Received, TimeStamp};

/// A simple two-state button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonInput {
    Pressed,
    Released,
}

impl ButtonInput {
    #[must_use]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Pressed
        } else {
            Self::Released
        }
    }

    /// Note-On with a velocity of 0 is a release.
    #[must_use]
    pub const fn from_velocity(velocity: u8) -> Self {
        Self::from_pressed(velocity > 0)
    }

    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// A continuous fader or knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderInput {
    /// Position in the interval [0, 1]
    pub position: f32,
}

impl SliderInput {
    pub const MIN_POSITION: f32 = 0.0;
    pub const MAX_POSITION: f32 = 1.0;

    #[must_use]
    pub fn from_u7(value: u8) -> Self {
        let position = f32::from(value.min(0x7f)) / 127.0;
        Self { position }
    }
}

/// Decoded input with its receive time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent<T> {
    pub ts: TimeStamp,
    pub input: T,
}

/// Sink for decoded input events.
pub trait EmitInputEvent<T> {
    fn emit_input_event(&mut self, event: InputEvent<T>);
}

impl<T, F> EmitInputEvent<T> for F
where
    F: FnMut(InputEvent<T>),
{
    fn emit_input_event(&mut self, event: InputEvent<T>) {
        self(event);
    }
}

/// Blocking receive loop on a dedicated thread.
///
/// Runs until the source is closed or cancelled.
pub struct InputThread {
    canceller: Box<dyn CancelReceive>,
    os_thread: JoinHandle<()>,
}

impl fmt::Debug for InputThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputThread")
            .field("os_thread", &self.os_thread)
            .finish_non_exhaustive()
    }
}

impl InputThread {
    #[must_use]
    pub fn spawn<M, C, H>(mut source: M, canceller: C, mut handler: H) -> Self
    where
        M: MidiSource + 'static,
        C: CancelReceive + 'static,
        H: MidiInputHandler + 'static,
    {
        let os_thread = std::thread::spawn(move || {
            log::info!("Entering input thread");
            loop {
                match source.receive() {
                    Received::Message { ts, bytes } => {
                        log::trace!("Received MIDI input: {ts} {bytes:02x?}");
                        if !handler.handle_midi_input(ts, &bytes) {
                            log::debug!("Unhandled MIDI input {ts} {bytes:02x?}");
                        }
                    }
                    Received::Closed => {
                        log::info!("MIDI input closed");
                        break;
                    }
                }
            }
            log::info!("Exiting input thread");
        });
        Self {
            canceller: Box::new(canceller),
            os_thread,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.os_thread.is_finished()
    }

    pub fn cancel_and_join(self) -> anyhow::Result<()> {
        let Self {
            canceller,
            os_thread,
        } = self;
        canceller.cancel_receive();
        os_thread
            .join()
            .map_err(|err| anyhow::anyhow!("Input thread panicked: {err:?}"))
    }
}
