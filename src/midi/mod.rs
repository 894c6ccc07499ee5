// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::ops::{Deref, DerefMut};

use derive_more::Display;

use crate::OutputResult;

pub(crate) mod message;

pub(crate) mod queue;

#[cfg(feature = "midir")]
pub(crate) mod midir;

/// Receive time of a MIDI message in microseconds.
///
/// The origin is defined by the transport, i.e. only differences
/// between time stamps of the same source are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[display("{_0}us")]
pub struct TimeStamp(u64);

impl TimeStamp {
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn to_micros(self) -> u64 {
        self.0
    }
}

/// Outbound MIDI capability.
///
/// Writes are fire-and-forget. There is no acknowledgement from the
/// device, i.e. a message that has been lost could only be corrected
/// by sending it again.
pub trait MidiSink: Send {
    /// Send a 3-byte channel message.
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) -> OutputResult<()>;

    /// Send a complete system exclusive frame including `F0`/`F7`.
    fn send_sysex(&mut self, frame: &[u8]) -> OutputResult<()>;
}

impl<S> MidiSink for Box<S>
where
    S: MidiSink + ?Sized,
{
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) -> OutputResult<()> {
        self.as_mut().send_short(status, data1, data2)
    }

    fn send_sysex(&mut self, frame: &[u8]) -> OutputResult<()> {
        self.as_mut().send_sysex(frame)
    }
}

/// Outcome of a blocking receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Message { ts: TimeStamp, bytes: Vec<u8> },
    /// The source has been closed or the receive has been cancelled.
    ///
    /// No more messages will arrive after this.
    Closed,
}

/// Inbound MIDI capability.
pub trait MidiSource: Send {
    /// Block until the next message arrives.
    ///
    /// Returns [`Received::Closed`] after the source has been closed
    /// or cancelled through the corresponding [`CancelReceive`] handle.
    fn receive(&mut self) -> Received;
}

/// Interrupts a blocking [`MidiSource::receive()`] from another thread.
pub trait CancelReceive: Send {
    fn cancel_receive(&self);
}

/// Passive callback for sinking MIDI input messages
pub trait MidiInputHandler: Send {
    /// Invoked for each incoming message.
    ///
    /// Returns `true` if the message has been accepted and handled
    /// or `false` otherwise.
    #[must_use]
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool;
}

impl<D> MidiInputHandler for D
where
    D: DerefMut + Send,
    <D as Deref>::Target: MidiInputHandler,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        self.deref_mut().handle_midi_input(ts, input)
    }
}
