// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Channel-backed [`MidiSource`] that decouples transport callbacks from
//! the blocking receive loop.

use std::sync::mpsc;

use crate::{CancelReceive, MidiInputHandler, MidiSource, Received, TimeStamp};

/// Create a connected pair of sender and receiver.
#[must_use]
pub fn input_queue() -> (InputQueueSender, InputQueue) {
    let (tx, rx) = mpsc::channel();
    (InputQueueSender { tx }, InputQueue { rx, closed: false })
}

/// Producer side of an [`InputQueue`].
///
/// Cloned into transport callbacks for enqueuing messages. The same
/// handle is used for closing the queue, which wakes up a blocked
/// receiver.
#[derive(Debug, Clone)]
pub struct InputQueueSender {
    tx: mpsc::Sender<Received>,
}

impl InputQueueSender {
    /// Enqueue a received message.
    ///
    /// Returns `false` if the receiver is gone.
    pub fn send(&self, ts: TimeStamp, input: &[u8]) -> bool {
        self.tx
            .send(Received::Message {
                ts,
                bytes: input.to_vec(),
            })
            .is_ok()
    }

    /// Close the queue.
    ///
    /// Messages that have been enqueued before are still delivered.
    pub fn close(&self) {
        // The receiver might already be gone
        let _ = self.tx.send(Received::Closed);
    }
}

impl CancelReceive for InputQueueSender {
    fn cancel_receive(&self) {
        self.close();
    }
}

impl MidiInputHandler for InputQueueSender {
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        self.send(ts, input)
    }
}

/// Consumer side, see [`input_queue()`].
#[derive(Debug)]
pub struct InputQueue {
    rx: mpsc::Receiver<Received>,
    closed: bool,
}

impl MidiSource for InputQueue {
    fn receive(&mut self) -> Received {
        if self.closed {
            return Received::Closed;
        }
        match self.rx.recv() {
            Ok(message @ Received::Message { .. }) => message,
            Ok(Received::Closed) | Err(mpsc::RecvError) => {
                self.closed = true;
                Received::Closed
            }
        }
    }
}
