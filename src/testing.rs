// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{MidiSink, OutputError, OutputResult};

/// Captures all sent messages as raw bytes.
///
/// Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject all following messages.
    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub(crate) fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.sent.lock())
    }

    fn record(&self, bytes: Vec<u8>) -> OutputResult<()> {
        if *self.failing.lock() {
            return Err(OutputError::Send {
                msg: "rejected".into(),
            });
        }
        self.sent.lock().push(bytes);
        Ok(())
    }
}

impl MidiSink for RecordingSink {
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) -> OutputResult<()> {
        self.record(vec![status, data1, data2])
    }

    fn send_sysex(&mut self, frame: &[u8]) -> OutputResult<()> {
        self.record(frame.to_vec())
    }
}
