// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use midir::{
    ConnectError, Ignore, InitError, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput,
    MidiOutputConnection, MidiOutputPort, SendError,
};
use thiserror::Error;

use crate::{
    input_queue, InputQueue, InputQueueSender, MidiConfig, MidiInputHandler, MidiSink,
    OutputError, OutputResult, TimeStamp,
};

const CLIENT_NAME: &str = "mixtrack-platinum-fx";

#[derive(Debug, Error)]
pub enum MidiPortError {
    #[error("no MIDI {direction} port matching \"{pattern}\"")]
    NotFound {
        direction: &'static str,
        pattern: String,
    },
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    ConnectInput(#[from] ConnectError<MidiInput>),
    #[error(transparent)]
    ConnectOutput(#[from] ConnectError<MidiOutput>),
}

impl From<SendError> for OutputError {
    fn from(err: SendError) -> Self {
        OutputError::Send {
            msg: err.to_string().into(),
        }
    }
}

impl MidiSink for MidiOutputConnection {
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) -> OutputResult<()> {
        self.send(&[status, data1, data2]).map_err(Into::into)
    }

    fn send_sysex(&mut self, frame: &[u8]) -> OutputResult<()> {
        self.send(frame).map_err(Into::into)
    }
}

// Adapter for the midir callback closure
fn handle_input<I>(micros: u64, input: &[u8], input_handler: &mut I)
where
    I: MidiInputHandler,
{
    let ts = TimeStamp::from_micros(micros);
    log::trace!("Received MIDI input: {ts} {input:02x?}");
    if !input_handler.handle_midi_input(ts, input) {
        log::debug!("Dropped MIDI input {ts} {input:02x?}: receiver gone");
    }
}

/// Port selection: an explicit name must match exactly, otherwise the
/// first port starting with the prefix wins.
fn select_port<P>(
    ports: Vec<P>,
    port_name: impl Fn(&P) -> Option<String>,
    explicit_name: Option<&str>,
    prefix: &str,
) -> Option<(String, P)> {
    ports.into_iter().find_map(|port| {
        let name = port_name(&port)?;
        let matches = match explicit_name {
            Some(explicit_name) => name == explicit_name,
            None => name.starts_with(prefix),
        };
        if !matches {
            log::debug!("Skipping MIDI port \"{name}\"");
            return None;
        }
        Some((name, port))
    })
}

/// Open input connection of the controller.
///
/// Incoming messages are forwarded into an [`InputQueue`].
#[allow(missing_debug_implementations)]
pub struct MidirConnection {
    input_port_name: String,
    output_port_name: String,
    input_connection: MidiInputConnection<InputQueueSender>,
    canceller: InputQueueSender,
}

impl MidirConnection {
    #[must_use]
    pub fn input_port_name(&self) -> &str {
        &self.input_port_name
    }

    #[must_use]
    pub fn output_port_name(&self) -> &str {
        &self.output_port_name
    }

    /// Handle for interrupting the receive loop of the [`InputQueue`].
    #[must_use]
    pub fn canceller(&self) -> InputQueueSender {
        self.canceller.clone()
    }

    pub fn close(self) {
        let Self {
            input_port_name,
            input_connection,
            canceller,
            ..
        } = self;
        input_connection.close();
        canceller.close();
        log::info!("Closed MIDI input port \"{input_port_name}\"");
    }
}

/// Connect to the controller's MIDI ports.
///
/// Returns the input connection, the output connection that is used as
/// [`MidiSink`], and the queue of received input messages.
pub fn connect_midir(
    config: &MidiConfig,
) -> Result<(MidirConnection, MidiOutputConnection, InputQueue), MidiPortError> {
    let mut input = MidiInput::new(CLIENT_NAME)?;
    input.ignore(Ignore::None);
    let output = MidiOutput::new(CLIENT_NAME)?;

    let (input_port_name, input_port): (String, MidiInputPort) = select_port(
        input.ports(),
        |port| input.port_name(port).ok(),
        config.input_port.as_deref(),
        &config.port_name_prefix,
    )
    .ok_or_else(|| MidiPortError::NotFound {
        direction: "input",
        pattern: config
            .input_port
            .clone()
            .unwrap_or_else(|| config.port_name_prefix.clone()),
    })?;
    let (output_port_name, output_port): (String, MidiOutputPort) = select_port(
        output.ports(),
        |port| output.port_name(port).ok(),
        config.output_port.as_deref(),
        &config.port_name_prefix,
    )
    .ok_or_else(|| MidiPortError::NotFound {
        direction: "output",
        pattern: config
            .output_port
            .clone()
            .unwrap_or_else(|| config.port_name_prefix.clone()),
    })?;

    let (sender, queue) = input_queue();
    let canceller = sender.clone();
    let input_connection = input.connect(
        &input_port,
        &input_port_name,
        |micros, input, input_handler| {
            handle_input(micros, input, input_handler);
        },
        sender,
    )?;
    log::info!("Connected MIDI input port \"{input_port_name}\"");
    let output_connection = output.connect(&output_port, &output_port_name)?;
    log::info!("Connected MIDI output port \"{output_port_name}\"");

    let connection = MidirConnection {
        input_port_name,
        output_port_name,
        input_connection,
        canceller,
    };
    Ok((connection, output_connection, queue))
}
