// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use super::{
    ChannelMap, Input, InputGateway, MapError, OutputGateway, CONTROLLER_DESCRIPTOR,
    MIDI_DEVICE_DESCRIPTOR,
};
use crate::{
    BlinkThread, CancelReceive, Config, ControllerDescriptor, EmitInputEvent, InputThread,
    MidiDeviceDescriptor, MidiSink, MidiSource, OutputResult,
};

/// The controller with its input and blink threads.
///
/// Lifecycle: [`attach()`](Self::attach) the output, [`start()`](Self::start)
/// receiving input, and finally [`detach()`](Self::detach).
#[derive(Debug)]
pub struct MixtrackPlatinumFx<S> {
    config: Config,
    output: Arc<OutputGateway<S>>,
    input_thread: Option<InputThread>,
    blink_thread: Option<BlinkThread>,
}

impl<S> MixtrackPlatinumFx<S>
where
    S: MidiSink + 'static,
{
    pub fn new(config: Config) -> Result<Self, MapError> {
        let map = Arc::new(ChannelMap::new(&config)?);
        let output = Arc::new(OutputGateway::new(
            map,
            config.ring.clone(),
            config.display.clone(),
        ));
        Ok(Self {
            config,
            output,
            input_thread: None,
            blink_thread: None,
        })
    }

    #[must_use]
    pub const fn midi_device_descriptor(&self) -> &'static MidiDeviceDescriptor {
        MIDI_DEVICE_DESCRIPTOR
    }

    #[must_use]
    pub const fn controller_descriptor(&self) -> &'static ControllerDescriptor {
        CONTROLLER_DESCRIPTOR
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn map(&self) -> &ChannelMap {
        self.output.map()
    }

    #[must_use]
    pub const fn output(&self) -> &Arc<OutputGateway<S>> {
        &self.output
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.input_thread.is_some() || self.blink_thread.is_some()
    }

    /// Connect the output and turn off all LEDs.
    ///
    /// The device leaves demo mode first. Returns the previously
    /// attached sink.
    pub fn attach(&self, sink: S) -> OutputResult<Option<S>> {
        let replaced = self.output.attach(sink);
        log::info!(
            "Attached {device}",
            device = MIDI_DEVICE_DESCRIPTOR.device.name()
        );
        self.output.exit_demo_mode()?;
        self.output.clear_all()?;
        Ok(replaced)
    }

    /// Spawn the input and blink threads.
    ///
    /// Decoded input is passed to `emit_input_event` on the input thread.
    /// Threads that are already running are stopped first.
    pub fn start<M, C, E>(&mut self, source: M, canceller: C, emit_input_event: E)
    where
        M: MidiSource + 'static,
        C: CancelReceive + 'static,
        E: EmitInputEvent<Input> + Send + 'static,
    {
        if self.is_running() {
            log::warn!("Restarting controller");
            self.stop();
        }
        let gateway = InputGateway::new(
            Arc::clone(&self.output),
            self.config.midi.button_led_feedback,
            emit_input_event,
        );
        self.input_thread = Some(InputThread::spawn(source, canceller, gateway));
        let output = Arc::clone(&self.output);
        self.blink_thread = Some(BlinkThread::spawn(self.config.blink.period(), move || {
            if output.tick_blink().is_none() {
                log::trace!("Skipped blink tick while detached");
            }
        }));
    }

    /// Stop all threads and disconnect the output.
    ///
    /// Returns the detached sink.
    pub fn detach(&mut self) -> Option<S> {
        self.stop();
        let sink = self.output.detach();
        if sink.is_some() {
            log::info!(
                "Detached {device}",
                device = MIDI_DEVICE_DESCRIPTOR.device.name()
            );
        }
        sink
    }
}

impl<S> MixtrackPlatinumFx<S> {
    /// Stop and join the input and blink threads.
    ///
    /// Errors are logged.
    pub fn stop(&mut self) {
        if let Some(input_thread) = self.input_thread.take() {
            if let Err(err) = input_thread.cancel_and_join() {
                log::error!("Failed to join input thread: {err}");
            }
        }
        if let Some(blink_thread) = self.blink_thread.take() {
            if let Err(err) = blink_thread.abort_and_join() {
                log::error!("Failed to join blink thread: {err}");
            }
        }
    }
}

impl<S> Drop for MixtrackPlatinumFx<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
