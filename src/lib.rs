// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

#![allow(rustdoc::invalid_rust_codeblocks)]
#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
//#![warn(missing_docs)] // FIXME
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(rustdoc::broken_intra_doc_links)]
// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]
// Repeating the type name in `..Default::default()` expressions
// is not needed since the context is obvious.
#![allow(clippy::default_trait_access)]

pub mod config;
pub use self::config::{
    BlinkConfig, Config, ConfigError, DisplayConfig, LedConfig, MidiConfig, MixerConfig,
    RingConfig,
};

pub mod devices;
pub use self::devices::{ControllerDescriptor, DeviceDescriptor, MidiDeviceDescriptor};

mod input;
pub use self::input::{ButtonInput, EmitInputEvent, InputEvent, InputThread, SliderInput};

mod midi;
pub use self::midi::{
    message::{MidiMessage, ShortMessage},
    queue::{input_queue, InputQueue, InputQueueSender},
    CancelReceive, MidiInputHandler, MidiSink, MidiSource, Received, TimeStamp,
};
#[cfg(feature = "midir")]
pub use self::midi::midir::{connect_midir, MidiPortError, MidirConnection};

mod output;
pub use self::output::{
    blink::{BlinkCallback, BlinkPhase, BlinkScheduler, BlinkSpeed, BlinkTicker},
    blinking_led_task::{blinking_led_task, BlinkThread, DEFAULT_BLINK_PERIOD},
    OutputError, OutputResult,
};

#[cfg(test)]
pub(crate) mod testing;
