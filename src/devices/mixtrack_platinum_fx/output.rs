// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{collections::BTreeSet, fmt, sync::Arc};

use parking_lot::Mutex;
use strum::{Display, EnumIter};

use super::{
    ChannelMap, Deck, DisplayValue, LedState, LedTable, LogicalControl, DEMO_MODE_ENTER,
    DEMO_MODE_EXIT, SYSEX_DEMO_MODE, SYSEX_FADER_CUT_EIGHT, SYSEX_FADER_CUT_FOUR,
    SYSEX_MANUFACTURER_ID, SYSEX_SHUTDOWN, VELOCITY_OFF, VELOCITY_ON,
};
use crate::{
    midi::message::{clamp_u7, saturating_u7},
    BlinkPhase, BlinkScheduler, BlinkSpeed, DisplayConfig, MidiMessage, MidiSink, OutputResult,
    RingConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RingType {
    /// Red ring
    Spinner,
    /// White ring
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum FaderCutMode {
    Eight,
    Four,
}

struct OutputState<S> {
    table: LedTable<S>,
    blink: BlinkScheduler<LogicalControl, LedTable<S>>,
}

impl<S> OutputState<S> {
    fn stop_blinking(&mut self, control: LogicalControl) -> bool {
        if !self.blink.unenroll(&control) {
            return false;
        }
        self.table.entry(control).blink = None;
        log::debug!("Stopped blinking {control:?}");
        true
    }
}

impl<S> OutputState<S>
where
    S: MidiSink + 'static,
{
    fn enroll_blink<F>(&mut self, control: LogicalControl, speed: BlinkSpeed, mut pattern: F)
    where
        F: FnMut(bool) -> u8 + Send + 'static,
    {
        self.table.entry(control).blink = Some(speed);
        let replaced = self.blink.enroll(
            control,
            speed,
            Box::new(move |table: &mut LedTable<S>, phase| {
                let velocity = clamp_u7(pattern(phase));
                if let Err(err) = table.write_velocity(control, velocity) {
                    log::warn!("Failed to blink {control:?}: {err}");
                }
            }),
        );
        log::debug!("Blinking {control:?} {speed} (replaced: {replaced:?})");
    }
}

/// Keep the first error, continue with the remaining messages.
fn collect_first_err(first_err: &mut Option<crate::OutputError>, result: OutputResult<()>) {
    if let Err(err) = result {
        log::warn!("Failed to send MIDI output: {err}");
        if first_err.is_none() {
            *first_err = Some(err);
        }
    }
}

fn first_err_or_ok(first_err: Option<crate::OutputError>) -> OutputResult<()> {
    first_err.map_or(Ok(()), Err)
}

/// All outbound state of the device behind a single lock.
///
/// Each operation records the new state and sends it while holding the
/// lock. Repeated operations are sent again, i.e. lost messages are
/// corrected by the next update.
pub struct OutputGateway<S> {
    map: Arc<ChannelMap>,
    ring: RingConfig,
    display: DisplayConfig,
    state: Mutex<OutputState<S>>,
}

impl<S> fmt::Debug for OutputGateway<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputGateway")
            .field("ring", &self.ring)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl<S> OutputGateway<S>
where
    S: MidiSink + 'static,
{
    #[must_use]
    pub fn new(map: Arc<ChannelMap>, ring: RingConfig, display: DisplayConfig) -> Self {
        let state = OutputState {
            table: LedTable::new(Arc::clone(&map)),
            blink: BlinkScheduler::new(),
        };
        Self {
            map,
            ring,
            display,
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn map(&self) -> &ChannelMap {
        &self.map
    }

    /// Returns the previously attached sink.
    pub fn attach(&self, sink: S) -> Option<S> {
        self.state.lock().table.attach(sink)
    }

    /// Detach the sink and forget all LED states.
    pub fn detach(&self) -> Option<S> {
        let mut state = self.state.lock();
        state.blink.reset();
        state.table.reset();
        state.table.detach()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.lock().table.is_attached()
    }

    #[must_use]
    pub fn led_state(&self, control: LogicalControl) -> Option<LedState> {
        self.state.lock().table.state(control)
    }

    #[must_use]
    pub fn blink_speed(&self, control: LogicalControl) -> Option<BlinkSpeed> {
        self.state.lock().blink.speed(&control)
    }

    pub fn send(&self, message: &MidiMessage) -> OutputResult<()> {
        self.state.lock().table.send(message)
    }

    /// Turn an LED on or off.
    ///
    /// Stops blinking.
    pub fn set(&self, control: LogicalControl, on: bool) -> OutputResult<()> {
        self.set_velocity(control, if on { VELOCITY_ON } else { VELOCITY_OFF })
    }

    /// Stops blinking.
    pub fn set_velocity(&self, control: LogicalControl, velocity: u8) -> OutputResult<()> {
        let velocity = clamp_u7(velocity);
        let mut state = self.state.lock();
        state.stop_blinking(control);
        let entry = state.table.entry(control);
        if velocity > VELOCITY_OFF {
            entry.lit_velocity = velocity;
        }
        log::debug!("Setting velocity of {control:?} to {velocity}");
        state.table.write_velocity(control, velocity)
    }

    /// Turn off all LEDs of the physical decks and effect units.
    ///
    /// Stops blinking. All LEDs are sent even if some fail, the first
    /// error is returned.
    pub fn clear_all(&self) -> OutputResult<()> {
        let mut state = self.state.lock();
        let blinking = state.blink.keys().copied().collect::<Vec<_>>();
        for control in blinking {
            state.stop_blinking(control);
        }
        let controls = Deck::PHYSICAL
            .into_iter()
            .flat_map(LogicalControl::iter_deck)
            .chain(LogicalControl::iter_effect_unit_buttons())
            .chain(state.table.controls())
            .collect::<BTreeSet<_>>();
        log::debug!("Clearing {num_leds} LEDs", num_leds = controls.len());
        let mut first_err = None;
        for control in controls {
            collect_first_err(
                &mut first_err,
                state.table.write_velocity(control, VELOCITY_OFF),
            );
        }
        first_err_or_ok(first_err)
    }

    /// Start blinking between the lit velocity and off.
    ///
    /// The lit velocity is the current velocity if lit or full
    /// brightness otherwise. Takes effect on the next tick.
    pub fn enroll_blink(&self, control: LogicalControl, speed: BlinkSpeed) {
        let mut state = self.state.lock();
        let entry = state.table.entry(control);
        if entry.velocity > VELOCITY_OFF {
            entry.lit_velocity = entry.velocity;
        }
        let lit_velocity = entry.lit_velocity;
        state.enroll_blink(control, speed, move |phase| {
            if phase {
                lit_velocity
            } else {
                VELOCITY_OFF
            }
        });
    }

    /// Start blinking with a custom pattern.
    ///
    /// The pattern maps the phase of the blink speed to a velocity. It
    /// is invoked by [`tick_blink()`](Self::tick_blink) while the output
    /// is locked and must not call back into this gateway.
    pub fn enroll_blink_with<F>(&self, control: LogicalControl, speed: BlinkSpeed, pattern: F)
    where
        F: FnMut(bool) -> u8 + Send + 'static,
    {
        self.state.lock().enroll_blink(control, speed, pattern);
    }

    /// Stop blinking and show the lit velocity steadily.
    ///
    /// Nothing is sent if the LED is not blinking.
    pub fn unenroll_blink(&self, control: LogicalControl) -> OutputResult<()> {
        let mut state = self.state.lock();
        if !state.stop_blinking(control) {
            return Ok(());
        }
        let lit_velocity = state.table.entry(control).lit_velocity;
        state.table.write_velocity(control, lit_velocity)
    }

    /// Advance all blinking LEDs.
    ///
    /// Skipped while detached.
    pub fn tick_blink(&self) -> Option<BlinkPhase> {
        let mut state = self.state.lock();
        if !state.table.is_attached() {
            return None;
        }
        let OutputState { table, blink } = &mut *state;
        Some(blink.tick(table))
    }

    /// Position is clamped to the configured maximum.
    pub fn set_ring(&self, deck: Deck, ring: RingType, position: u8) -> OutputResult<()> {
        let position = position.min(self.ring.max_position);
        let (control, value) = match ring {
            RingType::Spinner => (
                self.ring.spinner_control,
                position.saturating_add(self.ring.spinner_offset),
            ),
            RingType::Position => (self.ring.position_control, position),
        };
        log::debug!("Setting {ring} ring of deck {deck} to {position}");
        self.send(&MidiMessage::control_change(
            deck.input_channel(),
            control,
            value,
        ))
    }

    /// Percentage in the range 0.0 to 100.0
    pub fn set_ring_percentage(&self, deck: Deck, ring: RingType, percent: f64) -> OutputResult<()> {
        #[allow(clippy::cast_possible_truncation)]
        let position = (percent * f64::from(self.ring.max_position) / 100.0) as i64;
        self.set_ring(deck, ring, saturating_u7(position))
    }

    pub fn clear_rings(&self, deck: Deck) -> OutputResult<()> {
        let mut first_err = None;
        collect_first_err(&mut first_err, self.set_ring(deck, RingType::Spinner, 0));
        collect_first_err(&mut first_err, self.set_ring(deck, RingType::Position, 0));
        first_err_or_ok(first_err)
    }

    /// Level as a fraction in the range 0.0 to 1.0
    ///
    /// Levels are never read as percentages, values above 1.0 saturate
    /// at full scale.
    pub fn set_vu_meter(&self, deck: Deck, level: f64) -> OutputResult<()> {
        let max = self.display.vu_meter_max;
        #[allow(clippy::cast_possible_truncation)]
        let value = saturating_u7((level * f64::from(max)) as i64).min(max);
        log::trace!("Setting VU meter of deck {deck} to {value}/{max}");
        self.send(&MidiMessage::control_change(
            deck.input_channel(),
            self.display.vu_meter_control,
            value,
        ))
    }

    pub fn clear_vu_meter(&self, deck: Deck) -> OutputResult<()> {
        self.set_vu_meter(deck, 0.0)
    }

    pub fn clear_all_vu_meters(&self) -> OutputResult<()> {
        let mut first_err = None;
        for deck in Deck::PHYSICAL {
            collect_first_err(&mut first_err, self.clear_vu_meter(deck));
        }
        first_err_or_ok(first_err)
    }

    pub fn set_display(&self, value: DisplayValue) -> OutputResult<()> {
        log::debug!(
            "Setting {kind} display of deck {deck} to {raw}",
            kind = value.kind,
            deck = value.deck,
            raw = value.raw
        );
        self.send(&value.to_message())
    }

    pub fn set_bpm_display(&self, deck: Deck, bpm: f64) -> OutputResult<()> {
        self.set_display(DisplayValue::bpm(deck, bpm))
    }

    pub fn set_time_display(&self, deck: Deck, millis: i64) -> OutputResult<()> {
        self.set_display(DisplayValue::time(deck, millis))
    }

    pub fn set_duration_display(&self, deck: Deck, millis: i64) -> OutputResult<()> {
        self.set_display(DisplayValue::duration(deck, millis))
    }

    /// Pitch rate in percent
    pub fn set_rate_display(&self, deck: Deck, percent: f64) -> OutputResult<()> {
        self.set_display(DisplayValue::rate(deck, percent))
    }

    /// Show a 12-hour wall clock time as minutes and seconds.
    pub fn set_clock_display(&self, deck: Deck, hour: u8, minute: u8) -> OutputResult<()> {
        let hour = match hour % 12 {
            0 => 12,
            hour => hour,
        };
        let minutes = i64::from(hour) * 60 + i64::from(minute.min(59));
        self.set_time_display(deck, minutes * 1000)
    }

    pub fn enter_demo_mode(&self) -> OutputResult<()> {
        log::info!("Entering demo mode");
        self.send_demo_mode(DEMO_MODE_ENTER)
    }

    pub fn exit_demo_mode(&self) -> OutputResult<()> {
        log::info!("Exiting demo mode");
        self.send_demo_mode(DEMO_MODE_EXIT)
    }

    fn send_demo_mode(&self, mode: u8) -> OutputResult<()> {
        let mut data = SYSEX_DEMO_MODE.to_vec();
        data.push(mode);
        self.send(&MidiMessage::SysEx(data))
    }

    pub fn shutdown(&self) -> OutputResult<()> {
        log::info!("Shutting down device");
        self.send_vendor_command(SYSEX_SHUTDOWN)
    }

    pub fn set_fader_cut_mode(&self, mode: FaderCutMode) -> OutputResult<()> {
        log::debug!("Setting fader cut mode {mode}");
        let command = match mode {
            FaderCutMode::Eight => SYSEX_FADER_CUT_EIGHT,
            FaderCutMode::Four => SYSEX_FADER_CUT_FOUR,
        };
        self.send_vendor_command(command)
    }

    fn send_vendor_command(&self, command: u8) -> OutputResult<()> {
        let mut data = SYSEX_MANUFACTURER_ID.to_vec();
        data.push(command);
        self.send(&MidiMessage::SysEx(data))
    }
}
