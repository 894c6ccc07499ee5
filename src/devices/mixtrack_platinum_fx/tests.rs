// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    sync::{mpsc, Arc},
    time::Duration,
};

use parking_lot::Mutex;

use super::*;
use crate::{
    input_queue, testing::RecordingSink, BlinkSpeed, ButtonInput, Config, InputEvent,
    MidiInputHandler as _, OutputError, ShortMessage, SliderInput, TimeStamp,
};

fn control(deck: Deck, kind: ControlKind) -> LogicalControl {
    LogicalControl::new(deck, kind).unwrap()
}

fn default_map() -> ChannelMap {
    ChannelMap::new(&Config::default()).unwrap()
}

fn gateway() -> OutputGateway<RecordingSink> {
    let config = Config::default();
    let map = Arc::new(ChannelMap::new(&config).unwrap());
    OutputGateway::new(map, config.ring, config.display)
}

fn attached_gateway() -> (OutputGateway<RecordingSink>, RecordingSink) {
    let gateway = gateway();
    let sink = RecordingSink::new();
    assert!(gateway.attach(sink.clone()).is_none());
    (gateway, sink)
}

fn velocities(sent: &[Vec<u8>]) -> Vec<u8> {
    sent.iter().map(|bytes| bytes[2]).collect()
}

#[test]
fn deck_leds_are_offset_from_the_input_channel() {
    let map = default_map();
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 0,
            output_channel: 4,
            note: 24,
        },
        map.resolve(control(Deck::One, ControlKind::Hotcue(1)))
    );
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 1,
            output_channel: 5,
            note: 0x00,
        },
        map.resolve(control(Deck::Two, ControlKind::Play))
    );
    // Virtual decks follow the same rule
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 2,
            output_channel: 6,
            note: 0x02,
        },
        map.resolve(control(Deck::Three, ControlKind::Sync))
    );
}

#[test]
fn channel_offset_is_configurable() {
    let mut config = Config::default();
    config.led.channel_offset = 6;
    let map = ChannelMap::new(&config).unwrap();
    assert_eq!(6, map.channel_offset());
    assert_eq!(
        7,
        map.resolve(control(Deck::Two, ControlKind::Cue))
            .output_channel
    );
}

#[test]
fn effect_unit_buttons_use_fixed_channels() {
    let map = default_map();
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 8,
            output_channel: 8,
            note: 0,
        },
        map.resolve(LogicalControl::effect_unit_button(1, 1).unwrap())
    );
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 9,
            output_channel: 9,
            note: 5,
        },
        map.resolve(LogicalControl::effect_unit_button(2, 3).unwrap())
    );
    // Independent of the deck
    assert_eq!(
        LogicalControl::effect_unit_button(2, 1).unwrap(),
        control(Deck::Four, ControlKind::EffectUnitButton { unit: 2, button: 1 })
    );
}

#[test]
fn pad_section_channels() {
    let map = default_map();
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 4,
            output_channel: 4,
            note: 0x00,
        },
        map.resolve(control(Deck::One, ControlKind::PadModeButton(PadMode::Hotcue)))
    );
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 5,
            output_channel: 5,
            note: 0x0b,
        },
        map.resolve(control(Deck::Two, ControlKind::PadModeButton(PadMode::Sample1)))
    );
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 5,
            output_channel: 5,
            note: 20,
        },
        map.resolve(control(Deck::Two, ControlKind::Pad(1)))
    );
    assert_eq!(
        ChannelNoteBinding {
            input_channel: 4,
            output_channel: 4,
            note: 35,
        },
        map.resolve(control(Deck::One, ControlKind::Pad(16)))
    );
}

#[test]
fn reverse_lookup() {
    let map = default_map();
    assert_eq!(
        Some(control(Deck::One, ControlKind::Hotcue(1))),
        map.lookup(0, 24)
    );
    assert_eq!(
        Some(control(Deck::Two, ControlKind::Play)),
        map.lookup(1, 0x00)
    );
    assert_eq!(
        Some(LogicalControl::effect_unit_button(1, 3).unwrap()),
        map.lookup(8, 2)
    );
    assert_eq!(
        Some(control(
            Deck::One,
            ControlKind::PadModeButton(PadMode::Hotcue)
        )),
        map.lookup(4, 0x00)
    );
    assert_eq!(None, map.lookup(0, 0x7f));
    assert_eq!(None, map.lookup(0x0f, 0x00));
}

#[test]
fn reverse_lookup_prefers_earlier_controls() {
    let map = default_map();
    // The PFL button shares its note with the 4th hot cue
    assert_eq!(
        Some(control(Deck::One, ControlKind::PflCue)),
        map.lookup(0, 0x1b)
    );
    let shadowed = LogicalControl::iter_deck(Deck::One)
        .filter(|&control| {
            let binding = map.resolve(control);
            map.lookup(binding.input_channel, binding.note) != Some(control)
        })
        .collect::<Vec<_>>();
    assert_eq!(vec![control(Deck::One, ControlKind::Hotcue(4))], shadowed);
}

#[test]
fn every_effect_unit_button_is_found() {
    let map = default_map();
    for control in LogicalControl::iter_effect_unit_buttons() {
        let binding = map.resolve(control);
        assert_eq!(Some(control), map.lookup(binding.input_channel, binding.note));
    }
}

#[test]
fn shift_buttons() {
    let map = default_map();
    assert_eq!(Some(Deck::One), map.shift_deck(0, 0x20));
    assert_eq!(Some(Deck::Two), map.shift_deck(1, 0x20));
    assert_eq!(None, map.shift_deck(8, 0x20));
    assert_eq!(None, map.shift_deck(0, 0x21));
}

#[test]
fn shift_rebinds_mixer_controls() {
    let map = default_map();
    let mut shift = map.shift_bindings();
    assert_eq!(
        Target::HeadphoneGain,
        shift.resolve(ShiftableControl::CueGainKnob).target
    );
    assert_eq!(
        Target::Pfl(Deck::Two),
        shift.resolve(ShiftableControl::PflButton(Deck::Two)).target
    );

    shift.set_shift(Deck::Two, true);
    assert!(shift.is_shifted(Deck::Two));
    assert!(!shift.is_shifted(Deck::One));
    assert_eq!(
        Target::HeadphoneMix,
        shift.resolve(ShiftableControl::CueGainKnob).target
    );
    assert_eq!(
        Target::SlipEnabled(Deck::Two),
        shift.resolve(ShiftableControl::PflButton(Deck::Two)).target
    );
    // Only the PFL button of the shifted deck is affected
    assert_eq!(
        Target::Pfl(Deck::One),
        shift.resolve(ShiftableControl::PflButton(Deck::One)).target
    );

    // The cue gain knob stays shifted while any deck is shifted
    shift.set_shift(Deck::One, true);
    shift.set_shift(Deck::Two, false);
    assert_eq!(
        Target::HeadphoneMix,
        shift.resolve(ShiftableControl::CueGainKnob).target
    );
    shift.set_shift(Deck::One, false);
    assert_eq!(
        Target::HeadphoneGain,
        shift.resolve(ShiftableControl::CueGainKnob).target
    );

    assert_eq!(
        Some(ShiftableControl::CueGainKnob),
        shift.lookup(0x0f, 0x0c)
    );
    assert_eq!(
        Some(ShiftableControl::PflButton(Deck::Two)),
        shift.lookup(1, 0x1b)
    );
    assert_eq!(None, shift.lookup(1, 0x1c));
}

#[test]
fn invalid_note_counts_are_rejected() {
    let mut config = Config::default();
    config.led.hotcue_notes.pop();
    assert!(matches!(
        ChannelMap::new(&config),
        Err(MapError::Config(_))
    ));
}

#[test]
fn set_led_on_and_off() {
    let (gateway, sink) = attached_gateway();
    let play = control(Deck::One, ControlKind::Play);
    assert_eq!(None, gateway.led_state(play));

    gateway.set(play, true).unwrap();
    gateway.set(play, false).unwrap();
    // Never Note-Off, never velocity 0
    assert_eq!(
        vec![vec![0x94, 0x00, 0x7f], vec![0x94, 0x00, 0x01]],
        sink.take_sent()
    );
    let state = gateway.led_state(play).unwrap();
    assert_eq!(VELOCITY_OFF, state.velocity);
    assert!(!state.is_lit());
}

#[test]
fn repeated_updates_are_sent_again() {
    let (gateway, sink) = attached_gateway();
    let sync = control(Deck::Two, ControlKind::Sync);
    gateway.set(sync, true).unwrap();
    gateway.set(sync, true).unwrap();
    assert_eq!(
        vec![vec![0x95, 0x02, 0x7f], vec![0x95, 0x02, 0x7f]],
        sink.sent()
    );
}

#[test]
fn velocity_is_clamped() {
    let (gateway, sink) = attached_gateway();
    let cue = control(Deck::One, ControlKind::Cue);
    gateway.set_velocity(cue, 200).unwrap();
    assert_eq!(vec![vec![0x94, 0x05, 0x7f]], sink.sent());
}

#[test]
fn failed_updates_are_recorded() {
    let gateway = gateway();
    let play = control(Deck::One, ControlKind::Play);
    assert!(matches!(
        gateway.set(play, true),
        Err(OutputError::Disconnected)
    ));
    assert_eq!(VELOCITY_ON, gateway.led_state(play).unwrap().velocity);

    let sink = RecordingSink::new();
    sink.set_failing(true);
    gateway.attach(sink.clone());
    assert!(matches!(
        gateway.set(play, false),
        Err(OutputError::Send { .. })
    ));
    assert_eq!(VELOCITY_OFF, gateway.led_state(play).unwrap().velocity);
    assert!(sink.sent().is_empty());
}

#[test]
fn clear_all_turns_off_all_physical_leds() {
    let (gateway, sink) = attached_gateway();
    gateway.clear_all().unwrap();
    let sent = sink.take_sent();
    let num_leds_per_deck = LogicalControl::iter_deck(Deck::One).count();
    assert_eq!(2 * num_leds_per_deck + 6, sent.len());
    assert!(sent
        .iter()
        .all(|bytes| bytes[0] & 0xf0 == 0x90 && bytes[2] == VELOCITY_OFF));
    assert!(Deck::PHYSICAL
        .into_iter()
        .flat_map(LogicalControl::iter_deck)
        .all(|control| gateway.led_state(control).unwrap().velocity == VELOCITY_OFF));
}

#[test]
fn clear_all_includes_virtual_decks_in_use() {
    let (gateway, sink) = attached_gateway();
    let virtual_play = control(Deck::Three, ControlKind::Play);
    gateway.set(virtual_play, true).unwrap();
    sink.take_sent();
    gateway.clear_all().unwrap();
    assert!(sink.sent().contains(&vec![0x96, 0x00, 0x01]));
}

#[test]
fn clear_all_continues_after_errors() {
    let (gateway, sink) = attached_gateway();
    sink.set_failing(true);
    assert!(gateway.clear_all().is_err());
    assert_eq!(
        VELOCITY_OFF,
        gateway
            .led_state(LogicalControl::effect_unit_button(2, 3).unwrap())
            .unwrap()
            .velocity
    );
}

#[test]
fn fast_blinking() {
    let (gateway, sink) = attached_gateway();
    let play = control(Deck::One, ControlKind::Play);
    gateway.enroll_blink(play, BlinkSpeed::Fast);
    assert_eq!(Some(BlinkSpeed::Fast), gateway.blink_speed(play));
    assert!(gateway.led_state(play).unwrap().is_blinking());
    // Nothing is sent before the next tick
    assert!(sink.sent().is_empty());

    for _ in 0..4 {
        gateway.tick_blink().unwrap();
    }
    assert_eq!(vec![0x7f, 0x01, 0x7f, 0x01], velocities(&sink.take_sent()));

    // Stopping restores the lit velocity
    gateway.unenroll_blink(play).unwrap();
    assert_eq!(vec![vec![0x94, 0x00, 0x7f]], sink.take_sent());
    assert_eq!(None, gateway.blink_speed(play));
    gateway.tick_blink().unwrap();
    assert!(sink.sent().is_empty());
}

#[test]
fn slow_blinking_at_half_the_rate() {
    let (gateway, sink) = attached_gateway();
    let keylock = control(Deck::Two, ControlKind::Keylock);
    gateway.enroll_blink(keylock, BlinkSpeed::Slow);
    for _ in 0..5 {
        gateway.tick_blink().unwrap();
    }
    assert_eq!(vec![0x7f, 0x01, 0x7f], velocities(&sink.sent()));
}

#[test]
fn blinking_keeps_the_lit_velocity() {
    let (gateway, sink) = attached_gateway();
    let cue = control(Deck::One, ControlKind::Cue);
    gateway.set_velocity(cue, 0x30).unwrap();
    sink.take_sent();
    gateway.enroll_blink(cue, BlinkSpeed::Fast);
    gateway.tick_blink().unwrap();
    gateway.tick_blink().unwrap();
    gateway.unenroll_blink(cue).unwrap();
    assert_eq!(vec![0x30, 0x01, 0x30], velocities(&sink.sent()));
}

#[test]
fn concurrent_enroll_blinks_the_recorded_velocity() {
    let (gateway, sink) = attached_gateway();
    let cue = control(Deck::One, ControlKind::Cue);
    for velocity in (0x10..0x70).step_by(3) {
        std::thread::scope(|scope| {
            scope.spawn(|| gateway.set_velocity(cue, velocity).unwrap());
            scope.spawn(|| gateway.enroll_blink(cue, BlinkSpeed::Fast));
        });
        let state = gateway.led_state(cue).unwrap();
        if !state.is_blinking() {
            continue;
        }
        assert_eq!(velocity, state.lit_velocity);
        sink.take_sent();
        gateway.tick_blink().unwrap();
        gateway.tick_blink().unwrap();
        let mut blinked = velocities(&sink.take_sent());
        blinked.sort_unstable();
        assert_eq!(vec![VELOCITY_OFF, state.lit_velocity], blinked);
        gateway.unenroll_blink(cue).unwrap();
    }
}

#[test]
fn custom_blink_pattern() {
    let (gateway, sink) = attached_gateway();
    let slip = control(Deck::One, ControlKind::Slip);
    gateway.enroll_blink_with(slip, BlinkSpeed::Slow, |on| if on { 0x40 } else { 0x10 });
    for _ in 0..3 {
        gateway.tick_blink().unwrap();
    }
    assert_eq!(vec![0x40, 0x10], velocities(&sink.sent()));
}

#[test]
fn setting_a_led_stops_blinking() {
    let (gateway, sink) = attached_gateway();
    let play = control(Deck::One, ControlKind::Play);
    gateway.enroll_blink(play, BlinkSpeed::Fast);
    gateway.set(play, false).unwrap();
    assert!(!gateway.led_state(play).unwrap().is_blinking());
    sink.take_sent();
    gateway.tick_blink().unwrap();
    assert!(sink.sent().is_empty());
}

#[test]
fn unenroll_without_blinking_sends_nothing() {
    let (gateway, sink) = attached_gateway();
    gateway
        .unenroll_blink(control(Deck::One, ControlKind::Play))
        .unwrap();
    assert!(sink.sent().is_empty());
}

#[test]
fn no_blinking_while_detached() {
    let gateway = gateway();
    gateway.enroll_blink(control(Deck::One, ControlKind::Play), BlinkSpeed::Fast);
    assert_eq!(None, gateway.tick_blink());
}

#[test]
fn detach_resets_all_leds() {
    let (gateway, _sink) = attached_gateway();
    let play = control(Deck::One, ControlKind::Play);
    gateway.set(play, true).unwrap();
    gateway.enroll_blink(play, BlinkSpeed::Slow);
    assert!(gateway.detach().is_some());
    assert!(!gateway.is_attached());
    let state = gateway.led_state(play).unwrap();
    assert_eq!(VELOCITY_EXTINGUISHED, state.velocity);
    assert!(!state.is_blinking());
    assert_eq!(None, gateway.blink_speed(play));
}

#[test]
fn jog_wheel_rings() {
    let (gateway, sink) = attached_gateway();
    gateway.set_ring(Deck::One, RingType::Spinner, 10).unwrap();
    gateway.set_ring(Deck::One, RingType::Position, 60).unwrap();
    gateway
        .set_ring_percentage(Deck::Two, RingType::Position, 50.0)
        .unwrap();
    gateway.clear_rings(Deck::Two).unwrap();
    assert_eq!(
        vec![
            vec![0xb0, 0x06, 74],
            // Clamped to the maximum position
            vec![0xb0, 0x3f, 52],
            vec![0xb1, 0x3f, 26],
            vec![0xb1, 0x06, 64],
            vec![0xb1, 0x3f, 0],
        ],
        sink.sent()
    );
}

#[test]
fn vu_meters() {
    let (gateway, sink) = attached_gateway();
    gateway.set_vu_meter(Deck::Two, 1.0).unwrap();
    gateway.set_vu_meter(Deck::One, 0.5).unwrap();
    gateway.set_vu_meter(Deck::One, 2.0).unwrap();
    gateway.set_vu_meter(Deck::One, -1.0).unwrap();
    gateway.clear_all_vu_meters().unwrap();
    assert_eq!(
        vec![
            vec![0xb1, 0x1f, 90],
            vec![0xb0, 0x1f, 45],
            vec![0xb0, 0x1f, 90],
            vec![0xb0, 0x1f, 0],
            vec![0xb0, 0x1f, 0],
            vec![0xb1, 0x1f, 0],
        ],
        sink.sent()
    );
}

#[test]
fn display_frames() {
    let (gateway, sink) = attached_gateway();
    gateway.set_bpm_display(Deck::One, 128.5).unwrap();
    gateway.set_time_display(Deck::Two, 90_000).unwrap();
    // 1:30 PM
    gateway.set_clock_display(Deck::Two, 13, 30).unwrap();
    assert_eq!(
        vec![
            vec![0xf0, 0x00, 0x20, 0x7f, 0x01, 0x01, 0x00, 0x00, 0x03, 0x02, 0x03, 0x02, 0xf7],
            vec![
                0xf0, 0x00, 0x20, 0x7f, 0x02, 0x04, 0x08, 0x00, 0x00, 0x01, 0x05, 0x0f, 0x09,
                0x00, 0xf7
            ],
            vec![
                0xf0, 0x00, 0x20, 0x7f, 0x02, 0x04, 0x08, 0x00, 0x00, 0x01, 0x05, 0x0f, 0x09,
                0x00, 0xf7
            ],
        ],
        sink.sent()
    );
}

#[test]
fn device_control_frames() {
    let (gateway, sink) = attached_gateway();
    gateway.enter_demo_mode().unwrap();
    gateway.exit_demo_mode().unwrap();
    gateway.shutdown().unwrap();
    gateway.set_fader_cut_mode(FaderCutMode::Eight).unwrap();
    gateway.set_fader_cut_mode(FaderCutMode::Four).unwrap();
    assert_eq!(
        vec![
            vec![0xf0, 0x7e, 0x00, 0x06, 0x00, 0xf7],
            vec![0xf0, 0x7e, 0x00, 0x06, 0x01, 0xf7],
            vec![0xf0, 0x00, 0x20, 0x7f, 0x02, 0xf7],
            vec![0xf0, 0x00, 0x20, 0x7f, 0x03, 0xf7],
            vec![0xf0, 0x00, 0x20, 0x7f, 0x13, 0xf7],
        ],
        sink.sent()
    );
}

#[test]
fn decode_buttons() {
    let map = default_map();
    let shift = map.shift_bindings();
    let play = control(Deck::One, ControlKind::Play);
    assert_eq!(
        Some(Input::Button {
            control: play,
            input: ButtonInput::Pressed,
            target: None,
        }),
        decode_midi_input(&map, &shift, &[0x90, 0x00, 0x7f])
    );
    // Note-On with velocity 0
    assert_eq!(
        Some(Input::Button {
            control: play,
            input: ButtonInput::Released,
            target: None,
        }),
        decode_midi_input(&map, &shift, &[0x90, 0x00, 0x00])
    );
    assert_eq!(
        Some(Input::Button {
            control: play,
            input: ButtonInput::Released,
            target: None,
        }),
        decode_midi_input(&map, &shift, &[0x80, 0x00, 0x40])
    );
    assert_eq!(
        Some(Input::Button {
            control: control(Deck::Two, ControlKind::Pad(3)),
            input: ButtonInput::Pressed,
            target: None,
        }),
        decode_midi_input(&map, &shift, &[0x95, 22, 0x7f])
    );
}

#[test]
fn decode_shift_before_other_controls() {
    let map = default_map();
    let shift = map.shift_bindings();
    // Shadows the 5th hot cue
    assert_eq!(
        Some(Input::Shift {
            deck: Deck::One,
            input: ButtonInput::Pressed,
        }),
        decode_midi_input(&map, &shift, &[0x90, 0x20, 0x7f])
    );
    assert_eq!(
        Some(Input::Shift {
            deck: Deck::Two,
            input: ButtonInput::Released,
        }),
        decode_midi_input(&map, &shift, &[0x81, 0x20, 0x00])
    );
}

#[test]
fn decode_shiftable_controls() {
    let map = default_map();
    let mut shift = map.shift_bindings();
    let pfl = control(Deck::One, ControlKind::PflCue);
    assert_eq!(
        Some(Input::Button {
            control: pfl,
            input: ButtonInput::Pressed,
            target: Some(Target::Pfl(Deck::One)),
        }),
        decode_midi_input(&map, &shift, &[0x90, 0x1b, 0x7f])
    );
    assert_eq!(
        Some(Input::Knob {
            target: Target::HeadphoneGain,
            input: SliderInput { position: 1.0 },
        }),
        decode_midi_input(&map, &shift, &[0xbf, 0x0c, 0x7f])
    );

    shift.set_shift(Deck::One, true);
    assert_eq!(
        Some(Input::Button {
            control: pfl,
            input: ButtonInput::Pressed,
            target: Some(Target::SlipEnabled(Deck::One)),
        }),
        decode_midi_input(&map, &shift, &[0x90, 0x1b, 0x7f])
    );
    assert_eq!(
        Some(Input::Knob {
            target: Target::HeadphoneMix,
            input: SliderInput { position: 0.0 },
        }),
        decode_midi_input(&map, &shift, &[0xbf, 0x0c, 0x00])
    );
}

#[test]
fn decode_unmapped_input() {
    let map = default_map();
    let shift = map.shift_bindings();
    assert_eq!(
        Some(Input::Unmapped(ShortMessage::NoteOn {
            channel: 0,
            note: 0x7f,
            velocity: 0x7f
        })),
        decode_midi_input(&map, &shift, &[0x90, 0x7f, 0x7f])
    );
    // Faders and jog wheels
    assert_eq!(
        Some(Input::Unmapped(ShortMessage::ControlChange {
            channel: 0x0f,
            control: 0x08,
            value: 0x40
        })),
        decode_midi_input(&map, &shift, &[0xbf, 0x08, 0x40])
    );
    assert_eq!(
        Some(Input::Unmapped(ShortMessage::ControlChange {
            channel: 0,
            control: 0x06,
            value: 0x41
        })),
        decode_midi_input(&map, &shift, &[0xb0, 0x06, 0x41])
    );
}

#[test]
fn decode_invalid_input() {
    let map = default_map();
    let shift = map.shift_bindings();
    assert_eq!(None, decode_midi_input(&map, &shift, &[0x12, 0x00, 0x7f]));
    assert_eq!(None, decode_midi_input(&map, &shift, &[]));
    // Pitch bend
    assert_eq!(None, decode_midi_input(&map, &shift, &[0xe0, 0x00, 0x40]));
    assert_eq!(
        None,
        decode_midi_input(&map, &shift, &[0xf0, 0x00, 0x20, 0x7f, 0xf7])
    );
}

type RecordedInputs = Arc<Mutex<Vec<Input>>>;

fn input_gateway(
    button_led_feedback: bool,
) -> (
    InputGateway<RecordingSink, impl FnMut(InputEvent<Input>) + Send>,
    RecordingSink,
    RecordedInputs,
) {
    let (output, sink) = attached_gateway();
    let inputs = RecordedInputs::default();
    let gateway = InputGateway::new(Arc::new(output), button_led_feedback, {
        let inputs = Arc::clone(&inputs);
        move |event: InputEvent<Input>| inputs.lock().push(event.input)
    });
    (gateway, sink, inputs)
}

#[test]
fn button_led_feedback() {
    let (mut gateway, sink, inputs) = input_gateway(true);
    let ts = TimeStamp::from_micros(1);
    assert!(gateway.handle_midi_input(ts, &[0x91, 0x00, 0x7f]));
    assert!(gateway.handle_midi_input(ts, &[0x91, 0x00, 0x00]));
    assert_eq!(
        vec![vec![0x95, 0x00, 0x7f], vec![0x95, 0x00, 0x01]],
        sink.sent()
    );
    assert_eq!(2, inputs.lock().len());
}

#[test]
fn no_button_led_feedback() {
    let (mut gateway, sink, inputs) = input_gateway(false);
    assert!(gateway.handle_midi_input(TimeStamp::from_micros(1), &[0x91, 0x00, 0x7f]));
    assert!(sink.sent().is_empty());
    assert_eq!(1, inputs.lock().len());
}

#[test]
fn input_gateway_tracks_shift() {
    let (mut gateway, sink, inputs) = input_gateway(true);
    let ts = TimeStamp::from_micros(1);
    assert!(gateway.handle_midi_input(ts, &[0x90, 0x20, 0x7f]));
    assert!(gateway.shift_bindings().is_shifted(Deck::One));
    // No LED for the shift button
    assert!(sink.sent().is_empty());

    assert!(gateway.handle_midi_input(ts, &[0x90, 0x1b, 0x7f]));
    assert_eq!(
        Some(&Input::Button {
            control: control(Deck::One, ControlKind::PflCue),
            input: ButtonInput::Pressed,
            target: Some(Target::SlipEnabled(Deck::One)),
        }),
        inputs.lock().last()
    );

    assert!(gateway.handle_midi_input(ts, &[0x90, 0x20, 0x00]));
    assert!(!gateway.shift_bindings().is_shifted(Deck::One));
}

#[test]
fn unmapped_input_is_forwarded() {
    let (mut gateway, sink, inputs) = input_gateway(true);
    let ts = TimeStamp::from_micros(1);
    assert!(gateway.handle_midi_input(ts, &[0xbf, 0x08, 0x40]));
    assert!(gateway.handle_midi_input(ts, &[0xb0, 0x06, 0x41]));
    assert!(gateway.handle_midi_input(ts, &[0x90, 0x7f, 0x7f]));
    // No LED feedback without a mapped control
    assert!(sink.sent().is_empty());
    let inputs = inputs.lock();
    assert_eq!(3, inputs.len());
    assert!(inputs
        .iter()
        .all(|input| matches!(input, Input::Unmapped(_))));
}

#[test]
fn invalid_input_is_not_handled() {
    let (mut gateway, sink, inputs) = input_gateway(true);
    assert!(!gateway.handle_midi_input(TimeStamp::from_micros(1), &[0x7f]));
    assert!(!gateway.handle_midi_input(TimeStamp::from_micros(2), &[0xe0, 0x00, 0x40]));
    assert!(sink.sent().is_empty());
    assert!(inputs.lock().is_empty());
}

#[test]
fn controller_rejects_invalid_config() {
    let mut config = Config::default();
    config.blink.period_millis = 0;
    assert!(MixtrackPlatinumFx::<RecordingSink>::new(config).is_err());
}

#[test]
fn controller_attach_clears_leds() {
    let controller = MixtrackPlatinumFx::new(Config::default()).unwrap();
    assert_eq!(2, controller.controller_descriptor().num_decks);
    let sink = RecordingSink::new();
    assert!(controller.attach(sink.clone()).unwrap().is_none());
    let sent = sink.sent();
    assert_eq!(Some(&vec![0xf0, 0x7e, 0x00, 0x06, 0x01, 0xf7]), sent.first());
    assert!(sent[1..].iter().all(|bytes| bytes[2] == VELOCITY_OFF));
    assert!(controller.output().is_attached());
}

#[test]
fn controller_lifecycle() {
    let mut controller = MixtrackPlatinumFx::new(Config::default()).unwrap();
    let sink = RecordingSink::new();
    controller.attach(sink.clone()).unwrap();
    sink.take_sent();

    let (sender, queue) = input_queue();
    let (tx, rx) = mpsc::channel();
    controller.start(queue, sender.clone(), move |event: InputEvent<Input>| {
        let _ = tx.send(event.input);
    });
    assert!(controller.is_running());

    assert!(sender.send(TimeStamp::from_micros(1), &[0x90, 0x02, 0x7f]));
    assert_eq!(
        Input::Button {
            control: control(Deck::One, ControlKind::Sync),
            input: ButtonInput::Pressed,
            target: None,
        },
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    );
    // LED feedback is sent before the event is emitted
    assert!(sink.sent().contains(&vec![0x94, 0x02, 0x7f]));

    assert!(controller.detach().is_some());
    assert!(!controller.is_running());
    assert!(!controller.output().is_attached());
}
