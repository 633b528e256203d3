//! Engine-level tests: events, polyphony, presets and determinism.


use luthier_dsp::engine::StringEngine;
use luthier_dsp::fx::{DiodeType, Pedal, RatDistortion};
use luthier_dsp::physical_modelling::articulation::Articulation;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 32;

fn render(engine: &mut StringEngine, num_samples: usize) -> Vec<f32> {
    let mut left = vec![0.0f32; num_samples];
    let mut right = vec![0.0f32; num_samples];
    {
        let mut outputs = [&mut left[..], &mut right[..]];
        engine.process(&mut outputs);
    }
    assert_eq!(left, right);
    left
}

#[test]
fn identical_event_sequences_are_deterministic() {
    let run = || {
        let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
        engine.note_on(60, 0.8);
        let mut data = render(&mut engine, 2048);
        engine.note_on(67, 0.6);
        data.extend(render(&mut engine, 2048));
        engine.note_off(60);
        data.extend(render(&mut engine, 2048));
        data
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_restores_the_post_construction_state() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    let first = render(&mut engine, 2048);

    engine.reset();
    assert_eq!(engine.voices().active_voice_count(), 0);
    engine.note_on(60, 0.8);
    let second = render(&mut engine, 2048);
    assert_eq!(first, second);
}

#[test]
fn note_69_tunes_the_string_to_440_hz() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(69, 1.0);
    let voice = &engine.voices().voices()[0];
    assert!((voice.string().delay_samples() - SAMPLE_RATE / 440.0).abs() < 1e-3);
}

#[test]
fn single_note_scenario_produces_sound() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    let data = render(&mut engine, 512);
    assert!(data.iter().any(|s| *s != 0.0));
    assert!(data.iter().all(|s| s.is_finite()));
    assert_eq!(engine.voices().active_voice_count(), 1);

    wav_writer::write("engine/single_note.wav", &data, SAMPLE_RATE as u32).ok();
}

#[test]
fn master_volume_zero_renders_exact_silence() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    engine.set_parameter("masterVolume", 0.0);
    let data = render(&mut engine, 512);
    assert!(data.iter().all(|s| *s == 0.0));
}

#[test]
fn idle_engine_renders_exact_silence() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    let data = render(&mut engine, 512);
    assert!(data.iter().all(|s| *s == 0.0));
}

#[test]
fn polyphony_is_bounded_by_the_pool() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    for note in [60u8, 62, 64, 65, 67, 69] {
        engine.note_on(note, 0.8);
        render(&mut engine, BLOCK_SIZE);
    }
    assert_eq!(engine.voices().active_voice_count(), 6);

    engine.note_on(71, 0.8);
    assert_eq!(engine.voices().active_voice_count(), 6);
    let notes: Vec<u8> = engine
        .voices()
        .voices()
        .iter()
        .map(|voice| voice.note())
        .collect();
    assert!(notes.contains(&71));
    assert!(!notes.contains(&60));
}

#[test]
fn stealing_reassigns_the_oldest_voice_with_a_fresh_crossfade() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    for note in [60u8, 62, 64, 65, 67, 69] {
        engine.note_on(note, 0.8);
        render(&mut engine, BLOCK_SIZE);
    }

    // The first voice holds the oldest note and gets stolen.
    engine.note_on(71, 0.8);
    let stolen = &engine.voices().voices()[0];
    assert_eq!(stolen.note(), 71);
    assert_eq!(stolen.age(), 0.0);
    assert_eq!(stolen.articulation().state(), Articulation::AttackPluck);

    // Retriggering force-reset the crossfade: the fade starts from scratch.
    let (previous_gain, current_gain) = stolen.articulation().gains();
    assert!((previous_gain - 1.0).abs() < 1e-6);
    assert!(current_gain.abs() < 1e-6);
}

#[test]
fn note_off_releases_into_the_damp_window() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    render(&mut engine, 4800);

    engine.note_off(60);
    assert_eq!(
        engine.voices().voices()[0].articulation().state(),
        Articulation::ReleaseDamp
    );
    assert_eq!(engine.voices().active_voice_count(), 1);

    // The damp release lasts 300ms plus the crossfade tail.
    render(&mut engine, (0.35 * SAMPLE_RATE) as usize);
    assert_eq!(engine.voices().active_voice_count(), 0);
}

#[test]
fn preset_round_trip_reproduces_all_documented_parameters() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    let values = [
        ("masterVolume", 0.7),
        ("damping", 0.993),
        ("brightness", 0.65),
        ("stiffness", 0.25),
        ("dispersion", 0.45),
        ("sympatheticCoupling", 0.55),
        ("material", 2.0),
        ("bodyPreset", 1.0),
    ];
    for (id, value) in values {
        engine.set_parameter(id, value);
    }
    let json = engine.save_preset();

    let mut restored = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    restored.load_preset(&json).unwrap();
    for (id, value) in values {
        assert!(
            (restored.get_parameter(id) - value).abs() < 1e-5,
            "{id} did not round-trip"
        );
    }
}

#[test]
fn malformed_presets_leave_parameters_untouched() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.set_parameter("brightness", 0.9);
    assert!(engine.load_preset("{not json").is_err());
    assert_eq!(engine.get_parameter("brightness"), 0.9);
}

#[test]
fn unknown_and_missing_preset_keys_are_ignored() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.set_parameter("brightness", 0.9);
    engine.set_parameter("damping", 0.95);
    engine
        .load_preset(r#"{"damping":0.98,"wahWah":1.0}"#)
        .unwrap();
    assert!((engine.get_parameter("damping") - 0.98).abs() < 1e-6);
    assert_eq!(engine.get_parameter("brightness"), 0.9);
}

#[test]
fn out_of_range_events_and_parameters_are_safe() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(200, 0.8);
    assert_eq!(engine.voices().active_voice_count(), 0);

    engine.set_parameter("nonexistent", 5.0);
    assert_eq!(engine.get_parameter("nonexistent"), 0.0);

    engine.set_parameter("masterVolume", 7.0);
    assert_eq!(engine.get_parameter("masterVolume"), 1.0);
    engine.set_parameter("damping", 0.0);
    assert_eq!(engine.get_parameter("damping"), 0.9);
}

#[test]
fn reset_silences_the_pool() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    render(&mut engine, 256);

    engine.reset();
    assert_eq!(engine.voices().active_voice_count(), 0);
    let data = render(&mut engine, 256);
    assert!(data.iter().all(|s| *s == 0.0));
}

#[test]
fn pedalboard_shapes_the_mix() {
    let mut clean = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    clean.note_on(60, 0.9);
    let clean_data = render(&mut clean, 2048);

    let mut driven = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    driven.pedalboard_mut().set_pedal(
        0,
        Pedal::Rat(RatDistortion::new(SAMPLE_RATE, DiodeType::Germanium)),
    );
    driven.pedalboard_mut().set_enabled(0, true);
    driven.pedalboard_mut().set_drive(0, 0.9);
    driven.note_on(60, 0.9);
    let driven_data = render(&mut driven, 2048);

    assert!(clean_data != driven_data);
    assert!(driven_data.iter().all(|s| s.is_finite()));
}

#[test]
fn sympathetic_coupling_parameter_changes_the_mix() {
    let run = |coupling: f32| {
        let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
        engine.set_parameter("sympatheticCoupling", coupling);
        engine.note_on(48, 1.0);
        render(&mut engine, 9600)
    };
    assert!(run(0.0) != run(1.0));
}

#[test]
fn note_to_frequency_is_equal_tempered() {
    use luthier_dsp::voice::note_to_frequency;
    assert_eq!(note_to_frequency(69), 440.0);
    assert!((note_to_frequency(81) - 880.0).abs() < 1e-3);
    assert!((note_to_frequency(57) - 220.0).abs() < 1e-3);
}

#[test]
fn a_voice_renders_standalone_with_its_local_bridge() {
    let mut voice = luthier_dsp::voice::Voice::new(SAMPLE_RATE);
    voice.note_on(57, 0.9);
    let mut out = vec![0.0f32; 1024];
    voice.render(None, 0, 0.0, &mut out);
    assert!(voice.active());
    assert!(out.iter().any(|s| *s != 0.0));
    assert!(out.iter().all(|s| s.is_finite()));
}

#[test]
fn process_fills_arbitrary_buffer_sizes() {
    let mut engine = StringEngine::new(SAMPLE_RATE, BLOCK_SIZE);
    engine.note_on(60, 0.8);
    // Not a multiple of the internal block size.
    let data = render(&mut engine, 481);
    assert_eq!(data.len(), 481);
    assert!(data.iter().any(|s| *s != 0.0));
}
