//! Tests for the articulation state machine.

use luthier_dsp::physical_modelling::articulation::{next_state, Articulation, Articulator};

const SAMPLE_RATE: f32 = 48000.0;

fn step(articulator: &mut Articulator, seconds: f32) {
    for _ in 0..(seconds * SAMPLE_RATE) as usize {
        articulator.next_excitation();
    }
}

#[test]
fn transition_table_covers_every_state() {
    use Articulation::*;

    assert_eq!(next_state(Idle, 100.0), None);
    assert_eq!(next_state(AttackPluck, 0.049), None);
    assert_eq!(next_state(AttackPluck, 0.051), Some(Decay));
    assert_eq!(next_state(Decay, 0.9), None);
    assert_eq!(next_state(Decay, 1.0), Some(ReleaseGhost));
    assert_eq!(next_state(SustainBow, 100.0), None);
    assert_eq!(next_state(ReleaseGhost, 1.9), None);
    assert_eq!(next_state(ReleaseGhost, 2.0), Some(Idle));
    assert_eq!(next_state(ReleaseDamp, 0.29), None);
    assert_eq!(next_state(ReleaseDamp, 0.31), Some(Idle));
}

#[test]
fn pluck_walks_the_full_state_path() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_pluck(0.8);
    assert_eq!(articulator.state(), Articulation::AttackPluck);

    step(&mut articulator, 0.06);
    assert_eq!(articulator.state(), Articulation::Decay);
    step(&mut articulator, 1.01);
    assert_eq!(articulator.state(), Articulation::ReleaseGhost);
    step(&mut articulator, 2.01);
    assert_eq!(articulator.state(), Articulation::Idle);
    step(&mut articulator, 0.02);
    assert!(articulator.is_finished());
}

#[test]
fn bow_holds_until_damped() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_bow(0.9, 0.7);
    assert_eq!(articulator.state(), Articulation::SustainBow);
    step(&mut articulator, 1.0);
    assert_eq!(articulator.state(), Articulation::SustainBow);

    articulator.trigger_damp();
    assert_eq!(articulator.state(), Articulation::ReleaseDamp);
    step(&mut articulator, 0.31);
    assert_eq!(articulator.state(), Articulation::Idle);
}

#[test]
fn damp_is_reachable_from_every_active_state() {
    for setup in 0..4 {
        let mut articulator = Articulator::new(SAMPLE_RATE);
        match setup {
            0 => articulator.trigger_pluck(0.5),
            1 => {
                articulator.trigger_pluck(0.5);
                step(&mut articulator, 0.06);
                assert_eq!(articulator.state(), Articulation::Decay);
            }
            2 => articulator.trigger_bow(0.5, 0.5),
            _ => {
                articulator.trigger_pluck(0.5);
                step(&mut articulator, 1.1);
                assert_eq!(articulator.state(), Articulation::ReleaseGhost);
            }
        }
        articulator.trigger_damp();
        assert_eq!(articulator.state(), Articulation::ReleaseDamp);
    }
}

#[test]
fn damp_on_an_idle_machine_is_a_no_op() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_damp();
    assert_eq!(articulator.state(), Articulation::Idle);
}

#[test]
fn crossfade_gains_conserve_power() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_pluck(1.0);
    for _ in 0..2048 {
        let (previous_gain, current_gain) = articulator.gains();
        let power = previous_gain * previous_gain + current_gain * current_gain;
        assert!((power - 1.0).abs() < 1e-5);
        articulator.next_excitation();
    }
}

#[test]
fn crossfade_resets_on_every_state_change() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_pluck(1.0);
    let (previous_gain, current_gain) = articulator.gains();
    assert!((previous_gain - 1.0).abs() < 1e-6);
    assert!(current_gain.abs() < 1e-6);

    // 5ms into the Decay crossfade the fade is only half done.
    step(&mut articulator, 0.055);
    assert_eq!(articulator.state(), Articulation::Decay);
    let (_, current_gain) = articulator.gains();
    assert!(current_gain > 0.0);
    assert!(current_gain < 1.0);
}

#[test]
fn pluck_burst_is_ten_samples() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_pluck(1.0);
    let burst: Vec<f32> = (0..16).map(|_| articulator.next_excitation()).collect();
    assert!(burst[..10].iter().filter(|s| **s != 0.0).count() >= 8);
    assert!(burst[10..].iter().all(|s| *s == 0.0));
    assert!(burst.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn pluck_gain_scales_with_velocity() {
    let mut soft = Articulator::new(SAMPLE_RATE);
    soft.trigger_pluck(0.1);
    let soft_peak = (0..10)
        .map(|_| soft.next_excitation().abs())
        .fold(0.0f32, f32::max);
    assert!(soft_peak <= 0.1 * 1.5 + 1e-6);
}

#[test]
fn bow_excitation_regenerates_every_tick() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_bow(1.0, 1.0);
    let a = articulator.next_excitation();
    let b = articulator.next_excitation();
    let c = articulator.next_excitation();
    assert!(a != b || b != c);
    assert!(a.abs() <= 1.0);
}

#[test]
fn scrape_and_harmonic_fill_their_documented_lengths() {
    let mut articulator = Articulator::new(SAMPLE_RATE);
    articulator.trigger_scrape(1.0);
    let scrape: Vec<f32> = (0..32).map(|_| articulator.next_excitation()).collect();
    assert!(scrape[..20].iter().filter(|s| **s != 0.0).count() >= 16);
    assert!(scrape[20..].iter().all(|s| *s == 0.0));

    articulator.reset();
    articulator.trigger_harmonic(0.5, 220.0);
    let harmonic: Vec<f32> = (0..128).map(|_| articulator.next_excitation()).collect();
    assert!(harmonic[..100].iter().any(|s| *s != 0.0));
    assert!(harmonic[100..].iter().all(|s| *s == 0.0));
    assert!(harmonic.iter().all(|s| s.abs() <= 0.5 + 1e-6));
}
