//! Excitation articulation: a finite-state machine with crossfaded
//! transitions and a pre-rendered exciter ring.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::utils::random::NoiseSource;

pub const EXCITER_CAPACITY: usize = 128;

const NOISE_SEED: u32 = 0x21;

const ATTACK_PLUCK_SECONDS: f32 = 0.05;
const DECAY_SECONDS: f32 = 1.0;
const RELEASE_GHOST_SECONDS: f32 = 2.0;
const RELEASE_DAMP_SECONDS: f32 = 0.3;

const PLUCK_SAMPLES: usize = 10;
const SCRAPE_SAMPLES: usize = 20;
const HARMONIC_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Articulation {
    #[default]
    Idle,
    AttackPluck,
    Decay,
    SustainBow,
    ReleaseGhost,
    ReleaseDamp,
}

/// Timer-driven transition table. SustainBow holds until an external damp
/// trigger; Idle has no timed successor.
pub fn next_state(state: Articulation, elapsed_seconds: f32) -> Option<Articulation> {
    match state {
        Articulation::AttackPluck if elapsed_seconds >= ATTACK_PLUCK_SECONDS => {
            Some(Articulation::Decay)
        }
        Articulation::Decay if elapsed_seconds >= DECAY_SECONDS => Some(Articulation::ReleaseGhost),
        Articulation::ReleaseGhost if elapsed_seconds >= RELEASE_GHOST_SECONDS => {
            Some(Articulation::Idle)
        }
        Articulation::ReleaseDamp if elapsed_seconds >= RELEASE_DAMP_SECONDS => {
            Some(Articulation::Idle)
        }
        _ => None,
    }
}

fn state_level(state: Articulation) -> f32 {
    match state {
        Articulation::Idle => 0.0,
        Articulation::AttackPluck => 1.0,
        Articulation::Decay => 0.85,
        Articulation::SustainBow => 1.0,
        Articulation::ReleaseGhost => 0.4,
        Articulation::ReleaseDamp => 0.15,
    }
}

#[derive(Debug)]
pub struct Articulator {
    state: Articulation,
    previous_state: Articulation,
    state_time: f32,
    crossfade_time: f32,
    crossfade_progress: f32,
    exciter: [f32; EXCITER_CAPACITY],
    exciter_len: usize,
    exciter_pos: usize,
    bow_pressure: f32,
    velocity: f32,
    noise: NoiseSource,
    inv_sr: f32,
}

impl Articulator {
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            state: Articulation::Idle,
            previous_state: Articulation::Idle,
            state_time: 0.0,
            crossfade_time: 0.01,
            crossfade_progress: 1.0,
            exciter: [0.0; EXCITER_CAPACITY],
            exciter_len: 0,
            exciter_pos: 0,
            bow_pressure: 0.0,
            velocity: 0.0,
            noise: NoiseSource::new(NOISE_SEED),
            inv_sr: 1.0 / sample_rate_hz,
        }
    }

    pub fn reset(&mut self) {
        self.state = Articulation::Idle;
        self.previous_state = Articulation::Idle;
        self.state_time = 0.0;
        self.crossfade_progress = 1.0;
        self.exciter_len = 0;
        self.exciter_pos = 0;
        self.bow_pressure = 0.0;
        self.velocity = 0.0;
        // Reseeding keeps the synthesized excitation shapes fixed, so a
        // given trigger always produces the same burst.
        self.noise.reseed(NOISE_SEED);
    }

    pub fn set_crossfade_time(&mut self, seconds: f32) {
        self.crossfade_time = seconds.max(0.001);
    }

    pub fn state(&self) -> Articulation {
        self.state
    }

    /// True once the machine reached Idle and the final fade-out completed.
    pub fn is_finished(&self) -> bool {
        self.state == Articulation::Idle && self.crossfade_progress >= 1.0
    }

    fn change_state(&mut self, next: Articulation) {
        self.previous_state = self.state;
        self.state = next;
        self.state_time = 0.0;
        self.crossfade_progress = 0.0;
    }

    /// 10-sample decaying noise burst.
    pub fn trigger_pluck(&mut self, velocity: f32) {
        let velocity = velocity.clamp(0.0, 1.0);
        self.velocity = velocity;
        let gain = (velocity * 1.5).min(1.0);
        for i in 0..PLUCK_SAMPLES {
            let decay = 1.0 - i as f32 / PLUCK_SAMPLES as f32;
            self.exciter[i] = self.noise.next_bipolar() * gain * decay;
        }
        self.exciter_len = PLUCK_SAMPLES;
        self.exciter_pos = 0;
        self.change_state(Articulation::AttackPluck);
    }

    /// Continuous excitation, re-rolled every tick while sustained.
    pub fn trigger_bow(&mut self, velocity: f32, pressure: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
        self.bow_pressure = pressure.clamp(0.0, 1.0);
        self.exciter_len = 0;
        self.exciter_pos = 0;
        self.change_state(Articulation::SustainBow);
    }

    /// 20 samples of noise with linear decay.
    pub fn trigger_scrape(&mut self, velocity: f32) {
        let velocity = velocity.clamp(0.0, 1.0);
        self.velocity = velocity;
        for i in 0..SCRAPE_SAMPLES {
            let decay = 1.0 - i as f32 / SCRAPE_SAMPLES as f32;
            self.exciter[i] = self.noise.next_bipolar() * velocity * decay;
        }
        self.exciter_len = SCRAPE_SAMPLES;
        self.exciter_pos = 0;
        self.change_state(Articulation::AttackPluck);
    }

    /// 100-sample sine burst at twice the reference frequency.
    pub fn trigger_harmonic(&mut self, velocity: f32, reference_frequency: f32) {
        let velocity = velocity.clamp(0.0, 1.0);
        self.velocity = velocity;
        let phase_increment = core::f32::consts::TAU * 2.0 * reference_frequency * self.inv_sr;
        for i in 0..HARMONIC_SAMPLES {
            self.exciter[i] = (phase_increment * i as f32).sin() * velocity;
        }
        self.exciter_len = HARMONIC_SAMPLES;
        self.exciter_pos = 0;
        self.change_state(Articulation::AttackPluck);
    }

    /// Mute without new excitation; reachable from any active state.
    pub fn trigger_damp(&mut self) {
        if self.state != Articulation::Idle {
            self.change_state(Articulation::ReleaseDamp);
        }
    }

    /// Advance the machine by one sample and return this tick's excitation.
    #[inline]
    pub fn next_excitation(&mut self) -> f32 {
        self.state_time += self.inv_sr;
        if let Some(next) = next_state(self.state, self.state_time) {
            self.change_state(next);
        }
        if self.crossfade_progress < 1.0 {
            self.crossfade_progress =
                (self.crossfade_progress + self.inv_sr / self.crossfade_time).min(1.0);
        }

        match self.state {
            Articulation::Idle => 0.0,
            Articulation::SustainBow => self.noise.next_bipolar() * self.bow_pressure * self.velocity,
            _ => {
                if self.exciter_pos < self.exciter_len {
                    let sample = self.exciter[self.exciter_pos];
                    self.exciter_pos += 1;
                    sample
                } else {
                    0.0
                }
            }
        }
    }

    /// Equal-power gains of the outgoing and incoming state.
    #[inline]
    pub fn gains(&self) -> (f32, f32) {
        let angle = self.crossfade_progress * core::f32::consts::FRAC_PI_2;
        (angle.cos(), angle.sin())
    }

    /// Audible level: previous and current state levels blended through the
    /// equal-power crossfade.
    #[inline]
    pub fn level(&self) -> f32 {
        let (previous_gain, current_gain) = self.gains();
        state_level(self.previous_state) * previous_gain + state_level(self.state) * current_gain
    }
}
