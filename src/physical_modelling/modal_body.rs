//! Modal body resonance: a bank of decaying sinusoid modes populated from
//! named instrument-body presets.

#[allow(unused_imports)]
use num_traits::float::Float;

use alloc::vec::Vec;
use core::f32::consts::{PI, TAU};

pub const MIN_Q: f32 = 5.0;
pub const MAX_Q: f32 = 200.0;

const BASE_Q: f32 = 60.0;
const MAX_MODES: usize = 10;
const ENERGY_LIMIT: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPreset {
    #[default]
    Guitar,
    Piano,
    OrchestralString,
}

impl BodyPreset {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Guitar,
            1 => Self::Piano,
            _ => Self::OrchestralString,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Guitar => 0,
            Self::Piano => 1,
            Self::OrchestralString => 2,
        }
    }

    fn seeds(self) -> &'static [ModeSeed] {
        match self {
            Self::Guitar => &GUITAR_MODES,
            Self::Piano => &PIANO_MODES,
            Self::OrchestralString => &ORCHESTRAL_STRING_MODES,
        }
    }

    fn material_factor(self) -> f32 {
        match self {
            Self::Guitar => 1.0,
            Self::Piano => 1.4,
            Self::OrchestralString => 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Material {
    Spruce,
    #[default]
    Maple,
    Carbon,
    Metal,
}

impl Material {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Spruce,
            1 => Self::Maple,
            2 => Self::Carbon,
            _ => Self::Metal,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Spruce => 0,
            Self::Maple => 1,
            Self::Carbon => 2,
            Self::Metal => 3,
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            Self::Spruce => 0.85,
            Self::Maple => 1.0,
            Self::Carbon => 1.3,
            Self::Metal => 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ModeSeed {
    frequency: f32,
    amplitude: f32,
    decay: f32,
}

const GUITAR_MODES: [ModeSeed; 8] = [
    ModeSeed { frequency: 95.0, amplitude: 1.0, decay: 0.96 },
    ModeSeed { frequency: 190.0, amplitude: 0.82, decay: 0.93 },
    ModeSeed { frequency: 245.0, amplitude: 0.70, decay: 0.90 },
    ModeSeed { frequency: 310.0, amplitude: 0.55, decay: 0.88 },
    ModeSeed { frequency: 420.0, amplitude: 0.42, decay: 0.85 },
    ModeSeed { frequency: 560.0, amplitude: 0.30, decay: 0.82 },
    ModeSeed { frequency: 740.0, amplitude: 0.20, decay: 0.80 },
    ModeSeed { frequency: 980.0, amplitude: 0.12, decay: 0.78 },
];

const PIANO_MODES: [ModeSeed; 10] = [
    ModeSeed { frequency: 50.0, amplitude: 1.0, decay: 0.97 },
    ModeSeed { frequency: 98.0, amplitude: 0.85, decay: 0.9555 },
    ModeSeed { frequency: 152.0, amplitude: 0.7225, decay: 0.9411 },
    ModeSeed { frequency: 210.0, amplitude: 0.6141, decay: 0.927 },
    ModeSeed { frequency: 285.0, amplitude: 0.522, decay: 0.9131 },
    ModeSeed { frequency: 370.0, amplitude: 0.4437, decay: 0.8994 },
    ModeSeed { frequency: 480.0, amplitude: 0.3771, decay: 0.8859 },
    ModeSeed { frequency: 620.0, amplitude: 0.3206, decay: 0.8726 },
    ModeSeed { frequency: 800.0, amplitude: 0.2725, decay: 0.8595 },
    ModeSeed { frequency: 1020.0, amplitude: 0.2316, decay: 0.8466 },
];

const ORCHESTRAL_STRING_MODES: [ModeSeed; 8] = [
    ModeSeed { frequency: 280.0, amplitude: 0.9, decay: 0.94 },
    ModeSeed { frequency: 455.0, amplitude: 1.0, decay: 0.95 },
    ModeSeed { frequency: 620.0, amplitude: 0.75, decay: 0.91 },
    ModeSeed { frequency: 760.0, amplitude: 0.60, decay: 0.89 },
    ModeSeed { frequency: 985.0, amplitude: 0.45, decay: 0.86 },
    ModeSeed { frequency: 1220.0, amplitude: 0.32, decay: 0.84 },
    ModeSeed { frequency: 1540.0, amplitude: 0.22, decay: 0.81 },
    ModeSeed { frequency: 1960.0, amplitude: 0.15, decay: 0.79 },
];

/// One decaying sinusoidal body mode.
#[derive(Debug, Clone)]
pub struct ModalMode {
    frequency: f32,
    amplitude: f32,
    base_amplitude: f32,
    decay: f32,
    mode_index: usize,
    material_factor: f32,
    q: f32,
    decay_coefficient: f32,
    phase_increment: f32,
    phase: f32,
    energy: f32,
}

impl ModalMode {
    fn new(
        seed: ModeSeed,
        mode_index: usize,
        material_factor: f32,
        damping: f32,
        structure_mod: f32,
        sample_rate_hz: f32,
    ) -> Self {
        let frequency_damping = 1.0 + seed.frequency / 5000.0;
        let mode_damping = 1.0 + 0.15 * mode_index as f32;
        let damping_scale = 0.25 + 1.5 * damping;
        let q = (BASE_Q * material_factor * damping_scale
            / (frequency_damping * mode_damping * structure_mod))
            .clamp(MIN_Q, MAX_Q);
        let decay_coefficient = (-PI * seed.frequency / (q * seed.decay * sample_rate_hz)).exp();

        Self {
            frequency: seed.frequency,
            amplitude: seed.amplitude,
            base_amplitude: seed.amplitude,
            decay: seed.decay,
            mode_index,
            material_factor,
            q,
            decay_coefficient,
            phase_increment: TAU * seed.frequency / sample_rate_hz,
            phase: 0.0,
            energy: 0.0,
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.energy = 0.0;
    }

    #[inline]
    fn excite(&mut self, energy: f32) {
        self.energy = (self.energy + energy).clamp(-ENERGY_LIMIT, ENERGY_LIMIT);
    }

    #[inline]
    fn process(&mut self) -> f32 {
        self.energy *= self.decay_coefficient;
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.energy * self.phase.sin() * self.amplitude
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn base_amplitude(&self) -> f32 {
        self.base_amplitude
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn mode_index(&self) -> usize {
        self.mode_index
    }

    pub fn material_factor(&self) -> f32 {
        self.material_factor
    }

    pub fn q(&self) -> f32 {
        self.q
    }
}

/// Instrument-body response as a sum of modes. Modes are created in batches
/// by the presets and rebuilt whenever damping, structure or material
/// change.
#[derive(Debug)]
pub struct ModalBodyBank {
    modes: Vec<ModalMode>,
    preset: BodyPreset,
    material: Material,
    damping: f32,
    structure_mod: f32,
    inv_mode_count: f32,
    sample_rate_hz: f32,
}

impl ModalBodyBank {
    pub fn new(sample_rate_hz: f32, preset: BodyPreset) -> Self {
        let mut bank = Self {
            modes: Vec::with_capacity(MAX_MODES),
            preset,
            material: Material::default(),
            damping: 0.5,
            structure_mod: 1.0,
            inv_mode_count: 1.0,
            sample_rate_hz,
        };
        bank.repopulate();
        bank
    }

    pub fn load(&mut self, preset: BodyPreset) {
        self.preset = preset;
        self.repopulate();
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.repopulate();
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
        self.repopulate();
    }

    pub fn set_structure(&mut self, structure_mod: f32) {
        self.structure_mod = structure_mod.clamp(0.5, 2.0);
        self.repopulate();
    }

    pub fn reset(&mut self) {
        for mode in self.modes.iter_mut() {
            mode.reset();
        }
    }

    pub fn preset(&self) -> BodyPreset {
        self.preset
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn modes(&self) -> &[ModalMode] {
        &self.modes
    }

    fn repopulate(&mut self) {
        self.modes.clear();
        let material_factor = self.preset.material_factor() * self.material.factor();
        for (index, seed) in self.preset.seeds().iter().enumerate() {
            self.modes.push(ModalMode::new(
                *seed,
                index,
                material_factor,
                self.damping,
                self.structure_mod,
                self.sample_rate_hz,
            ));
        }
        self.inv_mode_count = 1.0 / self.modes.len() as f32;
    }

    #[inline]
    pub fn excite(&mut self, energy: f32) {
        for mode in self.modes.iter_mut() {
            mode.excite(energy * mode.base_amplitude);
        }
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        let mut sum = 0.0;
        for mode in self.modes.iter_mut() {
            sum += mode.process();
        }
        sum * self.inv_mode_count
    }
}
