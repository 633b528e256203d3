//! Sympathetic string bank: unplayed strings driven by bridge energy.

use alloc::vec::Vec;

use super::waveguide_string::WaveguideString;

const OPEN_STRING_FREQUENCIES: [f32; 4] = [110.0, 146.83, 196.0, 246.94];
const IMPULSE_SAMPLES: usize = 3;

#[derive(Debug)]
pub struct SympatheticStringBank {
    strings: Vec<WaveguideString>,
    impulse_remaining: usize,
    impulse_energy: f32,
    enabled: bool,
    scale: f32,
}

impl SympatheticStringBank {
    pub fn new(sample_rate_hz: f32, string_count: usize) -> Self {
        let count = string_count.max(1);
        let mut strings = Vec::with_capacity(count);
        for index in 0..count {
            let mut string = WaveguideString::new(sample_rate_hz);
            let octave = (index / OPEN_STRING_FREQUENCIES.len() + 1) as f32;
            string.set_frequency(
                OPEN_STRING_FREQUENCIES[index % OPEN_STRING_FREQUENCIES.len()] * octave,
            );
            string.set_damping(0.993);
            string.set_brightness(0.4);
            strings.push(string);
        }
        Self {
            strings,
            impulse_remaining: 0,
            impulse_energy: 0.0,
            enabled: true,
            scale: 0.3 / count as f32,
        }
    }

    pub fn reset(&mut self) {
        for string in self.strings.iter_mut() {
            string.reset();
        }
        self.impulse_remaining = 0;
        self.impulse_energy = 0.0;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Inject a short broadband impulse derived from bridge energy.
    pub fn excite_from_bridge(&mut self, energy: f32) {
        if !self.enabled {
            return;
        }
        self.impulse_remaining = IMPULSE_SAMPLES;
        self.impulse_energy = energy;
    }

    /// Summed bank output. A disabled bank costs one flag check.
    #[inline]
    pub fn process(&mut self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let excitation = if self.impulse_remaining > 0 {
            self.impulse_remaining -= 1;
            self.impulse_energy
        } else {
            0.0
        };
        let mut sum = 0.0;
        for string in self.strings.iter_mut() {
            sum += string.process(excitation, 0.0);
        }
        sum * self.scale
    }
}
