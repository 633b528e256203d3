//! Waveguide string: a delay line with filtered, saturated feedback.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::utils::crossfade;
use crate::utils::delay_line::DelayLine;
use crate::utils::filter::{DcBlocker, FilterMode, FrequencyApproximation, OnePole};

pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 20_000.0;

const DISPERSION_STAGES: usize = 3;
const REFERENCE_IMPEDANCE: f32 = 1000.0;

/// Physical string gauge, mapped to bridge impedance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringGauge {
    Thin,
    #[default]
    Normal,
    Thick,
    Massive,
}

impl StringGauge {
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            StringGauge::Thin => 0.5,
            StringGauge::Normal => 1.0,
            StringGauge::Thick => 1.5,
            StringGauge::Massive => 2.0,
        }
    }
}

/// String parameters. Every setter clamps its input, so no invalid state is
/// reachable.
#[derive(Debug, Clone)]
pub struct StringParams {
    frequency: f32,
    damping: f32,
    stiffness: f32,
    brightness: f32,
    bridge_coupling: f32,
    nonlinearity: f32,
    dispersion: f32,
    sympathetic_coupling: f32,
    string_length_meters: f32,
    gauge: StringGauge,
    pick_position: f32,
}

impl Default for StringParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            damping: 0.996,
            stiffness: 0.1,
            brightness: 0.5,
            bridge_coupling: 0.5,
            nonlinearity: 0.2,
            dispersion: 0.2,
            sympathetic_coupling: 0.3,
            string_length_meters: 0.65,
            gauge: StringGauge::Normal,
            pick_position: 0.28,
        }
    }
}

impl StringParams {
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.9, 1.0);
    }

    pub fn set_stiffness(&mut self, stiffness: f32) {
        self.stiffness = stiffness.clamp(0.0, 0.5);
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness.clamp(0.0, 1.0);
    }

    pub fn set_bridge_coupling(&mut self, coupling: f32) {
        self.bridge_coupling = coupling.clamp(0.0, 1.0);
    }

    pub fn set_nonlinearity(&mut self, nonlinearity: f32) {
        self.nonlinearity = nonlinearity.clamp(0.0, 1.0);
    }

    pub fn set_dispersion(&mut self, dispersion: f32) {
        self.dispersion = dispersion.clamp(0.0, 1.0);
    }

    pub fn set_sympathetic_coupling(&mut self, coupling: f32) {
        self.sympathetic_coupling = coupling.clamp(0.0, 1.0);
    }

    pub fn set_string_length_meters(&mut self, length: f32) {
        self.string_length_meters = length.max(0.01);
    }

    pub fn set_gauge(&mut self, gauge: StringGauge) {
        self.gauge = gauge;
    }

    pub fn set_pick_position(&mut self, position: f32) {
        self.pick_position = position.clamp(0.0, 1.0);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn bridge_coupling(&self) -> f32 {
        self.bridge_coupling
    }

    pub fn nonlinearity(&self) -> f32 {
        self.nonlinearity
    }

    pub fn dispersion(&self) -> f32 {
        self.dispersion
    }

    pub fn sympathetic_coupling(&self) -> f32 {
        self.sympathetic_coupling
    }

    pub fn string_length_meters(&self) -> f32 {
        self.string_length_meters
    }

    pub fn gauge(&self) -> StringGauge {
        self.gauge
    }

    pub fn pick_position(&self) -> f32 {
        self.pick_position
    }
}

/// One vibrating string.
///
/// Per-sample loop: delayed sample, stiffness allpass, three dispersion
/// allpass stages blended with the undispersed signal, damping lowpass,
/// sympathetic injection, impedance-scaled tanh bridge reflection written
/// back into the delay line. The audible output is the tap taken before the
/// reflection nonlinearity.
#[derive(Debug)]
pub struct WaveguideString {
    params: StringParams,
    delay: DelayLine,
    stiffness_allpass: OnePole,
    dispersion_stages: [OnePole; DISPERSION_STAGES],
    damping_filter: OnePole,
    dc_blocker: DcBlocker,
    loop_gain: f32,
    impedance_scale: f32,
    pick_gain: f32,
    sample_rate_hz: f32,
    inv_sr: f32,
}

impl WaveguideString {
    pub fn new(sample_rate_hz: f32) -> Self {
        let max_delay = (sample_rate_hz / MIN_FREQUENCY) as usize + 4;
        let mut string = Self {
            params: StringParams::default(),
            delay: DelayLine::new(max_delay),
            stiffness_allpass: OnePole::new(),
            dispersion_stages: [OnePole::new(), OnePole::new(), OnePole::new()],
            damping_filter: OnePole::new(),
            dc_blocker: DcBlocker::new(1.0 - 20.0 / sample_rate_hz),
            loop_gain: 0.0,
            impedance_scale: 1.0,
            pick_gain: 1.0,
            sample_rate_hz,
            inv_sr: 1.0 / sample_rate_hz,
        };
        string.update_coefficients();
        string
    }

    pub fn reset(&mut self) {
        self.delay.reset();
        self.stiffness_allpass.reset();
        for stage in self.dispersion_stages.iter_mut() {
            stage.reset();
        }
        self.damping_filter.reset();
        self.dc_blocker.reset();
    }

    pub fn params(&self) -> &StringParams {
        &self.params
    }

    pub fn set_params(&mut self, params: StringParams) {
        self.params = params;
        self.update_coefficients();
    }

    /// Recomputes the delay length as `sample_rate / frequency`.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.params.set_frequency(frequency);
        self.update_coefficients();
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.params.set_damping(damping);
        self.update_coefficients();
    }

    pub fn set_stiffness(&mut self, stiffness: f32) {
        self.params.set_stiffness(stiffness);
        self.update_coefficients();
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.params.set_brightness(brightness);
        self.update_coefficients();
    }

    pub fn set_dispersion(&mut self, dispersion: f32) {
        self.params.set_dispersion(dispersion);
        self.update_coefficients();
    }

    pub fn set_sympathetic_coupling(&mut self, coupling: f32) {
        self.params.set_sympathetic_coupling(coupling);
    }

    pub fn set_gauge(&mut self, gauge: StringGauge) {
        self.params.set_gauge(gauge);
        self.update_coefficients();
    }

    pub fn set_pick_position(&mut self, position: f32) {
        self.params.set_pick_position(position);
        self.update_coefficients();
    }

    pub fn delay_samples(&self) -> f32 {
        self.delay.delay()
    }

    fn update_coefficients(&mut self) {
        self.delay
            .set_delay(self.sample_rate_hz / self.params.frequency);

        let f0 = self.params.frequency * self.inv_sr;
        self.stiffness_allpass.set_f(
            f0 * (2.0 + 14.0 * self.params.stiffness),
            FrequencyApproximation::Dirty,
        );

        // Cascade cutoffs rise one octave per stage.
        for (index, stage) in self.dispersion_stages.iter_mut().enumerate() {
            stage.set_f(0.05 * (1 << index) as f32, FrequencyApproximation::Fast);
        }

        let brightness = self.params.brightness;
        self.damping_filter.set_f(
            0.005 + 0.35 * brightness * brightness,
            FrequencyApproximation::Fast,
        );

        self.loop_gain = self.params.damping.min(0.99999);
        self.impedance_scale =
            (REFERENCE_IMPEDANCE * (1.0 + 0.5 * self.params.gauge.factor())) / REFERENCE_IMPEDANCE;
        self.pick_gain = (core::f32::consts::PI * self.params.pick_position).sin().max(0.1);
    }

    #[inline]
    pub fn process(&mut self, excitation: f32, sympathetic_in: f32) -> f32 {
        let s = self.delay.read();
        let s = self.stiffness_allpass.process(s, FilterMode::AllPass);

        let mut dispersed = s;
        for stage in self.dispersion_stages.iter_mut() {
            dispersed = stage.process(dispersed, FilterMode::AllPass);
        }
        let s = crossfade(s, dispersed, self.params.dispersion);

        let s = self.damping_filter.process(s, FilterMode::LowPass) * self.loop_gain;
        let s = s + sympathetic_in * self.params.sympathetic_coupling;

        let z = self.impedance_scale;
        let reflected = (s * z).tanh() / z;
        let reflected = self.dc_blocker.process_sample(reflected);

        self.delay.write(reflected + excitation * self.pick_gain);

        s
    }
}
