//! Zero-delay-feedback one-pole filter using trapezoidal integration.

#[allow(unused_imports)]
use num_traits::float::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    AllPass,
    BandPass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyApproximation {
    Exact,
    Fast,
    Dirty,
}

const M_PI_F: f32 = core::f32::consts::PI;
const M_PI_POW_2: f32 = M_PI_F * M_PI_F;
const M_PI_POW_3: f32 = M_PI_POW_2 * M_PI_F;
const M_PI_POW_5: f32 = M_PI_POW_3 * M_PI_POW_2;

/// Single-pole topology-preserving filter. One instance is reused per role
/// (stiffness allpass, dispersion stages, damping lowpass, pedal filters).
#[derive(Debug, Default, Clone)]
pub struct OnePole {
    g: f32,
    h: f32,
    z1: f32,
}

impl OnePole {
    pub fn new() -> Self {
        let mut filter = Self::default();
        filter.set_f(0.01, FrequencyApproximation::Dirty);
        filter
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
    }

    /// Prewarped tangent of the normalized cutoff.
    #[inline]
    #[allow(clippy::excessive_precision)]
    pub fn tan(f: f32, approximation: FrequencyApproximation) -> f32 {
        match approximation {
            FrequencyApproximation::Exact => {
                // Clip coefficient to about 100.
                let f = if f < 0.497 { f } else { 0.497 };
                (M_PI_F * f).tan()
            }
            FrequencyApproximation::Dirty => {
                // Optimized for frequencies below 8kHz.
                const A: f32 = 3.736e-01 * M_PI_POW_3;
                f * (M_PI_F + A * f * f)
            }
            FrequencyApproximation::Fast => {
                // Coefficients optimized for the 16Hz to 16kHz range at a
                // sample rate of 48kHz.
                const A: f32 = 3.260e-01 * M_PI_POW_3;
                const B: f32 = 1.823e-01 * M_PI_POW_5;
                let f2 = f * f;
                f * (M_PI_F + f2 * (A + B * f2))
            }
        }
    }

    /// Set the normalized cutoff. `g` is the prewarped integrator gain and
    /// `h` the auxiliary term of the trapezoidal update.
    #[inline]
    pub fn set_f(&mut self, f: f32, approximation: FrequencyApproximation) {
        self.g = Self::tan(f.clamp(0.0, 0.497), approximation);
        self.h = 1.0 / (1.0 + self.g);
    }

    #[inline]
    pub fn process(&mut self, in_: f32, mode: FilterMode) -> f32 {
        let v1 = (in_ - self.z1) * self.g * self.h;
        let v2 = v1 + self.z1;
        self.z1 = v2 + v1;

        match mode {
            FilterMode::LowPass => v2,
            FilterMode::HighPass => in_ - v2,
            FilterMode::AllPass => in_ - 2.0 * self.g * self.h * v2,
            FilterMode::BandPass => 2.0 * v2,
        }
    }

    #[inline]
    pub fn process_buffer(&mut self, in_: &[f32], out: &mut [f32], mode: FilterMode) {
        for (sample_in, sample_out) in in_.iter().zip(out.iter_mut()) {
            *sample_out = self.process(*sample_in, mode);
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DcBlocker {
    pole: f32,
    x: f32,
    y: f32,
}

impl DcBlocker {
    pub fn new(pole: f32) -> Self {
        Self {
            pole,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }

    #[inline]
    pub fn process_sample(&mut self, in_: f32) -> f32 {
        self.y = self.y * self.pole + in_ - self.x;
        self.x = in_;
        self.y
    }
}
