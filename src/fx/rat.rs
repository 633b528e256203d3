//! RAT-style distortion: filtered, asymmetric diode clipping.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::utils::filter::{FilterMode, FrequencyApproximation, OnePole};
use crate::utils::smoother::Smoother;

const PRE_FILTER_HZ: f32 = 2500.0;
const TONE_MIN_HZ: f32 = 400.0;
const TONE_RANGE_HZ: f32 = 7600.0;

/// Clipping diode family. Thresholds differ per type, and the negative
/// half-wave clips earlier than the positive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiodeType {
    #[default]
    Silicon,
    Germanium,
    Led,
}

impl DiodeType {
    /// Positive threshold and negative-side ratio.
    fn thresholds(self) -> (f32, f32) {
        match self {
            DiodeType::Silicon => (0.70, 0.85),
            DiodeType::Germanium => (0.32, 0.78),
            DiodeType::Led => (1.10, 0.92),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatDistortion {
    diode: DiodeType,
    pre_filter: OnePole,
    tone_filter: OnePole,
    drive_smoother: Smoother,
    tone_cached: f32,
    inv_sr: f32,
}

impl RatDistortion {
    pub fn new(sample_rate_hz: f32, diode: DiodeType) -> Self {
        let inv_sr = 1.0 / sample_rate_hz;
        let mut pre_filter = OnePole::new();
        pre_filter.set_f(PRE_FILTER_HZ * inv_sr, FrequencyApproximation::Fast);
        let mut tone_filter = OnePole::new();
        tone_filter.set_f(
            (TONE_MIN_HZ + 0.5 * TONE_RANGE_HZ) * inv_sr,
            FrequencyApproximation::Fast,
        );
        Self {
            diode,
            pre_filter,
            tone_filter,
            drive_smoother: Smoother::new(0.005, sample_rate_hz),
            tone_cached: 0.5,
            inv_sr,
        }
    }

    pub fn reset(&mut self) {
        self.pre_filter.reset();
        self.tone_filter.reset();
        self.drive_smoother.reset(0.0);
    }

    pub fn diode(&self) -> DiodeType {
        self.diode
    }

    /// Asymmetric soft clip bounded by the diode thresholds.
    #[inline]
    fn clip(&self, x: f32) -> f32 {
        let (positive, negative_ratio) = self.diode.thresholds();
        if x >= 0.0 {
            positive * (x / positive).tanh()
        } else {
            let negative = positive * negative_ratio;
            -negative * (-x / negative).tanh()
        }
    }

    #[inline]
    pub fn process(&mut self, in_: f32, drive: f32, tone: f32) -> f32 {
        let drive = self.drive_smoother.next(drive);
        let gain = 1.0 + drive * drive * 99.0;

        if (tone - self.tone_cached).abs() > 1e-4 {
            self.tone_filter.set_f(
                (TONE_MIN_HZ + tone * TONE_RANGE_HZ) * self.inv_sr,
                FrequencyApproximation::Fast,
            );
            self.tone_cached = tone;
        }

        let filtered = self.pre_filter.process(in_, FilterMode::LowPass);
        let clipped = self.clip(filtered * gain);
        self.tone_filter.process(clipped, FilterMode::LowPass)
    }
}
