//! Hard-edged distortion.

use crate::utils::smoother::Smoother;

#[derive(Debug, Clone)]
pub struct Distortion {
    drive_smoother: Smoother,
}

impl Distortion {
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            drive_smoother: Smoother::new(0.005, sample_rate_hz),
        }
    }

    pub fn reset(&mut self) {
        self.drive_smoother.reset(0.0);
    }

    #[inline]
    pub fn process(&mut self, in_: f32, drive: f32) -> f32 {
        let drive = self.drive_smoother.next(drive);
        let gain = 1.0 + drive * drive * 49.0;
        (in_ * gain).clamp(-0.8, 0.8) * 1.25
    }
}
