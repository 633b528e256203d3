//! Soft-clipping overdrive.

use crate::utils::smoother::Smoother;
use crate::utils::soft_clip;

#[derive(Debug, Clone)]
pub struct Overdrive {
    drive_smoother: Smoother,
}

impl Overdrive {
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
        let drive_2 = drive * drive;
        let pre_gain_a = drive * 0.5;
        let pre_gain_b = drive_2 * drive_2 * drive * 24.0;
        let pre_gain = pre_gain_a + (pre_gain_b - pre_gain_a) * drive_2;
        let drive_squashed = drive * (2.0 - drive);
        let post_gain = 1.0 / soft_clip(1.0 + drive_squashed * pre_gain);

        soft_clip(in_ * (1.0 + pre_gain)) * post_gain
    }
}
