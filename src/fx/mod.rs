//! Effects pedalboard applied once, after voice mixdown.

pub mod distortion;
pub mod overdrive;
pub mod rat;

#[allow(unused_imports)]
use num_traits::float::Float;

pub use distortion::Distortion;
pub use overdrive::Overdrive;
pub use rat::{DiodeType, RatDistortion};

pub const MAX_PEDALS: usize = 8;

/// Compile-time pedal set; there is no runtime registry.
#[derive(Debug, Clone)]
pub enum Pedal {
    Bypass,
    Overdrive(Overdrive),
    Distortion(Distortion),
    Rat(RatDistortion),
}

#[derive(Debug, Clone)]
pub struct PedalSlot {
    pedal: Pedal,
    enabled: bool,
    drive: f32,
    tone: f32,
    mix: f32,
}

impl PedalSlot {
    fn bypass() -> Self {
        Self {
            pedal: Pedal::Bypass,
            enabled: false,
            drive: 0.5,
            tone: 0.5,
            mix: 1.0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn pedal(&self) -> &Pedal {
        &self.pedal
    }

    #[inline]
    fn process(&mut self, dry: f32) -> f32 {
        let wet = match &mut self.pedal {
            Pedal::Bypass => dry,
            Pedal::Overdrive(pedal) => pedal.process(dry, self.drive),
            Pedal::Distortion(pedal) => pedal.process(dry, self.drive),
            Pedal::Rat(pedal) => pedal.process(dry, self.drive, self.tone),
        };
        dry * (1.0 - self.mix) + wet * self.mix
    }

    fn reset(&mut self) {
        match &mut self.pedal {
            Pedal::Bypass => {}
            Pedal::Overdrive(pedal) => pedal.reset(),
            Pedal::Distortion(pedal) => pedal.reset(),
            Pedal::Rat(pedal) => pedal.reset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Routing {
    #[default]
    Serial,
    Parallel,
}

/// Ordered or parallel chain of up to [`MAX_PEDALS`] slots. Out-of-range
/// slot indices are ignored.
#[derive(Debug)]
pub struct Pedalboard {
    slots: [PedalSlot; MAX_PEDALS],
    order: [usize; MAX_PEDALS],
    routing: Routing,
}

impl Pedalboard {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| PedalSlot::bypass()),
            order: core::array::from_fn(|index| index),
            routing: Routing::Serial,
        }
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.reset();
        }
    }

    pub fn set_pedal(&mut self, slot: usize, pedal: Pedal) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.pedal = pedal;
        }
    }

    pub fn set_enabled(&mut self, slot: usize, enabled: bool) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.enabled = enabled;
        }
    }

    pub fn set_drive(&mut self, slot: usize, drive: f32) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.drive = drive.clamp(0.0, 1.0);
        }
    }

    pub fn set_tone(&mut self, slot: usize, tone: f32) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.tone = tone.clamp(0.0, 1.0);
        }
    }

    pub fn set_mix(&mut self, slot: usize, mix: f32) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.mix = mix.clamp(0.0, 1.0);
        }
    }

    pub fn set_routing(&mut self, routing: Routing) {
        self.routing = routing;
    }

    /// Replace the serial processing order. Rejected when any index is out
    /// of range.
    pub fn set_order(&mut self, order: [usize; MAX_PEDALS]) {
        if order.iter().all(|index| *index < MAX_PEDALS) {
            self.order = order;
        }
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    pub fn slot(&self, slot: usize) -> Option<&PedalSlot> {
        self.slots.get(slot)
    }

    #[inline]
    pub fn process(&mut self, in_out: &mut [f32]) {
        match self.routing {
            Routing::Serial => {
                for sample in in_out.iter_mut() {
                    let mut s = *sample;
                    for index in self.order {
                        let slot = &mut self.slots[index];
                        if slot.enabled {
                            s = slot.process(s);
                        }
                    }
                    *sample = s;
                }
            }
            Routing::Parallel => {
                let active = self.slots.iter().filter(|slot| slot.enabled).count();
                if active == 0 {
                    return;
                }
                let normalization = 1.0 / (active as f32).sqrt();
                for sample in in_out.iter_mut() {
                    let dry = *sample;
                    let mut sum = 0.0;
                    for slot in self.slots.iter_mut() {
                        if slot.enabled {
                            sum += slot.process(dry);
                        }
                    }
                    *sample = sum * normalization;
                }
            }
        }
    }
}

impl Default for Pedalboard {
    fn default() -> Self {
        Self::new()
    }
}
