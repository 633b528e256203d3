//! Single polyphonic voice: waveguide string, bridge termination, body
//! resonance and excitation articulation.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::physical_modelling::articulation::Articulator;
use crate::physical_modelling::bridge::{BridgeCoupler, SharedBridgeCoupler};
use crate::physical_modelling::modal_body::{BodyPreset, ModalBodyBank};
use crate::physical_modelling::waveguide_string::WaveguideString;

/// MIDI note number to frequency in Hz. A4 = 440 Hz = note 69.
#[inline]
pub fn note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

const BODY_MIX: f32 = 0.35;
const BODY_DRIVE: f32 = 0.5;

#[derive(Debug)]
pub struct Voice {
    string: WaveguideString,
    bridge: BridgeCoupler,
    body: ModalBodyBank,
    articulation: Articulator,
    active: bool,
    note: u8,
    velocity: f32,
    age: f32,
    inv_sr: f32,
}

impl Voice {
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            string: WaveguideString::new(sample_rate_hz),
            bridge: BridgeCoupler::new(),
            body: ModalBodyBank::new(sample_rate_hz, BodyPreset::default()),
            articulation: Articulator::new(sample_rate_hz),
            active: false,
            note: 0,
            velocity: 0.0,
            age: 0.0,
            inv_sr: 1.0 / sample_rate_hz,
        }
    }

    pub fn reset(&mut self) {
        self.string.reset();
        self.body.reset();
        self.articulation.reset();
        self.active = false;
        self.note = 0;
        self.velocity = 0.0;
        self.age = 0.0;
    }

    /// Start a note. Retriggering a still-sounding voice force-resets the
    /// articulation crossfade; the string's delay content is kept so the
    /// steal stays click-free.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let velocity = velocity.clamp(0.0, 1.0);
        self.string.set_frequency(note_to_frequency(note));
        self.bridge
            .set_coupling(self.string.params().bridge_coupling());
        self.bridge
            .set_nonlinearity(self.string.params().nonlinearity());
        self.articulation.reset();
        self.articulation.trigger_pluck(velocity);
        self.active = true;
        self.note = note;
        self.velocity = velocity;
        self.age = 0.0;
    }

    /// Release into the damp articulation; the voice keeps sounding until
    /// the state machine returns to Idle.
    pub fn note_off(&mut self) {
        self.articulation.trigger_damp();
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Seconds since the last note-on.
    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn string(&self) -> &WaveguideString {
        &self.string
    }

    pub fn string_mut(&mut self) -> &mut WaveguideString {
        &mut self.string
    }

    pub fn body(&self) -> &ModalBodyBank {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut ModalBodyBank {
        &mut self.body
    }

    pub fn articulation(&self) -> &Articulator {
        &self.articulation
    }

    pub fn articulation_mut(&mut self) -> &mut Articulator {
        &mut self.articulation
    }

    /// Render one block, adding into `out`. With a shared coupler the voice
    /// reports its energy into the slot addressed by `voice_index`;
    /// otherwise the local bridge terminates the string.
    #[inline]
    pub fn render(
        &mut self,
        mut shared_bridge: Option<&mut SharedBridgeCoupler>,
        voice_index: usize,
        sympathetic_in: f32,
        out: &mut [f32],
    ) {
        if !self.active {
            return;
        }

        for out_sample in out.iter_mut() {
            let excitation = self.articulation.next_excitation();
            let s = self.string.process(excitation, sympathetic_in);

            let after_bridge = match shared_bridge.as_deref_mut() {
                Some(coupler) => coupler.exchange(voice_index, s),
                None => self.bridge.process_string(s),
            };
            let absorbed = s - after_bridge;

            self.body.excite(absorbed * BODY_DRIVE);
            let body_out = self.body.process();

            *out_sample += (after_bridge + body_out * BODY_MIX) * self.articulation.level();
        }

        self.age += out.len() as f32 * self.inv_sr;

        if self.articulation.is_finished() {
            self.active = false;
        }
    }
}
