//! Top-level string synthesis engine.

#[allow(unused_imports)]
use num_traits::float::Float;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;

use crate::fx::Pedalboard;
use crate::physical_modelling::bridge::SharedBridgeCoupler;
use crate::physical_modelling::modal_body::{BodyPreset, Material};
use crate::physical_modelling::sympathetic::SympatheticStringBank;
use crate::preset::{Preset, PresetError};
use crate::utils::smoother::Smoother;
use crate::voice_manager::{VoiceManager, DEFAULT_VOICE_COUNT};

const SYMPATHETIC_STRING_COUNT: usize = 4;

/// Polyphonic engine: voice pool, shared bridge, sympathetic bank and
/// pedalboard, driven per audio block.
///
/// The per-block pipeline runs events, voices, mixdown, sympathetic
/// resonance, pedalboard and master volume in that order. All buffers are
/// allocated here, once; `process` never allocates.
#[derive(Debug)]
pub struct StringEngine {
    voices: VoiceManager,
    shared_bridge: SharedBridgeCoupler,
    sympathetic: SympatheticStringBank,
    pedalboard: Pedalboard,
    master_volume: f32,
    volume_smoother: Smoother,
    damping: f32,
    brightness: f32,
    stiffness: f32,
    dispersion: f32,
    sympathetic_coupling: f32,
    material: Material,
    body_preset: BodyPreset,
    sympathetic_feed: f32,
    mix_buffer: Box<[f32]>,
    block_size: usize,
    sample_rate_hz: f32,
}

impl StringEngine {
    pub fn new(sample_rate_hz: f32, block_size: usize) -> Self {
        Self::with_voice_count(sample_rate_hz, block_size, DEFAULT_VOICE_COUNT)
    }

    pub fn with_voice_count(sample_rate_hz: f32, block_size: usize, voice_count: usize) -> Self {
        let block_size = block_size.max(1);
        let mut engine = Self {
            voices: VoiceManager::new(sample_rate_hz, voice_count, block_size),
            shared_bridge: SharedBridgeCoupler::new(voice_count),
            sympathetic: SympatheticStringBank::new(sample_rate_hz, SYMPATHETIC_STRING_COUNT),
            pedalboard: Pedalboard::new(),
            master_volume: 0.8,
            volume_smoother: Smoother::new(0.01, sample_rate_hz),
            damping: 0.996,
            brightness: 0.5,
            stiffness: 0.1,
            dispersion: 0.2,
            sympathetic_coupling: 0.3,
            material: Material::default(),
            body_preset: BodyPreset::default(),
            sympathetic_feed: 0.0,
            mix_buffer: vec![0.0; block_size].into_boxed_slice(),
            block_size,
            sample_rate_hz,
        };
        engine.volume_smoother.reset(engine.master_volume);
        engine.apply_string_controls();
        engine
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate_hz
    }

    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    pub fn pedalboard_mut(&mut self) -> &mut Pedalboard {
        &mut self.pedalboard
    }

    pub fn set_sympathetic_enabled(&mut self, enabled: bool) {
        self.sympathetic.set_enabled(enabled);
    }

    /// Out-of-range notes are ignored.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > 127 {
            return;
        }
        self.voices.note_on(note, velocity.clamp(0.0, 1.0));
    }

    pub fn note_off(&mut self, note: u8) {
        self.voices.note_off(note);
    }

    /// Return to the post-construction state, including the per-voice noise
    /// seeds, so identical event sequences reproduce identical output.
    pub fn reset(&mut self) {
        self.voices.reset();
        self.shared_bridge.reset();
        self.sympathetic.reset();
        self.pedalboard.reset();
        self.sympathetic_feed = 0.0;
        self.volume_smoother.reset(self.master_volume);
    }

    /// Set a parameter by id, clamping the value. Unknown ids are ignored.
    pub fn set_parameter(&mut self, id: &str, value: f32) {
        match id {
            "masterVolume" => self.master_volume = value.clamp(0.0, 1.0),
            "damping" => {
                self.damping = value.clamp(0.9, 1.0);
                self.apply_string_controls();
                self.apply_body_damping();
            }
            "brightness" => {
                self.brightness = value.clamp(0.0, 1.0);
                self.apply_string_controls();
            }
            "stiffness" => {
                self.stiffness = value.clamp(0.0, 0.5);
                self.apply_string_controls();
            }
            "dispersion" => {
                self.dispersion = value.clamp(0.0, 1.0);
                self.apply_string_controls();
            }
            "sympatheticCoupling" => {
                self.sympathetic_coupling = value.clamp(0.0, 1.0);
                self.apply_string_controls();
            }
            "material" => {
                self.material = Material::from_index(value.max(0.0) as usize);
                let material = self.material;
                for voice in self.voices.voices_mut() {
                    voice.body_mut().set_material(material);
                }
            }
            "bodyPreset" => {
                self.body_preset = BodyPreset::from_index(value.max(0.0) as usize);
                let preset = self.body_preset;
                for voice in self.voices.voices_mut() {
                    voice.body_mut().load(preset);
                }
            }
            _ => {}
        }
    }

    /// Read a parameter by id. Unknown ids return 0.0.
    pub fn get_parameter(&self, id: &str) -> f32 {
        match id {
            "masterVolume" => self.master_volume,
            "damping" => self.damping,
            "brightness" => self.brightness,
            "stiffness" => self.stiffness,
            "dispersion" => self.dispersion,
            "sympatheticCoupling" => self.sympathetic_coupling,
            "material" => self.material.index() as f32,
            "bodyPreset" => self.body_preset.index() as f32,
            _ => 0.0,
        }
    }

    pub fn save_preset(&self) -> String {
        Preset {
            master_volume: Some(self.master_volume),
            damping: Some(self.damping),
            brightness: Some(self.brightness),
            stiffness: Some(self.stiffness),
            dispersion: Some(self.dispersion),
            sympathetic_coupling: Some(self.sympathetic_coupling),
            material: Some(self.material.index() as f32),
            body_preset: Some(self.body_preset.index() as f32),
        }
        .to_json()
    }

    /// Malformed data leaves every parameter untouched.
    pub fn load_preset(&mut self, json: &str) -> Result<(), PresetError> {
        let preset = Preset::from_json(json)?;
        if let Some(value) = preset.master_volume {
            self.set_parameter("masterVolume", value);
        }
        if let Some(value) = preset.damping {
            self.set_parameter("damping", value);
        }
        if let Some(value) = preset.brightness {
            self.set_parameter("brightness", value);
        }
        if let Some(value) = preset.stiffness {
            self.set_parameter("stiffness", value);
        }
        if let Some(value) = preset.dispersion {
            self.set_parameter("dispersion", value);
        }
        if let Some(value) = preset.sympathetic_coupling {
            self.set_parameter("sympatheticCoupling", value);
        }
        if let Some(value) = preset.material {
            self.set_parameter("material", value);
        }
        if let Some(value) = preset.body_preset {
            self.set_parameter("bodyPreset", value);
        }
        Ok(())
    }

    /// Fill every channel with the rendered mono mix. Channels beyond the
    /// first receive copies of the same signal.
    pub fn process(&mut self, outputs: &mut [&mut [f32]]) {
        if outputs.is_empty() {
            return;
        }
        let num_samples = outputs[0].len();
        let mut mix = core::mem::take(&mut self.mix_buffer);

        let mut start = 0;
        while start < num_samples {
            let len = (num_samples - start).min(self.block_size);
            let block = &mut mix[..len];
            self.render(block);
            for channel in outputs.iter_mut() {
                let end = (start + len).min(channel.len());
                if start < end {
                    channel[start..end].copy_from_slice(&block[..end - start]);
                }
            }
            start += len;
        }

        self.mix_buffer = mix;
    }

    fn render(&mut self, out: &mut [f32]) {
        if self.master_volume == 0.0 || self.voices.active_voice_count() == 0 {
            out.fill(0.0);
            self.volume_smoother.reset(self.master_volume);
            return;
        }

        self.voices
            .render(&mut self.shared_bridge, self.sympathetic_feed, out);

        // The bank is driven by this block's bridge motion; its mean output
        // feeds back into the strings on the next block, where each string
        // applies its own coupling gain.
        self.sympathetic
            .excite_from_bridge(self.shared_bridge.motion());
        let mut sympathetic_sum = 0.0;
        for sample in out.iter_mut() {
            let s = self.sympathetic.process();
            sympathetic_sum += s;
            *sample += s * self.sympathetic_coupling;
        }
        self.sympathetic_feed = sympathetic_sum / out.len().max(1) as f32;

        self.pedalboard.process(out);

        for sample in out.iter_mut() {
            *sample *= self.volume_smoother.next(self.master_volume);
        }
    }

    fn apply_string_controls(&mut self) {
        for voice in self.voices.voices_mut() {
            let string = voice.string_mut();
            let mut params = string.params().clone();
            params.set_damping(self.damping);
            params.set_brightness(self.brightness);
            params.set_stiffness(self.stiffness);
            params.set_dispersion(self.dispersion);
            params.set_sympathetic_coupling(self.sympathetic_coupling);
            string.set_params(params);
        }
    }

    fn apply_body_damping(&mut self) {
        // Map the string-domain damping range [0.9, 1.0] onto the body's
        // [0, 1] control.
        let body_damping = (self.damping - 0.9) * 10.0;
        for voice in self.voices.voices_mut() {
            voice.body_mut().set_damping(body_damping);
        }
    }
}
