//! Fixed voice pool: allocation, stealing and polyphony-normalized mixdown.

#[allow(unused_imports)]
use num_traits::float::Float;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::physical_modelling::bridge::SharedBridgeCoupler;
use crate::voice::Voice;

pub const DEFAULT_VOICE_COUNT: usize = 6;

/// Voices are created once at construction and reused across notes; the
/// pool never grows or shrinks.
#[derive(Debug)]
pub struct VoiceManager {
    voices: Vec<Voice>,
    scratch: Box<[f32]>,
}

impl VoiceManager {
    pub fn new(sample_rate_hz: f32, voice_count: usize, block_size: usize) -> Self {
        let count = voice_count.max(1);
        let mut voices = Vec::with_capacity(count);
        for _ in 0..count {
            voices.push(Voice::new(sample_rate_hz));
        }
        Self {
            voices,
            scratch: vec![0.0; block_size].into_boxed_slice(),
        }
    }

    pub fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|voice| voice.active()).count()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    /// Dispatch a note to a free voice, stealing the oldest one when the
    /// pool is exhausted. Returns the chosen slot index.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> usize {
        let index = self.allocate();
        self.voices[index].note_on(note, velocity);
        index
    }

    pub fn note_off(&mut self, note: u8) {
        for voice in self.voices.iter_mut() {
            if voice.active() && voice.note() == note {
                voice.note_off();
            }
        }
    }

    fn allocate(&mut self) -> usize {
        if let Some(index) = self.voices.iter().position(|voice| !voice.active()) {
            return index;
        }

        // All voices busy: steal the one holding the oldest note.
        let mut oldest = 0;
        for (index, voice) in self.voices.iter().enumerate() {
            if voice.age() > self.voices[oldest].age() {
                oldest = index;
            }
        }
        self.voices[oldest].note_off();
        oldest
    }

    /// Render and mix all active voices into `out` (overwriting it), with
    /// equal-power polyphony normalization.
    pub fn render(
        &mut self,
        shared_bridge: &mut SharedBridgeCoupler,
        sympathetic_in: f32,
        out: &mut [f32],
    ) {
        out.fill(0.0);
        let scratch = &mut self.scratch;
        let len = out.len().min(scratch.len());
        let out = &mut out[..len];
        let mut active = 0;

        for (index, voice) in self.voices.iter_mut().enumerate() {
            if !voice.active() {
                continue;
            }
            active += 1;
            let block = &mut scratch[..len];
            block.fill(0.0);
            voice.render(Some(shared_bridge), index, sympathetic_in, block);
            for (out_sample, voice_sample) in out.iter_mut().zip(block.iter()) {
                *out_sample += *voice_sample;
            }
        }

        if active > 0 {
            let normalization = 1.5 / (active as f32).sqrt();
            for out_sample in out.iter_mut() {
                *out_sample *= normalization;
            }
        }
    }
}
