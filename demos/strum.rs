//! Offline render of a short strummed phrase to a WAV file.

use hound::{SampleFormat, WavSpec, WavWriter};
use simple_logger::SimpleLogger;

use luthier_dsp::engine::StringEngine;

const SAMPLE_RATE: u32 = 48000;
const BLOCK_SIZE: usize = 32;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let mut engine = StringEngine::new(SAMPLE_RATE as f32, BLOCK_SIZE);
    engine.set_parameter("brightness", 0.6);
    engine.set_parameter("sympatheticCoupling", 0.4);

    let notes: [u8; 6] = [40, 47, 52, 56, 59, 64];
    let note_spacing = SAMPLE_RATE as usize / 8;
    let release_at = SAMPLE_RATE as usize * 3;
    let total_samples = SAMPLE_RATE as usize * 4;

    let mut left = vec![0.0f32; BLOCK_SIZE];
    let mut right = vec![0.0f32; BLOCK_SIZE];
    let mut data = Vec::with_capacity(total_samples);

    let mut next_note = 0;
    let mut rendered = 0;
    while rendered < total_samples {
        if next_note < notes.len() && rendered >= next_note * note_spacing {
            log::info!("note on: {}", notes[next_note]);
            engine.note_on(notes[next_note], 0.8);
            next_note += 1;
        }
        if rendered == release_at {
            log::info!("releasing all notes");
            for note in notes {
                engine.note_off(note);
            }
        }

        let mut outputs = [&mut left[..], &mut right[..]];
        engine.process(&mut outputs);
        data.extend_from_slice(&left);
        rendered += BLOCK_SIZE;
    }

    std::fs::create_dir_all("out").ok();
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create("out/strum.wav", spec).unwrap();
    for sample in &data {
        writer.write_sample(*sample).unwrap();
    }
    writer.finalize().unwrap();
    log::info!("wrote {} samples to out/strum.wav", data.len());
}
