//! Segment a WAV file into utterances with the built-in energy adapter.
//!
//! Feeds the file through a recognizer in small chunks, the way live audio
//! would arrive, and prints one JSON line per finalized utterance boundary.
//!
//! ```text
//! cargo run --example wav_segment -- <model-dir> <wav-file>
//! ```
//!
//! The WAV file must be mono 16-bit PCM; its sample rate is passed straight
//! to the recognizer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use streamscribe::{EndpointerMode, Model, Recognizer};

/// Samples per feeding call; roughly 100 ms at 16 kHz.
const CHUNK: usize = 1600;

fn print_usage() {
    eprintln!("Usage: wav_segment <model-dir> <wav-file>");
    eprintln!();
    eprintln!("  model-dir   directory containing model.json");
    eprintln!("  wav-file    mono 16-bit PCM WAV to segment");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let (model_dir, wav_path) = match (args.get(1), args.get(2)) {
        (Some(m), Some(w)) => (PathBuf::from(m), PathBuf::from(w)),
        _ => {
            print_usage();
            bail!("expected a model directory and a WAV file");
        }
    };

    let mut reader = hound::WavReader::open(&wav_path)
        .with_context(|| format!("opening {}", wav_path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 {
        bail!(
            "expected mono 16-bit PCM, got {} channel(s) at {} bits",
            spec.channels,
            spec.bits_per_sample
        );
    }

    let model = Model::load(&model_dir)?;
    let mut rec = Recognizer::new(&model, spec.sample_rate as f32)?;
    rec.set_endpointer_mode(EndpointerMode::Short);

    println!(
        "segmenting {} ({} Hz) with model '{}'",
        wav_path.display(),
        spec.sample_rate,
        model.name()
    );

    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .context("reading WAV samples")?;

    let mut boundaries = 0usize;
    for chunk in samples.chunks(CHUNK) {
        rec.accept_waveform_i16(chunk);

        while let Some(result) = rec.result_front() {
            boundaries += 1;
            println!("[{boundaries}] {}", result.to_json());
            rec.pop_result();
        }
    }

    // End of file: force a final answer for the tail.
    rec.flush();
    while let Some(result) = rec.result_front() {
        boundaries += 1;
        println!("[{boundaries}] {}", result.to_json());
        rec.pop_result();
    }

    println!(
        "done: {} utterance boundar{} in {:.2}s of audio",
        boundaries,
        if boundaries == 1 { "y" } else { "ies" },
        samples.len() as f64 / spec.sample_rate as f64
    );
    Ok(())
}
