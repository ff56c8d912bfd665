//! Energy-based reference decode adapter.
//!
//! [`EnergyEngine`] implements [`DecodeEngine`] with plain RMS activity
//! detection: a frame counts as speech when its RMS amplitude exceeds the
//! configured threshold.  It decodes no text (hypotheses stay empty), which
//! makes it a complete endpointing pipeline on its own: feed audio, get one
//! empty finalized result per detected utterance, with boundaries decided by
//! the endpointer.  Useful for silence segmentation, for wiring up an
//! application before a real decoder exists, and as the default adapter a
//! model-only recognizer runs with.

use crate::engine::decode::{DecodeEngine, FrameOutput, Hypothesis};

// ---------------------------------------------------------------------------
// EnergyEngine
// ---------------------------------------------------------------------------

/// RMS activity detector behind the [`DecodeEngine`] contract.
///
/// # Example
///
/// ```rust
/// use streamscribe::engine::{DecodeEngine, EnergyEngine};
///
/// // 30 ms frames at 16 kHz, 0.01 RMS threshold (quiet room)
/// let mut engine = EnergyEngine::new(16_000.0, 30, 0.01);
/// assert_eq!(engine.frame_len(), 480);
///
/// let silent = vec![0.0_f32; 480];
/// assert!(!engine.accept_frame(&silent).speech);
///
/// let loud = vec![0.5_f32; 480];
/// assert!(engine.accept_frame(&loud).speech);
/// ```
pub struct EnergyEngine {
    frame_len: usize,
    /// RMS amplitude threshold; frames at or below it are silence.
    threshold: f32,
}

impl EnergyEngine {
    /// Create an engine consuming `frame_ms` milliseconds of audio at
    /// `sample_rate` Hz per frame, classifying by `threshold` RMS.
    ///
    /// `threshold` should be in `[0.0, 1.0]`.  A typical value is `0.01`
    /// for quiet microphones; use `0.02`..`0.05` in noisy environments.
    /// The frame length is clamped to at least one sample so degenerate
    /// rate/duration combinations stay usable.
    pub fn new(sample_rate: f32, frame_ms: u32, threshold: f32) -> Self {
        let frame_len = ((sample_rate * frame_ms as f32 / 1000.0) as usize).max(1);
        Self {
            frame_len,
            threshold,
        }
    }

    /// RMS threshold currently in use.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn rms(frame: &[f32]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }
        let mean_sq: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        mean_sq.sqrt()
    }
}

impl DecodeEngine for EnergyEngine {
    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn accept_frame(&mut self, frame: &[f32]) -> FrameOutput {
        FrameOutput {
            speech: Self::rms(frame) > self.threshold,
        }
    }

    fn partial(&self) -> Hypothesis {
        Hypothesis::default()
    }

    fn finalize(&mut self) -> Hypothesis {
        Hypothesis::default()
    }

    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
