//! The decode engine seam.
//!
//! # Overview
//!
//! [`DecodeEngine`] is the narrow contract between this crate's streaming
//! machinery and an actual speech decoder.  The recognizer feeds the engine
//! fixed-size frames of normalized samples; the engine answers with a
//! speech-activity signal per frame (which drives the endpointer) and keeps
//! an internal hypothesis the recognizer freezes at finalization points.
//!
//! Implementations must be `Send`: the recognizer moves its engine onto the
//! decode worker thread.
//!
//! [`ScriptedEngine`] (available under `#[cfg(test)]`) is a deterministic
//! stand-in that classifies frames by RMS energy and fabricates hypothesis
//! text, so the streaming machinery can be tested without a real decoder.

use crate::results::{Alternative, WordInfo};

// ---------------------------------------------------------------------------
// FrameOutput
// ---------------------------------------------------------------------------

/// Per-frame signal produced by a decode engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutput {
    /// Whether the frame contained speech activity.  The endpointer turns
    /// this boolean plus the frame duration into utterance boundaries.
    pub speech: bool,
}

// ---------------------------------------------------------------------------
// Hypothesis
// ---------------------------------------------------------------------------

/// The engine's view of the current (or just-finalized) utterance.
///
/// Empty collections mean "not produced"; the recognizer applies the output
/// configuration on top (alternative truncation, word-output gating) when it
/// builds a [`crate::results::RecognitionResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hypothesis {
    /// Decoded text so far; empty when nothing was decoded.
    pub text: String,
    /// Best-first n-best list, when the decoder produces one.
    pub alternatives: Vec<Alternative>,
    /// Per-word timing entries, when the decoder produces them.
    pub words: Vec<WordInfo>,
}

impl Hypothesis {
    /// Returns `true` when no text, alternatives or words were decoded.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.alternatives.is_empty() && self.words.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DecodeEngine trait
// ---------------------------------------------------------------------------

/// Contract for pluggable speech decoders.
///
/// # Contract
///
/// - [`frame_len`](Self::frame_len) is fixed for the engine's lifetime and
///   must be `> 0`; the recognizer sizes its frame assembly to it.
/// - [`accept_frame`](Self::accept_frame) is called with exactly
///   `frame_len` normalized `f32` samples per call, in stream order.
/// - [`finalize`](Self::finalize) freezes and returns the hypothesis
///   accumulated since the previous finalization, then starts a fresh one.
/// - [`reset`](Self::reset) discards all accumulated state, as if the
///   engine had just been constructed.
pub trait DecodeEngine: Send {
    /// Samples per decode frame this engine consumes.
    fn frame_len(&self) -> usize;

    /// Decode one frame and report its speech-activity signal.
    fn accept_frame(&mut self, frame: &[f32]) -> FrameOutput;

    /// Snapshot of the in-progress hypothesis (provisional, non-final).
    fn partial(&self) -> Hypothesis;

    /// Freeze the accumulated hypothesis and start a fresh one.
    fn finalize(&mut self) -> Hypothesis;

    /// Discard all accumulated state.
    fn reset(&mut self);
}

// Compile-time assertion: Box<dyn DecodeEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn DecodeEngine>) {}
};

// ---------------------------------------------------------------------------
// ScriptedEngine  (test-only)
// ---------------------------------------------------------------------------

/// Deterministic test double for the streaming machinery.
///
/// Classifies a frame as speech when its RMS exceeds the threshold, counts
/// speech frames, and fabricates one "word" per speech frame.  Finalized
/// text identifies both the utterance index and the amount of speech heard,
/// so ordering and reproducibility are observable from the outside.
#[cfg(test)]
pub struct ScriptedEngine {
    frame_len: usize,
    threshold: f32,
    emit_words: bool,
    emit_alternatives: bool,
    speech_frames: usize,
    utterances: usize,
}

#[cfg(test)]
impl ScriptedEngine {
    /// A double consuming frames of `frame_len` samples, with RMS speech
    /// threshold 0.25.
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame_len,
            threshold: 0.25,
            emit_words: false,
            emit_alternatives: false,
            speech_frames: 0,
            utterances: 0,
        }
    }

    /// Fabricate one `WordInfo` per speech frame in finalized hypotheses.
    pub fn with_words(mut self) -> Self {
        self.emit_words = true;
        self
    }

    /// Fabricate a two-entry n-best list in finalized hypotheses.
    pub fn with_alternatives(mut self) -> Self {
        self.emit_alternatives = true;
        self
    }

    fn text(&self) -> String {
        if self.speech_frames == 0 {
            String::new()
        } else {
            format!("utterance {} spans {}", self.utterances + 1, self.speech_frames)
        }
    }
}

#[cfg(test)]
impl DecodeEngine for ScriptedEngine {
    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn accept_frame(&mut self, frame: &[f32]) -> FrameOutput {
        let mean_sq: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len().max(1) as f32;
        let speech = mean_sq.sqrt() > self.threshold;
        if speech {
            self.speech_frames += 1;
        }
        FrameOutput { speech }
    }

    fn partial(&self) -> Hypothesis {
        Hypothesis {
            text: self.text(),
            ..Hypothesis::default()
        }
    }

    fn finalize(&mut self) -> Hypothesis {
        let text = self.text();
        let words = if self.emit_words {
            (0..self.speech_frames)
                .map(|i| WordInfo {
                    word: format!("w{i}"),
                    start: i as f32 * 0.1,
                    end: (i + 1) as f32 * 0.1,
                    conf: 1.0,
                })
                .collect()
        } else {
            Vec::new()
        };
        let alternatives = if self.emit_alternatives && self.speech_frames > 0 {
            vec![
                Alternative {
                    text: text.clone(),
                    confidence: 0.9,
                },
                Alternative {
                    text: format!("{text} (alt)"),
                    confidence: 0.1,
                },
            ]
        } else {
            Vec::new()
        };

        if self.speech_frames > 0 {
            self.utterances += 1;
        }
        self.speech_frames = 0;
        Hypothesis {
            text,
            alternatives,
            words,
        }
    }

    fn reset(&mut self) {
        self.speech_frames = 0;
        self.utterances = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
