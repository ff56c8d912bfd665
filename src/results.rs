//! Recognition result types, output configuration and JSON shapes.
//!
//! [`RecognitionResult`] is the unit stored in the result queue: the decoded
//! text plus optional alternatives and optional word-level timing.
//! [`PartialResult`] is the provisional hypothesis for an utterance still in
//! progress and is surfaced through [`crate::recognizer::Recognizer::partial_result`],
//! never through the finalized-result queue.
//!
//! # JSON shapes
//!
//! Serialized results keep one of three shapes, selected by [`OutputConfig`]:
//!
//! ```text
//! simple                {"text": "turn the lights on"}
//! alternatives          {"alternatives": [{"text": ..., "confidence": ...}, ...]}
//! word timing           {"text": ..., "result": [{"word","start","end","conf"}, ...]}
//! ```
//!
//! Partial results serialize as `{"partial": "..."}` with an optional
//! `"partial_result"` word array when partial word timing is enabled.

use serde::{Deserialize, Serialize};
use serde_json::json;

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Controls which optional attributes finalized and partial results carry.
///
/// Stored behind a mutex shared with the decode worker and re-read at every
/// finalization, so setter calls take effect on the in-flight utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Maximum number of alternative hypotheses per result.  `0` disables
    /// alternatives entirely (the simple `{"text": ...}` shape).
    pub max_alternatives: usize,
    /// Include per-word timing and confidence in finalized results.
    pub words: bool,
    /// Include per-word entries in partial results too.
    pub partial_words: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_alternatives: 0,
            words: false,
            partial_words: false,
        }
    }
}

// ---------------------------------------------------------------------------
// WordInfo
// ---------------------------------------------------------------------------

/// Timing and confidence for a single decoded word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordInfo {
    /// The word text.
    pub word: String,
    /// Start time in seconds from the beginning of the stream.
    pub start: f32,
    /// End time in seconds from the beginning of the stream.
    pub end: f32,
    /// Confidence score in `[0.0, 1.0]`.
    pub conf: f32,
}

// ---------------------------------------------------------------------------
// Alternative
// ---------------------------------------------------------------------------

/// One entry of an n-best list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Hypothesis text.
    pub text: String,
    /// Hypothesis score in `[0.0, 1.0]`; entries are ordered best-first.
    pub confidence: f32,
}

// ---------------------------------------------------------------------------
// RecognitionResult
// ---------------------------------------------------------------------------

/// One finalized recognition outcome.
///
/// Immutable once enqueued; `Clone` so [`peek`]ing the queue does not consume
/// the entry.
///
/// [`peek`]: crate::recognizer::Recognizer::result_front
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// The decoded line.  Empty for a no-speech finalization (initial
    /// silence timeout).
    pub text: String,
    /// Best-first alternative hypotheses, present only when alternatives are
    /// enabled and the engine produced any.
    pub alternatives: Option<Vec<Alternative>>,
    /// Per-word timing entries, present only when word output is enabled and
    /// the engine produced any.
    pub words: Option<Vec<WordInfo>>,
}

impl RecognitionResult {
    /// A finalized result carrying no decoded speech (e.g. the initial
    /// silence timeout fired before any speech was heard).
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            alternatives: None,
            words: None,
        }
    }

    /// Serialize to the documented JSON shape.
    ///
    /// The shape is chosen by which optional attributes are present:
    /// alternatives win over word timing, word timing extends the simple
    /// shape with a `"result"` array.
    pub fn to_json(&self) -> String {
        let value = match &self.alternatives {
            Some(alternatives) => json!({
                "alternatives": alternatives
                    .iter()
                    .map(|a| json!({ "text": a.text, "confidence": a.confidence }))
                    .collect::<Vec<_>>(),
            }),
            None => match &self.words {
                Some(words) => json!({
                    "text": self.text,
                    "result": words.iter().map(word_value).collect::<Vec<_>>(),
                }),
                None => json!({ "text": self.text }),
            },
        };
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// PartialResult
// ---------------------------------------------------------------------------

/// A provisional, non-final hypothesis for the utterance in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialResult {
    /// The hypothesis text so far.  Empty when no speech has been decoded
    /// since the last finalization.
    pub text: String,
    /// Per-word entries, present only when partial word timing is enabled.
    pub words: Option<Vec<WordInfo>>,
}

impl PartialResult {
    /// Serialize to `{"partial": ...}`, adding a `"partial_result"` word
    /// array when word entries are present.
    pub fn to_json(&self) -> String {
        let value = match &self.words {
            Some(words) => json!({
                "partial": self.text,
                "partial_result": words.iter().map(word_value).collect::<Vec<_>>(),
            }),
            None => json!({ "partial": self.text }),
        };
        value.to_string()
    }
}

fn word_value(w: &WordInfo) -> serde_json::Value {
    json!({ "word": w.word, "start": w.start, "end": w.end, "conf": w.conf })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
