//! # streamscribe
//!
//! Streaming speech recognition with automatic utterance endpointing.
//!
//! Feed raw audio in chunks of any size and timing; the recognizer
//! assembles decode frames, drives a pluggable decode engine on a worker
//! thread, decides on its own when each utterance has ended, and queues one
//! finalized [`RecognitionResult`] per utterance for the caller to drain.
//!
//! ## Features
//!
//! - **Three audio encodings**: byte-packed 16-bit PCM, native `i16`
//!   samples, or normalized `f32` samples, all through one ingestion path
//! - **Endpointing**: silence-timeout and maximum-duration utterance
//!   boundaries with four presets and explicit threshold overrides
//! - **Non-blocking intake and drain**: feeding enqueues decode work and
//!   returns; draining never waits.  Pending/result counters give the
//!   producer an advisory backpressure signal
//! - **Shared models**: one [`Model`] serves any number of recognizers,
//!   read-only, across threads
//! - **Pluggable decoding**: real decoders implement [`DecodeEngine`];
//!   the built-in [`EnergyEngine`] segments speech by RMS activity
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamscribe::{Model, Recognizer};
//!
//! let model = Model::load("models/en-us-small")?;
//! let mut rec = Recognizer::new(&model, 16_000.0)?;
//!
//! # fn next_chunk() -> Option<Vec<i16>> { None }
//! while let Some(chunk) = next_chunk() {
//!     rec.accept_waveform_i16(&chunk);
//!
//!     while let Some(result) = rec.result_front() {
//!         println!("{}", result.to_json());
//!         rec.pop_result();
//!     }
//! }
//!
//! // No more audio coming: force a final answer.
//! rec.flush();
//! if let Some(result) = rec.result_front() {
//!     println!("{}", result.to_json());
//!     rec.pop_result();
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Threading
//!
//! Each recognizer owns one decode worker thread and is meant to be fed and
//! drained from a single caller thread.  The [`Model`] is the only object
//! intended for sharing across recognizers and threads.

pub mod audio;
pub mod endpoint;
pub mod engine;
pub mod logging;
pub mod model;
pub mod queue;
pub mod recognizer;
pub mod results;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use endpoint::{EndpointerDelays, EndpointerMode};
pub use engine::{DecodeEngine, EnergyEngine, FrameOutput, Hypothesis};
pub use logging::set_log_level;
pub use model::{Model, ModelError};
pub use recognizer::{Recognizer, RecognizerError};
pub use results::{Alternative, OutputConfig, PartialResult, RecognitionResult, WordInfo};
