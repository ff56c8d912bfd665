//! Decode engines: the pluggable decoder seam and the built-in adapter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                DecodeEngine (trait)                  │
//! │                                                     │
//! │   ┌──────────────┐        ┌─────────────────────┐   │
//! │   │ EnergyEngine │        │ your decoder adapter │   │
//! │   │ RMS activity │        │ (embedding app)      │   │
//! │   └──────┬───────┘        └──────────┬──────────┘   │
//! │          │                           │              │
//! │          ▼                           ▼              │
//! │   accept_frame(&[f32]) → FrameOutput { speech }     │
//! │   finalize() → Hypothesis { text, alts, words }     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The recognizer drives whichever implementation it owns from its decode
//! worker thread; real decoders are injected through
//! [`crate::recognizer::Recognizer::with_engine`].

pub mod decode;
pub mod energy;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use decode::{DecodeEngine, FrameOutput, Hypothesis};
pub use energy::EnergyEngine;

// test-only re-export so other modules' tests can import the double without
// spelling the full path.
#[cfg(test)]
pub use decode::ScriptedEngine;
