//! Audio ingestion: chunk normalization and decode-frame assembly.
//!
//! # Pipeline
//!
//! ```text
//! caller chunk (bytes | i16 | f32) → AudioChunk::normalize_into (f32, mono)
//!                                  → FrameAssembler → fixed decode frames
//! ```
//!
//! The recognizer's three feeding entry points differ only in encoding; they
//! all pass through this module's single normalization path before the
//! samples reach the decode engine.

pub mod chunk;
pub mod frames;

pub use chunk::{AudioChunk, ChunkError};
pub use frames::FrameAssembler;
