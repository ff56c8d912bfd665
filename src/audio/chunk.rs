//! Incoming audio chunks and sample normalization.
//!
//! Callers may hold audio as byte-packed PCM, native 16-bit integers or
//! 32-bit floats.  [`AudioChunk`] tags the three encodings and
//! [`AudioChunk::normalize_into`] converts all of them to the internal
//! representation: mono `f32` samples in `[-1.0, 1.0]`.  One conversion path
//! serves all three entry points of the recognizer.

use thiserror::Error;

/// Scale factor mapping `i16::MIN..=i16::MAX` onto `[-1.0, 1.0)`.
const I16_SCALE: f32 = 1.0 / 32768.0;

// ---------------------------------------------------------------------------
// ChunkError
// ---------------------------------------------------------------------------

/// Contract violations in a caller-supplied audio chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A byte-packed chunk must contain whole little-endian 16-bit sample
    /// pairs; an odd byte count cannot be split into samples.
    #[error("byte-packed PCM chunk has odd length {0}; expected little-endian 16-bit pairs")]
    OddByteLength(usize),
}

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A borrowed chunk of caller audio in one of the three accepted encodings.
///
/// Chunks are consumed immediately during ingestion and never retained.
///
/// # Example
///
/// ```rust
/// use streamscribe::audio::AudioChunk;
///
/// let mut samples = Vec::new();
/// AudioChunk::Pcm16(&[0, 16_384, -16_384])
///     .normalize_into(&mut samples)
///     .unwrap();
/// assert_eq!(samples.len(), 3);
/// assert!((samples[1] - 0.5).abs() < 1e-6);
/// assert!((samples[2] + 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum AudioChunk<'a> {
    /// Native signed 16-bit PCM samples.
    Pcm16(&'a [i16]),
    /// Byte stream of little-endian 16-bit PCM sample pairs.
    Bytes(&'a [u8]),
    /// 32-bit float samples, already in `[-1.0, 1.0]`.
    Float(&'a [f32]),
}

impl AudioChunk<'_> {
    /// Number of audio samples this chunk will contribute.
    ///
    /// For [`AudioChunk::Bytes`] this is the number of complete sample
    /// pairs; a trailing odd byte is not counted (and makes
    /// [`normalize_into`](Self::normalize_into) fail).
    pub fn len(&self) -> usize {
        match self {
            AudioChunk::Pcm16(s) => s.len(),
            AudioChunk::Bytes(b) => b.len() / 2,
            AudioChunk::Float(s) => s.len(),
        }
    }

    /// Returns `true` when the chunk contributes no samples.
    pub fn is_empty(&self) -> bool {
        match self {
            // An odd single byte is malformed, not empty.
            AudioChunk::Bytes(b) => b.is_empty(),
            _ => self.len() == 0,
        }
    }

    /// Append this chunk's samples to `out` as normalized `f32`.
    ///
    /// * `Pcm16` and `Bytes` samples are scaled by `1/32768`.
    /// * `Float` samples are passed through unchanged; values outside
    ///   `[-1.0, 1.0]` are the caller's responsibility.
    ///
    /// # Errors
    ///
    /// [`ChunkError::OddByteLength`] when a byte-packed chunk cannot be
    /// split into whole 16-bit pairs.  Nothing is appended in that case.
    pub fn normalize_into(&self, out: &mut Vec<f32>) -> Result<(), ChunkError> {
        match self {
            AudioChunk::Pcm16(samples) => {
                out.extend(samples.iter().map(|&s| s as f32 * I16_SCALE));
            }
            AudioChunk::Bytes(bytes) => {
                if bytes.len() % 2 != 0 {
                    return Err(ChunkError::OddByteLength(bytes.len()));
                }
                out.extend(
                    bytes
                        .chunks_exact(2)
                        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 * I16_SCALE),
                );
            }
            AudioChunk::Float(samples) => {
                out.extend_from_slice(samples);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(chunk: AudioChunk<'_>) -> Vec<f32> {
        let mut out = Vec::new();
        chunk.normalize_into(&mut out).expect("well-formed chunk");
        out
    }

    // ---- i16 path ----------------------------------------------------------

    #[test]
    fn pcm16_scaling() {
        let out = normalized(AudioChunk::Pcm16(&[0, 32_767, -32_768]));
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.999_97).abs() < 1e-4);
        assert!((out[2] + 1.0).abs() < 1e-6);
    }

    // ---- byte path ---------------------------------------------------------

    #[test]
    fn bytes_little_endian_pairs() {
        // 0x4000 = 16384 → 0.5; 0xC000 = -16384 → -0.5
        let bytes = [0x00, 0x40, 0x00, 0xC0];
        let out = normalized(AudioChunk::Bytes(&bytes));
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn bytes_match_pcm16_for_same_waveform() {
        let samples: Vec<i16> = vec![-12_000, -1, 0, 1, 12_000];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let a = normalized(AudioChunk::Pcm16(&samples));
        let b = normalized(AudioChunk::Bytes(&bytes));
        assert_eq!(a, b);
    }

    #[test]
    fn odd_byte_length_is_rejected_without_partial_output() {
        let mut out = vec![0.25_f32];
        let err = AudioChunk::Bytes(&[0x00, 0x40, 0x7F])
            .normalize_into(&mut out)
            .unwrap_err();
        assert_eq!(err, ChunkError::OddByteLength(3));
        // Nothing appended on failure.
        assert_eq!(out, vec![0.25]);
    }

    // ---- float path --------------------------------------------------------

    #[test]
    fn float_passes_through() {
        let input = [0.1_f32, -0.9, 0.0];
        let out = normalized(AudioChunk::Float(&input));
        assert_eq!(out, input);
    }

    // ---- length helpers ----------------------------------------------------

    #[test]
    fn len_counts_samples_not_bytes() {
        assert_eq!(AudioChunk::Pcm16(&[1, 2, 3]).len(), 3);
        assert_eq!(AudioChunk::Bytes(&[0, 0, 0, 0]).len(), 2);
        assert_eq!(AudioChunk::Float(&[0.0]).len(), 1);
    }

    #[test]
    fn empty_chunks_are_empty() {
        assert!(AudioChunk::Pcm16(&[]).is_empty());
        assert!(AudioChunk::Bytes(&[]).is_empty());
        assert!(AudioChunk::Float(&[]).is_empty());
        // A lone odd byte is malformed rather than empty.
        assert!(!AudioChunk::Bytes(&[0x7F]).is_empty());
    }

    #[test]
    fn normalize_appends_to_existing_buffer() {
        let mut out = vec![0.5_f32];
        AudioChunk::Pcm16(&[0]).normalize_into(&mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], 0.5);
    }
}
