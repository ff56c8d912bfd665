//! Model loading and read-only sharing.
//!
//! A model directory holds everything the decode side needs to recognize
//! speech: a small JSON manifest (`model.json`) describing the bundle and an
//! optional opaque weight blob (`weights.bin`).  [`Model::load`] reads it
//! once; the resulting [`Model`] is an `Arc`-backed handle that any number
//! of recognizers share read-only, even across threads.  Cloning the handle
//! is the reference-count increment, dropping it the decrement; the
//! underlying storage is reclaimed only when the last handle (recognizers
//! included) is gone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Manifest file every model directory must contain.
const MANIFEST_FILE: &str = "model.json";
/// Optional opaque weight blob next to the manifest.
const WEIGHTS_FILE: &str = "weights.bin";

// ---------------------------------------------------------------------------
// ModelError
// ---------------------------------------------------------------------------

/// All ways loading a model can fail.
///
/// Failure leaves nothing behind: no partially constructed model is ever
/// reachable.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The given path does not exist or is not a directory.
    #[error("model directory not found: {0}")]
    NotFound(String),

    /// The directory exists but has no `model.json`.
    #[error("model manifest missing: {0}")]
    MissingManifest(String),

    /// A file in the model directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// `model.json` is not valid manifest JSON.
    #[error("malformed model manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// ModelManifest
// ---------------------------------------------------------------------------

/// Contents of `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelManifest {
    /// Human-readable model identifier.
    name: String,
    /// Sample rate the bundle was built for, in Hz.
    sample_rate: f32,
    /// Decode frame duration in milliseconds.
    #[serde(default = "default_frame_ms")]
    frame_ms: u32,
    /// RMS speech-activity threshold for the built-in energy adapter.
    #[serde(default = "default_activity_threshold")]
    activity_threshold: f32,
}

fn default_frame_ms() -> u32 {
    30
}

fn default_activity_threshold() -> f32 {
    0.01
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Shared, immutable recognition data loaded from a model directory.
///
/// `Clone` hands out another reference to the same storage.  A
/// [`crate::recognizer::Recognizer`] keeps its own clone, so dropping the
/// handle used to create recognizers never invalidates them.
///
/// # Example
///
/// ```rust,no_run
/// use streamscribe::model::Model;
///
/// let model = Model::load("models/en-us-small")?;
/// println!("loaded {} ({} Hz)", model.name(), model.native_sample_rate());
/// # Ok::<(), streamscribe::model::ModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

#[derive(Debug)]
struct ModelInner {
    path: PathBuf,
    manifest: ModelManifest,
    weights: Vec<u8>,
}

impl Model {
    /// Load a model bundle from `path`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::NotFound`] when `path` is not a directory.
    /// - [`ModelError::MissingManifest`] when `model.json` is absent.
    /// - [`ModelError::Io`] / [`ModelError::Manifest`] on unreadable or
    ///   malformed files.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(ModelError::MissingManifest(
                manifest_path.display().to_string(),
            ));
        }

        let manifest_text =
            std::fs::read_to_string(&manifest_path).map_err(|source| ModelError::Io {
                path: manifest_path.display().to_string(),
                source,
            })?;
        let manifest: ModelManifest =
            serde_json::from_str(&manifest_text).map_err(|source| ModelError::Manifest {
                path: manifest_path.display().to_string(),
                source,
            })?;

        let weights_path = path.join(WEIGHTS_FILE);
        let weights = if weights_path.exists() {
            std::fs::read(&weights_path).map_err(|source| ModelError::Io {
                path: weights_path.display().to_string(),
                source,
            })?
        } else {
            Vec::new()
        };

        log::info!(
            "loaded model '{}' from {} ({} weight bytes)",
            manifest.name,
            path.display(),
            weights.len()
        );

        Ok(Self {
            inner: Arc::new(ModelInner {
                path: path.to_path_buf(),
                manifest,
                weights,
            }),
        })
    }

    /// Human-readable model identifier from the manifest.
    pub fn name(&self) -> &str {
        &self.inner.manifest.name
    }

    /// Directory this model was loaded from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Sample rate the bundle was built for, in Hz.
    ///
    /// Recognizers run at whatever rate the caller passes; feeding audio at
    /// a different rate than the content degrades accuracy silently, so
    /// callers should match this value.
    pub fn native_sample_rate(&self) -> f32 {
        self.inner.manifest.sample_rate
    }

    /// Decode frame duration in milliseconds.
    pub fn frame_ms(&self) -> u32 {
        self.inner.manifest.frame_ms
    }

    /// RMS activity threshold for the built-in energy adapter.
    pub fn activity_threshold(&self) -> f32 {
        self.inner.manifest.activity_threshold
    }

    /// The opaque weight blob; empty when the bundle ships none.
    pub fn weights(&self) -> &[u8] {
        &self.inner.weights
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Write a valid model directory and return its path guard.
    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{ "name": "unit-test", "sample_rate": 16000.0, "frame_ms": 30, "activity_threshold": 0.01 }"#,
        )
        .expect("write manifest");
        dir
    }

    // ---- loading -----------------------------------------------------------

    #[test]
    fn load_valid_model() {
        let dir = fixture_dir();
        std::fs::write(dir.path().join(WEIGHTS_FILE), [1u8, 2, 3]).unwrap();

        let model = Model::load(dir.path()).expect("load");
        assert_eq!(model.name(), "unit-test");
        assert_eq!(model.native_sample_rate(), 16_000.0);
        assert_eq!(model.frame_ms(), 30);
        assert_eq!(model.weights(), &[1, 2, 3]);
        assert_eq!(model.path(), dir.path());
    }

    #[test]
    fn manifest_defaults_fill_optional_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{ "name": "bare", "sample_rate": 8000.0 }"#,
        )
        .unwrap();

        let model = Model::load(dir.path()).expect("load");
        assert_eq!(model.frame_ms(), 30);
        assert!((model.activity_threshold() - 0.01).abs() < 1e-7);
        assert!(model.weights().is_empty());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = Model::load("/nonexistent/model-dir").unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn directory_without_manifest_is_rejected() {
        let dir = tempdir().unwrap();
        let err = Model::load(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::MissingManifest(_)));
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "not json at all").unwrap();

        let err = Model::load(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::Manifest { .. }));
    }

    // ---- sharing -----------------------------------------------------------

    #[test]
    fn clones_share_the_same_storage() {
        let dir = fixture_dir();
        let a = Model::load(dir.path()).unwrap();
        let b = a.clone();

        assert_eq!(a.name(), b.name());
        // Same allocation, not a copy.
        assert!(std::ptr::eq(a.weights().as_ptr(), b.weights().as_ptr()));
    }

    #[test]
    fn dropping_one_handle_keeps_the_other_alive() {
        let dir = fixture_dir();
        let a = Model::load(dir.path()).unwrap();
        let b = a.clone();
        drop(a);

        assert_eq!(b.name(), "unit-test");
    }

    // ---- error display -----------------------------------------------------

    #[test]
    fn error_messages_name_the_path() {
        let err = Model::load("/nonexistent/model-dir").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model-dir"));
    }
}
