//! The recognizer façade: one streaming recognition session.
//!
//! # Pipeline flow
//!
//! ```text
//! accept_waveform{,_i16,_f32}
//!   └─▶ normalize → FrameAssembler → Job::Frame (mpsc) ──▶ decode worker
//!                                                            │ engine.accept_frame
//!                                                            │ endpointer.observe
//!                                                            ▼
//!                                  ResultQueue ◀── finalized RecognitionResult
//!                                       ▲
//!   result_front / pop_result ──────────┘   (caller drains, never blocks)
//! ```
//!
//! Feeding enqueues decode work and returns; the worker thread absorbs the
//! decode latency.  [`Recognizer::num_pending_results`] reports the frames
//! still in flight so producers can throttle instead of growing the backlog.
//!
//! A recognizer is a single-stream object: one thread feeds and drains it.
//! The decode-worker handoff inside [`crate::queue::ResultQueue`] is the
//! only cross-thread synchronization it needs.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::audio::{AudioChunk, FrameAssembler};
use crate::endpoint::{
    Endpointer, EndpointerConfig, EndpointerDelays, EndpointerMode, EndpointTrigger,
};
use crate::engine::{DecodeEngine, EnergyEngine, Hypothesis};
use crate::model::Model;
use crate::queue::ResultQueue;
use crate::results::{OutputConfig, PartialResult, RecognitionResult};

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// Construction failures.  A failed constructor leaves nothing behind.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The sample rate must be a positive, finite number of Hz.
    #[error("invalid sample rate {0}; expected a positive, finite value in Hz")]
    InvalidSampleRate(f32),

    /// The decode engine declared a frame length of zero samples.
    #[error("decode engine declared a zero frame length")]
    ZeroFrameLen,

    /// The decode worker thread could not be spawned.
    #[error("failed to spawn decode worker: {0}")]
    Worker(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Job (caller → worker)
// ---------------------------------------------------------------------------

/// Work items for the decode worker.  Every job carries the generation it
/// was submitted under; a reset bumps the generation and thereby orphans
/// everything already queued.
enum Job {
    /// One complete decode frame.
    Frame { samples: Vec<f32>, generation: u64 },
    /// Finalize now.  `tail` is the zero-padded partial frame drained from
    /// the assembler; `done` is signalled once the result is queued, which
    /// is what makes flush synchronous.
    Flush {
        tail: Option<Vec<f32>>,
        generation: u64,
        done: mpsc::Sender<()>,
    },
    /// Restore engine and endpointer to their initial state.
    Reset,
}

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

/// A streaming recognition session over one audio stream.
///
/// Create one per stream against a shared [`Model`]; the recognizer keeps
/// its own model reference, so the caller may drop theirs at any time.
///
/// # Example
///
/// ```rust,no_run
/// use streamscribe::{Model, Recognizer};
///
/// let model = Model::load("models/en-us-small")?;
/// let mut rec = Recognizer::new(&model, 16_000.0)?;
///
/// # let chunk: Vec<i16> = Vec::new();
/// rec.accept_waveform_i16(&chunk);
/// while let Some(result) = rec.result_front() {
///     println!("{}", result.to_json());
///     rec.pop_result();
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Recognizer {
    model: Model,
    sample_rate: f32,
    /// Duration of one decode frame in seconds.
    frame_secs: f32,
    assembler: FrameAssembler,
    queue: Arc<ResultQueue>,
    ep_config: Arc<Mutex<EndpointerConfig>>,
    out_config: Arc<Mutex<OutputConfig>>,
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    /// Reused normalization buffer so steady-state feeding does not allocate.
    scratch: Vec<f32>,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("sample_rate", &self.sample_rate)
            .field("frame_secs", &self.frame_secs)
            .finish_non_exhaustive()
    }
}

impl Recognizer {
    /// Create a recognizer running the built-in [`EnergyEngine`] adapter,
    /// configured from the model manifest.
    ///
    /// `sample_rate` must match the audio that will be fed.  A mismatch is
    /// not detectable here and silently degrades accuracy; compare against
    /// [`Model::native_sample_rate`] when in doubt.
    pub fn new(model: &Model, sample_rate: f32) -> Result<Self, RecognizerError> {
        let engine = EnergyEngine::new(
            sample_rate.max(0.0),
            model.frame_ms(),
            model.activity_threshold(),
        );
        Self::with_engine(model, sample_rate, Box::new(engine))
    }

    /// Create a recognizer around a caller-supplied decode engine.
    ///
    /// This is the integration point for real decoders: anything
    /// implementing [`DecodeEngine`] is moved onto the decode worker thread
    /// and driven frame by frame.
    pub fn with_engine(
        model: &Model,
        sample_rate: f32,
        engine: Box<dyn DecodeEngine>,
    ) -> Result<Self, RecognizerError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(RecognizerError::InvalidSampleRate(sample_rate));
        }
        let frame_len = engine.frame_len();
        if frame_len == 0 {
            return Err(RecognizerError::ZeroFrameLen);
        }

        let queue = Arc::new(ResultQueue::new());
        let ep_config = Arc::new(Mutex::new(EndpointerConfig::default()));
        let out_config = Arc::new(Mutex::new(OutputConfig::default()));
        let frame_secs = frame_len as f32 / sample_rate;

        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let worker = DecodeWorker {
            engine,
            endpointer: Endpointer::new(),
            queue: Arc::clone(&queue),
            ep_config: Arc::clone(&ep_config),
            out_config: Arc::clone(&out_config),
            frame_secs,
        };
        let handle = std::thread::Builder::new()
            .name("streamscribe-decode".into())
            .spawn(move || worker.run(jobs_rx))?;

        log::debug!(
            "recognizer created: model '{}', {} Hz, {} samples/frame",
            model.name(),
            sample_rate,
            frame_len
        );

        Ok(Self {
            model: model.clone(),
            sample_rate,
            frame_secs,
            assembler: FrameAssembler::new(frame_len),
            queue,
            ep_config,
            out_config,
            jobs: Some(jobs_tx),
            worker: Some(handle),
            scratch: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Audio feeding
    // -----------------------------------------------------------------------

    /// Feed byte-packed little-endian 16-bit PCM.
    ///
    /// An odd byte count violates the encoding contract: the whole call is
    /// ignored and logged at error level.
    pub fn accept_waveform(&mut self, data: &[u8]) {
        self.ingest(AudioChunk::Bytes(data));
    }

    /// Feed native signed 16-bit samples.
    pub fn accept_waveform_i16(&mut self, data: &[i16]) {
        self.ingest(AudioChunk::Pcm16(data));
    }

    /// Feed 32-bit float samples in `[-1.0, 1.0]`.
    pub fn accept_waveform_f32(&mut self, data: &[f32]) {
        self.ingest(AudioChunk::Float(data));
    }

    /// The one ingestion path behind all three entry points.
    fn ingest(&mut self, chunk: AudioChunk<'_>) {
        if chunk.is_empty() {
            return;
        }

        self.scratch.clear();
        if let Err(e) = chunk.normalize_into(&mut self.scratch) {
            log::error!("ignoring audio chunk: {e}");
            return;
        }
        self.assembler.push(&self.scratch);

        let generation = self.queue.generation();
        while let Some(samples) = self.assembler.pop_frame() {
            self.submit(Job::Frame {
                samples,
                generation,
            });
        }
    }

    /// Hand one frame job to the worker, keeping the pending counter in
    /// step.
    fn submit(&self, job: Job) {
        self.queue.add_pending(1);
        let sent = self
            .jobs
            .as_ref()
            .map(|tx| tx.send(job).is_ok())
            .unwrap_or(false);
        if !sent {
            self.queue.finish_pending();
            log::error!("decode worker unavailable; dropping frame");
        }
    }

    // -----------------------------------------------------------------------
    // Result retrieval
    // -----------------------------------------------------------------------

    /// The oldest undrained finalized result, without removing it.
    /// `None` when the queue is empty; never blocks.
    pub fn result_front(&self) -> Option<RecognitionResult> {
        self.queue.peek_front()
    }

    /// Remove the oldest finalized result; a no-op on an empty queue.
    pub fn pop_result(&self) {
        self.queue.pop_front();
    }

    /// Number of finalized results queued and undrained.
    pub fn num_results(&self) -> usize {
        self.queue.count_results()
    }

    /// Number of decode frames accepted but not yet processed.  The
    /// producer's lag estimate: throttle upstream when this grows.
    pub fn num_pending_results(&self) -> usize {
        self.queue.count_pending()
    }

    /// Returns `true` when no finalized results are waiting.
    pub fn results_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The provisional hypothesis for the utterance in progress; empty
    /// between utterances.
    pub fn partial_result(&self) -> PartialResult {
        self.queue.partial()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Select an endpointing preset.  Takes effect on the next decode
    /// frame, including for the utterance in flight.  An explicit
    /// [`set_endpointer_delays`](Self::set_endpointer_delays) call keeps
    /// precedence over any preset.
    pub fn set_endpointer_mode(&self, mode: EndpointerMode) {
        self.ep_config.lock().unwrap().mode = mode;
    }

    /// Set an endpointing preset by its integer code (0..=3), as used by
    /// language bindings.  Unknown codes are rejected with a warning and
    /// the previous mode stays in force.
    pub fn set_endpointer_mode_code(&self, code: i32) {
        match EndpointerMode::from_code(code) {
            Some(mode) => self.set_endpointer_mode(mode),
            None => log::warn!("ignoring unknown endpointer mode code {code}"),
        }
    }

    /// Set explicit endpointing delays in seconds, overriding the mode
    /// preset from now on.  Each value must be finite and non-negative;
    /// invalid triples are rejected with a warning and the previous
    /// configuration stays in force (values are never clamped).
    pub fn set_endpointer_delays(&self, t_start_max: f32, t_end: f32, t_max: f32) {
        let delays = EndpointerDelays {
            t_start_max,
            t_end,
            t_max,
        };
        if !delays.is_valid() {
            log::warn!(
                "ignoring invalid endpointer delays ({t_start_max}, {t_end}, {t_max}); \
                 values must be finite and non-negative"
            );
            return;
        }
        self.ep_config.lock().unwrap().explicit = Some(delays);
    }

    /// The endpointing mode currently selected.
    pub fn endpointer_mode(&self) -> EndpointerMode {
        self.ep_config.lock().unwrap().mode
    }

    /// The endpointing thresholds currently in force (explicit delays when
    /// set, otherwise the mode preset).
    pub fn endpointer_delays(&self) -> EndpointerDelays {
        self.ep_config.lock().unwrap().effective()
    }

    /// Include up to `n` alternative hypotheses per finalized result;
    /// `0` returns to the simple `{"text": ...}` shape.
    pub fn set_max_alternatives(&self, n: usize) {
        self.out_config.lock().unwrap().max_alternatives = n;
    }

    /// Include per-word timing in finalized results.
    pub fn set_words(&self, on: bool) {
        self.out_config.lock().unwrap().words = on;
    }

    /// Include per-word entries in partial results.
    pub fn set_partial_words(&self, on: bool) {
        self.out_config.lock().unwrap().partial_words = on;
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start over: discard the partial-frame remainder, all queued and
    /// in-flight work, and every undrained result.  The model reference and
    /// all configuration survive.  Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.assembler.clear();
        self.queue.begin_generation();
        if let Some(tx) = &self.jobs {
            // Queued frames carry the old generation and will be dropped;
            // this restores engine and endpointer behind them.
            let _ = tx.send(Job::Reset);
        }
    }

    /// Force the in-progress utterance to finalize now instead of waiting
    /// for a silence timeout: the partial frame is zero-padded and decoded,
    /// the hypothesis frozen, and exactly one finalized result enqueued.
    ///
    /// Blocks until the worker has caught up with everything fed so far
    /// (bounded by the queued work), so `num_pending_results()` is zero
    /// afterwards.  The endpointer restarts exactly as after a natural
    /// finalization.
    pub fn flush(&mut self) {
        let tail = self.assembler.drain_padded();
        let generation = self.queue.generation();
        let (done_tx, done_rx) = mpsc::channel();

        let sent = self
            .jobs
            .as_ref()
            .map(|tx| {
                tx.send(Job::Flush {
                    tail,
                    generation,
                    done: done_tx,
                })
                .is_ok()
            })
            .unwrap_or(false);
        if sent {
            // Bounded wait: the worker answers as soon as it reaches the
            // flush job, right after the frames already queued.
            let _ = done_rx.recv();
        } else {
            log::error!("decode worker unavailable; flush dropped");
        }
    }

    /// Sample rate this recognizer was created with, in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The shared model this recognizer holds a reference to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Duration of one decode frame in seconds.
    pub fn frame_secs(&self) -> f32 {
        self.frame_secs
    }
}

impl Drop for Recognizer {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop; join so no decode work
        // outlives the recognizer.
        self.jobs.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

// ---------------------------------------------------------------------------
// DecodeWorker
// ---------------------------------------------------------------------------

/// The decode side of a recognizer: owns the engine and the endpointer,
/// runs on its own thread, and publishes into the shared queue.
struct DecodeWorker {
    engine: Box<dyn DecodeEngine>,
    endpointer: Endpointer,
    queue: Arc<ResultQueue>,
    ep_config: Arc<Mutex<EndpointerConfig>>,
    out_config: Arc<Mutex<OutputConfig>>,
    frame_secs: f32,
}

impl DecodeWorker {
    /// Process jobs until the channel closes.
    fn run(mut self, jobs: mpsc::Receiver<Job>) {
        while let Ok(job) = jobs.recv() {
            match job {
                Job::Frame {
                    samples,
                    generation,
                } => self.decode_frame(&samples, generation),
                Job::Flush {
                    tail,
                    generation,
                    done,
                } => {
                    self.flush(tail, generation);
                    let _ = done.send(());
                }
                Job::Reset => {
                    self.engine.reset();
                    self.endpointer.reset();
                }
            }
        }
        log::debug!("decode worker: job channel closed, shutting down");
    }

    fn decode_frame(&mut self, samples: &[f32], generation: u64) {
        if generation != self.queue.generation() {
            // Orphaned by a reset; the pending counter was zeroed with it.
            return;
        }

        let output = self.engine.accept_frame(samples);
        let delays = self.ep_config.lock().unwrap().effective();

        match self.endpointer.observe(output.speech, self.frame_secs, &delays) {
            Some(EndpointTrigger::InitialSilence) => {
                // Nothing was ever spoken; discard whatever the engine
                // accumulated over the silence and report no speech.
                let _ = self.engine.finalize();
                self.queue
                    .push_final(RecognitionResult::empty(), generation);
            }
            Some(_) => self.finalize(generation),
            None => {
                if self.endpointer.in_utterance() {
                    let config = self.out_config.lock().unwrap().clone();
                    let partial = build_partial(self.engine.partial(), &config);
                    self.queue.set_partial(partial, generation);
                }
            }
        }

        if generation == self.queue.generation() {
            self.queue.finish_pending();
        }
    }

    fn flush(&mut self, tail: Option<Vec<f32>>, generation: u64) {
        if generation != self.queue.generation() {
            return;
        }
        if let Some(samples) = tail {
            // The stream's tail: decode it, but no endpointer evaluation;
            // finalization is already decided.
            let _ = self.engine.accept_frame(&samples);
        }
        self.finalize(generation);
    }

    /// Freeze the hypothesis, queue it, restart the endpointer.
    fn finalize(&mut self, generation: u64) {
        let hypothesis = self.engine.finalize();
        self.endpointer.reset();
        let config = self.out_config.lock().unwrap().clone();
        self.queue
            .push_final(build_result(hypothesis, &config), generation);
    }
}

// ---------------------------------------------------------------------------
// Hypothesis → result conversion
// ---------------------------------------------------------------------------

/// Apply the output configuration to a finalized hypothesis.
fn build_result(hypothesis: Hypothesis, config: &OutputConfig) -> RecognitionResult {
    let alternatives = if config.max_alternatives > 0 && !hypothesis.alternatives.is_empty() {
        Some(
            hypothesis
                .alternatives
                .into_iter()
                .take(config.max_alternatives)
                .collect(),
        )
    } else {
        None
    };
    let words = if config.words && !hypothesis.words.is_empty() {
        Some(hypothesis.words)
    } else {
        None
    };
    RecognitionResult {
        text: hypothesis.text,
        alternatives,
        words,
    }
}

/// Apply the output configuration to an in-flight hypothesis.
fn build_partial(hypothesis: Hypothesis, config: &OutputConfig) -> PartialResult {
    let words = if config.partial_words && !hypothesis.words.is_empty() {
        Some(hypothesis.words)
    } else {
        None
    };
    PartialResult {
        text: hypothesis.text,
        words,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
