//! The result queue: ordered handoff from the decode worker to the caller.
//!
//! [`ResultQueue`] is the single point where the decode worker thread and
//! the feeding/draining thread meet, so it carries all the synchronization:
//! a mutex-guarded FIFO of finalized results, a latest-partial slot, an
//! atomic in-flight frame counter (the backpressure signal) and the session
//! generation counter that lets `reset` invalidate work already queued for
//! the worker without blocking on it.
//!
//! The FIFO is unbounded on purpose: slow draining must never drop a
//! finalized result.  Backpressure is advisory, via
//! [`count_pending`](ResultQueue::count_pending) and
//! [`count_results`](ResultQueue::count_results).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::results::{PartialResult, RecognitionResult};

// ---------------------------------------------------------------------------
// ResultQueue
// ---------------------------------------------------------------------------

/// FIFO of finalized results plus the stream's progress counters.
///
/// Shared as `Arc<ResultQueue>` between a recognizer and its decode worker;
/// all methods take `&self`.
#[derive(Debug, Default)]
pub struct ResultQueue {
    results: Mutex<VecDeque<RecognitionResult>>,
    partial: Mutex<PartialResult>,
    /// Decode frames handed to the worker and not yet processed.
    pending: AtomicUsize,
    /// Session generation; bumped by reset to orphan in-flight work.
    generation: AtomicU64,
}

impl ResultQueue {
    /// An empty queue at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Finalized results
    // -----------------------------------------------------------------------

    /// Append a finalized result, provided `generation` is still current.
    ///
    /// A stale generation means a reset happened after this result's frames
    /// were submitted; the result is dropped and `false` returned.  The
    /// partial slot is cleared either way a result lands, since the
    /// utterance it described is over.
    pub fn push_final(&self, result: RecognitionResult, generation: u64) -> bool {
        let mut results = self.results.lock().unwrap();
        if generation != self.generation.load(Ordering::SeqCst) {
            return false;
        }
        results.push_back(result);
        drop(results);
        self.clear_partial();
        true
    }

    /// The oldest undrained result, without removing it.  Never blocks on
    /// anything but the internal lock.
    pub fn peek_front(&self) -> Option<RecognitionResult> {
        self.results.lock().unwrap().front().cloned()
    }

    /// Remove the oldest result; a no-op when the queue is empty.
    pub fn pop_front(&self) {
        self.results.lock().unwrap().pop_front();
    }

    /// Number of finalized results queued and undrained.
    pub fn count_results(&self) -> usize {
        self.results.lock().unwrap().len()
    }

    /// Returns `true` when no finalized results are queued.
    pub fn is_empty(&self) -> bool {
        self.count_results() == 0
    }

    // -----------------------------------------------------------------------
    // Pending-work counter
    // -----------------------------------------------------------------------

    /// Record `n` decode frames handed to the worker.
    pub fn add_pending(&self, n: usize) {
        self.pending.fetch_add(n, Ordering::SeqCst);
    }

    /// Record one decode frame processed.  Saturates at zero: a reset may
    /// already have zeroed the counter while the frame was in flight.
    pub fn finish_pending(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
    }

    /// Decode frames accepted but not yet processed; the caller's lag
    /// estimate for upstream throttling.
    pub fn count_pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Partial slot
    // -----------------------------------------------------------------------

    /// Overwrite the latest-partial slot, provided `generation` is current.
    pub fn set_partial(&self, partial: PartialResult, generation: u64) {
        if generation == self.generation.load(Ordering::SeqCst) {
            *self.partial.lock().unwrap() = partial;
        }
    }

    /// Snapshot of the in-flight hypothesis; empty between utterances.
    pub fn partial(&self) -> PartialResult {
        self.partial.lock().unwrap().clone()
    }

    fn clear_partial(&self) {
        *self.partial.lock().unwrap() = PartialResult::default();
    }

    // -----------------------------------------------------------------------
    // Generations
    // -----------------------------------------------------------------------

    /// The current session generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new generation: discard queued results, the partial slot and
    /// the pending count.  Frames already queued for the worker carry the
    /// old generation and will be dropped on arrival.  Returns the new
    /// generation.
    pub fn begin_generation(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Bump first, then clear under the lock: a worker enqueue racing
        // this either loses the generation check or is swept by the clear.
        let mut results = self.results.lock().unwrap();
        results.clear();
        drop(results);
        self.clear_partial();
        self.pending.store(0, Ordering::SeqCst);
        generation
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
