//! Utterance endpointing: deciding, from activity signals and timers alone,
//! when the current utterance is over.
//!
//! [`Endpointer`] is a two-state machine driven once per decode frame:
//!
//! ```text
//!                speech                       speech / silence
//! SILENT ────────────────▶ IN_UTTERANCE ──────────────────────▶ (stays)
//!   │                          │
//!   │ silence > t_start_max    │ trailing silence > t_end, or
//!   │ (never spoke)            │ utterance length > t_max
//!   ▼                          ▼
//! finalize empty           finalize hypothesis
//! (back to SILENT)         (back to SILENT)
//! ```
//!
//! Thresholds come from a [`EndpointerMode`] preset or, once set, from
//! explicit [`EndpointerDelays`]; the effective values are re-read on every
//! frame so configuration changes apply to the utterance in flight.

// ---------------------------------------------------------------------------
// EndpointerMode
// ---------------------------------------------------------------------------

/// Threshold presets for different interaction styles.
///
/// | Variant  | Style                  | t_end | t_max |
/// |----------|------------------------|-------|-------|
/// | Default  | general conversation   | 0.5 s | 20 s  |
/// | Short    | terse commands         | 0.25 s| 10 s  |
/// | Long     | full sentences         | 1.0 s | 30 s  |
/// | VeryLong | dictation              | 2.0 s | 60 s  |
///
/// All presets wait 5 s of initial silence (`t_start_max`) before giving up
/// on an utterance that never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointerMode {
    /// Balanced timeouts for general use.
    Default,
    /// Reduced trailing-silence and cutoff timeouts for terse commands.
    Short,
    /// Longer pauses tolerated; suits full-sentence answers.
    Long,
    /// Dictation-style input with long pauses between phrases.
    VeryLong,
}

impl EndpointerMode {
    /// Map the wire-level integer code (0..=3) used by language bindings.
    ///
    /// Returns `None` for unknown codes; callers keep their previous mode.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Default),
            1 => Some(Self::Short),
            2 => Some(Self::Long),
            3 => Some(Self::VeryLong),
            _ => None,
        }
    }

    /// The preset threshold triple for this mode.
    pub fn delays(self) -> EndpointerDelays {
        match self {
            Self::Default => EndpointerDelays {
                t_start_max: 5.0,
                t_end: 0.5,
                t_max: 20.0,
            },
            Self::Short => EndpointerDelays {
                t_start_max: 5.0,
                t_end: 0.25,
                t_max: 10.0,
            },
            Self::Long => EndpointerDelays {
                t_start_max: 5.0,
                t_end: 1.0,
                t_max: 30.0,
            },
            Self::VeryLong => EndpointerDelays {
                t_start_max: 5.0,
                t_end: 2.0,
                t_max: 60.0,
            },
        }
    }
}

impl Default for EndpointerMode {
    fn default() -> Self {
        Self::Default
    }
}

// ---------------------------------------------------------------------------
// EndpointerDelays
// ---------------------------------------------------------------------------

/// Explicit endpointing thresholds, all in seconds.
///
/// No ordering between the three values is enforced; note that a `t_end` or
/// `t_max` smaller than one frame duration finalizes on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointerDelays {
    /// Give up waiting for speech after this much initial silence (emits an
    /// empty finalized result).
    pub t_start_max: f32,
    /// Finalize after this much trailing silence once speech was heard.
    pub t_end: f32,
    /// Force-finalize an utterance after this total duration regardless of
    /// activity, bounding utterance length.
    pub t_max: f32,
}

impl EndpointerDelays {
    /// All three values must be finite and non-negative to be accepted.
    pub fn is_valid(&self) -> bool {
        [self.t_start_max, self.t_end, self.t_max]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

// ---------------------------------------------------------------------------
// EndpointerConfig
// ---------------------------------------------------------------------------

/// Mode preset plus optional explicit override.
///
/// The two are stored separately so switching modes after an explicit
/// `set_endpointer_delays` call does not silently resurrect preset values:
/// explicit delays, once set, always win.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointerConfig {
    /// Currently selected preset.
    pub mode: EndpointerMode,
    /// Explicit delays, overriding the preset table when present.
    pub explicit: Option<EndpointerDelays>,
}

impl EndpointerConfig {
    /// The thresholds in force right now.
    pub fn effective(&self) -> EndpointerDelays {
        self.explicit.unwrap_or_else(|| self.mode.delays())
    }
}

// ---------------------------------------------------------------------------
// EndpointTrigger
// ---------------------------------------------------------------------------

/// Why the endpointer decided to finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointTrigger {
    /// `t_start_max` of silence elapsed before any speech: the finalized
    /// result carries no decoded speech.
    InitialSilence,
    /// `t_end` of trailing silence after speech.
    TrailingSilence,
    /// The utterance hit `t_max` and was cut off mid-speech.
    MaxDuration,
}

// ---------------------------------------------------------------------------
// Endpointer
// ---------------------------------------------------------------------------

/// The per-stream endpointing state machine.
///
/// Counters advance by whole decode-frame durations; "silent with zero
/// utterance time" doubles as the not-yet-started state.
#[derive(Debug, Default)]
pub struct Endpointer {
    in_utterance: bool,
    /// Seconds of silence since the last speech frame (or stream start).
    silence_secs: f32,
    /// Seconds elapsed since the utterance started, trailing silence
    /// included.
    utterance_secs: f32,
}

impl Endpointer {
    /// A fresh endpointer in the silent, not-yet-started state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while an utterance is in progress (speech was heard
    /// and no finalization has fired since).
    pub fn in_utterance(&self) -> bool {
        self.in_utterance
    }

    /// Advance the machine by one decode frame.
    ///
    /// `speech` is the engine's activity signal for the frame, `frame_secs`
    /// its duration, `delays` the thresholds in force for this evaluation.
    /// When a finalization trigger fires the machine returns to its initial
    /// state and reports the trigger; the caller finalizes the engine
    /// hypothesis (or emits an empty result for
    /// [`EndpointTrigger::InitialSilence`]).
    pub fn observe(
        &mut self,
        speech: bool,
        frame_secs: f32,
        delays: &EndpointerDelays,
    ) -> Option<EndpointTrigger> {
        if speech {
            self.in_utterance = true;
            self.silence_secs = 0.0;
            self.utterance_secs += frame_secs;
        } else {
            self.silence_secs += frame_secs;
            if self.in_utterance {
                self.utterance_secs += frame_secs;
            }
        }

        let trigger = if !self.in_utterance {
            (self.silence_secs > delays.t_start_max).then_some(EndpointTrigger::InitialSilence)
        } else if self.silence_secs > delays.t_end {
            Some(EndpointTrigger::TrailingSilence)
        } else if self.utterance_secs > delays.t_max {
            Some(EndpointTrigger::MaxDuration)
        } else {
            None
        };

        if trigger.is_some() {
            self.reset();
        }
        trigger
    }

    /// Return to the initial state.  Called on every finalization; flush
    /// uses the same path, so a flushed utterance leaves no residue in the
    /// counters.
    pub fn reset(&mut self) {
        self.in_utterance = false;
        self.silence_secs = 0.0;
        self.utterance_secs = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 ms frames keep the arithmetic readable.
    const FRAME: f32 = 0.1;

    fn delays(t_start_max: f32, t_end: f32, t_max: f32) -> EndpointerDelays {
        EndpointerDelays {
            t_start_max,
            t_end,
            t_max,
        }
    }

    /// Drive `n` frames of the given activity, asserting no finalization
    /// fires along the way.
    fn feed_quietly(ep: &mut Endpointer, speech: bool, n: usize, d: &EndpointerDelays) {
        for i in 0..n {
            assert_eq!(
                ep.observe(speech, FRAME, d),
                None,
                "unexpected trigger at frame {i}"
            );
        }
    }

    // ---- initial silence ---------------------------------------------------

    #[test]
    fn initial_silence_times_out_with_empty_trigger() {
        let d = delays(0.5, 0.5, 20.0);
        let mut ep = Endpointer::new();

        // 5 frames * 0.1 s = 0.5 s: not yet over the threshold.
        feed_quietly(&mut ep, false, 5, &d);
        // The 6th frame pushes past t_start_max.
        assert_eq!(
            ep.observe(false, FRAME, &d),
            Some(EndpointTrigger::InitialSilence)
        );
        assert!(!ep.in_utterance());
    }

    #[test]
    fn initial_silence_counter_restarts_after_timeout() {
        let d = delays(0.3, 0.5, 20.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, false, 3, &d);
        assert!(ep.observe(false, FRAME, &d).is_some());

        // Fresh countdown after the timeout.
        feed_quietly(&mut ep, false, 3, &d);
        assert_eq!(
            ep.observe(false, FRAME, &d),
            Some(EndpointTrigger::InitialSilence)
        );
    }

    #[test]
    fn speech_cancels_the_initial_silence_clock() {
        let d = delays(0.3, 0.5, 20.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, false, 3, &d);
        assert_eq!(ep.observe(true, FRAME, &d), None);
        assert!(ep.in_utterance());
    }

    // ---- trailing silence --------------------------------------------------

    #[test]
    fn trailing_silence_finalizes_after_t_end() {
        let d = delays(5.0, 0.3, 20.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, true, 4, &d);
        feed_quietly(&mut ep, false, 3, &d); // exactly 0.3 s, not yet over
        assert_eq!(
            ep.observe(false, FRAME, &d),
            Some(EndpointTrigger::TrailingSilence)
        );
        assert!(!ep.in_utterance());
    }

    #[test]
    fn speech_resets_the_trailing_silence_clock() {
        let d = delays(5.0, 0.3, 20.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, true, 2, &d);
        feed_quietly(&mut ep, false, 2, &d);
        // Speech again: silence clock restarts.
        feed_quietly(&mut ep, true, 1, &d);
        feed_quietly(&mut ep, false, 3, &d);
        assert_eq!(
            ep.observe(false, FRAME, &d),
            Some(EndpointTrigger::TrailingSilence)
        );
    }

    // ---- forced cutoff -----------------------------------------------------

    #[test]
    fn continuous_speech_hits_max_duration() {
        let d = delays(5.0, 0.5, 1.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, true, 10, &d); // exactly 1.0 s
        assert_eq!(
            ep.observe(true, FRAME, &d),
            Some(EndpointTrigger::MaxDuration)
        );
        assert!(!ep.in_utterance());
    }

    #[test]
    fn utterance_clock_includes_internal_silence() {
        let d = delays(5.0, 1.0, 0.5);
        let mut ep = Endpointer::new();

        // 0.3 s speech + 0.2 s silence = 0.5 s total; next frame trips t_max
        // before the 1.0 s t_end is anywhere close.
        feed_quietly(&mut ep, true, 3, &d);
        feed_quietly(&mut ep, false, 2, &d);
        assert_eq!(
            ep.observe(false, FRAME, &d),
            Some(EndpointTrigger::MaxDuration)
        );
    }

    #[test]
    fn counters_restart_after_finalization() {
        let d = delays(5.0, 0.2, 1.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, true, 3, &d);
        feed_quietly(&mut ep, false, 2, &d);
        assert!(ep.observe(false, FRAME, &d).is_some());

        // A second utterance gets a full t_max budget of its own.
        feed_quietly(&mut ep, true, 10, &d);
        assert_eq!(
            ep.observe(true, FRAME, &d),
            Some(EndpointTrigger::MaxDuration)
        );
    }

    // ---- live reconfiguration ----------------------------------------------

    #[test]
    fn tightened_delays_apply_to_the_utterance_in_flight() {
        let loose = delays(5.0, 2.0, 20.0);
        let tight = delays(5.0, 0.1, 20.0);
        let mut ep = Endpointer::new();

        feed_quietly(&mut ep, true, 2, &loose);
        feed_quietly(&mut ep, false, 2, &loose);
        // Thresholds are read per evaluation: handing tighter delays to the
        // next frame finalizes immediately.
        assert_eq!(
            ep.observe(false, FRAME, &tight),
            Some(EndpointTrigger::TrailingSilence)
        );
    }

    // ---- modes and config --------------------------------------------------

    #[test]
    fn mode_codes_round_trip() {
        assert_eq!(EndpointerMode::from_code(0), Some(EndpointerMode::Default));
        assert_eq!(EndpointerMode::from_code(1), Some(EndpointerMode::Short));
        assert_eq!(EndpointerMode::from_code(2), Some(EndpointerMode::Long));
        assert_eq!(EndpointerMode::from_code(3), Some(EndpointerMode::VeryLong));
        assert_eq!(EndpointerMode::from_code(4), None);
        assert_eq!(EndpointerMode::from_code(-1), None);
    }

    #[test]
    fn presets_scale_with_mode() {
        let short = EndpointerMode::Short.delays();
        let default = EndpointerMode::Default.delays();
        let long = EndpointerMode::Long.delays();
        let very_long = EndpointerMode::VeryLong.delays();

        assert!(short.t_end < default.t_end);
        assert!(default.t_end < long.t_end);
        assert!(long.t_end < very_long.t_end);
        assert!(short.t_max < default.t_max);
        assert!(long.t_max < very_long.t_max);
    }

    #[test]
    fn explicit_delays_override_mode() {
        let mut cfg = EndpointerConfig::default();
        assert_eq!(cfg.effective(), EndpointerMode::Default.delays());

        let custom = delays(1.0, 0.1, 2.0);
        cfg.explicit = Some(custom);
        assert_eq!(cfg.effective(), custom);

        // Switching modes does not displace an explicit override.
        cfg.mode = EndpointerMode::VeryLong;
        assert_eq!(cfg.effective(), custom);
    }

    #[test]
    fn delay_validation() {
        assert!(delays(0.0, 0.0, 0.0).is_valid());
        assert!(delays(5.0, 0.5, 20.0).is_valid());
        assert!(!delays(-0.1, 0.5, 20.0).is_valid());
        assert!(!delays(5.0, f32::NAN, 20.0).is_valid());
        assert!(!delays(5.0, 0.5, f32::INFINITY).is_valid());
    }
}
