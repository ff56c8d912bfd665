//! Process-wide log verbosity control.
//!
//! The crate logs through the [`log`] facade; installing an actual logger
//! (e.g. `env_logger`) is the embedding application's job.  What this module
//! adds is the integer verbosity knob traditionally exposed by recognition
//! toolkits, mapped onto the facade's maximum level:
//!
//! | level | effect                |
//! |-------|-----------------------|
//! | `< 0` | errors only           |
//! | `0`   | info and errors       |
//! | `1`   | debug and above       |
//! | `> 1` | everything (trace)    |

use log::LevelFilter;

// ---------------------------------------------------------------------------
// set_log_level
// ---------------------------------------------------------------------------

/// Set the process-wide maximum log level.
///
/// Global state shared by every recognizer (and everything else logging
/// through the facade in this process), not a per-recognizer setting.
pub fn set_log_level(level: i32) {
    log::set_max_level(filter_for(level));
}

/// The facade filter a verbosity integer maps to.
fn filter_for(level: i32) -> LevelFilter {
    match level {
        i32::MIN..=-1 => LevelFilter::Error,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
