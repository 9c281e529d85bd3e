//! Step-aligned query windows for range queries.
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{ConfigError, ValidationError};

const DEFAULT_LOOKBACK_SECS: i64 = 600;
const DEFAULT_STEP_SECS: i64 = 60;

/// Default lookback: ten minutes of data per query.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(DEFAULT_LOOKBACK_SECS.unsigned_abs());
/// Default query resolution: one minute.
pub const DEFAULT_STEP: Duration = Duration::from_secs(DEFAULT_STEP_SECS.unsigned_abs());

/// Inclusive range-query bounds in epoch seconds, aligned on the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: i64,
    end: i64,
}

impl QueryWindow {
    /// Builds a window, rejecting empty or inverted bounds.
    ///
    /// # Errors
    ///
    /// Returns `EmptyWindow` when `start >= end`.
    pub const fn new(start: i64, end: i64) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Human-readable bounds for log records.
    #[must_use]
    pub fn describe(&self) -> (String, String) {
        (format_epoch(self.start), format_epoch(self.end))
    }
}

fn format_epoch(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map_or_else(|| seconds.to_string(), |time| time.to_rfc3339())
}

/// Computes query windows of a fixed lookback, padded by one step on each
/// side. The query engine drops boundary samples when the requested range
/// lands exactly on a step, so the padding keeps the first and last minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGenerator {
    lookback_secs: i64,
    step_secs: i64,
}

impl Default for WindowGenerator {
    fn default() -> Self {
        Self {
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            step_secs: DEFAULT_STEP_SECS,
        }
    }
}

impl WindowGenerator {
    /// Creates a generator from whole-second durations.
    ///
    /// # Errors
    ///
    /// Returns an error when either duration is shorter than a second or has
    /// a sub-second component.
    pub fn new(lookback: Duration, step: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            lookback_secs: whole_seconds(lookback, "lookback")?,
            step_secs: whole_seconds(step, "step")?,
        })
    }

    #[must_use]
    pub const fn step_secs(&self) -> i64 {
        self.step_secs
    }

    #[must_use]
    pub const fn lookback_secs(&self) -> i64 {
        self.lookback_secs
    }

    /// Window for the given wall-clock instant in epoch seconds.
    ///
    /// # Errors
    ///
    /// Returns `WindowOverflow` when `now` is so close to the `i64` bounds
    /// that the padded window cannot be represented.
    pub fn generate(&self, now: i64) -> Result<QueryWindow, ValidationError> {
        let overflow = || ValidationError::WindowOverflow { now };
        let raw_start = now.checked_sub(self.lookback_secs).ok_or_else(overflow)?;
        let start = raw_start
            .checked_div_euclid(self.step_secs)
            .and_then(|steps| steps.checked_sub(1))
            .and_then(|steps| steps.checked_mul(self.step_secs))
            .ok_or_else(overflow)?;
        let end = now
            .checked_div_euclid(self.step_secs)
            .and_then(|steps| steps.checked_add(1))
            .and_then(|steps| steps.checked_mul(self.step_secs))
            .ok_or_else(overflow)?;
        QueryWindow::new(start, end)
    }

    /// Window for the current system time.
    ///
    /// # Errors
    ///
    /// See [`WindowGenerator::generate`].
    pub fn generate_now(&self) -> Result<QueryWindow, ValidationError> {
        self.generate(Utc::now().timestamp())
    }
}

fn whole_seconds(value: Duration, field: &'static str) -> Result<i64, ConfigError> {
    if value.subsec_nanos() != 0 || value.as_secs() == 0 {
        return Err(ConfigError::WholeSecondsRequired { field });
    }
    i64::try_from(value.as_secs()).map_err(|_err| ConfigError::WholeSecondsRequired { field })
}
