//! Time utilities for questline
//!
//! Daily challenges reset at local midnight, so everything here works in
//! local wall-clock time. Callers take a [`Clock`] instead of reading the
//! system time directly, which keeps day-boundary logic testable.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `QUESTLINE_MOCK_TIME` environment variable can be set
//! to override the system time seen by [`SystemClock`]. This is useful for
//! checking day rollover without waiting for midnight.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 23:30:00`)
//!
//! Example:
//! ```bash
//! QUESTLINE_MOCK_TIME="2025-12-25 23:30:00" questline status quiz-1
//! ```

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::sync::{Mutex, OnceLock};

use crate::DayKey;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "QUESTLINE_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Offset between mock time and real time, captured once per process.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                return parse_mock_offset(&mock_time_str, Local::now());
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Compute the offset that maps `real_now` onto the given mock time string.
#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn parse_mock_offset(mock_time_str: &str, real_now: DateTime<Local>) -> Option<chrono::Duration> {
    let Ok(naive_dt) = NaiveDateTime::parse_from_str(mock_time_str, MOCK_TIME_FORMAT) else {
        tracing::warn!(
            mock_time = %mock_time_str,
            expected_format = MOCK_TIME_FORMAT,
            "Invalid mock time format"
        );
        return None;
    };

    match Local.from_local_datetime(&naive_dt).single() {
        Some(mock_dt) => {
            let offset = mock_dt.signed_duration_since(real_now);
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        None => {
            tracing::warn!(
                mock_time = %mock_time_str,
                "Failed to convert mock time to local timezone"
            );
            None
        }
    }
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Source of "now" for anything that depends on the calendar day
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Key for the current local calendar day
    fn day_key(&self) -> DayKey {
        DayKey::from_date(self.today())
    }
}

/// Clock backed by the system time (or mock time in debug builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        now()
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Build a clock at the given local wall-clock time.
    ///
    /// Returns `None` when the time does not exist locally (DST gap).
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .map(Self::new)
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Time remaining until the next local midnight.
///
/// Exactly at midnight the current instant already is the boundary, so the
/// result is zero rather than a full day.
pub fn until_next_midnight(now: &DateTime<Local>) -> chrono::Duration {
    if now.time() == NaiveTime::MIN {
        return chrono::Duration::zero();
    }

    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return chrono::Duration::zero();
    };
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.signed_duration_since(*now),
        // Midnight skipped by a DST jump: fall back to wall-clock distance
        LocalResult::None => midnight.signed_duration_since(now.naive_local()),
    }
}

/// Whole hours until the daily reset, rounded up.
pub fn hours_until_reset(now: &DateTime<Local>) -> u32 {
    let millis = until_next_midnight(now).num_milliseconds().max(0);
    let hours = (millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
    hours as u32
}

/// Render a countdown like `9h 05m`, `12m 30s` or `45s`
pub fn format_countdown(remaining: chrono::Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);

    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m {:02}s", minutes, seconds),
        _ => format!("{}h {:02}m", hours, minutes),
    }
}
