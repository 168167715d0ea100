use readings::{Reading, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const FULL_WINDOW_SECONDS: [u64; 6] = [900, 3_600, 14_400, 43_200, 86_400, 604_800];
pub const FULL_WINDOW_LABELS: [&str; 6] = ["15m", "1h", "4h", "12h", "1d", "1w"];
pub const COMPACT_WINDOW_SECONDS: [u64; 4] = [900, 3_600, 86_400, 604_800];
pub const COMPACT_WINDOW_LABELS: [&str; 4] = ["15 minutes", "1 hour", "1 day", "1 week"];

/// Readings of `series` with `now - timestamp <= window_seconds`.
///
/// `series` must be ascending by timestamp; the result is the matching
/// suffix, borrowed from the input.
pub fn filter(series: &[Reading], window_seconds: u64, now: Timestamp) -> &[Reading] {
    let window = i64::try_from(window_seconds).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(window);
    let start = series.partition_point(|reading| reading.timestamp < cutoff);
    &series[start..]
}

/// Duration steps offered by a window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowTable {
    /// 15m, 1h, 4h, 12h, 1d, 1w
    Full,
    /// 15m, 1h, 1d, 1w
    Compact,
}

impl WindowTable {
    pub fn seconds(self) -> &'static [u64] {
        match self {
            WindowTable::Full => &FULL_WINDOW_SECONDS,
            WindowTable::Compact => &COMPACT_WINDOW_SECONDS,
        }
    }

    pub fn labels(self) -> &'static [&'static str] {
        match self {
            WindowTable::Full => &FULL_WINDOW_LABELS,
            WindowTable::Compact => &COMPACT_WINDOW_LABELS,
        }
    }

    pub fn len(self) -> usize {
        self.seconds().len()
    }

    pub fn seconds_for(self, ordinal: usize) -> Option<u64> {
        self.seconds().get(ordinal).copied()
    }

    pub fn label_for(self, ordinal: usize) -> Option<&'static str> {
        self.labels().get(ordinal).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSelector {
    table: WindowTable,
    ordinal: usize,
}

impl WindowSelector {
    /// Out-of-range ordinals are clamped to the last step.
    pub fn new(table: WindowTable, ordinal: usize) -> Self {
        Self {
            table,
            ordinal: ordinal.min(table.len() - 1),
        }
    }

    /// Returns false and keeps the current step when `ordinal` is not in
    /// the table.
    pub fn select(&mut self, ordinal: usize) -> bool {
        if ordinal >= self.table.len() {
            log::warn!(
                "window ordinal {ordinal} out of range for {:?} table",
                self.table
            );
            return false;
        }
        self.ordinal = ordinal;
        true
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn seconds(&self) -> u64 {
        self.table.seconds()[self.ordinal]
    }

    pub fn label(&self) -> &'static str {
        self.table.labels()[self.ordinal]
    }
}

pub trait Clock {
    /// Current time in epoch seconds.
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as Timestamp)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Fixed-cadence trigger for re-deriving the window against a fresh `now`
/// while no feed event or user action arrives.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    cadence: Duration,
    last: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence: cadence.max(Duration::from_millis(1)),
            last: None,
        }
    }

    /// True when a refresh is due at `at`; marks it as done.
    pub fn due(&mut self, at: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => at.saturating_duration_since(last) >= self.cadence,
        };
        if due {
            self.last = Some(at);
        }
        due
    }

    /// Records a refresh triggered by something else (feed push, selector
    /// change) so the cadence restarts from there.
    pub fn mark(&mut self, at: Instant) {
        self.last = Some(at);
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.last.map(|last| last + self.cadence)
    }
}
