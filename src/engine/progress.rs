//! Progress merging for compression jobs
//!
//! Two sources feed a job's percentage: a synthetic ticker that creeps
//! forward on a fixed interval while the engine is silent, and the engine's
//! own fractional reports. [`ProgressMerger`] folds both into one
//! non-decreasing value; [`SyntheticTicker`] owns the timer task.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Synthetic ticker tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerSettings {
    /// Time between synthetic ticks
    #[serde(with = "duration_ms", rename = "tick_interval_ms")]
    pub interval: Duration,
    /// Percentage points added per tick
    #[serde(rename = "tick_step")]
    pub step: u8,
    /// Synthetic progress never exceeds this value
    #[serde(rename = "tick_cap")]
    pub cap: u8,
}

impl Default for TickerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            step: 2,
            cap: 90,
        }
    }
}

impl TickerSettings {
    /// Ticks needed to carry synthetic progress from zero to its cap
    pub fn ticks_to_cap(&self) -> u32 {
        let cap = u32::from(self.cap.min(PRE_COMPLETION_CEILING));
        let step = u32::from(self.step.max(1));
        (cap + step - 1) / step
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Highest value reachable before the job is marked complete
const PRE_COMPLETION_CEILING: u8 = 99;

/// Folds synthetic ticks and engine reports into one percentage.
///
/// The value never decreases. Once the engine has reported anything, ticks
/// are ignored. After [`finish`](Self::finish) or [`halt`](Self::halt)
/// nothing moves the value again.
#[derive(Debug, Clone)]
pub struct ProgressMerger {
    value: u8,
    engine_reported: bool,
    finished: bool,
    settings: TickerSettings,
}

impl ProgressMerger {
    pub fn new(settings: TickerSettings) -> Self {
        Self {
            value: 0,
            engine_reported: false,
            finished: false,
            settings,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn engine_has_reported(&self) -> bool {
        self.engine_reported
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one synthetic tick; returns the new value if it moved
    pub fn on_tick(&mut self) -> Option<u8> {
        if self.finished || self.engine_reported {
            return None;
        }

        let cap = self.settings.cap.min(PRE_COMPLETION_CEILING);
        let next = self.value.saturating_add(self.settings.step).min(cap);
        self.advance_to(next)
    }

    /// Apply an engine fraction; returns the new value if it moved
    pub fn on_engine_progress(&mut self, fraction: f64) -> Option<u8> {
        if self.finished {
            return None;
        }

        self.engine_reported = true;
        let percent = Self::fraction_to_percent(fraction).min(PRE_COMPLETION_CEILING);
        self.advance_to(percent)
    }

    /// Force the value to 100 and stop accepting input
    pub fn finish(&mut self) -> u8 {
        self.finished = true;
        self.value = 100;
        self.value
    }

    /// Stop accepting input, keeping the last value
    pub fn halt(&mut self) {
        self.finished = true;
    }

    /// Convert an engine fraction to a whole percentage in `[0, 100]`
    pub fn fraction_to_percent(fraction: f64) -> u8 {
        if !fraction.is_finite() {
            return 0;
        }
        (fraction * 100.0).clamp(0.0, 100.0).round() as u8
    }

    fn advance_to(&mut self, next: u8) -> Option<u8> {
        if next > self.value {
            self.value = next;
            Some(next)
        } else {
            None
        }
    }
}

/// Periodic timer task driving synthetic progress.
///
/// The callback returns `false` to stop the ticker. The task is aborted
/// when the ticker is stopped or dropped.
pub struct SyntheticTicker {
    handle: JoinHandle<()>,
}

impl SyntheticTicker {
    /// Spawn a ticker whose first tick fires one `period` from now
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SyntheticTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
