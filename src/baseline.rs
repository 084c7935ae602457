//! Baseline comparison and trend history
//!
//! One reusable deviation comparator serves both analyses: deviation is
//! `current − baseline`, and the status label comes from an ordered rule
//! list with strict comparisons. The trend window is a bounded ring buffer
//! owned by the caller, used only for optional smoothing across repeated
//! calls.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default trend window capacity
pub const DEFAULT_TREND_CAPACITY: usize = 100;

/// One deviation rule: matches strictly above or strictly below a bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    Above(f64),
    Below(f64),
}

impl Band {
    fn matches(&self, deviation: f64) -> bool {
        match *self {
            Band::Above(bound) => deviation > bound,
            Band::Below(bound) => deviation < bound,
        }
    }
}

/// Classify a value against a baseline.
///
/// Returns `(deviation, status)` where deviation is exactly
/// `current − baseline`. Rules are evaluated in order and the first match
/// wins; a deviation sitting exactly on a bound falls through to later
/// rules or the fallback.
pub fn classify_deviation<S: Copy>(
    current: f64,
    baseline: f64,
    rules: &[(Band, S)],
    fallback: S,
) -> (f64, S) {
    let deviation = current - baseline;
    for &(band, status) in rules {
        if band.matches(deviation) {
            return (deviation, status);
        }
    }
    (deviation, fallback)
}

/// Bounded ring buffer of recent scores for trend smoothing.
///
/// The engine never owns one of these; callers hold them across analysis
/// calls and pass the rolling mean in as a baseline when they want trend
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Default for TrendWindow {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_CAPACITY)
    }
}

impl TrendWindow {
    /// Create a trend window holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, dropping the oldest entries beyond capacity
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Rolling mean of the window, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f64 = self.values.iter().sum();
        Some(sum / self.values.len() as f64)
    }

    /// Most recent value, `None` when empty
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Load a trend window from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the trend window to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
