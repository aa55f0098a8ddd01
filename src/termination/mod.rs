//! Stopping callbacks
//!
//! This module provides early-stopping predicates that are checked after every
//! recorded generation. All metric values are signed fitness statistics, so
//! larger always means better regardless of the optimization direction.

use std::time::{Duration, Instant};

use crate::diagnostics::{Logbook, Metric};

/// Early-stopping predicate
///
/// Callbacks only see the history; the engine calls `on_step` after the
/// generation's statistics have been recorded.
pub trait StoppingCallback: Send {
    /// Called once before the initial population is sampled
    fn on_start(&mut self) {}

    /// Return true to stop the run after `generation`
    fn on_step(&mut self, history: &Logbook, generation: usize) -> bool;

    /// Get a description of why the run stopped
    fn reason(&self) -> &'static str;
}

/// Stop once a metric has reached a threshold in any generation
#[derive(Clone, Debug)]
pub struct ThresholdStopping {
    /// Value to reach
    pub threshold: f64,
    /// Statistic to watch
    pub metric: Metric,
}

impl ThresholdStopping {
    /// Watch the best fitness
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            metric: Metric::FitnessMax,
        }
    }

    /// Watch another statistic
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

impl StoppingCallback for ThresholdStopping {
    fn on_step(&mut self, history: &Logbook, _generation: usize) -> bool {
        history
            .iter()
            .any(|record| record.metric(self.metric) >= self.threshold)
    }

    fn reason(&self) -> &'static str {
        "ThresholdStopping: metric reached threshold"
    }
}

/// Stop when a metric's spread over the last `generations` records is at
/// most `threshold`
#[derive(Clone, Debug)]
pub struct DeltaThreshold {
    /// Largest spread that still counts as converged
    pub threshold: f64,
    /// Window size (at least 2)
    pub generations: usize,
    /// Statistic to watch
    pub metric: Metric,
}

impl DeltaThreshold {
    /// Window of two generations over the best fitness
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            generations: 2,
            metric: Metric::FitnessMax,
        }
    }

    /// Set the window size
    pub fn with_generations(mut self, generations: usize) -> Self {
        assert!(generations >= 2, "DeltaThreshold window must be at least 2");
        self.generations = generations;
        self
    }

    /// Watch another statistic
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

impl StoppingCallback for DeltaThreshold {
    fn on_step(&mut self, history: &Logbook, _generation: usize) -> bool {
        if history.len() < self.generations {
            return false;
        }
        let window = &history.history()[history.len() - self.generations..];
        let values = window.iter().map(|r| r.metric(self.metric));
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = values.fold(f64::INFINITY, f64::min);

        max - min <= self.threshold
    }

    fn reason(&self) -> &'static str {
        "DeltaThreshold: metric spread fell below threshold"
    }
}

/// Stop when the latest value is no better than every one of the previous
/// `generations` values
#[derive(Clone, Debug)]
pub struct ConsecutiveStopping {
    /// Number of previous generations to compare against
    pub generations: usize,
    /// Statistic to watch
    pub metric: Metric,
}

impl ConsecutiveStopping {
    /// Compare the best fitness against the previous `generations` records
    pub fn new(generations: usize) -> Self {
        assert!(generations >= 1, "ConsecutiveStopping needs at least 1 generation");
        Self {
            generations,
            metric: Metric::FitnessMax,
        }
    }

    /// Watch another statistic
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

impl StoppingCallback for ConsecutiveStopping {
    fn on_step(&mut self, history: &Logbook, _generation: usize) -> bool {
        if history.len() <= self.generations {
            return false;
        }
        let records = history.history();
        let current = records[records.len() - 1].metric(self.metric);
        records[records.len() - 1 - self.generations..records.len() - 1]
            .iter()
            .all(|r| current <= r.metric(self.metric))
    }

    fn reason(&self) -> &'static str {
        "ConsecutiveStopping: no improvement over previous generations"
    }
}

/// Stop once a wall-clock budget has elapsed since the run started
#[derive(Clone, Debug)]
pub struct TimerStopping {
    /// Time budget
    pub total: Duration,
    started: Option<Instant>,
}

impl TimerStopping {
    /// Create a timer with the given budget
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            started: None,
        }
    }

    /// Create a timer with a budget in seconds
    pub fn from_secs_f64(seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(seconds))
    }
}

impl StoppingCallback for TimerStopping {
    fn on_start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn on_step(&mut self, _history: &Logbook, _generation: usize) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= self.total
    }

    fn reason(&self) -> &'static str {
        "TimerStopping: time budget elapsed"
    }
}

/// Ordered set of stopping callbacks combined with OR logic
#[derive(Default)]
pub struct StoppingCallbacks {
    callbacks: Vec<Box<dyn StoppingCallback>>,
}

impl StoppingCallbacks {
    /// Create an empty set (never stops)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn with<C: StoppingCallback + 'static>(mut self, callback: C) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Add a boxed callback
    pub fn push(&mut self, callback: Box<dyn StoppingCallback>) {
        self.callbacks.push(callback);
    }

    /// Number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if there are no callbacks
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Notify every callback that a run is starting
    pub fn on_start(&mut self) {
        for callback in &mut self.callbacks {
            callback.on_start();
        }
    }

    /// Evaluate every callback in order
    ///
    /// All callbacks run so their internal state stays current. Returns the
    /// reason of the first one that asked to stop.
    pub fn should_stop(&mut self, history: &Logbook, generation: usize) -> Option<&'static str> {
        let mut reason = None;
        for callback in &mut self.callbacks {
            if callback.on_step(history, generation) && reason.is_none() {
                reason = Some(callback.reason());
            }
        }
        reason
    }
}

impl std::fmt::Debug for StoppingCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reasons: Vec<&str> = self.callbacks.iter().map(|c| c.reason()).collect();
        f.debug_struct("StoppingCallbacks")
            .field("callbacks", &reasons)
            .finish()
    }
}

impl<C: StoppingCallback + 'static> From<C> for StoppingCallbacks {
    fn from(callback: C) -> Self {
        Self::new().with(callback)
    }
}

impl From<Vec<Box<dyn StoppingCallback>>> for StoppingCallbacks {
    fn from(callbacks: Vec<Box<dyn StoppingCallback>>) -> Self {
        Self { callbacks }
    }
}

pub mod prelude {
    pub use super::{
        ConsecutiveStopping, DeltaThreshold, StoppingCallback, StoppingCallbacks,
        ThresholdStopping, TimerStopping,
    };
}
