//! Fitness traits
//!
//! This module defines the two outward collaborators of the search: the
//! scoring function that turns a parameter mapping into a raw score, and the
//! optional experiment logger that observes every scored mapping.

use std::error::Error;

use crate::space::value::ParamMap;

/// Error type returned by a failing scorer
pub type ScoreError = Box<dyn Error + Send + Sync>;

/// Scoring function
///
/// Maps a decoded parameter mapping to a raw score (for example a
/// cross-validated metric). The score is raw: the evaluator applies the
/// optimization direction. Implementations run concurrently when more than
/// one worker is configured.
pub trait Scorer: Send + Sync {
    /// Score one parameter mapping
    fn score(&self, params: &ParamMap) -> Result<f64, ScoreError>;
}

impl<F> Scorer for F
where
    F: Fn(&ParamMap) -> Result<f64, ScoreError> + Send + Sync,
{
    fn score(&self, params: &ParamMap) -> Result<f64, ScoreError> {
        self(params)
    }
}

/// Wrap a closure as a [`Scorer`], letting the compiler infer its signature
pub fn scorer_fn<F>(f: F) -> F
where
    F: Fn(&ParamMap) -> Result<f64, ScoreError> + Send + Sync,
{
    f
}

/// Experiment logger
///
/// Receives every scored mapping together with its raw score. Always called
/// from the control thread, after a generation's evaluations complete.
pub trait ExperimentLogger: Send + Sync {
    /// Record one scored mapping
    fn log(&self, params: &ParamMap, score: f64);
}

impl<F> ExperimentLogger for F
where
    F: Fn(&ParamMap, f64) + Send + Sync,
{
    fn log(&self, params: &ParamMap, score: f64) {
        self(params, score)
    }
}
