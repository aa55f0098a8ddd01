//! Fitness evaluation
//!
//! This module turns individuals into signed fitness values: genes are decoded
//! into a parameter mapping, handed to the scorer, and the raw score is
//! multiplied by the criteria sign so that higher is always better.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::fitness::traits::{ExperimentLogger, Scorer};
use crate::population::individual::Individual;
use crate::space::value::{render_params, ParamMap};
use crate::space::Space;

/// Optimization direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Criteria {
    /// Maximize the raw score
    #[default]
    Max,
    /// Minimize the raw score
    Min,
}

impl Criteria {
    /// Names accepted by `FromStr`
    pub const VALID: [&'static str; 2] = ["max", "min"];

    /// +1 for max, -1 for min
    pub fn sign(self) -> f64 {
        match self {
            Self::Max => 1.0,
            Self::Min => -1.0,
        }
    }

    /// Convert a signed fitness back to a raw score
    pub fn to_raw(self, fitness: f64) -> f64 {
        fitness * self.sign()
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Min => write!(f, "min"),
        }
    }
}

impl FromStr for Criteria {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(SearchError::config(format!(
                "criteria must be one of {:?}, got '{}'",
                Self::VALID,
                other
            ))),
        }
    }
}

impl TryFrom<String> for Criteria {
    type Error = SearchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// What to do when the scorer fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorScoreRepr", into = "ErrorScoreRepr")]
pub enum ErrorScore {
    /// Abort the whole run with the scorer's error
    #[default]
    Raise,
    /// Substitute this raw score and keep going
    Value(f64),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ErrorScoreRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<ErrorScoreRepr> for ErrorScore {
    type Error = SearchError;

    fn try_from(repr: ErrorScoreRepr) -> Result<Self, Self::Error> {
        match repr {
            ErrorScoreRepr::Number(v) => Ok(Self::Value(v)),
            ErrorScoreRepr::Text(s) => s.parse(),
        }
    }
}

impl From<ErrorScore> for ErrorScoreRepr {
    fn from(score: ErrorScore) -> Self {
        match score {
            ErrorScore::Raise => Self::Text("raise".to_string()),
            ErrorScore::Value(v) if v.is_finite() => Self::Number(v),
            ErrorScore::Value(v) => Self::Text(v.to_string()),
        }
    }
}

impl fmt::Display for ErrorScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise => write!(f, "raise"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for ErrorScore {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "raise" {
            return Ok(Self::Raise);
        }
        s.parse::<f64>().map(Self::Value).map_err(|_| {
            SearchError::config(format!(
                "error_score must be 'raise' or a number, got '{s}'"
            ))
        })
    }
}

/// One scored individual
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Generation in which the individual was scored
    pub generation: usize,
    /// Decoded parameters
    pub params: ParamMap,
    /// Raw score (the fallback value when the scorer failed)
    pub score: f64,
    /// Signed fitness assigned to the individual
    pub fitness: f64,
    /// Scorer error message when the fallback was substituted
    pub failure: Option<String>,
}

/// Scores individuals and assigns their signed fitness
pub struct FitnessEvaluator<S> {
    scorer: S,
    criteria: Criteria,
    error_score: ErrorScore,
    logger: Option<Box<dyn ExperimentLogger>>,
    n_jobs: usize,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<S> fmt::Debug for FitnessEvaluator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitnessEvaluator")
            .field("criteria", &self.criteria)
            .field("error_score", &self.error_score)
            .field("has_logger", &self.logger.is_some())
            .field("n_jobs", &self.n_jobs)
            .finish()
    }
}

impl<S: Scorer> FitnessEvaluator<S> {
    /// Create a sequential evaluator that raises on scorer failure
    pub fn new(scorer: S, criteria: Criteria) -> Self {
        Self {
            scorer,
            criteria,
            error_score: ErrorScore::Raise,
            logger: None,
            n_jobs: 1,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Set the failure policy
    pub fn with_error_score(mut self, error_score: ErrorScore) -> Self {
        self.error_score = error_score;
        self
    }

    /// Attach an experiment logger
    pub fn with_logger<L: ExperimentLogger + 'static>(self, logger: L) -> Self {
        self.with_boxed_logger(Box::new(logger))
    }

    /// Attach an already boxed experiment logger
    pub fn with_boxed_logger(mut self, logger: Box<dyn ExperimentLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Evaluate with up to `n_jobs` concurrent scorer calls
    ///
    /// Without the `parallel` feature the bound is recorded but evaluation
    /// stays sequential.
    pub fn with_n_jobs(mut self, n_jobs: usize) -> SearchResult<Self> {
        if n_jobs == 0 {
            return Err(SearchError::config("n_jobs must be at least 1"));
        }
        self.n_jobs = n_jobs;

        #[cfg(feature = "parallel")]
        {
            self.pool = if n_jobs > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_jobs)
                    .thread_name(|i| format!("genetic-search-eval-{i}"))
                    .build()
                    .map_err(|e| {
                        SearchError::config(format!("failed to build evaluation pool: {e}"))
                    })?;
                Some(pool)
            } else {
                None
            };
        }
        #[cfg(not(feature = "parallel"))]
        if n_jobs > 1 {
            log::debug!("parallel feature disabled, evaluating {n_jobs} jobs sequentially");
        }

        Ok(self)
    }

    /// Optimization direction
    pub fn criteria(&self) -> Criteria {
        self.criteria
    }

    /// Failure policy
    pub fn error_score(&self) -> ErrorScore {
        self.error_score
    }

    /// Worker bound
    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    fn score_one(&self, space: &Space, individual: &Individual) -> (ParamMap, Result<f64, String>) {
        let params = space.decode(&individual.genes);
        let outcome = self.scorer.score(&params).map_err(|e| e.to_string());
        (params, outcome)
    }

    fn score_pending(
        &self,
        space: &Space,
        individuals: &[Individual],
        pending: &[usize],
    ) -> Vec<(ParamMap, Result<f64, String>)> {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(|| {
                pending
                    .par_iter()
                    .map(|&i| self.score_one(space, &individuals[i]))
                    .collect()
            });
        }

        pending
            .iter()
            .map(|&i| self.score_one(space, &individuals[i]))
            .collect()
    }

    /// Score every individual whose fitness is unset
    ///
    /// Scorer calls may run concurrently; fitness assignment, failure
    /// handling, and logging happen afterwards in population order. Under
    /// [`ErrorScore::Raise`] the first failure in population order aborts
    /// with [`SearchError::Evaluation`].
    pub fn evaluate_population(
        &self,
        space: &Space,
        individuals: &mut [Individual],
        generation: usize,
    ) -> SearchResult<Vec<EvaluationRecord>> {
        let pending: Vec<usize> = individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_evaluated())
            .map(|(i, _)| i)
            .collect();
        let outcomes = self.score_pending(space, individuals, &pending);
        let sign = self.criteria.sign();

        let mut records = Vec::with_capacity(pending.len());
        for (index, (params, outcome)) in pending.into_iter().zip(outcomes) {
            let (score, failure) = match outcome {
                Ok(score) => (score, None),
                Err(message) => match self.error_score {
                    ErrorScore::Raise => {
                        return Err(SearchError::Evaluation {
                            params: render_params(&params),
                            message,
                        });
                    }
                    ErrorScore::Value(fallback) => {
                        log::warn!(
                            "scoring {} failed ({}), substituting {}",
                            render_params(&params),
                            message,
                            fallback
                        );
                        (fallback, Some(message))
                    }
                },
            };

            let fitness = sign * score;
            individuals[index].set_fitness(fitness);
            if let Some(logger) = &self.logger {
                logger.log(&params, score);
            }
            records.push(EvaluationRecord {
                generation,
                params,
                score,
                fitness,
                failure,
            });
        }

        Ok(records)
    }
}
