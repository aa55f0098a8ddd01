//! Diagnostics and statistics
//!
//! This module provides the per-generation statistics recorder (the logbook)
//! and the result of a complete run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::fitness::evaluator::EvaluationRecord;
use crate::hall_of_fame::HallOfFame;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Statistics for a single generation
///
/// All values are computed over signed fitness, so `fitness_max` is always
/// the best individual of the generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation number (0 is the initial population)
    pub generation: usize,
    /// Individuals scored in this generation
    pub evaluations: usize,
    /// Mean fitness
    pub fitness: f64,
    /// Population standard deviation of fitness
    pub fitness_std: f64,
    /// Best fitness
    pub fitness_max: f64,
    /// Worst fitness
    pub fitness_min: f64,
}

impl GenerationRecord {
    /// Compute statistics from a fully evaluated, non-empty population
    pub fn from_population(population: &Population, generation: usize, evaluations: usize) -> Self {
        assert!(!population.is_empty(), "Cannot record an empty population");
        assert!(
            population.all_evaluated(),
            "Cannot record a population with unevaluated individuals"
        );

        let fitnesses = population.fitness_values();
        let n = fitnesses.len() as f64;
        let mean = fitnesses.iter().sum::<f64>() / n;
        let variance = fitnesses.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
        let max = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            generation,
            evaluations,
            fitness: mean,
            fitness_std: variance.sqrt(),
            fitness_max: max,
            fitness_min: min,
        }
    }

    /// Value of one statistic
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Fitness => self.fitness,
            Metric::FitnessStd => self.fitness_std,
            Metric::FitnessMax => self.fitness_max,
            Metric::FitnessMin => self.fitness_min,
        }
    }
}

/// Selector for one logbook column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean fitness
    Fitness,
    /// Fitness standard deviation
    FitnessStd,
    /// Best fitness
    #[default]
    FitnessMax,
    /// Worst fitness
    FitnessMin,
}

impl Metric {
    /// Column names accepted by `FromStr`
    pub const VALID: [&'static str; 4] = ["fitness", "fitness_std", "fitness_max", "fitness_min"];

    /// Column name
    pub fn name(self) -> &'static str {
        match self {
            Self::Fitness => "fitness",
            Self::FitnessStd => "fitness_std",
            Self::FitnessMax => "fitness_max",
            Self::FitnessMin => "fitness_min",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fitness" => Ok(Self::Fitness),
            "fitness_std" => Ok(Self::FitnessStd),
            "fitness_max" => Ok(Self::FitnessMax),
            "fitness_min" => Ok(Self::FitnessMin),
            other => Err(SearchError::config(format!(
                "metric must be one of {:?}, got '{}'",
                Self::VALID,
                other
            ))),
        }
    }
}

/// Ordered history of generation records
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    records: Vec<GenerationRecord>,
}

impl Logbook {
    /// Create an empty logbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and append the statistics of a generation
    pub fn record(
        &mut self,
        generation: usize,
        population: &Population,
        evaluations: usize,
    ) -> &GenerationRecord {
        let record = GenerationRecord::from_population(population, generation, evaluations);
        log::info!(
            "gen {:>4} | evals {:>4} | mean {:.6} | std {:.6} | max {:.6} | min {:.6}",
            record.generation,
            record.evaluations,
            record.fitness,
            record.fitness_std,
            record.fitness_max,
            record.fitness_min
        );
        self.push(record)
    }

    /// Append a precomputed record
    pub fn push(&mut self, record: GenerationRecord) -> &GenerationRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// All records, oldest first
    pub fn history(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Number of generations recorded
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record of a generation index
    pub fn get(&self, index: usize) -> Option<&GenerationRecord> {
        self.records.get(index)
    }

    /// Most recent record
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    /// Iterate records, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &GenerationRecord> {
        self.records.iter()
    }

    /// One statistic across all generations
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.metric(metric)).collect()
    }

    /// Generation indices
    pub fn generations(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.generation).collect()
    }}

impl std::ops::Index<usize> for Logbook {
    type Output = GenerationRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

/// Result of a complete run
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Survivors of the last executed generation
    pub final_population: Population,
    /// Statistics of every executed generation
    pub history: Logbook,
    /// Best distinct individuals seen during the run
    pub hall_of_fame: HallOfFame,
    /// Index of the last executed generation
    pub generations: usize,
    /// Generation budget the run was configured with
    pub generation_budget: usize,
    /// Total scorer calls
    pub evaluations: usize,
    /// Name of the callback that stopped the run, if any
    pub stop_reason: Option<String>,
    /// Every scored individual, in evaluation order
    pub evaluation_log: Vec<EvaluationRecord>,
    /// Wall-clock duration of the run
    pub runtime: Duration,
}

impl RunResult {
    /// Best individual ever seen
    pub fn best(&self) -> Option<&Individual> {
        self.hall_of_fame.top()
    }

    /// True when a callback ended the run before the generation budget
    ///
    /// A callback firing on the last budgeted generation still records its
    /// reason but does not count as an early stop.
    pub fn stopped_early(&self) -> bool {
        self.stop_reason.is_some() && self.generations < self.generation_budget
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        let best = self
            .best()
            .map(Individual::fitness_value)
            .unwrap_or(f64::NEG_INFINITY);

        format!(
            "Search Summary:\n\
             - Generations: {}\n\
             - Evaluations: {}\n\
             - Best fitness: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.generations,
            self.evaluations,
            best,
            self.runtime.as_secs_f64() * 1000.0,
            self.stop_reason.as_deref().unwrap_or("generation budget exhausted")
        )
    }
}

pub mod prelude {
    pub use super::{GenerationRecord, Logbook, Metric, RunResult};
}
