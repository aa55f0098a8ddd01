//! Generational strategies
//!
//! This module provides the three loop strategies (simple, mu-plus-lambda,
//! mu-comma-lambda) behind one [`GenerationalStrategy`] capability, and the
//! engine that runs the shared generational skeleton.

pub mod engine;
pub mod evolution_strategy;
pub mod simple_ga;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::operators::selection::Selection;
use crate::operators::traits::{CrossoverOperator, MutationOperator};
use crate::operators::variation::Variation;
use crate::population::population::Population;
use crate::space::Space;

use evolution_strategy::{ESSelectionStrategy, EvolutionStrategy};
use simple_ga::SimpleStrategy;

/// Loop strategy name
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Algorithm {
    /// Offspring replace parents through selection
    Simple,
    /// Best μ of parents and offspring survive
    #[default]
    MuPlusLambda,
    /// Best μ of offspring survive
    MuCommaLambda,
}

impl Algorithm {
    /// Names accepted by `FromStr`
    pub const VALID: [&'static str; 3] = ["simple", "mu-plus-lambda", "mu-comma-lambda"];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::MuPlusLambda => "mu-plus-lambda",
            Self::MuCommaLambda => "mu-comma-lambda",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" | "eaSimple" => Ok(Self::Simple),
            "mu-plus-lambda" | "eaMuPlusLambda" => Ok(Self::MuPlusLambda),
            "mu-comma-lambda" | "eaMuCommaLambda" => Ok(Self::MuCommaLambda),
            other => Err(SearchError::config(format!(
                "The algorithm {} is not supported, please select one from {:?}",
                other,
                Self::VALID
            ))),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = SearchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One generation step of a loop strategy
///
/// The engine owns the skeleton (sample, evaluate, archive, record, check
/// callbacks); a strategy decides how offspring are produced from the parents
/// and which individuals survive.
pub trait GenerationalStrategy {
    /// Strategy name for log lines
    fn name(&self) -> &'static str;

    /// Number of parents kept between generations (μ)
    fn parent_count(&self) -> usize;

    /// Number of offspring produced per generation (λ)
    fn offspring_count(&self) -> usize;

    /// Produce the next offspring set; only changed individuals are unevaluated
    fn vary<C, M, R>(
        &self,
        parents: &Population,
        variation: &Variation<C, M>,
        space: &Space,
        generation: usize,
        rng: &mut R,
    ) -> SearchResult<Population>
    where
        C: CrossoverOperator,
        M: MutationOperator,
        R: Rng;

    /// Choose the next parents from evaluated parents and offspring
    fn select_survivors<R: Rng>(
        &self,
        parents: Population,
        offspring: &Population,
        rng: &mut R,
    ) -> Population;
}

/// The configured loop strategy
#[derive(Clone, Debug)]
pub enum Strategy {
    /// Simple strategy
    Simple(SimpleStrategy),
    /// (μ+λ) or (μ,λ) strategy
    Evolution(EvolutionStrategy),
}

impl Strategy {
    /// Build the strategy for `algorithm`
    ///
    /// `lambda` defaults to twice the population size and is ignored by the
    /// simple strategy.
    pub fn new(
        algorithm: Algorithm,
        population_size: usize,
        lambda: Option<usize>,
        selection: Selection,
    ) -> SearchResult<Self> {
        if population_size == 0 {
            return Err(SearchError::config("population_size must be positive"));
        }
        let lambda = lambda.unwrap_or(2 * population_size);
        match algorithm {
            Algorithm::Simple => Ok(Self::Simple(SimpleStrategy::new(
                population_size,
                selection,
            ))),
            Algorithm::MuPlusLambda => Ok(Self::Evolution(EvolutionStrategy::new(
                population_size,
                lambda,
                ESSelectionStrategy::MuPlusLambda,
            )?)),
            Algorithm::MuCommaLambda => Ok(Self::Evolution(EvolutionStrategy::new(
                population_size,
                lambda,
                ESSelectionStrategy::MuCommaLambda,
            )?)),
        }
    }
}

impl GenerationalStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Simple(s) => s.name(),
            Self::Evolution(s) => s.name(),
        }
    }

    fn parent_count(&self) -> usize {
        match self {
            Self::Simple(s) => s.parent_count(),
            Self::Evolution(s) => s.parent_count(),
        }
    }

    fn offspring_count(&self) -> usize {
        match self {
            Self::Simple(s) => s.offspring_count(),
            Self::Evolution(s) => s.offspring_count(),
        }
    }

    fn vary<C, M, R>(
        &self,
        parents: &Population,
        variation: &Variation<C, M>,
        space: &Space,
        generation: usize,
        rng: &mut R,
    ) -> SearchResult<Population>
    where
        C: CrossoverOperator,
        M: MutationOperator,
        R: Rng,
    {
        match self {
            Self::Simple(s) => s.vary(parents, variation, space, generation, rng),
            Self::Evolution(s) => s.vary(parents, variation, space, generation, rng),
        }
    }

    fn select_survivors<R: Rng>(
        &self,
        parents: Population,
        offspring: &Population,
        rng: &mut R,
    ) -> Population {
        match self {
            Self::Simple(s) => s.select_survivors(parents, offspring, rng),
            Self::Evolution(s) => s.select_survivors(parents, offspring, rng),
        }
    }
}

pub mod prelude {
    pub use super::engine::*;
    pub use super::evolution_strategy::*;
    pub use super::simple_ga::*;
    pub use super::{Algorithm, GenerationalStrategy, Strategy};
}
