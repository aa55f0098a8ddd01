//! (μ+λ) and (μ,λ) strategies
//!
//! λ offspring are bred from randomly paired parents. Survivors are the best
//! μ of either the union of parents and offspring, or of the offspring alone.

use rand::Rng;

use crate::algorithms::GenerationalStrategy;
use crate::error::{SearchError, SearchResult};
use crate::operators::traits::{CrossoverOperator, MutationOperator};
use crate::operators::variation::Variation;
use crate::population::population::Population;
use crate::space::Space;

/// Survivor pool for evolution strategies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ESSelectionStrategy {
    /// (μ+λ): Select best μ from parents + offspring combined
    #[default]
    MuPlusLambda,
    /// (μ,λ): Select best μ from offspring only (requires λ ≥ μ)
    MuCommaLambda,
}

/// Evolution strategy with truncation survivor selection
#[derive(Clone, Debug)]
pub struct EvolutionStrategy {
    mu: usize,
    lambda: usize,
    selection: ESSelectionStrategy,
}

impl EvolutionStrategy {
    /// Create a (μ+λ) strategy
    pub fn mu_plus_lambda(mu: usize, lambda: usize) -> SearchResult<Self> {
        Self::new(mu, lambda, ESSelectionStrategy::MuPlusLambda)
    }

    /// Create a (μ,λ) strategy
    pub fn mu_comma_lambda(mu: usize, lambda: usize) -> SearchResult<Self> {
        Self::new(mu, lambda, ESSelectionStrategy::MuCommaLambda)
    }

    /// Create a strategy, validating the μ/λ relationship
    pub fn new(mu: usize, lambda: usize, selection: ESSelectionStrategy) -> SearchResult<Self> {
        if mu == 0 {
            return Err(SearchError::config("population_size must be positive"));
        }
        if lambda == 0 {
            return Err(SearchError::config("lambda must be positive"));
        }
        if selection == ESSelectionStrategy::MuCommaLambda && lambda < mu {
            return Err(SearchError::config(format!(
                "For (μ,λ) selection, λ ({lambda}) must be >= μ ({mu})"
            )));
        }
        Ok(Self {
            mu,
            lambda,
            selection,
        })
    }
}

impl GenerationalStrategy for EvolutionStrategy {
    fn name(&self) -> &'static str {
        match self.selection {
            ESSelectionStrategy::MuPlusLambda => "mu-plus-lambda",
            ESSelectionStrategy::MuCommaLambda => "mu-comma-lambda",
        }
    }

    fn parent_count(&self) -> usize {
        self.mu
    }

    fn offspring_count(&self) -> usize {
        self.lambda
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
        variation.breed(parents, self.lambda, space, generation, rng)
    }

    fn select_survivors<R: Rng>(
        &self,
        parents: Population,
        offspring: &Population,
        _rng: &mut R,
    ) -> Population {
        let mut pool = match self.selection {
            ESSelectionStrategy::MuPlusLambda => {
                let mut combined = parents;
                combined.extend(offspring.clone());
                combined
            }
            ESSelectionStrategy::MuCommaLambda => offspring.clone(),
        };
        assert!(
            pool.all_evaluated(),
            "Survivor selection requires every individual to be evaluated"
        );
        pool.truncate_to_best(self.mu);
        pool
    }
}
