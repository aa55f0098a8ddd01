//! Simple generational strategy
//!
//! Every generation the whole population is cloned, varied, evaluated, and
//! replaced by a selection drawn from the offspring (`mu = lambda`).

use rand::Rng;

use crate::algorithms::GenerationalStrategy;
use crate::error::SearchResult;
use crate::operators::selection::{select_population, Selection};
use crate::operators::traits::{CrossoverOperator, MutationOperator};
use crate::operators::variation::Variation;
use crate::population::population::Population;
use crate::space::Space;

/// Simple strategy: offspring replace the parents through selection
#[derive(Clone, Debug)]
pub struct SimpleStrategy {
    population_size: usize,
    selection: Selection,
}

impl SimpleStrategy {
    /// Create a simple strategy keeping `population_size` individuals
    pub fn new(population_size: usize, selection: Selection) -> Self {
        assert!(population_size >= 1, "Population size must be at least 1");
        Self {
            population_size,
            selection,
        }
    }
}

impl GenerationalStrategy for SimpleStrategy {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn parent_count(&self) -> usize {
        self.population_size
    }

    fn offspring_count(&self) -> usize {
        self.population_size
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
        variation.vary_population(parents, space, generation, rng)
    }

    fn select_survivors<R: Rng>(
        &self,
        _parents: Population,
        offspring: &Population,
        rng: &mut R,
    ) -> Population {
        log::debug!(
            "{} selection of {} from {} offspring",
            self.selection.name(),
            self.population_size,
            offspring.len()
        );
        select_population(&self.selection, offspring, self.population_size, rng)
    }
}
