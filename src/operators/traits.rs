//! Operator traits
//!
//! This module defines the selection, crossover, and mutation operator traits
//! used by the generational strategies.

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::space::value::ParamValue;
use crate::space::Space;

/// Selection operator trait
///
/// Selects individuals from a population for the next generation.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual
    ///
    /// `fitness` holds the signed fitness of every candidate, in population
    /// order. Returns the index of the selected individual.
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize;

    /// Select `count` individuals with replacement
    fn select_many<R: Rng>(&self, fitness: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
        (0..count).map(|_| self.select(fitness, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines the genes of two parents into two children.
pub trait CrossoverOperator: Send + Sync {
    /// Apply crossover to two parents and produce two offspring gene vectors
    fn crossover<R: Rng>(
        &self,
        parent1: &[ParamValue],
        parent2: &[ParamValue],
        rng: &mut R,
    ) -> OperatorResult<(Vec<ParamValue>, Vec<ParamValue>)>;
}

/// Mutation operator trait
///
/// Applies random changes to a gene vector in place, drawing replacement
/// values from the search space.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to `genes`
    fn mutate<R: Rng>(
        &self,
        genes: &mut [ParamValue],
        space: &Space,
        rng: &mut R,
    ) -> Result<(), OperatorError>;
}
