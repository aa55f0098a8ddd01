//! Offspring production
//!
//! Applies crossover and mutation with their configured probabilities to
//! produce a new, partially unevaluated offspring population.

use rand::Rng;

use crate::error::{OperatorResult, SearchResult};
use crate::operators::traits::{CrossoverOperator, MutationOperator};
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::space::Space;

/// Crossover and mutation bundled with their application probabilities
#[derive(Clone, Debug)]
pub struct Variation<C, M> {
    /// Crossover operator
    pub crossover: C,
    /// Mutation operator
    pub mutation: M,
    /// Probability of crossing each pair
    pub crossover_probability: f64,
    /// Probability of mutating each child
    pub mutation_probability: f64,
}

impl<C, M> Variation<C, M>
where
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Create a new variation step
    pub fn new(
        crossover: C,
        mutation: M,
        crossover_probability: f64,
        mutation_probability: f64,
    ) -> Self {
        assert!(
            (0.0..=1.0).contains(&crossover_probability),
            "Crossover probability must be in [0, 1]"
        );
        assert!(
            (0.0..=1.0).contains(&mutation_probability),
            "Mutation probability must be in [0, 1]"
        );
        Self {
            crossover,
            mutation,
            crossover_probability,
            mutation_probability,
        }
    }

    /// Cross a pair in place with the configured probability
    ///
    /// On operator failure the parents are kept unchanged.
    pub fn mate<R: Rng>(&self, first: &mut Individual, second: &mut Individual, rng: &mut R) {
        if rng.gen::<f64>() >= self.crossover_probability {
            return;
        }
        match self.crossover.crossover(&first.genes, &second.genes, rng) {
            OperatorResult::Success((g1, g2)) => {
                first.genes = g1;
                second.genes = g2;
                first.invalidate();
                second.invalidate();
            }
            OperatorResult::Failed(e) => {
                log::debug!("crossover skipped: {e}");
            }
        }
    }

    /// Mutate an individual in place with the configured probability
    pub fn mutate<R: Rng>(
        &self,
        individual: &mut Individual,
        space: &Space,
        rng: &mut R,
    ) -> SearchResult<()> {
        if rng.gen::<f64>() < self.mutation_probability {
            self.mutation.mutate(&mut individual.genes, space, rng)?;
            individual.invalidate();
        }
        Ok(())
    }

    /// Vary clones of the whole population, keeping its size
    ///
    /// Adjacent pairs `(0, 1), (2, 3), ...` are crossed, then every offspring
    /// is considered for mutation.
    pub fn vary_population<R: Rng>(
        &self,
        population: &Population,
        space: &Space,
        generation: usize,
        rng: &mut R,
    ) -> SearchResult<Population> {
        let mut offspring = population.clone();

        for pair in offspring.individuals_mut().chunks_exact_mut(2) {
            let (first, rest) = pair.split_at_mut(1);
            self.mate(&mut first[0], &mut rest[0], rng);
        }
        for individual in offspring.iter_mut() {
            self.mutate(individual, space, rng)?;
            if !individual.is_evaluated() {
                individual.birth_generation = generation;
            }
        }

        Ok(offspring)
    }

    /// Breed `count` offspring from randomly paired parents
    pub fn breed<R: Rng>(
        &self,
        parents: &Population,
        count: usize,
        space: &Space,
        generation: usize,
        rng: &mut R,
    ) -> SearchResult<Population> {
        assert!(!parents.is_empty(), "Cannot breed from an empty population");

        let mut offspring = Population::with_capacity(count);
        while offspring.len() < count {
            let mut first = parents[rng.gen_range(0..parents.len())].clone();
            let mut second = parents[rng.gen_range(0..parents.len())].clone();
            self.mate(&mut first, &mut second, rng);

            for mut child in [first, second] {
                if offspring.len() == count {
                    break;
                }
                self.mutate(&mut child, space, rng)?;
                if !child.is_evaluated() {
                    child.birth_generation = generation;
                }
                offspring.push(child);
            }
        }

        Ok(offspring)
    }
}
