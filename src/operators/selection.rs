//! Selection operators
//!
//! This module provides the two survivor-selection operators: tournament
//! (elitist pressure) and roulette (fitness proportionate).

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::operators::traits::SelectionOperator;
use crate::population::population::Population;

/// Tournament selection operator
///
/// Draws `tournament_size` contestants uniformly with replacement and keeps
/// the fittest. The earliest-drawn contestant wins ties.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "Population cannot be empty");

        let mut winner = rng.gen_range(0..fitness.len());
        for _ in 1..self.tournament_size {
            let contestant = rng.gen_range(0..fitness.len());
            if fitness[contestant] > fitness[winner] {
                winner = contestant;
            }
        }
        winner
    }
}

/// Roulette wheel selection (fitness proportionate)
///
/// Weights are the signed fitness values. When any fitness is negative, all
/// weights are shifted by `-min + offset` so the worst individual gets weight
/// `offset`. A degenerate wheel (zero or non-finite total) selects uniformly.
#[derive(Clone, Debug, Default)]
pub struct RouletteSelection {
    /// Weight given to the worst individual when shifting negative fitness
    offset: f64,
}

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Create with a shift offset for negative fitness
    pub fn with_offset(offset: f64) -> Self {
        assert!(offset >= 0.0, "Roulette offset must be non-negative");
        Self { offset }
    }

    /// Selection weights for the given fitness values
    pub fn weights(&self, fitness: &[f64]) -> Vec<f64> {
        let min_fitness = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let shift = if min_fitness < 0.0 {
            -min_fitness + self.offset
        } else {
            0.0
        };
        fitness.iter().map(|f| f + shift).collect()
    }
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "Population cannot be empty");

        let weights = self.weights(fitness);
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return rng.gen_range(0..fitness.len());
        }

        match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..fitness.len()),
        }
    }
}

/// Survivor selection chosen by the `elitism` switch
#[derive(Clone, Debug)]
pub enum Selection {
    /// Tournament selection (elitism on)
    Tournament(TournamentSelection),
    /// Roulette selection (elitism off)
    Roulette(RouletteSelection),
}

impl Selection {
    /// Tournament of `tournament_size` under elitism, roulette otherwise
    pub fn from_elitism(elitism: bool, tournament_size: usize) -> Self {
        if elitism {
            Self::Tournament(TournamentSelection::new(tournament_size))
        } else {
            Self::Roulette(RouletteSelection::new())
        }
    }

    /// Short name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tournament(_) => "tournament",
            Self::Roulette(_) => "roulette",
        }
    }
}

impl SelectionOperator for Selection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        match self {
            Self::Tournament(s) => s.select(fitness, rng),
            Self::Roulette(s) => s.select(fitness, rng),
        }
    }
}

/// Build a population of `count` clones selected from `population`
///
/// Every individual must already be evaluated.
pub fn select_population<S, R>(
    selection: &S,
    population: &Population,
    count: usize,
    rng: &mut R,
) -> Population
where
    S: SelectionOperator,
    R: Rng,
{
    assert!(
        population.all_evaluated(),
        "Selection requires every individual to be evaluated"
    );
    let fitness = population.fitness_values();
    selection
        .select_many(&fitness, count, rng)
        .into_iter()
        .map(|i| population[i].clone())
        .collect()
}
