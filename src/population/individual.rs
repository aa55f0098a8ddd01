//! Individual type
//!
//! This module provides the Individual type: one candidate configuration as a
//! gene vector plus its (possibly unset) fitness.

use serde::{Deserialize, Serialize};

use crate::space::value::ParamValue;

/// An individual in the population
///
/// Gene `i` holds the value of the `i`-th dimension of the search space.
/// `fitness` is the signed fitness (higher is better) and is `None` until the
/// individual has been evaluated with its current genes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual {
    /// One value per search dimension
    pub genes: Vec<ParamValue>,
    /// The signed fitness value (None if not yet evaluated)
    pub fitness: Option<f64>,
    /// Generation when this individual was created
    pub birth_generation: usize,
}

impl Individual {
    /// Create a new individual with unevaluated genes
    pub fn new(genes: Vec<ParamValue>) -> Self {
        Self {
            genes,
            fitness: None,
            birth_generation: 0,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(genes: Vec<ParamValue>, fitness: f64) -> Self {
        Self {
            genes,
            fitness: Some(fitness),
            birth_generation: 0,
        }
    }

    /// Number of genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if the individual has no genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Get the fitness value, panicking if not evaluated
    pub fn fitness_value(&self) -> f64 {
        match self.fitness {
            Some(f) => f,
            None => panic!("Individual has not been evaluated"),
        }
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Mark the fitness as stale after the genes changed
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Gene-wise equality, ignoring fitness
    pub fn same_genes(&self, other: &Self) -> bool {
        self.genes == other.genes
    }

    /// Ranking key: the signed fitness, with NaN or unset fitness ranked
    /// below every real value
    pub fn rank(&self) -> f64 {
        match self.fitness {
            Some(f) if !f.is_nan() => f,
            _ => f64::NEG_INFINITY,
        }
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes && self.fitness == other.fitness
    }
}
