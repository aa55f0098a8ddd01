//! Parameter space
//!
//! This module provides the ordered, named collection of dimensions that
//! defines what an individual's genes mean.

pub mod dimension;
pub mod value;

use std::collections::HashSet;

use rand::Rng;

use crate::error::{SearchError, SearchResult};
use crate::population::individual::Individual;
use crate::population::population::Population;

pub use dimension::{Dimension, Distribution};
pub use value::{render_params, ParamMap, ParamValue};

/// Ordered mapping from parameter name to dimension
///
/// Gene `i` of every individual corresponds to parameter `i` of the space.
/// The order is fixed when the space is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Space {
    parameters: Vec<(String, Dimension)>,
}

impl Space {
    /// Build a space from `(name, dimension)` pairs, preserving their order
    ///
    /// Fails when the grid is empty, a name repeats, or a dimension does not
    /// describe a samplable domain.
    pub fn build<I, K>(param_grid: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = (K, Dimension)>,
        K: Into<String>,
    {
        let parameters: Vec<(String, Dimension)> = param_grid
            .into_iter()
            .map(|(name, dim)| (name.into(), dim))
            .collect();

        if parameters.is_empty() {
            return Err(SearchError::config(
                "param_grid must contain at least one dimension",
            ));
        }

        let mut seen = HashSet::new();
        for (name, dim) in &parameters {
            if !seen.insert(name.as_str()) {
                return Err(SearchError::config(format!(
                    "duplicate parameter name '{name}' in param_grid"
                )));
            }
            dim.validate().map_err(|e| match e {
                SearchError::Configuration(msg) => {
                    SearchError::config(format!("parameter '{name}': {msg}"))
                }
                other => other,
            })?;
        }

        Ok(Self { parameters })
    }

    /// Number of dimensions (genes per individual)
    pub fn dimension_count(&self) -> usize {
        self.parameters.len()
    }

    /// Parameter names in gene order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(name, dimension)` pairs in gene order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dimension)> {
        self.parameters.iter().map(|(name, dim)| (name.as_str(), dim))
    }

    /// Dimension at a gene index
    pub fn dimension(&self, index: usize) -> Option<&Dimension> {
        self.parameters.get(index).map(|(_, dim)| dim)
    }

    /// Dimension by parameter name
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, dim)| dim)
    }

    /// Sample one gene per dimension, in order
    pub fn sample_genes<R: Rng>(&self, rng: &mut R) -> Vec<ParamValue> {
        self.parameters
            .iter()
            .map(|(_, dim)| dim.sample(rng))
            .collect()
    }

    /// Sample a fresh, unevaluated individual
    pub fn sample_individual<R: Rng>(&self, rng: &mut R) -> Individual {
        Individual::new(self.sample_genes(rng))
    }

    /// Sample `size` independent individuals
    pub fn sample_population<R: Rng>(&self, size: usize, rng: &mut R) -> Population {
        (0..size).map(|_| self.sample_individual(rng)).collect()
    }

    /// Draw a fresh value for gene `index`
    pub fn resample<R: Rng>(&self, index: usize, rng: &mut R) -> Option<ParamValue> {
        self.dimension(index).map(|dim| dim.sample(rng))
    }

    /// Pair each gene with its parameter name
    pub fn decode(&self, genes: &[ParamValue]) -> ParamMap {
        debug_assert_eq!(genes.len(), self.parameters.len());
        self.parameters
            .iter()
            .zip(genes)
            .map(|((name, _), value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Check that a gene vector has the right length and every gene is in its domain
    pub fn contains(&self, genes: &[ParamValue]) -> bool {
        genes.len() == self.parameters.len()
            && self
                .parameters
                .iter()
                .zip(genes)
                .all(|((_, dim), value)| dim.contains(value))
    }
}

pub mod prelude {
    pub use super::dimension::*;
    pub use super::value::*;
    pub use super::Space;
}
