//! Crossover operators

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::operators::traits::CrossoverOperator;
use crate::space::value::ParamValue;

/// Two-point crossover
///
/// Picks two distinct cut points `a < b` in `1..=len` and swaps the gene
/// range `[a, b)` between the parents. Gene vectors of length 1 pass through
/// unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoPointCrossover;

impl TwoPointCrossover {
    /// Create a new two-point crossover
    pub fn new() -> Self {
        Self
    }

    /// Draw the sorted cut points for a gene vector of length `len >= 2`
    pub fn cut_points<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
        assert!(len >= 2, "Two-point crossover needs at least two genes");
        let picked = rand::seq::index::sample(rng, len, 2);
        let (a, b) = (picked.index(0) + 1, picked.index(1) + 1);
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl CrossoverOperator for TwoPointCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &[ParamValue],
        parent2: &[ParamValue],
        rng: &mut R,
    ) -> OperatorResult<(Vec<ParamValue>, Vec<ParamValue>)> {
        if parent1.len() != parent2.len() {
            return OperatorResult::Failed(OperatorError::CrossoverFailed(format!(
                "parent lengths differ ({} vs {})",
                parent1.len(),
                parent2.len()
            )));
        }

        let mut child1 = parent1.to_vec();
        let mut child2 = parent2.to_vec();

        if parent1.len() < 2 {
            return OperatorResult::Success((child1, child2));
        }

        let (a, b) = Self::cut_points(parent1.len(), rng);
        child1[a..b].swap_with_slice(&mut child2[a..b]);
        log::trace!("two-point crossover cut at [{a}, {b})");

        OperatorResult::Success((child1, child2))
    }
}
