//! Mutation operators

use rand::Rng;

use crate::error::OperatorError;
use crate::operators::traits::MutationOperator;
use crate::space::value::ParamValue;
use crate::space::Space;

/// Single-point resampling mutation
///
/// Chooses one gene uniformly at random and replaces it with a fresh sample
/// from that gene's dimension. The new value may coincide with the old one.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResampleMutation;

impl ResampleMutation {
    /// Create a new resampling mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for ResampleMutation {
    fn mutate<R: Rng>(
        &self,
        genes: &mut [ParamValue],
        space: &Space,
        rng: &mut R,
    ) -> Result<(), OperatorError> {
        if genes.len() != space.dimension_count() {
            return Err(OperatorError::MutationFailed(format!(
                "individual has {} genes but the space has {} dimensions",
                genes.len(),
                space.dimension_count()
            )));
        }

        let index = rng.gen_range(0..genes.len());
        let value = space.resample(index, rng).ok_or_else(|| {
            OperatorError::MutationFailed(format!("gene index {index} out of range"))
        })?;
        log::trace!("resampled gene {index}: {} -> {value}", genes[index]);
        genes[index] = value;

        Ok(())
    }
}
