//! Fitness evaluation
//!
//! This module provides the scorer abstraction and the evaluator that turns
//! raw scores into signed fitness values.

pub mod evaluator;
pub mod traits;

pub mod prelude {
    pub use super::evaluator::*;
    pub use super::traits::*;
}
