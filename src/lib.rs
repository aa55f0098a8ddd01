//! # genetic-search
//!
//! Evolutionary hyperparameter search over typed parameter spaces.
//!
//! A search space is declared as named integer, continuous, or categorical
//! dimensions. A population of parameter mappings is evolved with two-point
//! crossover, single-gene resampling mutation, and tournament or roulette
//! selection, using one of three generational loops (simple, mu-plus-lambda,
//! mu-comma-lambda). The user supplies the scorer.
//!
//! ## Core Concepts
//!
//! - **Signed fitness**: raw scores are multiplied by the criteria sign, so
//!   larger is always better inside the engine
//! - **Hall of fame**: the best distinct individuals ever seen are archived
//! - **Stopping callbacks**: early stopping from the recorded history
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use genetic_search::prelude::*;
//!
//! let config = SearchConfig {
//!     population_size: 20,
//!     generations: 30,
//!     seed: Some(42),
//!     ..SearchConfig::default()
//! }
//! .with_param("max_depth", Dimension::integer(2, 30))
//! .with_param("learning_rate", Dimension::log_uniform(1e-4, 1.0))
//! .with_param("loss", Dimension::categorical(["squared", "huber"]));
//!
//! let report = GeneticSearch::new(config)?
//!     .with_callbacks(ConsecutiveStopping::new(5))
//!     .fit(scorer_fn(|params| Ok(train_and_score(params)?)))?;
//!
//! println!("{:?} -> {}", report.best_params, report.best_score);
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod hall_of_fame;
pub mod operators;
pub mod population;
pub mod search;
pub mod space;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::hall_of_fame::HallOfFame;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::search::{GeneticSearch, ParamSpec, RankedParams, SearchConfig, SearchReport};
    pub use crate::space::prelude::*;
    pub use crate::termination::prelude::*;
}
