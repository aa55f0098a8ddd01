//! Search facade
//!
//! `GeneticSearch` wires a validated [`SearchConfig`] into a
//! [`GeneticEngine`] and turns its [`RunResult`] into a [`SearchReport`]
//! expressed in raw scores and parameter mappings.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::algorithms::engine::{EngineConfig, GeneticEngine};
use crate::algorithms::{Algorithm, Strategy};
use crate::diagnostics::{Logbook, RunResult};
use crate::error::{SearchError, SearchResult};
use crate::fitness::evaluator::{Criteria, ErrorScore, EvaluationRecord, FitnessEvaluator};
use crate::fitness::traits::{ExperimentLogger, Scorer};
use crate::operators::selection::Selection;
use crate::population::individual::Individual;
use crate::space::value::ParamMap;
use crate::space::{Dimension, Space};
use crate::termination::StoppingCallbacks;

/// One named entry of the parameter grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name passed to the scorer
    pub name: String,
    /// Domain of the parameter
    #[serde(flatten)]
    pub dimension: Dimension,
}

/// Full configuration of a search
///
/// Every field has the default of the classic setup (population 10,
/// 40 generations, crossover 0.8, mutation 0.1, tournament of 3 with elitism,
/// one hall of fame entry, maximize, mu-plus-lambda, one worker).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Ordered parameter grid
    pub param_grid: Vec<ParamSpec>,
    /// Parents kept between generations
    pub population_size: usize,
    /// Generation budget after the initial population
    pub generations: usize,
    /// Probability of crossing each pair
    pub crossover_probability: f64,
    /// Probability of mutating each offspring
    pub mutation_probability: f64,
    /// Tournament size under elitism
    pub tournament_size: usize,
    /// Tournament selection when true, roulette otherwise
    pub elitism: bool,
    /// Hall of fame capacity
    pub keep_top_k: usize,
    /// Optimization direction
    pub criteria: Criteria,
    /// Loop strategy
    pub algorithm: Algorithm,
    /// Offspring count for evolution strategies (default twice the population)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<usize>,
    /// Scorer failure policy
    pub error_score: ErrorScore,
    /// Maximum concurrent scorer calls
    pub n_jobs: usize,
    /// Seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            param_grid: Vec::new(),
            population_size: engine.population_size,
            generations: engine.generations,
            crossover_probability: engine.crossover_probability,
            mutation_probability: engine.mutation_probability,
            tournament_size: engine.tournament_size,
            elitism: engine.elitism,
            keep_top_k: engine.keep_top_k,
            criteria: Criteria::Max,
            algorithm: engine.algorithm,
            lambda: engine.lambda,
            error_score: ErrorScore::Raise,
            n_jobs: 1,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> SearchResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SearchError::config(format!("invalid search configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Append a parameter to the grid
    pub fn with_param(mut self, name: impl Into<String>, dimension: Dimension) -> Self {
        self.param_grid.push(ParamSpec {
            name: name.into(),
            dimension,
        });
        self
    }

    /// Loop parameters for the engine
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            algorithm: self.algorithm,
            population_size: self.population_size,
            lambda: self.lambda,
            generations: self.generations,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            elitism: self.elitism,
            tournament_size: self.tournament_size,
            keep_top_k: self.keep_top_k,
        }
    }

    /// Build the search space from the grid
    pub fn space(&self) -> SearchResult<Space> {
        Space::build(
            self.param_grid
                .iter()
                .map(|p| (p.name.clone(), p.dimension.clone())),
        )
    }

    /// Check the whole configuration before any generation runs
    pub fn validate(&self) -> SearchResult<()> {
        self.space()?;
        self.engine_config().validate()?;
        Strategy::new(
            self.algorithm,
            self.population_size,
            self.lambda,
            Selection::from_elitism(self.elitism, self.tournament_size),
        )?;
        if self.n_jobs == 0 {
            return Err(SearchError::config("n_jobs must be at least 1"));
        }
        Ok(())
    }
}

/// A parameter mapping with its raw and signed scores
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedParams {
    /// Decoded parameters
    pub params: ParamMap,
    /// Raw score as returned by the scorer
    pub score: f64,
    /// Signed fitness (higher is better)
    pub fitness: f64,
    /// Generation in which these parameters were first produced
    pub generation: usize,
}

/// Outcome of a search, in the scorer's terms
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchReport {
    /// Parameters of the best individual ever seen
    pub best_params: ParamMap,
    /// Raw score of `best_params`
    pub best_score: f64,
    /// Hall of fame, best first
    pub hall_of_fame: Vec<RankedParams>,
    /// Final survivors, best first
    pub final_population: Vec<RankedParams>,
    /// Per-generation statistics (signed fitness)
    pub history: Logbook,
    /// Index of the last executed generation
    pub n_iterations: usize,
    /// Callback that stopped the run, if any
    pub stop_reason: Option<String>,
    /// Every scored individual
    pub evaluations: Vec<EvaluationRecord>,
}

impl SearchReport {
    fn from_run(result: RunResult, space: &Space, criteria: Criteria) -> SearchResult<Self> {
        let rank = |individual: &Individual| {
            let fitness = individual.fitness_value();
            RankedParams {
                params: space.decode(&individual.genes),
                score: criteria.to_raw(fitness),
                fitness,
                generation: individual.birth_generation,
            }
        };

        let best = result.best().ok_or(SearchError::EmptyPopulation)?;
        let hall_of_fame: Vec<RankedParams> = result.hall_of_fame.iter().map(rank).collect();
        let mut survivors = result.final_population.clone();
        survivors.sort_by_fitness();
        let final_population = survivors.iter().map(rank).collect();

        Ok(Self {
            best_params: space.decode(&best.genes),
            best_score: criteria.to_raw(best.fitness_value()),
            hall_of_fame,
            final_population,
            history: result.history,
            n_iterations: result.generations,
            stop_reason: result.stop_reason,
            evaluations: result.evaluation_log,
        })
    }
}

/// Evolutionary hyperparameter search
pub struct GeneticSearch {
    config: SearchConfig,
    space: Space,
    callbacks: StoppingCallbacks,
    logger: Option<Box<dyn ExperimentLogger>>,
}

impl GeneticSearch {
    /// Validate the configuration and build the search space
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        config.validate()?;
        let space = config.space()?;
        Ok(Self {
            config,
            space,
            callbacks: StoppingCallbacks::new(),
            logger: None,
        })
    }

    /// Set the stopping callbacks (one callback or a list)
    pub fn with_callbacks(mut self, callbacks: impl Into<StoppingCallbacks>) -> Self {
        self.callbacks = callbacks.into();
        self
    }

    /// Attach an experiment logger
    pub fn with_logger<L: ExperimentLogger + 'static>(mut self, logger: L) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search space in use
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Run the search with `scorer`
    pub fn fit<S: Scorer>(self, scorer: S) -> SearchResult<SearchReport> {
        let Self {
            config,
            space,
            callbacks,
            logger,
        } = self;

        let mut evaluator = FitnessEvaluator::new(scorer, config.criteria)
            .with_error_score(config.error_score)
            .with_n_jobs(config.n_jobs)?;
        if let Some(logger) = logger {
            evaluator = evaluator.with_boxed_logger(logger);
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "fitting {} parameters ({} criteria, error_score {}, n_jobs {})",
            space.dimension_count(),
            config.criteria,
            config.error_score,
            config.n_jobs
        );

        let mut engine = GeneticEngine::builder()
            .config(config.engine_config())
            .space(space.clone())
            .evaluator(evaluator)
            .callbacks(callbacks)
            .build()?;
        let result = engine.run(&mut rng)?;

        SearchReport::from_run(result, &space, config.criteria)
    }
}
