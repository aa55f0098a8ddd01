//! Generational engine
//!
//! This module runs the skeleton shared by every loop strategy: sample the
//! initial population, evaluate, archive, record, check callbacks, then repeat
//! vary / evaluate / archive / record / select / check until the generation
//! budget runs out or a callback asks to stop.

use std::fmt;
use std::time::Instant;

use rand::Rng;

use crate::algorithms::{Algorithm, GenerationalStrategy, Strategy};
use crate::diagnostics::{Logbook, RunResult};
use crate::error::{SearchError, SearchResult};
use crate::fitness::evaluator::{EvaluationRecord, FitnessEvaluator};
use crate::fitness::traits::Scorer;
use crate::hall_of_fame::HallOfFame;
use crate::operators::crossover::TwoPointCrossover;
use crate::operators::mutation::ResampleMutation;
use crate::operators::selection::Selection;
use crate::operators::traits::{CrossoverOperator, MutationOperator};
use crate::operators::variation::Variation;
use crate::population::population::Population;
use crate::space::Space;
use crate::termination::StoppingCallbacks;

/// Loop parameters, with the defaults of the search facade
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Loop strategy
    pub algorithm: Algorithm,
    /// Parents kept between generations (μ)
    pub population_size: usize,
    /// Offspring per generation for evolution strategies (λ, default 2μ)
    pub lambda: Option<usize>,
    /// Generation budget after the initial population
    pub generations: usize,
    /// Probability of crossing each pair
    pub crossover_probability: f64,
    /// Probability of mutating each offspring
    pub mutation_probability: f64,
    /// Tournament under elitism, roulette otherwise
    pub elitism: bool,
    /// Tournament size
    pub tournament_size: usize,
    /// Hall of fame capacity
    pub keep_top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::MuPlusLambda,
            population_size: 10,
            lambda: None,
            generations: 40,
            crossover_probability: 0.8,
            mutation_probability: 0.1,
            elitism: true,
            tournament_size: 3,
            keep_top_k: 1,
        }
    }
}

impl EngineConfig {
    /// Check every loop parameter
    pub fn validate(&self) -> SearchResult<()> {
        if self.population_size == 0 {
            return Err(SearchError::config("population_size must be positive"));
        }
        for (name, p) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SearchError::config(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        if self.tournament_size == 0 {
            return Err(SearchError::config("tournament_size must be positive"));
        }
        if self.keep_top_k == 0 {
            return Err(SearchError::config("keep_top_k must be positive"));
        }
        Ok(())
    }
}

/// Builder for GeneticEngine
pub struct GeneticEngineBuilder<S, C = TwoPointCrossover, M = ResampleMutation> {
    config: EngineConfig,
    space: Option<Space>,
    evaluator: Option<FitnessEvaluator<S>>,
    crossover: C,
    mutation: M,
    callbacks: StoppingCallbacks,
}

impl<S: Scorer> GeneticEngineBuilder<S> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            space: None,
            evaluator: None,
            crossover: TwoPointCrossover,
            mutation: ResampleMutation,
            callbacks: StoppingCallbacks::new(),
        }
    }
}

impl<S: Scorer> Default for GeneticEngineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, M> GeneticEngineBuilder<S, C, M>
where
    S: Scorer,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Replace all loop parameters at once
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the loop strategy
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Set the population size (μ)
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the offspring count (λ) for evolution strategies
    pub fn lambda(mut self, lambda: usize) -> Self {
        self.config.lambda = Some(lambda);
        self
    }

    /// Set the generation budget
    pub fn generations(mut self, generations: usize) -> Self {
        self.config.generations = generations;
        self
    }

    /// Set the crossover probability
    pub fn crossover_probability(mut self, probability: f64) -> Self {
        self.config.crossover_probability = probability;
        self
    }

    /// Set the mutation probability
    pub fn mutation_probability(mut self, probability: f64) -> Self {
        self.config.mutation_probability = probability;
        self
    }

    /// Enable or disable elitist (tournament) selection
    pub fn elitism(mut self, enabled: bool) -> Self {
        self.config.elitism = enabled;
        self
    }

    /// Set the tournament size
    pub fn tournament_size(mut self, size: usize) -> Self {
        self.config.tournament_size = size;
        self
    }

    /// Set the hall of fame capacity
    pub fn keep_top_k(mut self, k: usize) -> Self {
        self.config.keep_top_k = k;
        self
    }

    /// Set the search space
    pub fn space(mut self, space: Space) -> Self {
        self.space = Some(space);
        self
    }

    /// Set the fitness evaluator
    pub fn evaluator(mut self, evaluator: FitnessEvaluator<S>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Set the stopping callbacks
    pub fn callbacks(mut self, callbacks: impl Into<StoppingCallbacks>) -> Self {
        self.callbacks = callbacks.into();
        self
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> GeneticEngineBuilder<S, NewC, M>
    where
        NewC: CrossoverOperator,
    {
        GeneticEngineBuilder {
            config: self.config,
            space: self.space,
            evaluator: self.evaluator,
            crossover,
            mutation: self.mutation,
            callbacks: self.callbacks,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> GeneticEngineBuilder<S, C, NewM>
    where
        NewM: MutationOperator,
    {
        GeneticEngineBuilder {
            config: self.config,
            space: self.space,
            evaluator: self.evaluator,
            crossover: self.crossover,
            mutation,
            callbacks: self.callbacks,
        }
    }

    /// Build the engine, validating the whole configuration
    pub fn build(self) -> SearchResult<GeneticEngine<S, C, M>> {
        let space = self
            .space
            .ok_or_else(|| SearchError::config("Search space must be specified"))?;

        let evaluator = self
            .evaluator
            .ok_or_else(|| SearchError::config("Fitness evaluator must be specified"))?;

        self.config.validate()?;

        let selection = Selection::from_elitism(self.config.elitism, self.config.tournament_size);
        let strategy = Strategy::new(
            self.config.algorithm,
            self.config.population_size,
            self.config.lambda,
            selection,
        )?;
        let variation = Variation::new(
            self.crossover,
            self.mutation,
            self.config.crossover_probability,
            self.config.mutation_probability,
        );

        Ok(GeneticEngine {
            config: self.config,
            space,
            evaluator,
            strategy,
            variation,
            callbacks: self.callbacks,
        })
    }
}

/// Evolutionary search engine
///
/// Runs one of the three loop strategies over a search space, scoring
/// individuals with a [`FitnessEvaluator`].
pub struct GeneticEngine<S, C = TwoPointCrossover, M = ResampleMutation> {
    config: EngineConfig,
    space: Space,
    evaluator: FitnessEvaluator<S>,
    strategy: Strategy,
    variation: Variation<C, M>,
    callbacks: StoppingCallbacks,
}

impl<S, C, M> fmt::Debug for GeneticEngine<S, C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticEngine")
            .field("config", &self.config)
            .field("space", &self.space)
            .field("evaluator", &self.evaluator)
            .field("strategy", &self.strategy.name())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<S: Scorer> GeneticEngine<S> {
    /// Create a builder for GeneticEngine
    pub fn builder() -> GeneticEngineBuilder<S> {
        GeneticEngineBuilder::new()
    }
}

impl<S, C, M> GeneticEngine<S, C, M>
where
    S: Scorer,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Loop parameters
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search space
    pub fn space(&self) -> &Space {
        &self.space
    }

    fn evaluate(
        &self,
        population: &mut Population,
        generation: usize,
        log: &mut Vec<EvaluationRecord>,
    ) -> SearchResult<usize> {
        let records =
            self.evaluator
                .evaluate_population(&self.space, population.individuals_mut(), generation)?;
        let scored = records.len();
        log.extend(records);
        Ok(scored)
    }

    /// Run the search
    ///
    /// Callbacks are checked after every recorded generation, so the history
    /// holds `generations + 1` records unless a callback stopped the run
    /// earlier.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> SearchResult<RunResult> {
        let start_time = Instant::now();
        log::info!(
            "starting {} search: population {}, offspring {}, generations {}, {} dimensions",
            self.strategy.name(),
            self.strategy.parent_count(),
            self.strategy.offspring_count(),
            self.config.generations,
            self.space.dimension_count()
        );

        self.callbacks.on_start();
        let mut history = Logbook::new();
        let mut hall_of_fame = HallOfFame::new(self.config.keep_top_k);
        let mut evaluation_log = Vec::new();

        // Generation 0: the initial population
        let mut population = self
            .space
            .sample_population(self.strategy.parent_count(), rng);
        let scored = self.evaluate(&mut population, 0, &mut evaluation_log)?;
        let mut evaluations = scored;
        hall_of_fame.offer(population.iter());
        history.record(0, &population, scored);

        let mut generation = 0;
        let mut stop_reason = self.callbacks.should_stop(&history, generation);

        while stop_reason.is_none() && generation < self.config.generations {
            generation += 1;

            let mut offspring =
                self.strategy
                    .vary(&population, &self.variation, &self.space, generation, rng)?;
            let scored = self.evaluate(&mut offspring, generation, &mut evaluation_log)?;
            evaluations += scored;

            hall_of_fame.offer(offspring.iter());
            history.record(generation, &offspring, scored);
            population = self.strategy.select_survivors(population, &offspring, rng);

            stop_reason = self.callbacks.should_stop(&history, generation);
        }

        if let Some(reason) = stop_reason {
            log::info!("stopped at generation {generation}: {reason}");
        }
        let runtime = start_time.elapsed();
        log::info!(
            "search finished after {} generations, {} evaluations, best fitness {:.6} ({:.2?})",
            generation,
            evaluations,
            hall_of_fame
                .top()
                .and_then(|best| best.fitness)
                .unwrap_or(f64::NEG_INFINITY),
            runtime
        );

        Ok(RunResult {
            final_population: population,
            history,
            hall_of_fame,
            generations: generation,
            generation_budget: self.config.generations,
            evaluations,
            stop_reason: stop_reason.map(str::to_string),
            evaluation_log,
            runtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Metric;
    use crate::fitness::evaluator::{Criteria, ErrorScore};
    use crate::fitness::traits::{scorer_fn, ScoreError};
    use crate::space::value::ParamMap;
    use crate::space::Dimension;
    use crate::termination::{ConsecutiveStopping, StoppingCallback, ThresholdStopping};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn space() -> Space {
        Space::build([
            ("x", Dimension::continuous(-1.0, 1.0)),
            ("y", Dimension::continuous(-1.0, 1.0)),
            ("flag", Dimension::categorical([true, false])),
        ])
        .unwrap()
    }

    fn sphere(params: &ParamMap) -> Result<f64, ScoreError> {
        let x = params["x"].as_f64().ok_or("x")?;
        let y = params["y"].as_f64().ok_or("y")?;
        Ok(x * x + y * y)
    }

    type SphereFn = fn(&ParamMap) -> Result<f64, ScoreError>;

    fn engine(algorithm: Algorithm, generations: usize) -> GeneticEngine<SphereFn> {
        GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(sphere as SphereFn, Criteria::Min))
            .algorithm(algorithm)
            .population_size(8)
            .generations(generations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_space_and_evaluator() {
        let err = GeneticEngine::<SphereFn>::builder()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Search space must be specified"));

        let err = GeneticEngine::<SphereFn>::builder()
            .space(space())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Fitness evaluator must be specified"));
    }

    #[test]
    fn test_builder_validates_config() {
        let evaluator = || FitnessEvaluator::new(scorer_fn(|_| Ok(0.0)), Criteria::Max);

        let err = GeneticEngine::builder()
            .space(space())
            .evaluator(evaluator())
            .population_size(0)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());

        let err = GeneticEngine::builder()
            .space(space())
            .evaluator(evaluator())
            .mutation_probability(1.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("mutation_probability"));

        let err = GeneticEngine::builder()
            .space(space())
            .evaluator(evaluator())
            .algorithm(Algorithm::MuCommaLambda)
            .population_size(10)
            .lambda(4)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_history_length_for_every_algorithm() {
        for algorithm in [
            Algorithm::Simple,
            Algorithm::MuPlusLambda,
            Algorithm::MuCommaLambda,
        ] {
            let mut rng = StdRng::seed_from_u64(21);
            let result = engine(algorithm, 5).run(&mut rng).unwrap();

            assert_eq!(result.history.len(), 6, "{algorithm}");
            assert_eq!(result.generations, 5);
            assert_eq!(result.history.generations(), vec![0, 1, 2, 3, 4, 5]);
            assert_eq!(result.final_population.len(), 8);
            assert!(result.final_population.all_evaluated());
            assert!(!result.stopped_early());
            assert_eq!(result.evaluations, result.evaluation_log.len());
        }
    }

    #[test]
    fn test_zero_generations_records_initial_population() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = engine(Algorithm::Simple, 0).run(&mut rng).unwrap();
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.generations, 0);
        assert_eq!(result.evaluations, 8);
    }

    #[test]
    fn test_offspring_evaluations_counted_per_generation() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = engine(Algorithm::MuPlusLambda, 3).run(&mut rng).unwrap();

        assert_eq!(result.history[0].evaluations, 8);
        for record in &result.history.history()[1..] {
            // Only offspring touched by crossover or mutation are scored
            assert!(record.evaluations <= 16);
        }
        let total: usize = result.history.iter().map(|r| r.evaluations).sum();
        assert_eq!(total, result.evaluations);
    }

    #[test]
    fn test_callback_stops_early() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut engine = GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(scorer_fn(|_| Ok(1.0)), Criteria::Max))
            .algorithm(Algorithm::Simple)
            .population_size(4)
            .generations(20)
            .callbacks(ConsecutiveStopping::new(2))
            .build()
            .unwrap();

        let result = engine.run(&mut rng).unwrap();
        // Constant fitness never improves: stops once two previous records exist
        assert_eq!(result.generations, 2);
        assert_eq!(result.history.len(), 3);
        assert_eq!(
            result.stop_reason.as_deref(),
            Some(ConsecutiveStopping::new(2).reason())
        );
        assert!(result.stopped_early());
    }

    #[test]
    fn test_callback_on_last_generation_is_not_early() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut engine = GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(scorer_fn(|_| Ok(1.0)), Criteria::Max))
            .algorithm(Algorithm::Simple)
            .population_size(4)
            .generations(2)
            .callbacks(ConsecutiveStopping::new(2))
            .build()
            .unwrap();

        let result = engine.run(&mut rng).unwrap();
        assert_eq!(result.generations, 2);
        assert!(result.stop_reason.is_some());
        assert!(!result.stopped_early());
    }

    #[test]
    fn test_engine_debug() {
        let debug = format!("{:?}", engine(Algorithm::MuCommaLambda, 3));
        assert!(debug.contains("GeneticEngine"));
        assert!(debug.contains("mu-comma-lambda"));
    }

    #[test]
    fn test_nan_fallback_survives_truncation() {
        for algorithm in [Algorithm::MuPlusLambda, Algorithm::MuCommaLambda] {
            let mut rng = StdRng::seed_from_u64(9);
            let mut engine = GeneticEngine::builder()
                .space(space())
                .evaluator(
                    FitnessEvaluator::new(
                        scorer_fn(|p| {
                            let x = p["x"].as_f64().ok_or("x")?;
                            if x > 0.0 {
                                Err("diverged".into())
                            } else {
                                Ok(x)
                            }
                        }),
                        Criteria::Max,
                    )
                    .with_error_score(ErrorScore::Value(f64::NAN)),
                )
                .algorithm(algorithm)
                .population_size(30)
                .generations(8)
                .build()
                .unwrap();

            let result = engine.run(&mut rng).unwrap();
            assert_eq!(result.history.len(), 9);
            let best = result.best().unwrap().fitness_value();
            assert!(!best.is_nan());
            assert!(best <= 0.0);

            let survivors = result.final_population.fitness_values();
            let first_nan = survivors.iter().position(|f| f.is_nan());
            if let Some(i) = first_nan {
                assert!(survivors[i..].iter().all(|f| f.is_nan()), "{algorithm}");
            }
        }
    }

    #[test]
    fn test_threshold_on_initial_population() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut engine = GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(scorer_fn(|_| Ok(0.5)), Criteria::Max))
            .generations(10)
            .callbacks(ThresholdStopping::new(0.5).with_metric(Metric::Fitness))
            .build()
            .unwrap();

        let result = engine.run(&mut rng).unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_mu_plus_lambda_keeps_best_ever() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut engine = engine(Algorithm::MuPlusLambda, 6);

        let result = engine.run(&mut rng).unwrap();
        let best_history = result.history.column(Metric::FitnessMax);
        let hof_best = result.best().unwrap().fitness_value();
        assert!(best_history.iter().all(|b| *b <= hof_best));
        assert_eq!(
            result.final_population.best().unwrap().fitness_value(),
            hof_best
        );
    }

    #[test]
    fn test_hall_of_fame_holds_best_evaluated() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(sphere as SphereFn, Criteria::Min))
            .algorithm(Algorithm::MuCommaLambda)
            .population_size(6)
            .generations(4)
            .keep_top_k(3)
            .build()
            .unwrap();

        let result = engine.run(&mut rng).unwrap();
        assert_eq!(result.hall_of_fame.len(), 3);

        let hof_worst = result.hall_of_fame.entries()[2].fitness_value();
        for record in &result.evaluation_log {
            let in_hof = result
                .hall_of_fame
                .iter()
                .any(|e| e.fitness_value() == record.fitness);
            assert!(in_hof || record.fitness <= hof_worst);
        }
    }

    #[test]
    fn test_raise_aborts_run() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut engine = GeneticEngine::builder()
            .space(space())
            .evaluator(FitnessEvaluator::new(
                scorer_fn(|_| Err("estimator failed to converge".into())),
                Criteria::Max,
            ))
            .build()
            .unwrap();

        let err = engine.run(&mut rng).unwrap_err();
        assert!(matches!(err, SearchError::Evaluation { .. }));
        assert!(err.to_string().contains("estimator failed to converge"));
    }
}
