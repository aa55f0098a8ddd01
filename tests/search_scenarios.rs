//! End-to-end search scenarios
//!
//! Runs complete searches through the public facade with small synthetic
//! scorers and checks reports, histories and error handling.

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use genetic_search::prelude::*;

fn small_config(algorithm: Algorithm) -> SearchConfig {
    SearchConfig {
        population_size: 4,
        generations: 3,
        algorithm,
        seed: Some(11),
        ..SearchConfig::default()
    }
    .with_param("x", Dimension::continuous(0.0, 1.0))
    .with_param("label", Dimension::categorical(["A", "B"]))
}

/// Records the history length seen at every step
struct HistoryProbe {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl StoppingCallback for HistoryProbe {
    fn on_step(&mut self, history: &Logbook, _generation: usize) -> bool {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(history.len());
        }
        false
    }

    fn reason(&self) -> &'static str {
        "history probe"
    }
}

#[test]
fn constant_scorer_gives_flat_history() {
    for algorithm in [Algorithm::Simple, Algorithm::MuPlusLambda, Algorithm::MuCommaLambda] {
        let report = GeneticSearch::new(small_config(algorithm))
            .unwrap()
            .fit(scorer_fn(|_| Ok(0.5)))
            .unwrap();

        assert_eq!(report.history.len(), 4, "{algorithm}");
        assert_eq!(report.n_iterations, 3);
        assert_eq!(report.stop_reason, None);
        assert_relative_eq!(report.best_score, 0.5);
        assert_relative_eq!(report.hall_of_fame[0].score, 0.5);
        for record in report.history.iter() {
            assert_relative_eq!(record.fitness, 0.5);
            assert_relative_eq!(record.fitness_std, 0.0);
            assert_relative_eq!(record.fitness_max, 0.5);
            assert_relative_eq!(record.fitness_min, 0.5);
        }
        assert!(report.final_population.iter().all(|p| p.score == 0.5));
    }
}

#[test]
fn unknown_algorithm_is_rejected_before_running() {
    let err = SearchConfig::from_json(
        r#"{
            "param_grid": [{"name": "x", "type": "continuous", "low": 0.0, "high": 1.0}],
            "algorithm": "genetic"
        }"#,
    )
    .unwrap_err();

    assert!(err.is_configuration());
    let message = err.to_string();
    assert!(message.contains("genetic"));
    for name in Algorithm::VALID {
        assert!(message.contains(name), "{message}");
    }
}

#[test]
fn invalid_dimension_is_rejected() {
    let config = SearchConfig::default().with_param("rate", Dimension::log_uniform(0.0, 1.0));
    let err = GeneticSearch::new(config).err().unwrap();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("rate"));

    let config = SearchConfig::default()
        .with_param("a", Dimension::integer(0, 3))
        .with_param("a", Dimension::integer(0, 3));
    assert!(GeneticSearch::new(config).is_err());
}

#[test]
fn raise_aborts_and_callbacks_stop_seeing_history() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let probe = HistoryProbe {
        seen: Arc::clone(&seen),
    };

    let err = GeneticSearch::new(small_config(Algorithm::MuPlusLambda))
        .unwrap()
        .with_callbacks(probe)
        .fit(scorer_fn(|_| Err("model failed to converge".into())))
        .err()
        .unwrap();

    match &err {
        SearchError::Evaluation { message, params } => {
            assert!(message.contains("model failed to converge"));
            assert!(params.contains("label"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn raise_midway_keeps_earlier_history() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let probe = HistoryProbe {
        seen: Arc::clone(&seen),
    };
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);

    let result = GeneticSearch::new(SearchConfig {
        mutation_probability: 1.0,
        ..small_config(Algorithm::Simple)
    })
    .unwrap()
    .with_callbacks(probe)
    .fit(scorer_fn(move |_| {
        let mut calls = counter.lock().map_err(|e| e.to_string())?;
        *calls += 1;
        if *calls > 4 {
            Err("out of budget".into())
        } else {
            Ok(1.0)
        }
    }));

    assert!(matches!(result, Err(SearchError::Evaluation { .. })));
    assert_eq!(*seen.lock().unwrap(), vec![1]);
}

#[test]
fn minimize_reports_smallest_raw_score() {
    let report = GeneticSearch::new(SearchConfig {
        criteria: Criteria::Min,
        generations: 10,
        population_size: 8,
        ..small_config(Algorithm::MuPlusLambda)
    })
    .unwrap()
    .fit(scorer_fn(|p| Ok(p["x"].as_f64().ok_or("x")?)))
    .unwrap();

    let smallest = report
        .evaluations
        .iter()
        .map(|r| r.score)
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(report.best_score, smallest);
    // History stays in signed fitness
    assert!(report.history.iter().all(|r| r.fitness_max <= 0.0));
}

#[test]
fn json_config_runs_end_to_end() {
    let config = SearchConfig::from_json(
        r#"{
            "param_grid": [
                {"name": "n_estimators", "type": "integer", "low": 10, "high": 200},
                {"name": "bootstrap", "type": "categorical", "choices": [true, false]},
                {"name": "max_features", "type": "continuous", "low": 0.1, "high": 1.0}
            ],
            "population_size": 6,
            "generations": 5,
            "keep_top_k": 3,
            "elitism": false,
            "algorithm": "eaSimple",
            "error_score": "raise",
            "n_jobs": 2,
            "seed": 5
        }"#,
    )
    .unwrap();

    let report = GeneticSearch::new(config)
        .unwrap()
        .with_callbacks(ThresholdStopping::new(199.0))
        .fit(scorer_fn(|p| {
            let trees = p["n_estimators"].as_i64().ok_or("n_estimators")? as f64;
            let bonus = if p["bootstrap"].as_bool() == Some(true) { 0.5 } else { 0.0 };
            Ok(trees + bonus)
        }))
        .unwrap();

    assert!(report.hall_of_fame.len() <= 3);
    assert!(report.history.len() <= 6);
    assert_eq!(report.best_params.len(), 3);
    for pair in report.hall_of_fame.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["best_params"]["n_estimators"].is_i64());
    let records = json["history"]["records"].as_array().unwrap();
    assert_eq!(records.len(), report.history.len());
    assert_eq!(records[0]["generation"], 0);
}

#[test]
fn nan_error_score_keeps_mu_plus_lambda_running() {
    let report = GeneticSearch::new(SearchConfig {
        population_size: 30,
        generations: 10,
        error_score: ErrorScore::Value(f64::NAN),
        ..small_config(Algorithm::MuPlusLambda)
    })
    .unwrap()
    .fit(scorer_fn(|p| {
        let x = p["x"].as_f64().ok_or("x")?;
        if x > 0.5 {
            Err("fold failed".into())
        } else {
            Ok(x)
        }
    }))
    .unwrap();

    assert_eq!(report.history.len(), 11);
    assert!(report.best_score <= 0.5);
    assert!(report.evaluations.iter().any(|r| r.failure.is_some()));
    assert!(report.hall_of_fame.iter().all(|e| !e.score.is_nan()));

    // Survivors are ranked best first with NaN last
    let scores: Vec<f64> = report.final_population.iter().map(|p| p.score).collect();
    if let Some(i) = scores.iter().position(|s| s.is_nan()) {
        assert!(scores[i..].iter().all(|s| s.is_nan()));
    }
}

#[test]
fn seeded_runs_match() {
    let run = || {
        GeneticSearch::new(small_config(Algorithm::MuCommaLambda))
            .unwrap()
            .fit(scorer_fn(|p| Ok(p["x"].as_f64().ok_or("x")?)))
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.best_params, second.best_params);
    assert_eq!(first.evaluations, second.evaluations);
}
