//! Hyperparameter Search
//!
//! This demo tunes a synthetic "model" whose validation loss depends on a
//! tree depth, a log-scaled learning rate and a loss function choice. The
//! search minimizes the loss and stops early once progress stalls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use genetic_search::prelude::*;

/// Validation loss of an imaginary gradient boosted model
fn validation_loss(params: &ParamMap) -> Result<f64, ScoreError> {
    let depth = params["max_depth"].as_i64().ok_or("max_depth must be an integer")?;
    let rate = params["learning_rate"]
        .as_f64()
        .ok_or("learning_rate must be numeric")?;
    let loss = params["loss"].as_str().ok_or("loss must be a string")?;

    if depth > 24 && rate > 0.5 {
        return Err(format!("training diverged at depth {depth} with rate {rate:.3}").into());
    }

    let depth_term = ((depth as f64) - 8.0).powi(2) / 64.0;
    let rate_term = (rate.log10() + 1.5).powi(2);
    let loss_term = match loss {
        "huber" => 0.0,
        "squared" => 0.15,
        _ => 0.4,
    };
    Ok(0.05 + depth_term + rate_term + loss_term)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Hyperparameter Search ===\n");

    let config = SearchConfig {
        population_size: 16,
        generations: 40,
        keep_top_k: 5,
        criteria: Criteria::Min,
        error_score: ErrorScore::Value(10.0),
        n_jobs: 4,
        seed: Some(42),
        ..SearchConfig::default()
    }
    .with_param("max_depth", Dimension::integer(2, 30))
    .with_param("learning_rate", Dimension::log_uniform(1e-4, 1.0))
    .with_param(
        "loss",
        Dimension::categorical(["squared", "huber", "absolute"]),
    );

    let trials = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&trials);

    let callbacks = StoppingCallbacks::new()
        .with(ConsecutiveStopping::new(6))
        .with(DeltaThreshold::new(1e-6).with_generations(8))
        .with(TimerStopping::from_secs_f64(30.0));

    let report = GeneticSearch::new(config)?
        .with_callbacks(callbacks)
        .with_logger(move |params: &ParamMap, score: f64| {
            let trial = counter.fetch_add(1, Ordering::SeqCst);
            log::debug!("trial {trial}: {} -> {score:.4}", render_params(params));
        })
        .fit(validation_loss)?;

    println!("Generations run: {}", report.n_iterations);
    println!(
        "Stopped by:      {}",
        report.stop_reason.as_deref().unwrap_or("generation budget")
    );
    println!("Trials scored:   {}", trials.load(Ordering::SeqCst));
    println!(
        "Failed trials:   {}",
        report.evaluations.iter().filter(|r| r.failure.is_some()).count()
    );

    println!("\nHall of fame:");
    for (rank, entry) in report.hall_of_fame.iter().enumerate() {
        println!(
            "  {}. loss {:.5}  {}",
            rank + 1,
            entry.score,
            render_params(&entry.params)
        );
    }

    println!("\nBest loss per generation (negated fitness):");
    for record in report.history.iter() {
        println!(
            "  gen {:>3}: {:.5} ({} evaluated)",
            record.generation, -record.fitness_max, record.evaluations
        );
    }

    println!("\nBest parameters: {}", render_params(&report.best_params));
    println!("Best loss:       {:.5}", report.best_score);

    Ok(())
}
