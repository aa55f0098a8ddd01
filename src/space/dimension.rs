//! Search dimensions
//!
//! A `Dimension` describes the domain of one hyperparameter and knows how to
//! draw an independent sample from it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution as _, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::space::value::ParamValue;

/// Sampling distribution for continuous dimensions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribution {
    /// Uniform over `[low, high]`
    #[default]
    #[serde(rename = "uniform")]
    Uniform,
    /// Uniform in log-space, then exponentiated
    #[serde(rename = "log-uniform")]
    LogUniform,
}

impl Distribution {
    /// Names accepted by `FromStr`
    pub const VALID: [&'static str; 2] = ["uniform", "log-uniform"];
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::LogUniform => write!(f, "log-uniform"),
        }
    }
}

impl FromStr for Distribution {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "log-uniform" => Ok(Self::LogUniform),
            other => Err(SearchError::config(format!(
                "distribution must be one of {:?}, got '{}'",
                Self::VALID,
                other
            ))),
        }
    }
}

/// Domain of a single hyperparameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dimension {
    /// Integer range, both bounds inclusive
    Integer {
        /// Lower bound (inclusive)
        low: i64,
        /// Upper bound (inclusive)
        high: i64,
    },
    /// Real range with a sampling distribution
    Continuous {
        /// Lower bound (inclusive)
        low: f64,
        /// Upper bound (inclusive)
        high: f64,
        /// How values are drawn from the range
        #[serde(default)]
        distribution: Distribution,
    },
    /// Finite set of allowed values
    Categorical {
        /// Allowed values, in display order
        choices: Vec<ParamValue>,
        /// Optional sampling weights, one per choice
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priors: Option<Vec<f64>>,
    },
}

impl Dimension {
    /// Create an integer dimension over `[low, high]`
    pub fn integer(low: i64, high: i64) -> Self {
        Self::Integer { low, high }
    }

    /// Create a uniform continuous dimension over `[low, high]`
    pub fn continuous(low: f64, high: f64) -> Self {
        Self::Continuous {
            low,
            high,
            distribution: Distribution::Uniform,
        }
    }

    /// Create a log-uniform continuous dimension over `[low, high]`
    pub fn log_uniform(low: f64, high: f64) -> Self {
        Self::Continuous {
            low,
            high,
            distribution: Distribution::LogUniform,
        }
    }

    /// Create a categorical dimension sampled uniformly
    pub fn categorical<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Categorical {
            choices: choices.into_iter().map(Into::into).collect(),
            priors: None,
        }
    }

    /// Create a categorical dimension sampled with the given weights
    pub fn categorical_with_priors<I, V>(choices: I, priors: Vec<f64>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Categorical {
            choices: choices.into_iter().map(Into::into).collect(),
            priors: Some(priors),
        }
    }

    /// Short name of the dimension kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::Continuous { .. } => "continuous",
            Self::Categorical { .. } => "categorical",
        }
    }

    /// Check that the descriptor defines a non-empty, samplable domain
    pub fn validate(&self) -> SearchResult<()> {
        match self {
            Self::Integer { low, high } => {
                if low > high {
                    return Err(SearchError::config(format!(
                        "integer dimension has low ({low}) > high ({high})"
                    )));
                }
            }
            Self::Continuous {
                low,
                high,
                distribution,
            } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(SearchError::config(format!(
                        "continuous dimension bounds must be finite, got [{low}, {high}]"
                    )));
                }
                if low > high {
                    return Err(SearchError::config(format!(
                        "continuous dimension has low ({low}) > high ({high})"
                    )));
                }
                if *distribution == Distribution::LogUniform && *low <= 0.0 {
                    return Err(SearchError::config(format!(
                        "log-uniform dimension requires low > 0, got {low}"
                    )));
                }
            }
            Self::Categorical { choices, priors } => {
                if choices.is_empty() {
                    return Err(SearchError::config(
                        "categorical dimension needs at least one choice",
                    ));
                }
                if let Some(priors) = priors {
                    if priors.len() != choices.len() {
                        return Err(SearchError::config(format!(
                            "categorical priors length ({}) must match choices length ({})",
                            priors.len(),
                            choices.len()
                        )));
                    }
                    if priors.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(SearchError::config(
                            "categorical priors must be finite and non-negative",
                        ));
                    }
                    if priors.iter().sum::<f64>() <= 0.0 {
                        return Err(SearchError::config(
                            "categorical priors must have a positive sum",
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Draw one independent sample from the domain
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParamValue {
        match self {
            Self::Integer { low, high } => ParamValue::Int(rng.gen_range(*low..=*high)),
            Self::Continuous {
                low,
                high,
                distribution: Distribution::Uniform,
            } => ParamValue::Float(rng.gen_range(*low..=*high)),
            Self::Continuous {
                low,
                high,
                distribution: Distribution::LogUniform,
            } => {
                let exponent = rng.gen_range(low.ln()..=high.ln());
                // exp(ln(x)) can land a ulp outside the declared bounds
                ParamValue::Float(exponent.exp().clamp(*low, *high))
            }
            Self::Categorical { choices, priors } => {
                let index = match priors.as_ref().map(WeightedIndex::<f64>::new) {
                    Some(Ok(dist)) => dist.sample(rng),
                    _ => rng.gen_range(0..choices.len()),
                };
                choices[index].clone()
            }
        }
    }

    /// Check whether a value lies in the domain
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::Integer { low, high }, ParamValue::Int(v)) => low <= v && v <= high,
            (Self::Continuous { low, high, .. }, ParamValue::Float(v)) => low <= v && v <= high,
            (Self::Categorical { choices, .. }, v) => choices.contains(v),
            _ => false,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { low, high } => write!(f, "Integer({low}, {high})"),
            Self::Continuous {
                low,
                high,
                distribution,
            } => write!(f, "Continuous({low}, {high}, {distribution})"),
            Self::Categorical { choices, .. } => {
                let rendered: Vec<String> = choices.iter().map(ToString::to_string).collect();
                write!(f, "Categorical([{}])", rendered.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_integer_samples_inclusive_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let dim = Dimension::integer(700, 703);
        let mut seen = [false; 4];

        for _ in 0..1000 {
            let v = dim.sample(&mut rng);
            assert!(dim.contains(&v));
            seen[(v.as_i64().unwrap() - 700) as usize] = true;
        }

        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_continuous_uniform_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let dim = Dimension::continuous(0.0, 1.0);

        for _ in 0..1000 {
            let v = dim.sample(&mut rng).as_f64().unwrap();
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_log_uniform_spreads_over_magnitudes() {
        let mut rng = StdRng::seed_from_u64(3);
        let dim = Dimension::log_uniform(1e-4, 1.0);

        let samples: Vec<f64> = (0..2000)
            .map(|_| dim.sample(&mut rng).as_f64().unwrap())
            .collect();

        assert!(samples.iter().all(|v| (1e-4..=1.0).contains(v)));
        // Each decade holds roughly a quarter of the mass
        let below_1e3 = samples.iter().filter(|v| **v < 1e-3).count();
        assert!(below_1e3 > 300 && below_1e3 < 700, "got {below_1e3}");
    }

    #[test]
    fn test_degenerate_continuous_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let dim = Dimension::continuous(0.3, 0.3);
        assert_eq!(dim.sample(&mut rng), ParamValue::Float(0.3));
    }

    #[test]
    fn test_categorical_visits_every_choice() {
        let mut rng = StdRng::seed_from_u64(5);
        let dim = Dimension::categorical(["a", "b", "c", "d", "e"]);
        let mut counts = std::collections::HashMap::new();

        for _ in 0..10_000 {
            let v = dim.sample(&mut rng);
            assert!(dim.contains(&v));
            *counts.entry(v.to_string()).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), 5);
    }

    #[test]
    fn test_categorical_priors_bias_sampling() {
        let mut rng = StdRng::seed_from_u64(9);
        let dim = Dimension::categorical_with_priors([true, false], vec![0.9, 0.1]);
        dim.validate().unwrap();

        let trues = (0..5000)
            .filter(|_| dim.sample(&mut rng) == ParamValue::Bool(true))
            .count();
        assert!(trues > 4200, "got {trues}");
    }

    #[test]
    fn test_zero_prior_never_sampled() {
        let mut rng = StdRng::seed_from_u64(2);
        let dim = Dimension::categorical_with_priors(["x", "y"], vec![1.0, 0.0]);

        for _ in 0..500 {
            assert_eq!(dim.sample(&mut rng), ParamValue::from("x"));
        }
    }

    #[test]
    fn test_validate_rejects_bad_descriptors() {
        assert!(Dimension::integer(5, 1).validate().is_err());
        assert!(Dimension::continuous(1.0, 0.0).validate().is_err());
        assert!(Dimension::continuous(0.0, f64::INFINITY).validate().is_err());
        assert!(Dimension::log_uniform(0.0, 1.0).validate().is_err());
        assert!(Dimension::categorical(Vec::<ParamValue>::new())
            .validate()
            .is_err());
        assert!(Dimension::categorical_with_priors(["a", "b"], vec![1.0])
            .validate()
            .is_err());
        assert!(Dimension::categorical_with_priors(["a", "b"], vec![-1.0, 2.0])
            .validate()
            .is_err());
        assert!(Dimension::categorical_with_priors(["a", "b"], vec![0.0, 0.0])
            .validate()
            .is_err());

        assert!(Dimension::integer(1, 1).validate().is_ok());
        assert!(Dimension::log_uniform(1e-4, 1.0).validate().is_ok());
    }

    #[test]
    fn test_contains_checks_kind() {
        let dim = Dimension::integer(0, 10);
        assert!(dim.contains(&ParamValue::Int(10)));
        assert!(!dim.contains(&ParamValue::Int(11)));
        assert!(!dim.contains(&ParamValue::Float(5.0)));

        let dim = Dimension::categorical(["a", "b"]);
        assert!(dim.contains(&ParamValue::from("a")));
        assert!(!dim.contains(&ParamValue::from("c")));
    }

    #[test]
    fn test_dimension_json() {
        let dim: Dimension =
            serde_json::from_str(r#"{"type": "continuous", "low": 0.0001, "high": 1.0, "distribution": "log-uniform"}"#)
                .unwrap();
        assert_eq!(dim, Dimension::log_uniform(1e-4, 1.0));

        let dim: Dimension = serde_json::from_str(r#"{"type": "integer", "low": 2, "high": 8}"#).unwrap();
        assert_eq!(dim, Dimension::integer(2, 8));

        let dim: Dimension =
            serde_json::from_str(r#"{"type": "categorical", "choices": [true, false]}"#).unwrap();
        assert_eq!(dim, Dimension::categorical([true, false]));
    }

    #[test]
    fn test_distribution_from_str() {
        assert_eq!("uniform".parse::<Distribution>().unwrap(), Distribution::Uniform);
        assert_eq!(
            "log-uniform".parse::<Distribution>().unwrap(),
            Distribution::LogUniform
        );
        let err = "normal".parse::<Distribution>().unwrap_err();
        assert!(err.to_string().contains("log-uniform"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimension::integer(1, 3).to_string(), "Integer(1, 3)");
        assert_eq!(
            Dimension::categorical(["a", "b"]).to_string(),
            "Categorical([a, b])"
        );
    }
}
