//! Error types for genetic-search
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Mutation operation failed
    #[error("Mutation failed: {0}")]
    MutationFailed(String),
}

/// Top-level error type for search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid configuration, raised before any generation runs
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The scoring collaborator failed and the error policy is `raise`
    #[error("Fitness evaluation failed for {params}: {message}")]
    Evaluation {
        /// Rendered parameter mapping of the failing individual
        params: String,
        /// Message reported by the scorer
        message: String,
    },

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

impl SearchError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Result of an operator application
#[derive(Debug, Clone)]
pub enum OperatorResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation failed unrecoverably
    Failed(OperatorError),
}

impl<T> OperatorResult<T> {
    /// Returns the value if successful, None if failed
    pub fn value(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// Returns true if the operation was successful
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a standard result
    pub fn into_result(self) -> Result<T, OperatorError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Failed(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::CrossoverFailed("incompatible parents".to_string());
        assert_eq!(err.to_string(), "Crossover failed: incompatible parents");

        let err = OperatorError::MutationFailed("gene index 7 out of range".to_string());
        assert_eq!(err.to_string(), "Mutation failed: gene index 7 out of range");
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::config("population_size must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: population_size must be positive"
        );
        assert!(err.is_configuration());

        let err = SearchError::Evaluation {
            params: "{alpha: 0.1}".to_string(),
            message: "diverged".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Fitness evaluation failed for {alpha: 0.1}: diverged"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_search_error_from_operator_error() {
        let op_err = OperatorError::MutationFailed("index out of range".to_string());
        let err: SearchError = op_err.into();
        assert!(matches!(err, SearchError::Operator(_)));
    }

    #[test]
    fn test_operator_result_success() {
        let result: OperatorResult<i32> = OperatorResult::Success(42);
        assert!(result.is_ok());
        assert_eq!(result.value(), Some(42));
    }

    #[test]
    fn test_operator_result_failed() {
        let result: OperatorResult<i32> =
            OperatorResult::Failed(OperatorError::MutationFailed("test".to_string()));
        assert!(!result.is_ok());
        assert!(result.clone().into_result().is_err());
        assert_eq!(result.value(), None);
    }
}
