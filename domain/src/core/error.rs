//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::InvalidPlan("no steps".to_string());
        assert_eq!(error.to_string(), "Invalid plan: no steps");
    }
}
