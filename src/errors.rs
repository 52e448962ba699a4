//! Error types for the bolão domain
//!
//! Domain-integrity failures (quota and lifecycle) are surfaced to callers.
//! AI generation failures live in [`GenerationError`] and are absorbed by the
//! lucky number generator, which degrades to its local fallback instead.

use crate::pools::{PaymentStatus, PoolStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Root error type for all bolão operations
#[derive(Debug, Error)]
pub enum BolaoError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {0}")]
    MissingRequired(String),
}

/// Quota accounting and lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: PoolStatus, to: PoolStatus },

    #[error("Insufficient quotas: requested {requested}, available {available}")]
    InsufficientQuotas { requested: u32, available: u32 },

    #[error("Pool is not open (status {status})")]
    PoolNotOpen { status: PoolStatus },

    #[error("Inconsistent quotas: total {total}, available {available}")]
    InconsistentQuotas { total: u32, available: u32 },

    #[error("Quota quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Invalid pool draft: {0}")]
    InvalidDraft(String),

    #[error("Pool cannot close before {closing_date} with {available} quotas unsold")]
    CloseConditionUnmet {
        closing_date: DateTime<Utc>,
        available: u32,
    },

    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("Payment is not pending (status {status})")]
    PaymentNotPending { status: PaymentStatus },
}

/// Lookup misses; callers decide between a default and reporting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Participation not found: {0}")]
    ParticipationNotFound(String),
}

/// Reasons the AI text generation path is unavailable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI credentials are not configured")]
    MissingCredentials,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("AI service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service returned an empty response")]
    EmptyResponse,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        GenerationError::MalformedResponse(e.to_string())
    }
}

impl From<std::io::Error> for BolaoError {
    fn from(e: std::io::Error) -> Self {
        BolaoError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(e: toml::de::Error) -> Self {
        ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e))
    }
}

impl From<toml::ser::Error> for ConfigurationError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
    }
}

// Convenience type alias for Results
pub type BolaoResult<T> = Result<T, BolaoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display() {
        let pool_error = PoolError::InsufficientQuotas {
            requested: 6,
            available: 5,
        };
        let error = BolaoError::Pool(pool_error);

        assert!(error.to_string().contains("Pool error"));
        assert!(error.to_string().contains("requested 6"));
        assert!(error.to_string().contains("available 5"));
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let error = PoolError::InvalidTransition {
            from: PoolStatus::Closed,
            to: PoolStatus::Open,
        };

        assert_eq!(error.to_string(), "Invalid transition from CLOSED to OPEN");
    }

    #[test]
    fn test_error_conversion() {
        let lookup: BolaoError = LookupError::PoolNotFound("p9".to_string()).into();

        match lookup {
            BolaoError::Lookup(LookupError::PoolNotFound(id)) => assert_eq!(id, "p9"),
            other => panic!("Expected lookup error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_source() {
        let error = BolaoError::Configuration(ConfigurationError::MissingRequired(
            "ai.model".to_string(),
        ));

        assert!(error.source().is_some());
    }

    #[test]
    fn test_json_error_maps_to_malformed_response() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: GenerationError = json_error.into();

        assert!(matches!(error, GenerationError::MalformedResponse(_)));
    }
}
