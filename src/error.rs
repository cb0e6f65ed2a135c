//! Error types for the billing assistant.

/// Top-level error type for the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Message-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Intent-classification errors.
///
/// Malformed model *output* is not an error — it degrades to an unknown
/// intent inside the classifier. These variants cover transport failures
/// and responses the completions endpoint itself got wrong.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classification request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Unexpected classification response: {reason}")]
    InvalidResponse { reason: String },
}

/// Billing-gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Billing request to {endpoint} failed: {reason}")]
    RequestFailed {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Billing gateway returned HTTP {status} for {endpoint}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Unexpected {endpoint} response: {reason}")]
    InvalidResponse {
        endpoint: &'static str,
        reason: String,
    },
}

/// Per-message pipeline errors.
///
/// The failure path persists the error's display text as the bot reply,
/// so leaf errors pass through transparently instead of being re-wrapped.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Token acquisition failed. The display text is the exact reply the
    /// user sees for this case.
    #[error("Failed to retrieve token")]
    Auth,

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for the process.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display_is_the_reply_text() {
        assert_eq!(PipelineError::Auth.to_string(), "Failed to retrieve token");
    }

    #[test]
    fn leaf_errors_pass_through_transparently() {
        let e = PipelineError::from(BillingError::Status {
            endpoint: "QueryBill",
            status: 503,
        });
        assert_eq!(
            e.to_string(),
            "Billing gateway returned HTTP 503 for QueryBill"
        );
    }
}
