//! Error types for the panen prediction pipeline.
//!
//! All failures from loading, encoding, and inference funnel into
//! [`PanenError`]; the HTTP boundary converts each variant into a
//! structured error response and an appropriate status code.

use thiserror::Error;

/// Result alias using [`PanenError`].
pub type Result<T> = std::result::Result<T, PanenError>;

/// Errors produced by the panen prediction pipeline.
#[derive(Debug, Error)]
pub enum PanenError {
    /// Model artifact or reference dataset could not be loaded at startup.
    #[error("startup load failed: {reason}")]
    StartupLoad {
        /// What failed to load and why
        reason: String,
    },

    /// Prediction requested while the service is not in the Ready state.
    #[error("model is not loaded; check server startup logs")]
    ModelNotReady,

    /// An input record is missing a required field or carries a value
    /// that cannot be coerced to its declared type.
    #[error("schema mismatch: {reason}")]
    SchemaMismatch {
        /// Which field or value was rejected
        reason: String,
    },

    /// The model rejected the assembled feature matrix.
    #[error("inference failed: {reason}")]
    Inference {
        /// Underlying cause from the model
        reason: String,
    },

    /// Server-level failure (address parse, bind, serve).
    #[error("server error: {reason}")]
    Server {
        /// Underlying transport cause
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_load_display() {
        let err = PanenError::StartupLoad {
            reason: "model file 'xgb.json' not found".to_string(),
        };
        assert!(err.to_string().contains("startup load failed"));
        assert!(err.to_string().contains("xgb.json"));
    }

    #[test]
    fn test_model_not_ready_display() {
        let err = PanenError::ModelNotReady;
        assert!(err.to_string().contains("not loaded"));
    }

    #[test]
    fn test_inference_display_includes_cause() {
        let err = PanenError::Inference {
            reason: "expected 14 features, got 13".to_string(),
        };
        assert!(err.to_string().contains("expected 14 features"));
    }
}
