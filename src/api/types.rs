//! API request/response types.

use serde::{Deserialize, Serialize};

use crate::encode::LandRecord;

/// Welcome message returned at the root path.
#[derive(Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// Static greeting
    pub message: String,
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "ready" or "unavailable"
    pub status: String,
    /// Service version
    pub version: String,
}

/// Batch prediction request.
#[derive(Serialize, Deserialize)]
pub struct PredictRequest {
    /// Land records to score, one prediction each
    pub instances: Vec<LandRecord>,
}

/// Batch prediction response.
#[derive(Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predictions in input order, rounded to 3 decimals
    pub predictions: Vec<f32>,
}

/// Error response.
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_instances_deserialize() {
        let request: PredictRequest = serde_json::from_str(r#"{"instances": []}"#).expect("test");
        assert!(request.instances.is_empty());
    }

    #[test]
    fn test_missing_instances_key_rejected() {
        let result: Result<PredictRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_predict_response_shape() {
        let response = PredictResponse {
            predictions: vec![4.123, 3.9],
        };
        let json = serde_json::to_string(&response).expect("test");
        assert!(json.contains("\"predictions\""));
        assert!(json.contains("4.123"));
    }

    #[test]
    fn test_error_response_roundtrip() {
        let response = ErrorResponse {
            error: "model is not loaded".to_string(),
        };
        let json = serde_json::to_string(&response).expect("test");
        let parsed: ErrorResponse = serde_json::from_str(&json).expect("test");
        assert_eq!(parsed.error, "model is not loaded");
    }
}
