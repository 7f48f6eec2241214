use thiserror::Error;

/// Main error type for the decision engine
///
/// The scoring pipeline itself never fails: missing inputs degrade into
/// ineligible drivers and PASS decisions. Errors only come from the ambient
/// surfaces (configuration loading and strict snapshot parsing).
#[derive(Error, Debug)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Shorthand for a calibration validation failure
    pub fn calibration(msg: impl Into<String>) -> Self {
        EngineError::InvalidCalibration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_message() {
        let err = EngineError::calibration("nhl.total weights sum to 1.2");
        assert_eq!(
            err.to_string(),
            "Invalid calibration: nhl.total weights sum to 1.2"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: EngineError = parse.unwrap_err().into();
        assert!(matches!(err, EngineError::Json(_)));
    }
}
