//! Error types for the weather memory server

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Result type alias for store and weather operations
pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error(
        "Invalid coordinates ({latitude}, {longitude}): latitude must be within [-90, 90] \
         and longitude within [-180, 180]"
    )]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid state code '{0}': expected a two-letter US state or territory code")]
    InvalidStateCode(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Location '{0}' is already saved as a favorite")]
    DuplicateFavorite(String),

    #[error("Weather service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(
        "Location ({latitude}, {longitude}) is outside the National Weather Service \
         coverage area"
    )]
    UnsupportedLocation { latitude: f64, longitude: f64 },

    #[error("Failed to persist memory file: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Memory file is corrupt: {0}")]
    CorruptState(String),
}

impl WeatherError {
    /// Errors caused by the caller's input, raised before any mutation or request
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            WeatherError::InvalidCoordinate { .. }
                | WeatherError::InvalidStateCode(_)
                | WeatherError::InvalidArgument(_)
        )
    }
}

impl From<WeatherError> for McpError {
    fn from(err: WeatherError) -> Self {
        if err.is_invalid_argument() || matches!(err, WeatherError::UnsupportedLocation { .. }) {
            McpError::invalid_params(err.to_string(), None)
        } else {
            McpError::internal_error(err.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_family() {
        assert!(WeatherError::InvalidStateCode("ZZ".into()).is_invalid_argument());
        assert!(WeatherError::InvalidArgument("limit".into()).is_invalid_argument());
        assert!(WeatherError::InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0
        }
        .is_invalid_argument());
        assert!(!WeatherError::ServiceUnavailable("timeout".into()).is_invalid_argument());
        assert!(!WeatherError::DuplicateFavorite("Home".into()).is_invalid_argument());
    }

    #[test]
    fn test_mcp_error_mapping() {
        let err: McpError = WeatherError::InvalidStateCode("ZZ".into()).into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let err: McpError = WeatherError::ServiceUnavailable("timed out".into()).into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);

        let err: McpError = WeatherError::UnsupportedLocation {
            latitude: 10.0,
            longitude: 10.0,
        }
        .into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("coverage"));
    }
}
