use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::US_AREA_CODES;
use crate::error::{Result, WeatherError};

// ============================================================================
// National Weather Service API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AlertResponse {
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFeature {
    pub properties: Alert,
}

/// A single active alert as reported by NWS
#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    #[serde(default = "unknown")]
    pub event: String,
    pub headline: Option<String>,
    pub description: Option<String>,
    #[serde(default = "unknown")]
    pub severity: String,
    #[serde(rename = "areaDesc", default = "unknown")]
    pub area_desc: String,
}

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    /// Absent for points NWS resolves but does not forecast (e.g. offshore grids)
    pub forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
pub struct ForecastProperties {
    pub periods: Vec<DailyForecast>,
}

/// One forecast period ("Tonight", "Tuesday", ...)
#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecast {
    pub name: String,
    pub temperature: i32,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: String,
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "windDirection")]
    pub wind_direction: String,
    #[serde(rename = "shortForecast")]
    pub short_forecast: String,
    #[serde(rename = "detailedForecast")]
    pub detailed_forecast: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Result of an alerts lookup. An empty result set is a normal outcome, not an error.
#[derive(Debug)]
pub enum AlertsOutcome {
    Active(Vec<Alert>),
    NoActiveAlerts,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetAlertsRequest {
    #[schemars(description = "Two-letter US state code (e.g. CA, NY)")]
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[schemars(description = "Name of the location, used in history (optional)")]
    #[serde(default)]
    pub location_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SaveFavoriteRequest {
    #[schemars(description = "Name of the location")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetHistoryRequest {
    #[schemars(description = "Number of recent searches to show (default 10)")]
    #[serde(default)]
    pub limit: Option<i64>,
}

// ============================================================================
// Input Validation
// ============================================================================

/// Checks latitude is within [-90, 90] and longitude within [-180, 180]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(WeatherError::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// Normalizes a state code to uppercase and checks it names a US state or territory
pub fn normalize_state_code(state: &str) -> Result<String> {
    let code = state.trim().to_ascii_uppercase();
    if code.len() == 2 && US_AREA_CODES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(WeatherError::InvalidStateCode(state.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(40.7128, -74.0060).is_ok());

        assert!(matches!(
            validate_coordinates(91.0, 0.0),
            Err(WeatherError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            validate_coordinates(0.0, -181.0),
            Err(WeatherError::InvalidCoordinate { .. })
        ));
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_state_code_normalization() {
        assert_eq!(normalize_state_code("ca").unwrap(), "CA");
        assert_eq!(normalize_state_code(" ny ").unwrap(), "NY");
        assert_eq!(normalize_state_code("pr").unwrap(), "PR");

        for bad in ["ZZ", "C", "CAL", "", "1A"] {
            assert!(
                matches!(
                    normalize_state_code(bad),
                    Err(WeatherError::InvalidStateCode(_))
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_alert_defaults_missing_fields() {
        let body = r#"{"features":[{"properties":{"event":"Flood Watch","headline":null}}]}"#;
        let alerts: AlertResponse = serde_json::from_str(body).unwrap();
        let alert = &alerts.features[0].properties;
        assert_eq!(alert.event, "Flood Watch");
        assert_eq!(alert.severity, "Unknown");
        assert_eq!(alert.area_desc, "Unknown");
        assert!(alert.description.is_none());
    }

    #[test]
    fn test_points_without_forecast_url() {
        let body = r#"{"properties":{"forecast":null,"gridId":"MTR"}}"#;
        let points: PointsResponse = serde_json::from_str(body).unwrap();
        assert!(points.properties.forecast.is_none());
    }

    #[test]
    fn test_history_request_limit_optional() {
        let req: GetHistoryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.limit.is_none());
    }
}
