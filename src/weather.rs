//! Outbound queries against the National Weather Service API.
//!
//! Each request carries its own timeout and nothing is retried; failures are
//! classified and handed back to the caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::constants::{FORECAST_PERIODS, USER_AGENT};
use crate::error::{Result, WeatherError};
use crate::models::{
    normalize_state_code, validate_coordinates, AlertResponse, AlertsOutcome, DailyForecast,
    ForecastResponse, PointsResponse,
};

/// Why a single upstream request failed
#[derive(Debug)]
enum FetchFailure {
    NotFound,
    Unavailable(String),
}

impl From<FetchFailure> for WeatherError {
    fn from(failure: FetchFailure) -> Self {
        match failure {
            FetchFailure::NotFound => {
                WeatherError::ServiceUnavailable("upstream returned 404 Not Found".to_string())
            }
            FetchFailure::Unavailable(reason) => WeatherError::ServiceUnavailable(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_base: String,
}

impl WeatherClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Active alerts for a US state or territory
    pub async fn get_alerts(&self, state: &str) -> Result<AlertsOutcome> {
        let state = normalize_state_code(state)?;
        let url = format!("{}/alerts/active/area/{}", self.api_base, state);

        let alerts = self.fetch::<AlertResponse>(&url).await?;
        if alerts.features.is_empty() {
            return Ok(AlertsOutcome::NoActiveAlerts);
        }
        Ok(AlertsOutcome::Active(
            alerts.features.into_iter().map(|f| f.properties).collect(),
        ))
    }

    /// Next forecast periods for a coordinate, resolved via the points endpoint first
    pub async fn get_forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<DailyForecast>> {
        validate_coordinates(latitude, longitude)?;
        let unsupported = || WeatherError::UnsupportedLocation {
            latitude,
            longitude,
        };

        let points_url = format!("{}/points/{:.4},{:.4}", self.api_base, latitude, longitude);
        let points = self
            .fetch::<PointsResponse>(&points_url)
            .await
            .map_err(|failure| match failure {
                FetchFailure::NotFound => unsupported(),
                other => other.into(),
            })?;

        let forecast_url = points.properties.forecast.ok_or_else(unsupported)?;
        let forecast = self.fetch::<ForecastResponse>(&forecast_url).await?;

        Ok(forecast
            .properties
            .periods
            .into_iter()
            .take(FORECAST_PERIODS)
            .collect())
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, FetchFailure> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Unavailable(format!("request to {} timed out", url))
            } else {
                FetchFailure::Unavailable(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchFailure::NotFound);
        }
        if !status.is_success() {
            return Err(FetchFailure::Unavailable(format!(
                "request failed with status: {}",
                status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchFailure::Unavailable(format!("unexpected response body: {}", e)))
    }
}
