//! Weather proxy for the Open-Meteo current-conditions API
//!
//! Every request queries the same fixed coordinates; the caller's city is
//! only echoed back as a label.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::GatewayError;
use crate::config::WeatherConfig;

/// Strictly above this temperature (°C) the condition is reported as warm
pub const WARM_THRESHOLD_C: f64 = 15.0;

/// Coordinates the upstream provider is queried with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Values extracted from the provider's `current` object
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
}

/// Source of current conditions for a location
#[async_trait]
pub trait CurrentConditionsProvider: Send + Sync {
    async fn current_conditions(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, GatewayError>;
}

/// Coarse two-value condition label derived from temperature only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Clear/Warm")]
    ClearWarm,
    #[serde(rename = "Cloudy/Cold")]
    CloudyCold,
}

impl Condition {
    #[must_use]
    pub fn from_temperature(temperature: f64) -> Self {
        if temperature > WARM_THRESHOLD_C {
            Condition::ClearWarm
        } else {
            Condition::CloudyCold
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Condition::ClearWarm => "Clear/Warm",
            Condition::CloudyCold => "Cloudy/Cold",
        }
    }
}

/// Body of a successful `GET /api/weather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub temperature: String,
    pub wind_speed: String,
    pub condition: Condition,
}

impl WeatherReport {
    #[must_use]
    pub fn new(city: impl Into<String>, conditions: CurrentConditions) -> Self {
        Self {
            city: city.into(),
            temperature: format!("{} °C", conditions.temperature),
            wind_speed: format!("{} km/h", conditions.wind_speed),
            condition: Condition::from_temperature(conditions.temperature),
        }
    }
}

/// Fixed-location weather lookup shared by all requests
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn CurrentConditionsProvider>,
    coordinates: Coordinates,
    default_city: String,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn CurrentConditionsProvider>,
        coordinates: Coordinates,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            coordinates,
            default_city: default_city.into(),
        }
    }

    /// Build the service backed by Open-Meteo as configured
    pub fn from_config(config: &WeatherConfig) -> Result<Self, GatewayError> {
        let client = OpenMeteoClient::new(&config.base_url)?;
        Ok(Self::new(
            Arc::new(client),
            Coordinates {
                latitude: config.latitude,
                longitude: config.longitude,
            },
            config.default_city.clone(),
        ))
    }

    /// Current weather labelled with `city`, or the default label when it is empty
    pub async fn report(&self, city: Option<&str>) -> Result<WeatherReport, GatewayError> {
        let city = city
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_city.as_str());
        let conditions = self.provider.current_conditions(self.coordinates).await?;
        Ok(WeatherReport::new(city, conditions))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

/// HTTP client for the Open-Meteo forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("InfoHub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,weather_code,wind_speed_10m&timezone=GMT",
            self.base_url, coordinates.latitude, coordinates.longitude
        )
    }
}

#[async_trait]
impl CurrentConditionsProvider for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current_conditions(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, GatewayError> {
        let url = self.forecast_url(coordinates);
        debug!("OpenMeteo API request URL: {}", url);
        let start_time = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Weather API request failed: {}", e);
            GatewayError::upstream(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Weather API returned HTTP {}", status);
            return Err(GatewayError::upstream(format!(
                "provider returned status {status}"
            )));
        }

        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse weather response: {}", e);
            GatewayError::upstream(format!("invalid payload: {e}"))
        })?;

        let current = forecast.current.ok_or_else(|| {
            error!("Weather response has no current conditions");
            GatewayError::upstream("missing current conditions")
        })?;

        info!(
            "Retrieved current weather in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LONDON: Coordinates = Coordinates {
        latitude: 51.5085,
        longitude: -0.1257,
    };

    struct FixedConditions(CurrentConditions);

    #[async_trait]
    impl CurrentConditionsProvider for FixedConditions {
        async fn current_conditions(
            &self,
            _coordinates: Coordinates,
        ) -> Result<CurrentConditions, GatewayError> {
            Ok(self.0)
        }
    }

    fn fixed_service(temperature: f64, wind_speed: f64) -> WeatherService {
        WeatherService::new(
            Arc::new(FixedConditions(CurrentConditions {
                temperature,
                wind_speed,
            })),
            LONDON,
            "London",
        )
    }

    #[test]
    fn test_condition_threshold() {
        assert_eq!(Condition::from_temperature(15.1), Condition::ClearWarm);
        assert_eq!(Condition::from_temperature(15.0), Condition::CloudyCold);
        assert_eq!(Condition::from_temperature(-3.0), Condition::CloudyCold);
        assert_eq!(Condition::ClearWarm.label(), "Clear/Warm");
    }

    #[test]
    fn test_report_formatting() {
        let report = WeatherReport::new(
            "Paris",
            CurrentConditions {
                temperature: 12.0,
                wind_speed: 7.4,
            },
        );
        assert_eq!(report.temperature, "12 °C");
        assert_eq!(report.wind_speed, "7.4 km/h");
        assert_eq!(report.condition, Condition::CloudyCold);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["windSpeed"], "7.4 km/h");
        assert_eq!(json["condition"], "Cloudy/Cold");
    }

    #[tokio::test]
    async fn test_city_is_only_a_label() {
        let service = fixed_service(18.2, 3.0);
        let report = service.report(Some("Tokyo")).await.unwrap();
        assert_eq!(report.city, "Tokyo");
        assert_eq!(report.condition, Condition::ClearWarm);

        let report = service.report(None).await.unwrap();
        assert_eq!(report.city, "London");

        let report = service.report(Some("")).await.unwrap();
        assert_eq!(report.city, "London");
    }

    #[tokio::test]
    async fn test_open_meteo_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("latitude", "51.5085"))
            .and(query_param("longitude", "-0.1257"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"latitude":51.5,"longitude":-0.12,"current":{"time":"2024-05-01T12:00","temperature_2m":16.4,"weather_code":2,"wind_speed_10m":11.2}}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = OpenMeteoClient::new(&mock_server.uri()).unwrap();
        let current = client.current_conditions(LONDON).await.unwrap();
        assert_eq!(current.temperature, 16.4);
        assert_eq!(current.wind_speed, 11.2);
    }

    #[tokio::test]
    async fn test_open_meteo_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = OpenMeteoClient::new(&mock_server.uri()).unwrap();
        let err = client.current_conditions(LONDON).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_open_meteo_malformed_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"current":{"temperature_2m":"warm"}}"#),
            )
            .mount(&mock_server)
            .await;

        let client = OpenMeteoClient::new(&mock_server.uri()).unwrap();
        let err = client.current_conditions(LONDON).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_open_meteo_missing_current() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"latitude":51.5}"#))
            .mount(&mock_server)
            .await;

        let client = OpenMeteoClient::new(&mock_server.uri()).unwrap();
        let err = client.current_conditions(LONDON).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }
}
