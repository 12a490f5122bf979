use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    GatewayError,
    currency::{self, ConversionRequest, ConversionResponse},
    error::ApiError,
    quotes::{self, QuoteResponse},
    weather::{WeatherReport, WeatherService},
};

const QUOTE_FAILED: &str = "Failed to generate quote.";
const CONVERSION_FAILED: &str = "Conversion service error.";
const WEATHER_FAILED: &str = "Failed to fetch weather data. Try again later.";
const INVALID_BODY: &str = "Invalid request body: expected a JSON object.";

const MAX_BODY_BYTES: usize = 16 * 1024;

/// Read-only state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherService,
    pub quotes: &'static [&'static str],
}

impl AppState {
    pub fn new(weather: WeatherService) -> Self {
        Self {
            weather,
            quotes: &quotes::QUOTES,
        }
    }
}

/// First `city` value of the query string. Repeated or undecodable
/// parameters never fail the request; they only affect the label.
fn city_param(query: Result<Query<Vec<(String, String)>>, QueryRejection>) -> Option<String> {
    match query {
        Ok(Query(pairs)) => pairs
            .into_iter()
            .find_map(|(key, value)| (key == "city").then_some(value)),
        Err(rejection) => {
            debug!("Ignoring unreadable query string: {}", rejection.body_text());
            None
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/quote", get(get_quote))
        .route("/convert", post(convert_currency))
        .route("/weather", get(get_weather))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn get_quote(State(state): State<AppState>) -> Result<Json<QuoteResponse>, ApiError> {
    quotes::random_quote_from(state.quotes).map(Json).map_err(|e| {
        error!("Quote generation failed: {}", e);
        e.with_public_message(QUOTE_FAILED)
    })
}

async fn convert_currency(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected conversion body: {}", rejection.body_text());
        GatewayError::validation(INVALID_BODY)
    })?;

    let request = ConversionRequest::from_json(&body).map_err(|e| {
        debug!("Invalid conversion request: {}", e);
        e.with_public_message(CONVERSION_FAILED)
    })?;

    let response = currency::convert(&request);
    if !response.converted.is_finite() {
        error!("Conversion produced a non-finite result for {:?}", request);
        return Err(GatewayError::internal("non-finite conversion result")
            .with_public_message(CONVERSION_FAILED));
    }
    Ok(Json(response))
}

async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<WeatherReport>, ApiError> {
    let city = city_param(query);
    state
        .weather
        .report(city.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            error!("Weather API request failed: {}", e);
            e.with_public_message(WEATHER_FAILED)
        })
}
