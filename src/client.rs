//! HTTP client for the gateway endpoints, used by the panels

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::currency::{ConversionResponse, Currency};
use crate::error::ErrorBody;
use crate::quotes::QuoteResponse;
use crate::weather::WeatherReport;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-success status; `message` is the gateway's `error` field when it sent one
    #[error("Gateway returned {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Unexpected response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// Message worth showing to a user for a rejected request, if any
    #[must_use]
    pub fn client_message(&self) -> Option<&str> {
        match self {
            ClientError::Status {
                status: 400..=499,
                message: Some(message),
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self))]
    pub async fn quote(&self) -> Result<QuoteResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/quote", self.base_url))
            .send()
            .await
            .map_err(ClientError::Transport)?;
        decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn convert(
        &self,
        amount: f64,
        target: Currency,
    ) -> Result<ConversionResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/convert", self.base_url))
            .json(&json!({ "amount": amount_json(amount), "target": target }))
            .send()
            .await
            .map_err(ClientError::Transport)?;
        decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn weather(&self, city: Option<&str>) -> Result<WeatherReport, ClientError> {
        let url = match city {
            Some(city) => format!(
                "{}/api/weather?city={}",
                self.base_url,
                urlencoding::encode(city)
            ),
            None => format!("{}/api/weather", self.base_url),
        };
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        decode(response).await
    }
}

/// Largest integer an f64 holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole amounts go out as JSON integers (`100`, not `100.0`) so the gateway
/// echoes them the way the user typed them.
fn amount_json(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() <= MAX_EXACT_INTEGER {
        Value::from(amount as i64)
    } else {
        Value::from(amount)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.json::<ErrorBody>().await.ok().map(|body| body.error);
        debug!("Gateway returned {}: {:?}", status, message);
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    response.json().await.map_err(ClientError::Decode)
}
