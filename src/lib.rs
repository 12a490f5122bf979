//! `InfoHub` - a small utility hub
//!
//! The gateway serves a random motivational quote, a mock INR currency
//! conversion and a single-location weather proxy over HTTP. The client
//! side (`client`, `panel`) drives those endpoints through three panels.

pub mod api;
pub mod client;
pub mod config;
pub mod currency;
pub mod error;
pub mod logging;
pub mod panel;
pub mod quotes;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use client::{ClientError, GatewayClient};
pub use config::GatewayConfig;
pub use currency::{ConversionRequest, ConversionResponse, Currency};
pub use error::GatewayError;
pub use panel::{Hub, PanelKind, PanelState};
pub use quotes::QuoteResponse;
pub use weather::{Condition, WeatherReport, WeatherService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GatewayError>;
